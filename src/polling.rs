use crate::platform::telegram::{ApiError, BotApi};
use crate::platform::RawUpdate;

/// getUpdates offset carried between polling rounds.
///
/// Unset until the first update is acknowledged, then bumped by one per
/// acknowledgement. Later acknowledgements do not look at the update id, so
/// a batch with gaps in its ids leaves the offset behind the last id seen;
/// Telegram then redelivers from there.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PollCursor {
    offset: Option<i64>,
}

impl PollCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offset(&self) -> Option<i64> {
        self.offset
    }

    /// Mark one update as handled.
    pub fn acknowledge(&mut self, update_id: i64) {
        let base = *self.offset.get_or_insert(update_id);
        self.offset = Some(base + 1);
    }
}

/// Drives getUpdates rounds from a [`PollCursor`]
#[derive(Debug)]
pub struct Poller {
    cursor: PollCursor,
    timeout_secs: u64,
}

impl Poller {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            cursor: PollCursor::new(),
            timeout_secs,
        }
    }

    pub fn cursor(&self) -> PollCursor {
        self.cursor
    }

    /// One polling round from the current offset. On error nothing is
    /// consumed and the same round can simply be retried.
    pub async fn fetch_batch<A>(&self, api: &A) -> Result<Vec<RawUpdate>, ApiError>
    where
        A: BotApi + ?Sized,
    {
        api.get_updates(self.cursor.offset(), self.timeout_secs)
            .await
    }

    pub fn acknowledge(&mut self, update_id: i64) {
        self.cursor.acknowledge(update_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_unset() {
        assert_eq!(PollCursor::new().offset(), None);
    }

    #[test]
    fn test_first_ack_starts_from_update_id() {
        let mut cursor = PollCursor::new();
        cursor.acknowledge(100);
        assert_eq!(cursor.offset(), Some(101));
    }

    #[test]
    fn test_contiguous_batch() {
        let mut cursor = PollCursor::new();
        for id in 100..105 {
            cursor.acknowledge(id);
        }
        assert_eq!(cursor.offset(), Some(105));
    }

    #[test]
    fn test_gapped_batch_only_increments() {
        // Ids after the first are ignored: 100, 107 leaves the offset at 102,
        // not 108. Telegram redelivers 107 on the next round.
        let mut cursor = PollCursor::new();
        cursor.acknowledge(100);
        cursor.acknowledge(107);
        assert_eq!(cursor.offset(), Some(102));
    }

    #[test]
    fn test_never_decreases() {
        let mut cursor = PollCursor::new();
        let mut last = i64::MIN;
        for id in [50, 3, 49, 0, -7, 1000, 51] {
            cursor.acknowledge(id);
            let offset = cursor.offset().unwrap();
            assert!(offset > last);
            last = offset;
        }
    }
}
