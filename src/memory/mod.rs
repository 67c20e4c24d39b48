pub mod durable;
pub mod session;

use anyhow::Result;
use rand::Rng;
use tracing::info;

pub use durable::DurableRoster;
pub use session::{RosterEntry, SessionRoster};

/// Two-tier roster: who is in today's roll, and everyone ever seen
pub struct RosterStore {
    session: SessionRoster,
    durable: DurableRoster,
}

impl RosterStore {
    pub fn new(durable: DurableRoster) -> Self {
        Self {
            session: SessionRoster::default(),
            durable,
        }
    }

    pub fn is_registered(&self, user_id: &str) -> bool {
        self.session.contains(user_id)
    }

    /// Add a user to this run's roster. A user seen in an earlier run keeps
    /// the name recorded back then.
    ///
    /// Returns false when the user was already registered.
    pub fn register(&mut self, user_id: &str, display_name: &str) -> Result<bool> {
        if self.session.contains(user_id) {
            return Ok(false);
        }

        if self.durable.insert_if_absent(user_id, display_name)? {
            info!("New user recorded: {} ({})", display_name, user_id);
        }
        let name = self
            .durable
            .get(user_id)?
            .unwrap_or_else(|| display_name.to_string());

        Ok(self.session.insert(user_id, &name))
    }

    /// Drop a user from this run's roster; the durable record stays.
    pub fn unregister(&mut self, user_id: &str) -> bool {
        self.session.remove(user_id).is_some()
    }

    /// Session names in registration order
    pub fn list_session(&self) -> Vec<&str> {
        self.session
            .entries()
            .iter()
            .map(|e| e.name.as_str())
            .collect()
    }

    pub fn session(&self) -> &SessionRoster {
        &self.session
    }

    #[cfg(test)]
    pub fn durable(&self) -> &DurableRoster {
        &self.durable
    }

    pub fn pick_random<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&RosterEntry> {
        self.session.pick_random(rng)
    }

    pub fn close(self) -> Result<()> {
        self.durable.close()
    }
}
