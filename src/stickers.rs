/// Sent back for any sticker the bot has no pair for
pub const DEFAULT_STICKER: &str = "CAADAgADSAIAAkcGQwU-G-9SZUDTWAI";

const RYZHKOV_LEFT: &str = "CAADAgADdAEAAizdvQn2LxfsJBfaxAI";
const RYZHKOV_RIGHT: &str = "CAADAgADcgEAAizdvQlKOeQLRsy97AI";
const SHALYTO_LEFT: &str = "CAADAgADUQADRTARC-8FwsYxJM2cAg";
const SHALYTO_RIGHT: &str = "CAADAgADTgADRTARC8Mi8Smz4tpGAg";
const SHALYTO_BOTH: &str = "CAADAgADUgADRTARC-jA-35mcixwAg";

/// Sticker to answer `file_id` with: paired stickers face each other.
pub fn reply_sticker(file_id: &str) -> &'static str {
    match file_id {
        RYZHKOV_LEFT => RYZHKOV_RIGHT,
        RYZHKOV_RIGHT => RYZHKOV_LEFT,
        SHALYTO_LEFT => SHALYTO_RIGHT,
        SHALYTO_RIGHT => SHALYTO_LEFT,
        SHALYTO_BOTH => SHALYTO_BOTH,
        _ => DEFAULT_STICKER,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairs_swap() {
        assert_eq!(reply_sticker(RYZHKOV_LEFT), RYZHKOV_RIGHT);
        assert_eq!(reply_sticker(RYZHKOV_RIGHT), RYZHKOV_LEFT);
        assert_eq!(reply_sticker(SHALYTO_LEFT), SHALYTO_RIGHT);
        assert_eq!(reply_sticker(SHALYTO_RIGHT), SHALYTO_LEFT);
    }

    #[test]
    fn test_both_echoes() {
        assert_eq!(reply_sticker(SHALYTO_BOTH), SHALYTO_BOTH);
    }

    #[test]
    fn test_unknown_gets_default() {
        assert_eq!(reply_sticker("something-else"), DEFAULT_STICKER);
    }
}
