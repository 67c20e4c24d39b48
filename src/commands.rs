use crate::logs::DEFAULT_TAIL_LINES;

pub const HELP_TEXT: &str = "Usage:\n\
    /help - print this message\n\
    /reg - register for roll\n\
    /leave - unregister\n\
    /list - show list of participants\n\
    /roll - find the lucky guy\n\
    /logs [n] - show the last n log lines";

/// Replies to anything the bot doesn't understand; each gets [`FALLBACK_HINT`]
pub const FALLBACK_PHRASES: [&str; 3] = [
    "Не внятно!",
    "Не содержательно!",
    "Эту реплику из зала я отвергну как неорганизованную!",
];

pub const FALLBACK_HINT: &str = " Используйте /help";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Help,
    Register,
    Leave,
    List,
    Roll,
    Logs(usize),
    Unknown,
}

impl Command {
    /// Parse the command word of a text message. Anything after it is
    /// ignored, except the line count of `/logs`.
    pub fn parse(text: &str) -> Self {
        let mut words = text.split_whitespace();
        let Some(head) = words.next() else {
            return Command::Unknown;
        };

        match strip_mention(head) {
            "/help" | "/start" => Command::Help,
            "/reg" => Command::Register,
            "/leave" => Command::Leave,
            "/list" => Command::List,
            "/roll" => Command::Roll,
            "/logs" => Command::Logs(
                words
                    .next()
                    .and_then(|arg| arg.parse().ok())
                    .unwrap_or(DEFAULT_TAIL_LINES),
            ),
            _ => Command::Unknown,
        }
    }
}

// In groups Telegram sends `/roll@SomeBot`.
fn strip_mention(word: &str) -> &str {
    match word.split_once('@') {
        Some((command, _)) if command.starts_with('/') => command,
        _ => word,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("/help"), Command::Help);
        assert_eq!(Command::parse("/start"), Command::Help);
        assert_eq!(Command::parse("/reg"), Command::Register);
        assert_eq!(Command::parse("/leave"), Command::Leave);
        assert_eq!(Command::parse("/list"), Command::List);
        assert_eq!(Command::parse("/roll"), Command::Roll);
    }

    #[test]
    fn test_parse_logs_argument() {
        assert_eq!(Command::parse("/logs"), Command::Logs(10));
        assert_eq!(Command::parse("/logs 3"), Command::Logs(3));
        assert_eq!(Command::parse("/logs abc"), Command::Logs(10));
        assert_eq!(Command::parse("/logs -3"), Command::Logs(10));
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(Command::parse(""), Command::Unknown);
        assert_eq!(Command::parse("   "), Command::Unknown);
        assert_eq!(Command::parse("hello"), Command::Unknown);
        assert_eq!(Command::parse("/motivate"), Command::Unknown);
        assert_eq!(Command::parse("/logsfoo"), Command::Unknown);
    }

    #[test]
    fn test_parse_with_bot_mention() {
        assert_eq!(Command::parse("/roll@ShavermaBot"), Command::Roll);
        assert_eq!(Command::parse("/logs@ShavermaBot 2"), Command::Logs(2));
        assert_eq!(Command::parse("mail@example.com"), Command::Unknown);
    }

    #[test]
    fn test_help_lists_every_command() {
        for command in ["/help", "/reg", "/leave", "/list", "/roll", "/logs"] {
            assert!(HELP_TEXT.contains(command), "missing {}", command);
        }
    }
}
