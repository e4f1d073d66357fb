//! Parsing of chat input lines shared by the TUI and the line chat.

/// What a submitted line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Blank line; ignored
    Empty,
    /// `/login <user>`: switch the active session
    Login(String),
    /// Anything else is a chat message for the assistant, kept verbatim
    Say(String),
}

/// Classify one line of input.
pub fn parse_line(line: &str) -> Command {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Command::Empty;
    }

    if let Some(rest) = trimmed.strip_prefix("/login") {
        let user = rest.trim();
        if !user.is_empty() && rest.starts_with(char::is_whitespace) {
            return Command::Login(user.to_string());
        }
    }

    Command::Say(line.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line() {
        assert_eq!(parse_line("   "), Command::Empty);
        assert_eq!(parse_line("/login alice"), Command::Login("alice".to_string()));
        assert_eq!(parse_line("  /login   bob  "), Command::Login("bob".to_string()));
        assert_eq!(
            parse_line("dough done"),
            Command::Say("dough done".to_string())
        );
    }

    #[test]
    fn test_chat_text_is_not_trimmed() {
        assert_eq!(
            parse_line("  dough done\t"),
            Command::Say("  dough done\t".to_string())
        );
    }

    #[test]
    fn test_malformed_login_is_chat() {
        assert_eq!(parse_line("/login "), Command::Say("/login ".to_string()));
        assert_eq!(
            parse_line("/loginalice"),
            Command::Say("/loginalice".to_string())
        );
    }
}
