//! Command parsing for inbound messages

/// What an inbound message asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/start`
    Start,
    /// `/help`
    Help,
    /// Anything else; validated as a username later
    Lookup { candidate: String },
}

impl Command {
    /// Parse message text
    ///
    /// Only `/start` and `/help` are commands (optionally addressed as
    /// `/help@botname`). Every other input, unknown slash commands included,
    /// becomes a lookup and is left to the validator to reject.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();

        if let Some(rest) = trimmed.strip_prefix('/') {
            let word = rest.split_whitespace().next().unwrap_or_default();
            let name = word.split('@').next().unwrap_or_default();
            match name.to_lowercase().as_str() {
                "start" => return Command::Start,
                "help" => return Command::Help,
                _ => {}
            }
        }

        Command::Lookup {
            candidate: input.to_string(),
        }
    }

    /// Short description, used for the platform's command menu
    pub fn description(&self) -> &'static str {
        match self {
            Command::Start => "Start the bot",
            Command::Help => "Show help",
            Command::Lookup { .. } => "Recent listens for a username",
        }
    }

    /// Commands shown in the platform's command menu as `(name, description)`
    pub fn menu() -> [(&'static str, &'static str); 2] {
        [
            ("start", Command::Start.description()),
            ("help", Command::Help.description()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_start_and_help() {
        assert_eq!(Command::parse("/start"), Command::Start);
        assert_eq!(Command::parse("/help"), Command::Help);
        assert_eq!(Command::parse("  /HELP  "), Command::Help);
    }

    #[test]
    fn test_parse_addressed_command() {
        assert_eq!(Command::parse("/start@recentplaybot"), Command::Start);
        assert_eq!(Command::parse("/help@recentplaybot extra"), Command::Help);
    }

    #[test]
    fn test_parse_lookup() {
        assert_eq!(
            Command::parse("rj"),
            Command::Lookup {
                candidate: "rj".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_command_is_a_lookup() {
        assert_eq!(
            Command::parse("/stats"),
            Command::Lookup {
                candidate: "/stats".to_string()
            }
        );
    }

    #[test]
    fn test_menu() {
        let menu = Command::menu();
        assert_eq!(menu[0].0, "start");
        assert_eq!(menu[1], ("help", "Show help"));
    }
}
