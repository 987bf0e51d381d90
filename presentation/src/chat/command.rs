//! Chat input parsing
//!
//! Turns one line of REPL input into a [`ChatCommand`]. Parsing is pure so
//! the REPL loop only has to dispatch.

/// One parsed line of chat input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Plain text: starts a discussion, or contributes to the current one
    Message(String),
    /// `/say <text>`: contribute to the current discussion
    Say(String),
    /// `/continue [n]`
    Continue(Option<u32>),
    /// `/new`: forget the current discussion
    New,
    /// `/participants`
    Participants,
    /// `/toggle <id>`
    Toggle(String),
    /// `/edit <id> <text>`
    Edit { id: String, text: String },
    /// `/reset <id>`
    Reset(String),
    /// `/publish`: push edited instructions to the backend
    Publish,
    /// `/transcript`
    Transcript,
    Help,
    Quit,
    /// Input that could not be parsed, with a hint for the user
    Invalid(String),
}

impl ChatCommand {
    /// Parse a trimmed, non-empty line.
    pub fn parse(line: &str) -> ChatCommand {
        let line = line.trim();
        let Some(rest) = line.strip_prefix('/') else {
            return ChatCommand::Message(line.to_string());
        };

        let (name, args) = match rest.split_once(char::is_whitespace) {
            Some((name, args)) => (name, args.trim()),
            None => (rest, ""),
        };

        match name {
            "quit" | "exit" | "q" => ChatCommand::Quit,
            "help" | "h" | "?" => ChatCommand::Help,
            "new" => ChatCommand::New,
            "participants" | "p" => ChatCommand::Participants,
            "publish" => ChatCommand::Publish,
            "transcript" | "t" => ChatCommand::Transcript,
            "continue" | "c" => {
                if args.is_empty() {
                    return ChatCommand::Continue(None);
                }
                match args.parse::<u32>() {
                    Ok(n) if n > 0 => ChatCommand::Continue(Some(n)),
                    _ => ChatCommand::Invalid(format!(
                        "'{}' is not a round count; use /continue [n] with n >= 1",
                        args
                    )),
                }
            }
            "say" => required(args, "/say <text>", |text| ChatCommand::Say(text.to_string())),
            "toggle" => required(args, "/toggle <id>", |id| ChatCommand::Toggle(id.to_string())),
            "reset" => required(args, "/reset <id>", |id| ChatCommand::Reset(id.to_string())),
            "edit" => match args.split_once(char::is_whitespace) {
                Some((id, text)) if !text.trim().is_empty() => ChatCommand::Edit {
                    id: id.to_string(),
                    text: text.trim().to_string(),
                },
                _ => ChatCommand::Invalid("Usage: /edit <id> <instructions>".to_string()),
            },
            other => ChatCommand::Invalid(format!(
                "Unknown command: /{}. Type /help for available commands",
                other
            )),
        }
    }
}

fn required(args: &str, usage: &str, build: impl FnOnce(&str) -> ChatCommand) -> ChatCommand {
    if args.is_empty() {
        ChatCommand::Invalid(format!("Usage: {}", usage))
    } else {
        build(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_message() {
        assert_eq!(
            ChatCommand::parse("  Is a hot dog a sandwich? "),
            ChatCommand::Message("Is a hot dog a sandwich?".into())
        );
    }

    #[test]
    fn test_continue_with_and_without_count() {
        assert_eq!(ChatCommand::parse("/continue"), ChatCommand::Continue(None));
        assert_eq!(ChatCommand::parse("/c 3"), ChatCommand::Continue(Some(3)));
        assert!(matches!(
            ChatCommand::parse("/continue 0"),
            ChatCommand::Invalid(_)
        ));
        assert!(matches!(
            ChatCommand::parse("/continue lots"),
            ChatCommand::Invalid(_)
        ));
    }

    #[test]
    fn test_edit_keeps_full_instruction_text() {
        assert_eq!(
            ChatCommand::parse("/edit Claude Answer in one sentence, then stop."),
            ChatCommand::Edit {
                id: "Claude".into(),
                text: "Answer in one sentence, then stop.".into()
            }
        );
        assert!(matches!(ChatCommand::parse("/edit Claude"), ChatCommand::Invalid(_)));
    }

    #[test]
    fn test_commands_needing_an_argument() {
        assert_eq!(ChatCommand::parse("/toggle Grok"), ChatCommand::Toggle("Grok".into()));
        assert_eq!(ChatCommand::parse("/reset Grok"), ChatCommand::Reset("Grok".into()));
        assert_eq!(ChatCommand::parse("/say I disagree"), ChatCommand::Say("I disagree".into()));
        assert!(matches!(ChatCommand::parse("/toggle"), ChatCommand::Invalid(_)));
        assert!(matches!(ChatCommand::parse("/say   "), ChatCommand::Invalid(_)));
    }

    #[test]
    fn test_simple_commands_and_aliases() {
        assert_eq!(ChatCommand::parse("/quit"), ChatCommand::Quit);
        assert_eq!(ChatCommand::parse("/q"), ChatCommand::Quit);
        assert_eq!(ChatCommand::parse("/?"), ChatCommand::Help);
        assert_eq!(ChatCommand::parse("/new"), ChatCommand::New);
        assert_eq!(ChatCommand::parse("/participants"), ChatCommand::Participants);
        assert_eq!(ChatCommand::parse("/publish"), ChatCommand::Publish);
        assert_eq!(ChatCommand::parse("/transcript"), ChatCommand::Transcript);
    }

    #[test]
    fn test_unknown_command() {
        let ChatCommand::Invalid(hint) = ChatCommand::parse("/dance") else {
            panic!("expected Invalid");
        };
        assert!(hint.contains("/dance"));
    }
}
