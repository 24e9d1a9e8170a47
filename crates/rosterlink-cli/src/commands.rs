//! Chat command grammar
//!
//! Slash commands take whitespace-separated arguments. A bot mention suffix
//! (`/stats@rosterbot`) is ignored. Any text that is not a command is treated
//! as a record lookup when it is a single run of digits.

use rosterlink_core::{RecordId, RequesterId};

/// One parsed chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// `/start`
    Start,
    /// `/result <id>` or a bare id; `None` when no usable id was given
    Result(Option<String>),
    /// `/status`
    Status,
    /// `/admin <requester>`
    AddAdmin(RequesterId),
    /// `/remove <requester>`
    RemoveAdmin(RequesterId),
    /// `/adminlist`
    AdminList,
    /// `/who <record>`
    Who(RecordId),
    /// `/unlink <record>`
    UnlinkRecord(RecordId),
    /// `/unlinktg <requester>`
    UnlinkRequester(RequesterId),
    /// `/stats`
    Stats,
    /// `/find <terms...>`
    Find(String),
    /// `/reset <secret>`
    Reset(String),
    /// Known command with bad arguments; carries the usage line
    Usage(&'static str),
    /// Unrecognized slash command
    Unknown(String),
}

impl ChatCommand {
    /// Parse one message
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        let Some(body) = text.strip_prefix('/') else {
            return Self::Result(bare_record_id(text));
        };

        let (head, rest) = body
            .split_once(char::is_whitespace)
            .map_or((body, ""), |(head, rest)| (head, rest.trim()));
        let name = head.split('@').next().unwrap_or(head).to_ascii_lowercase();
        let args: Vec<&str> = rest.split_whitespace().collect();

        match name.as_str() {
            "start" => Self::Start,
            "result" => Self::Result(match args.as_slice() {
                [id] => Some((*id).to_string()),
                _ => None,
            }),
            "status" => Self::Status,
            "admin" => requester_arg(&args, Self::AddAdmin, "Usage: /admin <user_id>"),
            "remove" => requester_arg(&args, Self::RemoveAdmin, "Usage: /remove <user_id>"),
            "adminlist" => Self::AdminList,
            "who" => record_arg(&args, Self::Who, "Usage: /who <record_id>"),
            "unlink" => record_arg(&args, Self::UnlinkRecord, "Usage: /unlink <record_id>"),
            "unlinktg" => {
                requester_arg(&args, Self::UnlinkRequester, "Usage: /unlinktg <user_id>")
            }
            "stats" => Self::Stats,
            "find" if !rest.is_empty() => Self::Find(rest.to_string()),
            "find" => Self::Usage("Usage: /find <part of a name>"),
            "reset" => match args.as_slice() {
                [secret] => Self::Reset((*secret).to_string()),
                _ => Self::Usage("Usage: /reset <secret>"),
            },
            _ => Self::Unknown(name),
        }
    }
}

fn bare_record_id(text: &str) -> Option<String> {
    let mut tokens = text.split_whitespace();
    match (tokens.next(), tokens.next()) {
        (Some(token), None) if token.chars().all(|c| c.is_ascii_digit()) => {
            Some(token.to_string())
        }
        _ => None,
    }
}

fn requester_arg(
    args: &[&str],
    build: fn(RequesterId) -> ChatCommand,
    usage: &'static str,
) -> ChatCommand {
    match args {
        [raw] if raw.chars().all(|c| c.is_ascii_digit()) => raw
            .parse::<RequesterId>()
            .map_or(ChatCommand::Usage(usage), build),
        _ => ChatCommand::Usage(usage),
    }
}

fn record_arg(args: &[&str], build: fn(RecordId) -> ChatCommand, usage: &'static str) -> ChatCommand {
    match args {
        [raw] => RecordId::parse(raw).map_or(ChatCommand::Usage(usage), build),
        _ => ChatCommand::Usage(usage),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_digits_are_lookups() {
        assert_eq!(
            ChatCommand::parse(" 12345 "),
            ChatCommand::Result(Some("12345".to_string()))
        );
        assert_eq!(ChatCommand::parse("hello"), ChatCommand::Result(None));
        assert_eq!(ChatCommand::parse("12 34"), ChatCommand::Result(None));
    }

    #[test]
    fn result_takes_one_argument() {
        assert_eq!(
            ChatCommand::parse("/result A123"),
            ChatCommand::Result(Some("A123".to_string()))
        );
        assert_eq!(ChatCommand::parse("/result"), ChatCommand::Result(None));
        assert_eq!(ChatCommand::parse("/result 1 2"), ChatCommand::Result(None));
    }

    #[test]
    fn mention_suffix_and_case_are_ignored() {
        assert_eq!(ChatCommand::parse("/Stats@rosterbot"), ChatCommand::Stats);
        assert_eq!(ChatCommand::parse("/adminlist"), ChatCommand::AdminList);
    }

    #[test]
    fn admin_commands_validate_ids() {
        assert_eq!(
            ChatCommand::parse("/admin 42"),
            ChatCommand::AddAdmin(RequesterId::new(42))
        );
        assert_eq!(
            ChatCommand::parse("/admin bob"),
            ChatCommand::Usage("Usage: /admin <user_id>")
        );
        assert_eq!(
            ChatCommand::parse("/unlinktg -5"),
            ChatCommand::Usage("Usage: /unlinktg <user_id>")
        );
        assert_eq!(
            ChatCommand::parse("/who 1001"),
            ChatCommand::Who(RecordId::parse("1001").unwrap())
        );
        assert_eq!(
            ChatCommand::parse("/unlink"),
            ChatCommand::Usage("Usage: /unlink <record_id>")
        );
    }

    #[test]
    fn find_keeps_the_whole_query() {
        assert_eq!(
            ChatCommand::parse("/find  mona   adel "),
            ChatCommand::Find("mona   adel".to_string())
        );
        assert_eq!(
            ChatCommand::parse("/find"),
            ChatCommand::Usage("Usage: /find <part of a name>")
        );
    }

    #[test]
    fn unknown_commands_are_named() {
        assert_eq!(
            ChatCommand::parse("/broadcast hi"),
            ChatCommand::Unknown("broadcast".to_string())
        );
    }
}
