//! Line parsing for the interactive session.

use std::path::PathBuf;

/// What a line typed at the prompt asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Plain text to send as a chat message.
    Message(String),
    Attach(PathBuf),
    Upload,
    Remove,
    /// Whole transcript, or only its last `n` messages.
    History(Option<usize>),
    Status,
    Help,
    Quit,
    /// Nothing typed.
    Blank,
    /// A slash command that could not be understood.
    Invalid(String),
}

pub const HELP: &str = "\
Type a question and press Enter to send it.

Commands:
  /attach <path>  Select a document (pdf, doc, docx, txt, md)
  /upload         Upload the selected document
  /remove         Discard the selected document
  /history [n]    Show the conversation, or its last n messages
  /status         Show whether a request is in flight and what is selected
  /help           Show this help
  /quit           Leave (Ctrl-D works too)";

/// Parse one line of input.
///
/// Lines starting with `/` are commands; `//` escapes a message that starts
/// with a slash.
pub fn parse_line(line: &str) -> Input {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Input::Blank;
    }

    if let Some(escaped) = trimmed.strip_prefix("//") {
        return Input::Message(format!("/{escaped}"));
    }

    let Some(command) = trimmed.strip_prefix('/') else {
        return Input::Message(line.to_string());
    };

    let (name, rest) = command
        .split_once(char::is_whitespace)
        .map_or((command, ""), |(name, rest)| (name, rest.trim()));

    match (name, rest) {
        ("attach" | "a", "") => Input::Invalid("usage: /attach <path>".to_string()),
        ("attach" | "a", path) => Input::Attach(PathBuf::from(unquote(path))),
        ("upload" | "u", "") => Input::Upload,
        ("remove" | "rm", "") => Input::Remove,
        ("history", "") => Input::History(None),
        ("history", count) => match count.parse() {
            Ok(n) => Input::History(Some(n)),
            Err(_) => Input::Invalid("usage: /history [n]".to_string()),
        },
        ("status", "") => Input::Status,
        ("help" | "h" | "?", "") => Input::Help,
        ("quit" | "q" | "exit", "") => Input::Quit,
        _ => Input::Invalid(format!("unknown command '/{command}', try /help")),
    }
}

/// Strip one pair of matching surrounding quotes.
fn unquote(s: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = s.strip_prefix(quote).and_then(|r| r.strip_suffix(quote)) {
            return inner;
        }
    }
    s
}
