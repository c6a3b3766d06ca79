//! Terminal rendering of session state and events.

use std::io::{self, Stderr, Stdout, Write};

use crate::models::{Attachment, Message};
use crate::session::{Notice, NoticeLevel, Phase, SessionEvent};

/// Writes transcript entries to `out` and notices to `err`.
pub struct Renderer<O, E> {
    out: O,
    err: E,
    /// Name of the selected file, for the upload progress line.
    selected: Option<String>,
}

impl Renderer<Stdout, Stderr> {
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl<O: Write, E: Write> Renderer<O, E> {
    pub const fn new(out: O, err: E) -> Self {
        Self {
            out,
            err,
            selected: None,
        }
    }

    pub fn event(&mut self, event: &SessionEvent) -> io::Result<()> {
        match event {
            SessionEvent::MessageAppended(message) => self.message(message),
            SessionEvent::PhaseChanged(phase) => {
                let Some(line) = phase_line(*phase, self.selected.as_deref()) else {
                    return Ok(());
                };
                writeln!(self.out, "{line}")?;
                self.out.flush()
            }
            SessionEvent::AttachmentChanged(attachment) => {
                self.selected = attachment.as_ref().map(|a| a.file_name.clone());
                match attachment {
                    Some(attachment) => writeln!(self.out, "{}", selected_line(attachment)),
                    None => Ok(()),
                }
            }
            SessionEvent::Notice(notice) => self.notice(notice),
        }
    }

    pub fn message(&mut self, message: &Message) -> io::Result<()> {
        writeln!(self.out, "{}", format_message(message))
    }

    pub fn transcript(&mut self, messages: &[Message]) -> io::Result<()> {
        for message in messages {
            self.message(message)?;
        }
        Ok(())
    }

    pub fn notice(&mut self, notice: &Notice) -> io::Result<()> {
        writeln!(self.err, "{}", format_notice(notice))
    }

    /// Plain informational text on the output stream.
    pub fn info(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{text}")
    }

    /// A problem with the user's input, shown like an error notice.
    pub fn problem(&mut self, text: &str) -> io::Result<()> {
        self.notice(&Notice::error(text))
    }

    pub fn prompt(&mut self) -> io::Result<()> {
        write!(self.out, "> ")?;
        self.out.flush()
    }

    #[cfg(test)]
    pub fn into_parts(self) -> (O, E) {
        (self.out, self.err)
    }
}

/// `[sender HH:MM]` header followed by the content, line breaks intact.
pub fn format_message(message: &Message) -> String {
    format!(
        "[{} {}]\n{}\n",
        message.sender,
        message.display_time(),
        message.content
    )
}

pub fn format_notice(notice: &Notice) -> String {
    match notice.level {
        NoticeLevel::Success => format!("✓ {}", notice.text),
        NoticeLevel::Error => format!("✗ {}", notice.text),
    }
}

fn phase_line(phase: Phase, selected: Option<&str>) -> Option<String> {
    match phase {
        Phase::Idle => None,
        Phase::AwaitingReply => Some("Thinking...".to_string()),
        Phase::AwaitingUpload => Some(format!("Uploading {}...", selected.unwrap_or("document"))),
    }
}

fn selected_line(attachment: &Attachment) -> String {
    format!(
        "Selected {} ({}). Type /upload to send it or /remove to discard it.",
        attachment.file_name,
        format_size(attachment.size)
    )
}

pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut unit = 0;
    // u64 -> f64 loses precision only above 2^53 bytes.
    #[allow(clippy::cast_precision_loss)]
    let mut size = bytes as f64;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}
