//! Session controller: the conversation state machine.
//!
//! ```text
//!   Idle ──submit──────────▶ AwaitingReply  ──reply/timeout/failure──▶ Idle
//!   Idle ──trigger_upload──▶ AwaitingUpload ──ok/timeout/failure─────▶ Idle
//!   Idle ──select_file / remove_selected_file──▶ Idle
//! ```
//!
//! The phase check and the transition into a busy phase happen under one
//! short lock, so at most one request is ever outstanding. The lock is never
//! held across an await.

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::copy;
use super::state::{Notice, Outcome, Phase, Rejected, SessionEvent, SessionOptions};
use crate::gateway::{within, FailureKind, Gateway, GatewayError};
use crate::models::{Attachment, Message};
use crate::transcript::Transcript;

#[derive(Debug)]
struct SessionState {
    transcript: Transcript,
    phase: Phase,
    pending_attachment: Option<Attachment>,
}

pub struct SessionController<G> {
    gateway: G,
    options: SessionOptions,
    state: Mutex<SessionState>,
    events: Option<mpsc::UnboundedSender<SessionEvent>>,
}

impl<G> SessionController<G> {
    /// Start a session seeded with the assistant greeting.
    pub fn new(gateway: G, options: SessionOptions) -> Self {
        Self {
            gateway,
            options,
            state: Mutex::new(SessionState {
                transcript: Transcript::seeded(Message::assistant(copy::GREETING)),
                phase: Phase::Idle,
                pending_attachment: None,
            }),
            events: None,
        }
    }

    /// Start a session that also reports every change on a channel.
    pub fn with_events(
        gateway: G,
        options: SessionOptions,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut controller = Self::new(gateway, options);
        controller.events = Some(tx);
        (controller, rx)
    }

    pub fn phase(&self) -> Phase {
        self.state.lock().phase
    }

    pub fn is_busy(&self) -> bool {
        self.phase().is_busy()
    }

    /// Snapshot of the transcript.
    pub fn transcript(&self) -> Vec<Message> {
        self.state.lock().transcript.messages().to_vec()
    }

    /// Messages appended at or after `index`; empty when out of range.
    pub fn messages_since(&self, index: usize) -> Vec<Message> {
        self.state.lock().transcript.since(index).to_vec()
    }

    pub fn last_message(&self) -> Option<Message> {
        self.state.lock().transcript.last().cloned()
    }

    pub fn message_count(&self) -> usize {
        self.state.lock().transcript.messages().len()
    }

    pub fn pending_attachment(&self) -> Option<Attachment> {
        self.state.lock().pending_attachment.clone()
    }

    /// Select a document for a later upload, replacing any previous choice.
    pub fn select_file(&self, attachment: Attachment) -> Result<(), Rejected> {
        let mut state = self.state.lock();
        ensure_idle(&state)?;

        debug!(file = %attachment.file_name, bytes = attachment.size, "attachment selected");
        state.pending_attachment = Some(attachment.clone());
        self.emit(SessionEvent::AttachmentChanged(Some(attachment)));
        Ok(())
    }

    /// Discard the selected document without contacting the backend.
    pub fn remove_selected_file(&self) -> Result<Option<Attachment>, Rejected> {
        let mut state = self.state.lock();
        ensure_idle(&state)?;

        let removed = state.pending_attachment.take();
        if removed.is_some() {
            debug!("attachment removed");
            self.emit(SessionEvent::AttachmentChanged(None));
        }
        Ok(removed)
    }

    fn emit(&self, event: SessionEvent) {
        if let Some(tx) = &self.events {
            // A closed receiver just means nobody is rendering.
            let _ = tx.send(event);
        }
    }

    /// Move into a busy phase. Caller holds the lock and has checked idleness.
    fn enter(&self, state: &mut SessionState, phase: Phase) -> InFlight<'_, G> {
        state.phase = phase;
        debug!(%phase, "request started");
        self.emit(SessionEvent::PhaseChanged(phase));
        InFlight {
            controller: self,
            settled: false,
        }
    }
}

impl<G: Gateway> SessionController<G> {
    /// Send a chat message.
    ///
    /// The trimmed text is appended as a user message before the request is
    /// issued. The reply, or an error message, is appended when the request
    /// settles. Empty input and submissions while busy are rejected.
    pub async fn submit(&self, text: &str) -> Result<Outcome, Rejected> {
        let text = text.trim();
        if text.is_empty() {
            debug!("empty submission ignored");
            return Err(Rejected::EmptyInput);
        }

        let in_flight = {
            let mut state = self.state.lock();
            ensure_idle(&state)?;
            let message = state.transcript.append(Message::user(text)).clone();
            self.emit(SessionEvent::MessageAppended(message));
            self.enter(&mut state, Phase::AwaitingReply)
        };

        let result = within(self.options.chat_timeout, self.gateway.send_message(text)).await;

        let outcome = match result {
            Ok(reply) if reply.is_empty() => Outcome {
                message: Message::assistant(copy::EMPTY_REPLY),
                notice: None,
                error: None,
            },
            Ok(reply) => Outcome {
                message: Message::assistant(reply),
                notice: None,
                error: None,
            },
            Err(error) => {
                let (content, notice) = match error.kind() {
                    FailureKind::Timeout => (copy::CHAT_TIMEOUT, copy::CHAT_TIMEOUT_NOTICE),
                    _ => (copy::CHAT_FAILED, copy::CHAT_FAILED_NOTICE),
                };
                warn!(%error, "chat request failed");
                Outcome {
                    message: Message::assistant(content),
                    notice: Some(Notice::error(notice)),
                    error: Some(error),
                }
            }
        };

        Ok(in_flight.settle(outcome, false))
    }

    /// Upload the selected document.
    ///
    /// On success the selection is cleared and the backend's confirmation is
    /// appended. On failure an error message is appended, the error is
    /// returned in the outcome, and the selection is cleared unless the
    /// session retains attachments for retry.
    pub async fn trigger_upload(&self) -> Result<Outcome, Rejected> {
        let (in_flight, attachment) = {
            let mut state = self.state.lock();
            ensure_idle(&state)?;
            let attachment = state
                .pending_attachment
                .clone()
                .ok_or(Rejected::NoAttachment)?;
            (self.enter(&mut state, Phase::AwaitingUpload), attachment)
        };

        let result = within(
            self.options.upload_timeout,
            self.gateway.upload_document(&attachment),
        )
        .await;

        let (outcome, clear) = match result {
            Ok(confirmation) => {
                info!(file = %attachment.file_name, "document uploaded");
                let outcome = Outcome {
                    message: Message::assistant(confirmation),
                    notice: Some(Notice::success(copy::UPLOAD_SUCCESS_NOTICE)),
                    error: None,
                };
                (outcome, true)
            }
            Err(error) => {
                warn!(%error, file = %attachment.file_name, "upload failed");
                let outcome = Outcome {
                    message: Message::assistant(upload_failure_copy(&error)),
                    notice: Some(upload_failure_notice(&error)),
                    error: Some(error),
                };
                (outcome, !self.options.retain_attachment_on_failure)
            }
        };

        Ok(in_flight.settle(outcome, clear))
    }
}

fn ensure_idle(state: &SessionState) -> Result<(), Rejected> {
    if state.phase.is_busy() {
        debug!(phase = %state.phase, "rejected while busy");
        return Err(Rejected::Busy(state.phase));
    }
    Ok(())
}

const fn upload_failure_copy(error: &GatewayError) -> &'static str {
    match error.kind() {
        FailureKind::Timeout => copy::UPLOAD_TIMEOUT,
        FailureKind::RequestFailed | FailureKind::BackendReportedFailure => copy::UPLOAD_FAILED,
    }
}

fn upload_failure_notice(error: &GatewayError) -> Notice {
    if error.kind() == FailureKind::Timeout {
        return Notice::error(copy::UPLOAD_TIMEOUT_NOTICE);
    }
    match error.backend_message() {
        Some(detail) => Notice::error(format!("{}: {detail}", copy::UPLOAD_FAILED_NOTICE)),
        None => Notice::error(copy::UPLOAD_FAILED_NOTICE),
    }
}

/// Marks an outstanding request. Dropping it unsettled returns the session to
/// `Idle`, so an abandoned request cannot leave the session stuck busy.
struct InFlight<'a, G> {
    controller: &'a SessionController<G>,
    settled: bool,
}

impl<G> InFlight<'_, G> {
    fn settle(mut self, outcome: Outcome, clear_attachment: bool) -> Outcome {
        self.settled = true;
        let controller = self.controller;
        let mut state = controller.state.lock();

        if clear_attachment && state.pending_attachment.take().is_some() {
            controller.emit(SessionEvent::AttachmentChanged(None));
        }

        let message = state.transcript.append(outcome.message.clone()).clone();
        controller.emit(SessionEvent::MessageAppended(message));

        state.phase = Phase::Idle;
        debug!(ok = outcome.is_success(), "request settled");
        controller.emit(SessionEvent::PhaseChanged(Phase::Idle));

        if let Some(notice) = &outcome.notice {
            controller.emit(SessionEvent::Notice(notice.clone()));
        }
        outcome
    }
}

impl<G> Drop for InFlight<'_, G> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        warn!("request abandoned before settling");
        self.controller.state.lock().phase = Phase::Idle;
        self.controller.emit(SessionEvent::PhaseChanged(Phase::Idle));
    }
}
