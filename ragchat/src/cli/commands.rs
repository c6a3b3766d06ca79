//! CLI command execution.
//!
//! The interactive session and both one-shot commands go through the same
//! session controller, so deadlines, copy and error handling are identical.

use std::future::Future;
use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;

use crate::config::{Config, Overrides};
use crate::gateway::{Gateway, HttpGateway};
use crate::models::Attachment;
use crate::session::{Outcome, Rejected, SessionController, SessionEvent};

use super::args::{Cli, Commands};
use super::render::Renderer;
use super::repl::{parse_line, Input, HELP};

// === Command Execution ===

pub async fn execute(cli: Cli) -> Result<()> {
    let settings = Config::load(cli.config.as_deref())?
        .apply(&Overrides::from(&cli))
        .resolve()?;
    debug!(backend = %settings.base_url, options = ?settings.session, "settings resolved");

    let gateway = HttpGateway::new(&settings.base_url);

    match cli.command {
        None | Some(Commands::Chat) => {
            let (controller, events) = SessionController::with_events(gateway, settings.session);
            let mut session = Interactive::new(controller, events, Renderer::stdio());
            let stdin = BufReader::new(tokio::io::stdin());
            session.run(stdin).await
        }
        Some(Commands::Ask { message }) => {
            let controller = SessionController::new(gateway, settings.session);
            ask(&controller, &message.join(" "), &mut Renderer::stdio()).await
        }
        Some(Commands::Upload { file }) => {
            let controller = SessionController::new(gateway, settings.session);
            upload(&controller, &file, &mut Renderer::stdio()).await
        }
    }
}

/// Send one message and print the reply. Fails when the request fails.
async fn ask<G, O, E>(
    controller: &SessionController<G>,
    message: &str,
    renderer: &mut Renderer<O, E>,
) -> Result<()>
where
    G: Gateway,
    O: Write,
    E: Write,
{
    let outcome = controller.submit(message).await.context("Nothing to send")?;
    finish_one_shot(outcome, renderer)
}

/// Upload one document and print the confirmation. Fails when the upload fails.
async fn upload<G, O, E>(
    controller: &SessionController<G>,
    path: &Path,
    renderer: &mut Renderer<O, E>,
) -> Result<()>
where
    G: Gateway,
    O: Write,
    E: Write,
{
    let attachment = Attachment::open(path)?;
    controller.select_file(attachment)?;
    let outcome = controller.trigger_upload().await?;
    finish_one_shot(outcome, renderer)
}

fn finish_one_shot<O: Write, E: Write>(
    outcome: Outcome,
    renderer: &mut Renderer<O, E>,
) -> Result<()> {
    if let Some(error) = outcome.error {
        if let Some(ref notice) = outcome.notice {
            renderer.notice(notice)?;
        }
        bail!("{}: {error}", outcome.message.content);
    }
    renderer.info(&outcome.message.content)?;
    Ok(())
}

// === Interactive Session ===

/// Prompt loop that renders controller events as they happen.
struct Interactive<G, O, E> {
    controller: SessionController<G>,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    renderer: Renderer<O, E>,
}

impl<G, O, E> Interactive<G, O, E>
where
    G: Gateway,
    O: Write,
    E: Write,
{
    const fn new(
        controller: SessionController<G>,
        events: mpsc::UnboundedReceiver<SessionEvent>,
        renderer: Renderer<O, E>,
    ) -> Self {
        Self {
            controller,
            events,
            renderer,
        }
    }

    async fn run<R: AsyncBufRead + Unpin>(&mut self, input: R) -> Result<()> {
        self.renderer.transcript(&self.controller.transcript())?;
        self.renderer.info("Type /help for commands.")?;

        let mut lines = input.lines();
        loop {
            self.renderer.prompt()?;
            let Some(line) = lines.next_line().await.context("Failed to read input")? else {
                break;
            };

            match parse_line(&line) {
                Input::Blank => {}
                Input::Quit => break,
                Input::Help => self.renderer.info(HELP)?,
                Input::Invalid(reason) => self.renderer.problem(&reason)?,
                Input::Message(text) => {
                    let result = drive(
                        self.controller.submit(&text),
                        &mut self.events,
                        &mut self.renderer,
                    )
                    .await?;
                    if let Err(rejected) = result {
                        self.report_rejection(rejected)?;
                    }
                }
                Input::Upload => {
                    let result = drive(
                        self.controller.trigger_upload(),
                        &mut self.events,
                        &mut self.renderer,
                    )
                    .await?;
                    if let Err(rejected) = result {
                        self.report_rejection(rejected)?;
                    }
                }
                Input::Attach(path) => match Attachment::open(&path) {
                    Ok(attachment) => {
                        let result = self.controller.select_file(attachment);
                        self.flush_events()?;
                        if let Err(rejected) = result {
                            self.report_rejection(rejected)?;
                        }
                    }
                    Err(e) => self.renderer.problem(&e.to_string())?,
                },
                Input::Remove => match self.controller.remove_selected_file() {
                    Ok(Some(removed)) => {
                        self.flush_events()?;
                        self.renderer.info(&format!("Removed {}.", removed.file_name))?;
                    }
                    Ok(None) => self.renderer.info("No file selected.")?,
                    Err(rejected) => self.report_rejection(rejected)?,
                },
                Input::History(None) => {
                    let transcript = self.controller.transcript();
                    self.renderer.transcript(&transcript)?;
                }
                Input::History(Some(count)) => {
                    let start = self.controller.message_count().saturating_sub(count);
                    let recent = self.controller.messages_since(start);
                    self.renderer.transcript(&recent)?;
                }
                Input::Status => {
                    let status = self.status_line();
                    self.renderer.info(&status)?;
                }
            }
        }

        self.flush_events()?;
        Ok(())
    }

    fn status_line(&self) -> String {
        let selected = self
            .controller
            .pending_attachment()
            .map_or_else(|| "none".to_string(), |a| a.file_name);
        let last = self
            .controller
            .last_message()
            .map(|m| format!(", last from {} at {}", m.sender, m.display_time()))
            .unwrap_or_default();
        format!(
            "State: {}. Messages: {}{last}. Selected file: {selected}.",
            self.controller.phase(),
            self.controller.message_count()
        )
    }

    fn flush_events(&mut self) -> Result<()> {
        drain(&mut self.events, &mut self.renderer)
    }

    fn report_rejection(&mut self, rejected: Rejected) -> Result<()> {
        let text = match rejected {
            Rejected::NoAttachment => "No file selected. Use /attach <path> first.".to_string(),
            other => other.to_string(),
        };
        self.renderer.problem(&text)?;
        Ok(())
    }
}

/// Run `operation` to completion, rendering events while it is in flight.
async fn drive<F, T, O, E>(
    operation: F,
    events: &mut mpsc::UnboundedReceiver<SessionEvent>,
    renderer: &mut Renderer<O, E>,
) -> Result<T>
where
    F: Future<Output = T>,
    O: Write,
    E: Write,
{
    tokio::pin!(operation);
    loop {
        tokio::select! {
            biased;
            Some(event) = events.recv() => renderer.event(&event)?,
            result = &mut operation => {
                drain(events, renderer)?;
                return Ok(result);
            }
        }
    }
}

fn drain<O: Write, E: Write>(
    events: &mut mpsc::UnboundedReceiver<SessionEvent>,
    renderer: &mut Renderer<O, E>,
) -> Result<()> {
    while let Ok(event) = events.try_recv() {
        renderer.event(&event)?;
    }
    Ok(())
}
