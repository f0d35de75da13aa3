use async_trait::async_trait;
use colored::Colorize;
use eyre::Result;
use palaver_core::app::{ControllerHandle, InboundMessage, OutboundMessage};
use palaver_core::session::Role;
use palaver_core::surface::{ChatSurface, KeyInput, RenderedItem, render_item};
use std::io::{self, Write};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::Command;
use super::models::models_table;
use crate::RuntimeOptions;

const HELP: &str = "\
Commands:
  /clear         clear the conversation
  /new           start a new chat
  /model <id>    switch model
  /models        list available models
  /help          show this help
  /quit          exit
End a line with '\\' to continue the message on the next line.";

pub struct ChatCommand {
    pub options: RuntimeOptions,
}

/// What the terminal loop should do with one line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    Dispatch(InboundMessage),
    ListModels,
    Help,
    Quit,
    /// The line was buffered or blank; nothing to do yet.
    Nothing,
    Unknown(String),
}

/// Terminal front end over a [`ChatSurface`].
pub struct TerminalChat {
    surface: ChatSurface,
    show_timestamps: bool,
}

impl TerminalChat {
    pub fn new(greeting: &str, show_timestamps: bool) -> Self {
        Self {
            surface: ChatSurface::with_greeting(greeting),
            show_timestamps,
        }
    }

    pub fn surface(&self) -> &ChatSurface {
        &self.surface
    }

    /// Attach the surface, writing the greeting placeholder if one was added.
    pub fn attach<W: Write>(&mut self, out: &mut W) -> io::Result<InboundMessage> {
        let request = self.surface.attach();
        for item in self.surface.items() {
            self.write_item(out, item)?;
        }
        Ok(request)
    }

    pub fn handle_line(&mut self, line: &str) -> LineOutcome {
        let trimmed = line.trim();
        if self.surface.draft().is_empty() && trimmed.starts_with('/') {
            return self.handle_command(trimmed);
        }

        let (body, continued) = match line.strip_suffix('\\') {
            Some(body) => (body, true),
            None => (line, false),
        };
        for c in body.chars() {
            self.surface.key(KeyInput::Char(c));
        }

        match self.surface.key(KeyInput::Enter { shift: continued }) {
            Some(event) => LineOutcome::Dispatch(event),
            None => LineOutcome::Nothing,
        }
    }

    fn handle_command(&mut self, line: &str) -> LineOutcome {
        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or_default();
        let arg = parts.next();

        match (command, arg) {
            ("/quit" | "/exit", _) => LineOutcome::Quit,
            ("/clear", _) => LineOutcome::Dispatch(self.surface.clear()),
            ("/new", _) => LineOutcome::Dispatch(self.surface.new_chat()),
            ("/model", Some(id)) => LineOutcome::Dispatch(self.surface.select_model(id)),
            ("/models", _) => LineOutcome::ListModels,
            ("/help", _) => LineOutcome::Help,
            _ => LineOutcome::Unknown(line.to_string()),
        }
    }

    /// Apply a controller update and write whatever became visible.
    pub fn apply<W: Write>(&mut self, update: OutboundMessage, out: &mut W) -> io::Result<()> {
        match update {
            OutboundMessage::Append { .. } => {
                let before = self.surface.items().len();
                self.surface.apply(update);
                for item in &self.surface.items()[before..] {
                    self.write_item(out, item)?;
                }
            }
            OutboundMessage::State { .. } => {
                self.surface.apply(update);
                for item in self.surface.items() {
                    self.write_item(out, item)?;
                }
            }
            OutboundMessage::Cleared => {
                self.surface.apply(update);
                writeln!(out, "{}", "Conversation cleared.".dimmed())?;
            }
            OutboundMessage::Model { .. } => {
                self.surface.apply(update);
                if let Some(label) = self.surface.model_label() {
                    writeln!(out, "{} {}", "Model:".dimmed(), label.bold())?;
                }
            }
        }
        Ok(())
    }

    fn write_item<W: Write>(&self, out: &mut W, item: &RenderedItem) -> io::Result<()> {
        let text = render_item(item);
        let line = match item.role {
            Role::User => text.as_str().normal(),
            Role::Assistant => text.as_str().green(),
            Role::System => text.as_str().yellow(),
        };

        match item.timestamp.filter(|_| self.show_timestamps) {
            Some(ts) => writeln!(out, "{} {line}", format_timestamp(ts).dimmed()),
            None => writeln!(out, "{line}"),
        }
    }
}

fn format_timestamp(ms: u64) -> String {
    i64::try_from(ms)
        .ok()
        .and_then(chrono::DateTime::from_timestamp_millis)
        .map(|dt| {
            dt.with_timezone(&chrono::Local)
                .format("[%H:%M:%S]")
                .to_string()
        })
        .unwrap_or_default()
}

#[async_trait]
impl Command for ChatCommand {
    async fn execute(&self) -> Result<()> {
        let runtime = self.options.start().await?;
        let ui = &self.options.preferences.ui;
        let mut chat = TerminalChat::new(&ui.greeting, ui.show_timestamps);
        let mut stdout = io::stdout();

        let mut updates = runtime.handle.subscribe();
        let request = chat.attach(&mut stdout)?;
        dispatch_and_render(&runtime.handle, request, &mut chat, &mut updates, &mut stdout)
            .await?;

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let prompt = if chat.surface().draft().is_empty() {
                ">"
            } else {
                "."
            };
            write!(stdout, "{} ", prompt.bold())?;
            stdout.flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };

            match chat.handle_line(&line) {
                LineOutcome::Dispatch(event) => {
                    dispatch_and_render(&runtime.handle, event, &mut chat, &mut updates, &mut stdout)
                        .await?;
                }
                LineOutcome::ListModels => {
                    let table =
                        models_table(&runtime.config.model_registry, chat.surface().model_id());
                    writeln!(stdout, "{table}")?;
                }
                LineOutcome::Help => writeln!(stdout, "{HELP}")?,
                LineOutcome::Quit => break,
                LineOutcome::Nothing => {}
                LineOutcome::Unknown(command) => {
                    writeln!(
                        stdout,
                        "{} {command}. Type /help for commands.",
                        "Unknown command:".red()
                    )?;
                }
            }
        }

        runtime.handle.shutdown();
        Ok(())
    }
}

async fn dispatch_and_render<W: Write + Send>(
    handle: &ControllerHandle,
    event: InboundMessage,
    chat: &mut TerminalChat,
    updates: &mut tokio::sync::broadcast::Receiver<OutboundMessage>,
    out: &mut W,
) -> Result<()> {
    handle.dispatch(event).await?;
    while let Ok(update) = updates.try_recv() {
        chat.apply(update, out)?;
    }
    Ok(())
}
