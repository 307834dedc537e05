// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Interactive chat session
//!
//! Reads one utterance per line, prints one reply per line. The session ends
//! on an exit command, end of input or Ctrl+C, each with its own farewell.
//!
//! Input lines come from a dedicated OS thread over a channel. A blocking
//! read cannot be cancelled, so it must not live on the runtime: Ctrl+C has
//! to end the process without waiting for another line.

use anyhow::{Context, Result};
use colored::Colorize;
use std::future::Future;
use std::io::{BufRead, BufReader};
use std::panic::{self, PanicHookInfo};
use std::path::PathBuf;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use banter_core::application::ChatSession;
use banter_core::domain::SessionConfig;

use crate::bootstrap;

/// Lines buffered between the reader thread and the session
const LINE_BUFFER: usize = 16;

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    ExitCommand,
    EndOfInput,
    Interrupted,
}

pub async fn handle_command(
    config_override: Option<PathBuf>,
    corpus_override: Option<PathBuf>,
) -> Result<()> {
    let manifest = bootstrap::load_config(config_override, corpus_override)?;
    let (chatbot, report) = bootstrap::build_chatbot(&manifest)?;

    if !report.rejected.is_empty() {
        eprintln!(
            "{}",
            format!("⚠ Skipped {} malformed corpus entries", report.rejected.len()).yellow()
        );
    }

    print_banner(&manifest.metadata.name, &manifest.spec.session);

    let session = chatbot.session();
    info!(session = %session.id(), pairs = chatbot.corpus().len(), "Chat session started");

    let lines = spawn_line_reader(BufReader::new(std::io::stdin()))?;
    let mut stdout = tokio::io::stdout();

    let _quiet = quiet_panics();
    let end = run_session(session, &manifest.spec.session, lines, &mut stdout, shutdown_signal()).await?;

    debug!(?end, "Chat session ended");
    Ok(())
}

fn print_banner(name: &str, session: &SessionConfig) {
    println!("{}", format!("{} Terminal Chat", name).bold());
    println!("Let's have a natural conversation!");
    if let Some(exit) = session.exit_commands.first() {
        println!("Type '{}' to exit", exit);
    }
    println!("{}", "-".repeat(50).dimmed());
}

/// Read `reader` line by line on its own thread.
///
/// The channel closes at end of input or after the first read error, which
/// is delivered as the last item. The thread is detached: if the receiver is
/// dropped mid-read it stays blocked until the process exits.
pub fn spawn_line_reader<R>(reader: R) -> Result<mpsc::Receiver<std::io::Result<String>>>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel(LINE_BUFFER);

    std::thread::Builder::new()
        .name("banter-stdin".to_string())
        .spawn(move || {
            for line in reader.lines() {
                let failed = line.is_err();
                if tx.blocking_send(line).is_err() || failed {
                    break;
                }
            }
        })
        .context("Failed to start input reader thread")?;

    Ok(rx)
}

/// Drive one conversation until it ends.
///
/// `lines` yields user input (see [`spawn_line_reader`]); `None` means end of
/// input. `shutdown` resolving (Ctrl+C in the binary) interrupts the wait for
/// the next line.
pub async fn run_session<W, S>(
    mut session: ChatSession,
    config: &SessionConfig,
    mut lines: mpsc::Receiver<std::io::Result<String>>,
    writer: &mut W,
    shutdown: S,
) -> Result<SessionEnd>
where
    W: AsyncWrite + Unpin,
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        write_out(writer, &config.user_prompt).await?;

        let line = tokio::select! {
            _ = &mut shutdown => {
                let farewell = format!("\n{}{}\n", config.bot_prefix, config.interrupt_farewell);
                write_out(writer, &farewell).await?;
                return Ok(SessionEnd::Interrupted);
            }
            line = lines.recv() => line.transpose().context("Failed to read input")?,
        };

        let Some(line) = line else {
            let farewell = format!("\n{}{}\n", config.bot_prefix, config.eof_farewell);
            write_out(writer, &farewell).await?;
            return Ok(SessionEnd::EndOfInput);
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        if config.is_exit_command(input) {
            let farewell = format!("{}{}\n", config.bot_prefix, config.farewell);
            write_out(writer, &farewell).await?;
            return Ok(SessionEnd::ExitCommand);
        }

        let reply = session.handle_turn(input);
        write_out(writer, &format!("{}{}\n", config.bot_prefix, reply)).await?;
    }
}

async fn write_out<W: AsyncWrite + Unpin>(writer: &mut W, text: &str) -> Result<()> {
    writer
        .write_all(text.as_bytes())
        .await
        .context("Failed to write output")?;
    writer.flush().await.context("Failed to flush output")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!("Failed to install Ctrl+C handler: {}", e);
        // Without a handler the session can only end from input
        std::future::pending::<()>().await;
    }
}

type PanicHook = Box<dyn Fn(&PanicHookInfo<'_>) + Sync + Send + 'static>;

/// Keeps panic reports off the terminal while alive.
///
/// Sessions already contain panics and reply with the fallback; the report
/// goes to the log at debug level instead. The previous hook is restored on
/// drop.
pub struct QuietPanics {
    previous: Option<PanicHook>,
}

pub fn quiet_panics() -> QuietPanics {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(|info| {
        debug!(panic = %info, "Panic contained");
    }));
    QuietPanics {
        previous: Some(previous),
    }
}

impl Drop for QuietPanics {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            panic::set_hook(previous);
        }
    }
}
