//! CLI for relay.
//!
//! Formats producer payloads from files or stdin, and runs the webhook receiver that forwards
//! formatted messages to a chat channel.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use relay_core::{buffer_to_message_with, TracingDiagnostics};
use std::fs;
use std::io::{self, Read, Write};
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod notify;
mod server;

use notify::{DiscordWebhook, LogNotifier, Notifier};
use server::{build_router, AppState};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Emit logs as JSON lines instead of human-readable text
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the message for a payload read from a file or stdin
    Format {
        /// Input file path (reads stdin when omitted)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Treat every non-blank input line as a separate payload
        #[arg(long)]
        lines: bool,
    },
    /// Receive webhooks over HTTP and forward them to chat
    Serve {
        /// Port to listen on
        #[arg(long, env = "PORT", default_value = "8080")]
        port: u16,

        /// Discord webhook URL; messages are only logged when unset
        #[arg(long, env = "DISCORD_WEBHOOK_URL")]
        webhook_url: Option<String>,
    },
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn read_input(path: Option<&Path>) -> Result<Vec<u8>> {
    match path {
        Some(p) => fs::read(p).with_context(|| format!("Failed to read {}", p.display())),
        None => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

/// Formats the whole input as one payload.
fn format_payload(input: &[u8]) -> Result<String> {
    Ok(buffer_to_message_with(input, &mut TracingDiagnostics)?)
}

/// Formats each non-blank line as its own payload. Line numbers in errors are 1-based.
fn format_lines(input: &[u8]) -> Result<String> {
    let text = std::str::from_utf8(input).context("Input is not valid UTF-8")?;
    let mut out = String::new();
    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let msg = buffer_to_message_with(line.as_bytes(), &mut TracingDiagnostics)
            .with_context(|| format!("line {}", idx + 1))?;
        out.push_str(&msg);
    }
    Ok(out)
}

async fn serve(port: u16, webhook_url: Option<String>) -> Result<()> {
    let notifier: Arc<dyn Notifier> = match webhook_url {
        Some(url) if !url.is_empty() => Arc::new(DiscordWebhook::new(url)?),
        _ => {
            tracing::warn!("DISCORD_WEBHOOK_URL is not set; messages will only be logged");
            Arc::new(LogNotifier)
        }
    };

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Starting up on http://localhost:{port}");

    axum::serve(listener, build_router(AppState::new(notifier)))
        .await
        .context("Server stopped")?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match cli.command {
        Commands::Format { path, lines } => {
            let input = read_input(path.as_deref())?;
            let msg = if lines {
                format_lines(&input)?
            } else {
                format_payload(&input)?
            };
            io::stdout().write_all(msg.as_bytes())?;
        }
        Commands::Serve { port, webhook_url } => serve(port, webhook_url).await?,
    }

    Ok(())
}
