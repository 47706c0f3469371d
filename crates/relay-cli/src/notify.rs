//! Outbound delivery of formatted messages.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

/// Discord rejects message content longer than this many characters.
pub const DISCORD_MESSAGE_LIMIT: usize = 2000;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &str) -> Result<()>;
}

/// Posts messages to a Discord channel webhook.
#[derive(Debug, Clone)]
pub struct DiscordWebhook {
    url: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct WebhookMessage<'a> {
    content: &'a str,
}

impl DiscordWebhook {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

#[async_trait]
impl Notifier for DiscordWebhook {
    async fn send(&self, message: &str) -> Result<()> {
        for chunk in split_message(message, DISCORD_MESSAGE_LIMIT) {
            self.client
                .post(&self.url)
                .json(&WebhookMessage { content: &chunk })
                .send()
                .await
                .context("Failed to reach chat webhook")?
                .error_for_status()
                .context("Chat webhook rejected message")?;
        }
        Ok(())
    }
}

/// Used when no webhook is configured: messages only show up in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, message: &str) -> Result<()> {
        tracing::info!(text = %message.trim_end(), "no chat webhook configured");
        Ok(())
    }
}

/// Splits `message` into chunks of at most `limit` characters, breaking
/// between lines where possible. Lines longer than `limit` are cut hard.
pub fn split_message(message: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in message.split_inclusive('\n') {
        let line_len = line.chars().count();
        if current_len + line_len > limit && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if line_len <= limit {
            current.push_str(line);
            current_len += line_len;
            continue;
        }
        let chars: Vec<char> = line.chars().collect();
        for piece in chars.chunks(limit.max(1)) {
            if current_len + piece.len() > limit && !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            current.extend(piece);
            current_len += piece.len();
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
