//! Notification delivery.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use gaalab_core::Notification;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info};

/// Discord rejects messages longer than this.
const WEBHOOK_CONTENT_LIMIT: usize = 2000;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("write message file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("webhook request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("webhook returned HTTP {status}")]
    Status { status: u16 },
}

pub trait NotificationSink {
    fn name(&self) -> &str;

    /// Deliver every notification of one run.
    fn deliver(&self, notifications: &[Notification]) -> Result<(), SinkError>;
}

/// Flat text file, rewritten on every run: each non-empty part of each
/// notification followed by a blank line.
pub struct MessageFileSink {
    path: PathBuf,
}

impl MessageFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_all(&self, notifications: &[Notification]) -> std::io::Result<usize> {
        let mut out = BufWriter::new(File::create(&self.path)?);
        let mut written = 0;
        for n in notifications.iter().filter(|n| !n.is_blank()) {
            for part in n.parts() {
                out.write_all(part.as_bytes())?;
                out.write_all(b"\n\n")?;
            }
            written += 1;
        }
        out.flush()?;
        Ok(written)
    }
}

impl NotificationSink for MessageFileSink {
    fn name(&self) -> &str {
        "message_file"
    }

    fn deliver(&self, notifications: &[Notification]) -> Result<(), SinkError> {
        let written = self.write_all(notifications).map_err(|source| SinkError::Io {
            path: self.path.display().to_string(),
            source,
        })?;
        info!(path = %self.path.display(), written, "message file written");
        Ok(())
    }
}

/// Discord-compatible webhook: one `{"content": ...}` POST per notification.
pub struct WebhookSink {
    url: String,
    client: reqwest::blocking::Client,
}

impl WebhookSink {
    pub fn new(url: impl Into<String>) -> Result<Self, SinkError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(15))
            .user_agent(concat!("gaalab/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// Parts joined by blank lines, cut to the content limit on a char boundary.
    pub fn content(notification: &Notification) -> String {
        let text = notification.parts().collect::<Vec<_>>().join("\n\n");
        match text.char_indices().nth(WEBHOOK_CONTENT_LIMIT) {
            Some((cut, _)) => text[..cut].to_string(),
            None => text,
        }
    }
}

impl NotificationSink for WebhookSink {
    fn name(&self) -> &str {
        "webhook"
    }

    fn deliver(&self, notifications: &[Notification]) -> Result<(), SinkError> {
        for n in notifications.iter().filter(|n| !n.is_blank()) {
            let content = Self::content(n);
            let response = self
                .client
                .post(&self.url)
                .json(&json!({ "content": content }))
                .send()?;
            let status = response.status();
            if !status.is_success() {
                return Err(SinkError::Status {
                    status: status.as_u16(),
                });
            }
            debug!(headline = %n.headline, "webhook delivered");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_file_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("message.txt");
        std::fs::write(&path, "stale content from yesterday").unwrap();

        let sink = MessageFileSink::new(&path);
        sink.deliver(&[
            Notification::new("GAA Rebalance (Jun 2024)", "Buy: EEM"),
            Notification::default(),
            Notification::new("GO BUY NOW", ""),
        ])
        .unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "GAA Rebalance (Jun 2024)\n\nBuy: EEM\n\nGO BUY NOW\n\n");
    }

    #[test]
    fn nothing_to_deliver_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("message.txt");
        std::fs::write(&path, "old").unwrap();
        MessageFileSink::new(&path).deliver(&[]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn webhook_content_is_bounded() {
        let n = Notification::new("GO SELL NOW", "x".repeat(5000));
        let content = WebhookSink::content(&n);
        assert_eq!(content.chars().count(), WEBHOOK_CONTENT_LIMIT);
        assert!(content.starts_with("GO SELL NOW\n\n"));
    }
}
