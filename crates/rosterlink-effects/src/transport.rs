//! Console transport
//!
//! Line-oriented stand-in for a chat network. Text messages are written to
//! stdout as `@<recipient> <line>`, one output line per message line; file
//! attachments are saved under the outbox directory and announced on stdout.

use async_trait::async_trait;
use rosterlink_core::effects::{TransportEffects, TransportError};
use rosterlink_core::RequesterId;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

/// Transport handler writing to the process's stdout
#[derive(Debug, Clone)]
pub struct ConsoleTransportHandler {
    outbox_dir: PathBuf,
}

impl ConsoleTransportHandler {
    /// Create a console transport saving attachments under `outbox_dir`
    pub fn new(outbox_dir: PathBuf) -> Self {
        Self { outbox_dir }
    }

    /// Frame `text` for `to`, prefixing every line with the recipient
    pub fn frame(to: RequesterId, text: &str) -> String {
        let mut framed = String::with_capacity(text.len() + 16);
        for line in text.lines() {
            framed.push('@');
            framed.push_str(&to.to_string());
            framed.push(' ');
            framed.push_str(line);
            framed.push('\n');
        }
        if framed.is_empty() {
            framed = format!("@{to}\n");
        }
        framed
    }

    async fn write_stdout(to: RequesterId, framed: &str) -> Result<(), TransportError> {
        let mut stdout = tokio::io::stdout();
        let delivery_failed = |e: std::io::Error| TransportError::DeliveryFailed {
            recipient: to,
            reason: e.to_string(),
        };
        stdout
            .write_all(framed.as_bytes())
            .await
            .map_err(delivery_failed)?;
        stdout.flush().await.map_err(delivery_failed)
    }
}

#[async_trait]
impl TransportEffects for ConsoleTransportHandler {
    async fn send_text(&self, to: RequesterId, text: &str) -> Result<(), TransportError> {
        Self::write_stdout(to, &Self::frame(to, text)).await
    }

    async fn send_file(
        &self,
        to: RequesterId,
        bytes: Vec<u8>,
        filename: &str,
        caption: &str,
    ) -> Result<(), TransportError> {
        let delivery_failed = |reason: String| TransportError::DeliveryFailed {
            recipient: to,
            reason,
        };
        let safe_name: String = filename
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect();
        let target_dir = self.outbox_dir.join(to.to_string());
        tokio::fs::create_dir_all(&target_dir)
            .await
            .map_err(|e| delivery_failed(e.to_string()))?;
        let target = target_dir.join(&safe_name);
        tokio::fs::write(&target, bytes)
            .await
            .map_err(|e| delivery_failed(e.to_string()))?;

        tracing::debug!(recipient = %to, path = %target.display(), "attachment written");
        let notice = format!("{caption}\n[file: {}]", target.display());
        Self::write_stdout(to, &Self::frame(to, &notice)).await
    }
}
