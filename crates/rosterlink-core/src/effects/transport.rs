//! Transport effect interface
//!
//! Outbound delivery to chat identities. Delivery is best-effort: callers log
//! a failed send and carry on, a failure never changes the outcome of the
//! state mutation that triggered it.

use crate::identifiers::RequesterId;
use async_trait::async_trait;

/// Delivery failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Recipient could not be reached
    #[error("delivery to {recipient} failed: {reason}")]
    DeliveryFailed {
        /// Intended recipient
        recipient: RequesterId,
        /// Transport message
        reason: String,
    },
}

/// Outbound messaging to a chat identity
#[async_trait]
pub trait TransportEffects: Send + Sync {
    /// Send a text message
    async fn send_text(&self, to: RequesterId, text: &str) -> Result<(), TransportError>;

    /// Send a file attachment with a caption
    async fn send_file(
        &self,
        to: RequesterId,
        bytes: Vec<u8>,
        filename: &str,
        caption: &str,
    ) -> Result<(), TransportError>;
}
