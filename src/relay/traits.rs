// Email relay trait — the send capability the contact form depends on.
//
// The relay's own protocol, retry policy and failure modes are its business.
// From the form's point of view a send either succeeds or fails, eventually.

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

/// The template parameters handed to the relay for one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelayPayload {
    pub from_name: String,
    pub from_email: String,
    pub subject: String,
    pub message: String,
    pub to_email: String,
}

/// A third-party service that delivers contact messages.
#[async_trait]
pub trait EmailRelay: Send + Sync {
    /// Deliver one message. An `Err` carries whatever the transport reported.
    async fn send(&self, payload: &RelayPayload) -> Result<()>;
}
