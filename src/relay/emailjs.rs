// EmailJS REST relay.
//
// EmailJS delivers a message by rendering a stored template with the
// parameters we send. The three identifiers (public key, service id,
// template id) are opaque to us and come from Config.
//
// API docs: https://www.emailjs.com/docs/rest-api/send/

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use super::traits::{EmailRelay, RelayPayload};
use crate::config::Config;

/// Sends contact messages through the EmailJS `email/send` endpoint.
pub struct EmailJsRelay {
    client: Client,
    api_url: String,
    public_key: String,
    service_id: String,
    template_id: String,
}

impl EmailJsRelay {
    /// Build a relay from loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(crate::security::events::DEFAULT_USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            public_key: config.public_key.clone(),
            service_id: config.service_id.clone(),
            template_id: config.template_id.clone(),
        })
    }

    fn request_body<'a>(&'a self, payload: &'a RelayPayload) -> SendRequest<'a> {
        SendRequest {
            service_id: &self.service_id,
            template_id: &self.template_id,
            user_id: &self.public_key,
            template_params: payload,
        }
    }
}

#[async_trait]
impl EmailRelay for EmailJsRelay {
    async fn send(&self, payload: &RelayPayload) -> Result<()> {
        let response = self
            .client
            .post(&self.api_url)
            .json(&self.request_body(payload))
            .send()
            .await
            .context("Failed to call EmailJS")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("EmailJS returned {}: {}", status, body);
        }

        debug!(
            to = %payload.to_email,
            message_chars = payload.message.chars().count(),
            "EmailJS accepted message"
        );

        Ok(())
    }
}

// --- EmailJS request types ---

#[derive(Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: &'a RelayPayload,
}
