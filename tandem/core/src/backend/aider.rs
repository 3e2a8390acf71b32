//! Aider Bridge Backend
//!
//! HTTP implementation of [`AssistantBackend`] that relays session commands
//! to an aider-style bridge process: one JSON POST per command against
//! `{base_url}/aider/{command}`, one JSON reply per call. The bridge keeps
//! the working set and computes diffs; this side only carries the protocol.
//!
//! The client applies the configured request timeout, so a hung bridge
//! resolves to an ordinary failure (and then a visible error turn) instead of
//! wedging the session.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use crate::backend::traits::{AssistantBackend, BackendReply, BackendRequest};
use crate::config::BridgeSettings;
use crate::encode::ModelMessage;
use crate::events::BridgeCommand;

/// HTTP bridge to the assistant backend.
#[derive(Debug, Clone)]
pub struct AiderBridge {
    client: reqwest::Client,
    base_url: String,
}

/// Request body the bridge expects.
#[derive(Serialize)]
struct BridgePayload<'a> {
    message: &'a str,
    context: &'a [ModelMessage],
}

impl AiderBridge {
    /// Bridge client for `base_url` with the given request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client for the aider bridge")?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Bridge client from configuration.
    pub fn from_config(settings: &BridgeSettings) -> anyhow::Result<Self> {
        Self::new(settings.base_url.clone(), settings.timeout())
    }

    /// Endpoint for one command.
    fn command_url(&self, command: BridgeCommand) -> String {
        format!("{}/aider/{}", self.base_url, command)
    }

    /// Reachability probe endpoint.
    fn health_url(&self) -> String {
        format!("{}/health", self.base_url)
    }
}

#[async_trait]
impl AssistantBackend for AiderBridge {
    fn name(&self) -> &str {
        "aider-bridge"
    }

    async fn health_check(&self) -> bool {
        match self.client.get(self.health_url()).send().await {
            Ok(response) => response.status().is_success(),
            Err(error) => {
                warn!(%error, url = %self.health_url(), "bridge health check failed");
                false
            }
        }
    }

    async fn invoke(&self, request: &BackendRequest) -> anyhow::Result<BackendReply> {
        let url = self.command_url(request.command);
        debug!(%url, command = %request.command, context_len = request.context.len(), "dispatching bridge command");

        let response = self
            .client
            .post(&url)
            .json(&BridgePayload {
                message: &request.message,
                context: &request.context,
            })
            .send()
            .await
            .with_context(|| format!("bridge request to {url} failed"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("bridge returned {status}: {}", body.trim());
        }

        let reply: BackendReply = response
            .json()
            .await
            .context("bridge reply was not valid JSON")?;
        debug!(
            command = %request.command,
            reply_len = reply.message.len(),
            has_code = reply.code.is_some(),
            "bridge reply received"
        );
        Ok(reply)
    }
}
