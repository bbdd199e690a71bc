use super::PurgeService;
use crate::models::{ApiEnvelope, CdnCredentials, PurgeRequest, DEFAULT_API_BASE};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;

pub struct CloudflareClient {
    client: Client,
    base_url: String,
}

impl CloudflareClient {
    pub fn new() -> Self {
        Self::new_with_client(DEFAULT_API_BASE.to_string(), Client::new())
    }

    pub fn new_with_client(base_url: String, client: Client) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn purge_url(&self, zone_id: &str) -> String {
        format!("{}/client/v4/zones/{}/purge_cache", self.base_url, zone_id)
    }
}

impl Default for CloudflareClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PurgeService for CloudflareClient {
    async fn purge(&self, credentials: &CdnCredentials, request: &PurgeRequest) -> Result<()> {
        tracing::debug!(
            "Sending purge request for {} URL(s) to zone {}",
            request.files.len(),
            credentials.zone_id
        );

        let response = self
            .client
            .post(self.purge_url(&credentials.zone_id))
            .header("X-Auth-Key", &credentials.account_id)
            .header("Authorization", format!("Bearer {}", credentials.api_token))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send purge request to Cloudflare: {}", e);
                e
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::Cloudflare(format!(
                "purge rejected (status {}): {}",
                status,
                describe_errors(&error_text)
            )));
        }

        Ok(())
    }
}

/// Summarize an error body, preferring the API envelope's messages.
fn describe_errors(body: &str) -> String {
    match serde_json::from_str::<ApiEnvelope>(body) {
        Ok(envelope) if !envelope.errors.is_empty() => envelope
            .errors
            .iter()
            .map(|e| format!("[{}] {}", e.code, e.message))
            .collect::<Vec<_>>()
            .join("; "),
        _ => body.to_string(),
    }
}
