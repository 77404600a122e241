use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};

use crate::domain::SubmissionPayload;

#[derive(thiserror::Error, Debug)]
pub enum DeliveryError {
    #[error("Webhook responded with {status}: {detail}")]
    Rejected { status: StatusCode, detail: String },
    #[error("Failed to reach the webhook")]
    Transport(#[source] reqwest::Error),
}

#[derive(Debug)]
pub struct WebhookClient {
    http_client: Client,
    url: Secret<String>,
}

impl WebhookClient {
    pub fn new(url: Secret<String>, timeout: std::time::Duration) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self { http_client, url })
    }

    /// One POST per call; no retry.
    #[tracing::instrument(name = "Deliver a submission to the webhook", skip_all)]
    pub async fn deliver(&self, payload: &SubmissionPayload) -> Result<(), DeliveryError> {
        let request_body = WebhookRequest {
            name: &payload.name,
            email: &payload.email,
            message: &payload.message,
            company: &payload.company,
            source: &payload.source,
            submitted_at: payload.submitted_at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        };
        let response = self
            .http_client
            .post(self.url.expose_secret())
            .json(&request_body)
            .send()
            .await
            .map_err(DeliveryError::Transport)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        // The body is only a diagnostic, losing it is fine.
        let detail = response.text().await.unwrap_or_default();
        let detail = if detail.is_empty() {
            format!("Webhook request failed with status {}.", status.as_u16())
        } else {
            detail
        };
        Err(DeliveryError::Rejected { status, detail })
    }
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct WebhookRequest<'a> {
    name: &'a str,
    email: &'a str,
    message: &'a str,
    company: &'a str,
    source: &'a str,
    submitted_at: String,
}
