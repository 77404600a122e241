use reqwest::{Client, StatusCode};

use super::Resolution;
use crate::domain::sanitize_strict;

#[derive(thiserror::Error, Debug)]
pub enum SubmitError {
    #[error("The site rejected the submission with {status}")]
    Rejected {
        status: StatusCode,
        message: Option<String>,
    },
    #[error("Failed to reach the site")]
    Transport(#[from] reqwest::Error),
}

impl SubmitError {
    /// The explanation sent back by the server, if there was one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            SubmitError::Rejected { message, .. } => message.as_deref(),
            SubmitError::Transport(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub message: String,
    pub company: String,
    pub source: String,
}

impl ContactRequest {
    fn sanitized(&self) -> Self {
        Self {
            name: sanitize_strict(&self.name),
            email: sanitize_strict(&self.email),
            message: sanitize_strict(&self.message),
            company: sanitize_strict(&self.company),
            source: sanitize_strict(&self.source),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct LeadRequest {
    pub name: String,
    pub email: String,
    pub company: String,
    pub message: String,
}

impl LeadRequest {
    fn sanitized(&self) -> Self {
        Self {
            name: sanitize_strict(&self.name),
            email: sanitize_strict(&self.email),
            company: sanitize_strict(&self.company),
            message: sanitize_strict(&self.message),
        }
    }
}

// Both acknowledgement shapes; each endpoint only fills one flag.
#[derive(Debug, Default, serde::Deserialize)]
struct Acknowledgement {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    success: bool,
    error: Option<String>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookingUrlBody {
    booking_url: Option<String>,
}

/// What the widgets use to talk to the site's API.
pub struct SiteClient {
    http_client: Client,
    base_url: String,
}

impl SiteClient {
    pub fn new(base_url: String, timeout: std::time::Duration) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url,
        })
    }

    #[tracing::instrument(name = "Send the contact form", skip_all)]
    pub async fn submit_contact(&self, request: &ContactRequest) -> Result<(), SubmitError> {
        let response = self
            .http_client
            .post(format!("{}/api/contact", self.base_url))
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&request.sanitized())
            .send()
            .await?;
        let status = response.status();
        let body = read_acknowledgement(response).await;
        if !status.is_success() || !body.ok {
            return Err(SubmitError::Rejected {
                status,
                message: body.error,
            });
        }
        Ok(())
    }

    #[tracing::instrument(name = "Send the chat lead form", skip_all)]
    pub async fn save_chat_request(&self, request: &LeadRequest) -> Result<(), SubmitError> {
        let response = self
            .http_client
            .post(format!("{}/api/save-chat-request", self.base_url))
            .json(&request.sanitized())
            .send()
            .await?;
        let status = response.status();
        let body = read_acknowledgement(response).await;
        if !status.is_success() || !body.success {
            return Err(SubmitError::Rejected {
                status,
                message: body.error,
            });
        }
        Ok(())
    }

    /// Looks the booking URL up once. Callers keep the result and pass it to
    /// [`super::render`] instead of asking again.
    #[tracing::instrument(name = "Resolve the booking URL", skip_all)]
    pub async fn resolve_booking_url(&self) -> Resolution {
        match self.fetch_booking_url().await {
            Ok(url) => Resolution::Resolved(url),
            Err(e) => {
                tracing::warn!(error.cause_chain = ?e, "Failed to resolve booking URL");
                Resolution::Failed
            }
        }
    }

    async fn fetch_booking_url(&self) -> Result<String, anyhow::Error> {
        let body: BookingUrlBody = self
            .http_client
            .get(format!("{}/api/booking-url", self.base_url))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        body.booking_url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| anyhow::anyhow!("Booking URL missing from payload"))
    }
}

// A body that is not JSON counts as an empty acknowledgement.
async fn read_acknowledgement(response: reqwest::Response) -> Acknowledgement {
    response.json().await.unwrap_or_default()
}
