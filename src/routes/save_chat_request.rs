use actix_web::http::header::{HeaderName, REFERER};
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use once_cell::sync::Lazy;
use tracing::field::display;
use tracing::Span;

use crate::domain::{Field, RawSubmission, Sanitizer, SubmissionPayload, ValidationOptions};
use crate::startup::LeadSink;
use crate::submission_sink::SinkError;
use crate::utils::{
    error_chain_fmt, header_text, is_payload_too_large, method_not_allowed, POST_AND_OPTIONS,
};

const DEFAULT_SOURCE: &str = "website";

static LEAD_RULES: Lazy<ValidationOptions> = Lazy::new(|| {
    ValidationOptions::default()
        .with_message(Field::Name, "Name is required.")
        .with_message(Field::Email, "A valid email is required.")
        .with_message(
            Field::Message,
            "Message should include at least 10 characters.",
        )
        .with_message(Field::Company, "Company name is too long.")
        .check_company()
});

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct LeadResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LeadResponse {
    fn success() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

#[derive(thiserror::Error)]
pub enum LeadCaptureError {
    #[error("{0}")]
    ValidationError(String),
    #[error("Request body is too large.")]
    PayloadTooLarge,
    #[error("Unable to save request.")]
    SaveError(#[from] SinkError),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for LeadCaptureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for LeadCaptureError {
    fn status_code(&self) -> StatusCode {
        match self {
            LeadCaptureError::ValidationError(_) => StatusCode::BAD_REQUEST,
            LeadCaptureError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            LeadCaptureError::SaveError(_) | LeadCaptureError::UnexpectedError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            LeadCaptureError::ValidationError(_) | LeadCaptureError::PayloadTooLarge => {
                self.to_string()
            }
            _ => "Unable to save request.".to_string(),
        };
        HttpResponse::build(self.status_code()).json(LeadResponse::failure(message))
    }
}

#[tracing::instrument(
    name = "Saving a chat lead",
    skip(request, body, sink),
    fields(
        submitter_email = tracing::field::Empty,
        submitter_name = tracing::field::Empty
    )
)]
pub async fn save_chat_request(
    request: HttpRequest,
    body: Result<web::Bytes, actix_web::Error>,
    sink: web::Data<LeadSink>,
) -> Result<HttpResponse, LeadCaptureError> {
    let body = body.map_err(|e| {
        if is_payload_too_large(&e) {
            LeadCaptureError::PayloadTooLarge
        } else {
            LeadCaptureError::UnexpectedError(anyhow::anyhow!(
                "Failed to read the request body: {}",
                e
            ))
        }
    })?;
    // An empty body is a submission with every field missing.
    let raw = if body.is_empty() {
        RawSubmission::default()
    } else {
        RawSubmission::from_json(&body)
            .map_err(|_| LeadCaptureError::ValidationError("Invalid JSON payload.".to_string()))?
    };

    let source = match header_text(&request, REFERER, Sanitizer::Strict) {
        referer if !referer.is_empty() => referer,
        _ => DEFAULT_SOURCE.to_string(),
    };
    let payload = SubmissionPayload::accept(
        raw.fields(Sanitizer::Strict),
        &LEAD_RULES,
        source,
        client_ip(&request),
    )
    .map_err(|errors| LeadCaptureError::ValidationError(errors.joined()))?;

    Span::current()
        .record("submitter_email", &display(&payload.email))
        .record("submitter_name", &display(&payload.name));

    sink.0.deliver(&payload).await.map_err(|e| {
        tracing::error!(
            error.cause_chain = ?e,
            error.message = %e,
            "Chat lead could not be saved",
        );
        LeadCaptureError::from(e)
    })?;

    Ok(HttpResponse::Ok().json(LeadResponse::success()))
}

// Forwarding headers win over the socket address; the body is never consulted.
fn client_ip(request: &HttpRequest) -> Option<String> {
    let forwarded = header_text(
        request,
        HeaderName::from_static("x-forwarded-for"),
        Sanitizer::Strict,
    );
    let ip = if forwarded.is_empty() {
        request
            .peer_addr()
            .map(|address| address.ip().to_string())
            .unwrap_or_default()
    } else {
        forwarded
    };
    Some(ip).filter(|ip| !ip.is_empty())
}

pub async fn save_chat_request_method_not_allowed() -> HttpResponse {
    method_not_allowed(
        POST_AND_OPTIONS,
        &LeadResponse::failure("Method not allowed."),
    )
}
