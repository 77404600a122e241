use actix_web::http::header::REFERER;
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use once_cell::sync::Lazy;
use tracing::field::display;
use tracing::Span;

use crate::domain::{Field, RawSubmission, Sanitizer, SubmissionPayload, ValidationOptions};
use crate::fallback_store::StoreError;
use crate::startup::ContactSink;
use crate::submission_sink::SinkError;
use crate::utils::{
    error_chain_fmt, header_text, is_payload_too_large, method_not_allowed, POST_AND_OPTIONS,
};
use crate::webhook_client::DeliveryError;

static CONTACT_RULES: Lazy<ValidationOptions> = Lazy::new(|| {
    ValidationOptions::default()
        .with_message(Field::Name, "Name is required.")
        .with_message(Field::Email, "A valid email address is required.")
        .with_message(Field::Message, "Message is required.")
        .min_message_length(1)
});

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct ContactResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ContactResponse {
    fn success() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }

    fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(error.into()),
        }
    }
}

#[derive(thiserror::Error)]
pub enum ContactError {
    #[error("{0}")]
    ValidationError(String),
    #[error("Request body is too large.")]
    PayloadTooLarge,
    #[error("Unable to deliver the message.")]
    DeliveryError(#[source] DeliveryError),
    #[error("Unable to save the message.")]
    PersistenceError(#[source] StoreError),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for ContactError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl From<SinkError> for ContactError {
    fn from(e: SinkError) -> Self {
        match e {
            SinkError::Delivery(e) => ContactError::DeliveryError(e),
            SinkError::Persistence(e) => ContactError::PersistenceError(e),
        }
    }
}

impl ResponseError for ContactError {
    fn status_code(&self) -> StatusCode {
        match self {
            ContactError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ContactError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ContactError::DeliveryError(_) => StatusCode::BAD_GATEWAY,
            ContactError::PersistenceError(_) | ContactError::UnexpectedError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            ContactError::UnexpectedError(_) => {
                "Unexpected error while submitting the form.".to_string()
            }
            known => known.to_string(),
        };
        HttpResponse::build(self.status_code()).json(ContactResponse::failure(message))
    }
}

#[tracing::instrument(
    name = "Submitting a contact request",
    skip(request, body, sink),
    fields(
        submitter_email = tracing::field::Empty,
        submitter_name = tracing::field::Empty
    )
)]
pub async fn submit_contact(
    request: HttpRequest,
    body: Result<web::Bytes, actix_web::Error>,
    sink: web::Data<ContactSink>,
) -> Result<HttpResponse, ContactError> {
    let body = body.map_err(|e| {
        if is_payload_too_large(&e) {
            ContactError::PayloadTooLarge
        } else {
            ContactError::UnexpectedError(anyhow::anyhow!(
                "Failed to read the request body: {}",
                e
            ))
        }
    })?;
    if body.is_empty() {
        return Err(ContactError::ValidationError(
            "Missing request body.".to_string(),
        ));
    }
    let raw = RawSubmission::from_json(&body)
        .map_err(|_| ContactError::ValidationError("Invalid JSON payload.".to_string()))?;

    let source = match raw.text("source", Sanitizer::Standard) {
        source if !source.is_empty() => source,
        _ => header_text(&request, REFERER, Sanitizer::Standard),
    };
    let payload = SubmissionPayload::accept(
        raw.fields(Sanitizer::Standard),
        &CONTACT_RULES,
        source,
        None,
    )
    .map_err(|errors| ContactError::ValidationError(errors.first().unwrap_or_default().into()))?;

    Span::current()
        .record("submitter_email", &display(&payload.email))
        .record("submitter_name", &display(&payload.name));

    sink.0.deliver(&payload).await.map_err(|e| {
        tracing::error!(
            error.cause_chain = ?e,
            error.message = %e,
            "Contact request could not be handed over",
        );
        ContactError::from(e)
    })?;

    Ok(HttpResponse::Ok().json(ContactResponse::success()))
}

pub async fn contact_method_not_allowed() -> HttpResponse {
    method_not_allowed(
        POST_AND_OPTIONS,
        &ContactResponse::failure("Method not allowed."),
    )
}
