use actix_web::error::PayloadError;
use actix_web::http::header;
use actix_web::HttpRequest;
use actix_web::HttpResponse;

use crate::domain::Sanitizer;

pub const POST_AND_OPTIONS: &str = "POST, OPTIONS";
pub const GET_AND_OPTIONS: &str = "GET, OPTIONS";

pub fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }
    Ok(())
}

// CORS preflight: 204 with no body.
pub fn preflight(allow: &'static str) -> HttpResponse {
    HttpResponse::NoContent()
        .insert_header((header::ALLOW, allow))
        .insert_header((header::ACCESS_CONTROL_ALLOW_METHODS, allow))
        .insert_header((header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"))
        .finish()
}

pub fn method_not_allowed<B: serde::Serialize>(allow: &'static str, body: &B) -> HttpResponse {
    HttpResponse::MethodNotAllowed()
        .insert_header((header::ALLOW, allow))
        .json(body)
}

/// Sanitized value of a request header, empty if absent or not valid text.
pub fn header_text(
    request: &HttpRequest,
    name: header::HeaderName,
    sanitizer: Sanitizer,
) -> String {
    request
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(|value| sanitizer.clean(value))
        .unwrap_or_default()
}

/// True when the body extractor gave up because the body exceeds `PayloadConfig`'s limit.
pub fn is_payload_too_large(e: &actix_web::Error) -> bool {
    matches!(e.as_error::<PayloadError>(), Some(PayloadError::Overflow))
}
