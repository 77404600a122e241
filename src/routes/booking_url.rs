use actix_web::http::header::CACHE_CONTROL;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};

use crate::startup::BookingUrl;
use crate::utils::{method_not_allowed, GET_AND_OPTIONS};

const CACHE_POLICY: &str = "public, max-age=0, s-maxage=3600";

#[derive(serde::Serialize, serde::Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct BookingUrlResponse {
    pub booking_url: String,
}

#[derive(serde::Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

#[derive(thiserror::Error, Debug)]
pub enum BookingUrlError {
    #[error("Booking URL is not configured.")]
    NotConfigured,
}

impl ResponseError for BookingUrlError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: &self.to_string(),
        })
    }
}

pub async fn booking_url(
    booking_url: web::Data<BookingUrl>,
) -> Result<HttpResponse, BookingUrlError> {
    let url = booking_url.0.as_ref().ok_or(BookingUrlError::NotConfigured)?;
    Ok(HttpResponse::Ok()
        .insert_header((CACHE_CONTROL, CACHE_POLICY))
        .json(BookingUrlResponse {
            booking_url: url.clone(),
        }))
}

pub async fn booking_url_method_not_allowed() -> HttpResponse {
    method_not_allowed(
        GET_AND_OPTIONS,
        &ErrorBody {
            error: "Method not allowed.",
        },
    )
}
