//! HTTP adapter mapping for domain errors.
//!
//! Keeps the domain error type HTTP-agnostic while letting Actix handlers
//! turn domain failures into the shared envelope and a status code.

use actix_web::http::StatusCode;
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::{HttpResponse, ResponseError};
use serde_json::Value;
use tracing::error;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

use super::envelope::Envelope;

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::Validation | ErrorCode::Duplicate => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Persistence => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn public_message(error: &Error) -> &str {
    if matches!(error.code(), ErrorCode::InternalError) {
        "Internal server error"
    } else {
        error.message()
    }
}

/// Render `error` as an envelope answered with `status`.
pub fn envelope_response(error: &Error, status: StatusCode) -> HttpResponse {
    let data = error.data().cloned().unwrap_or(Value::Null);
    let mut response =
        Envelope::new(status_for(error.code()), public_message(error), data).respond_as(status);
    if let Some(value) = error
        .trace_id()
        .and_then(|id| HeaderValue::from_str(id).ok())
    {
        response
            .headers_mut()
            .insert(HeaderName::from_static(TRACE_ID_HEADER), value);
    }
    response
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        envelope_response(self, self.status_code())
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Error::internal("Internal server error")
    }
}
