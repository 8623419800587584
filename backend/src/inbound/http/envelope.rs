//! Response envelope shared by every endpoint.
//!
//! Bodies are `{message, data, status_code, metadata?}`. `status_code` repeats
//! the HTTP status, except where an endpoint deliberately answers `200` with a
//! different code in the body (booking validation failures).

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use pagination::{Page, PageMeta};
use serde::Serialize;
use serde_json::Value;

/// JSON body returned by every endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T> {
    /// Human-readable outcome.
    pub message: String,
    /// Payload, `null` when there is none.
    pub data: T,
    /// Status code reported in the body.
    pub status_code: u16,
    /// Pagination metadata for list responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<PageMeta>,
}

impl<T: Serialize> Envelope<T> {
    /// Envelope whose body status matches `status`.
    pub fn new(status: StatusCode, message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data,
            status_code: status.as_u16(),
            metadata: None,
        }
    }

    /// Attach pagination metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: PageMeta) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Render with the HTTP status taken from the body.
    pub fn respond(self) -> HttpResponse {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        self.respond_as(status)
    }

    /// Render with an explicit HTTP status.
    pub fn respond_as(self, status: StatusCode) -> HttpResponse {
        HttpResponse::build(status).json(self)
    }
}

impl Envelope<Value> {
    /// Envelope with a `null` payload.
    pub fn empty(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(status, message, Value::Null)
    }
}

/// List response: `200` with metadata, or `404` with `data: []` when the page
/// holds nothing.
pub fn page_response<T: Serialize>(page: Page<T>, found: &str, missing: &str) -> HttpResponse {
    if page.is_empty() {
        return Envelope::new(StatusCode::NOT_FOUND, missing, Vec::<T>::new()).respond();
    }
    let Page { items, meta } = page;
    Envelope::new(StatusCode::OK, found, items)
        .with_metadata(meta)
        .respond()
}
