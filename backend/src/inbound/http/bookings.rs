//! Booking endpoints.
//!
//! ```text
//! GET    /bookings
//! POST   /booking/store
//! PUT    /booking/update
//! DELETE /booking/delete
//! ```
//!
//! Bodies are read as raw JSON and validated by the booking service. Store
//! reports validation and duplicate failures, including bodies that are not
//! JSON or exceed the size limit, as HTTP `200` with `status_code: 422` in
//! the body; update and delete answer `422`.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, delete, get, post, put, web};
use serde_json::{Value, json};

use crate::domain::{Error, ListParams};
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope::{Envelope, page_response};
use crate::inbound::http::error::envelope_response;
use crate::inbound::http::schemas::{
    BookingDeleteRequest, BookingStoreRequest, BookingUpdateRequest, EnvelopeSchema,
    ListParamsSchema,
};
use crate::inbound::http::state::HttpState;

/// List bookings with search, sort, and pagination.
#[utoipa::path(
    get,
    path = "/bookings",
    params(ListParamsSchema),
    responses(
        (status = 200, description = "Page of bookings with attachments", body = EnvelopeSchema),
        (status = 404, description = "No bookings match", body = EnvelopeSchema),
        (status = 422, description = "Unknown sort column or direction", body = EnvelopeSchema)
    ),
    tags = ["bookings"],
    operation_id = "listBookings"
)]
#[get("/bookings")]
pub async fn list_bookings(
    state: web::Data<HttpState>,
    query: web::Query<ListParams>,
) -> ApiResult<HttpResponse> {
    let page = state.bookings.list(&query).await?;
    Ok(page_response(
        page,
        "Successfully retrieve bookings.",
        "No bookings found based on the provided criteria.",
    ))
}

/// Create a booking and store its attachments.
#[utoipa::path(
    post,
    path = "/booking/store",
    request_body = BookingStoreRequest,
    responses(
        (status = 201, description = "Booking created", body = EnvelopeSchema),
        (status = 200, description = "Rejected input; body status_code is 422", body = EnvelopeSchema),
        (status = 400, description = "Booking or attachment could not be stored", body = EnvelopeSchema)
    ),
    tags = ["bookings"],
    operation_id = "storeBooking"
)]
#[post("/booking/store")]
pub async fn store_booking(
    state: web::Data<HttpState>,
    body: Result<web::Json<Value>, actix_web::Error>,
) -> ApiResult<HttpResponse> {
    let body = match body {
        Ok(body) => body.into_inner(),
        Err(err) => return Ok(rejected_body(&err)),
    };
    match state.bookings.store(&body).await {
        Ok(booking) => Ok(Envelope::new(
            StatusCode::CREATED,
            "Successfully inserted booking with files.",
            booking,
        )
        .respond()),
        Err(err) if err.is_client_input() => Ok(envelope_response(&err, StatusCode::OK)),
        Err(err) => Err(err),
    }
}

/// Render an extractor failure the way store reports rejected input.
fn rejected_body(err: &actix_web::Error) -> HttpResponse {
    match err.as_error::<Error>() {
        Some(error) => envelope_response(error, StatusCode::OK),
        None => envelope_response(
            &Error::validation("The request body is invalid."),
            StatusCode::OK,
        ),
    }
}

/// Overwrite a booking identified by `id` in the body.
#[utoipa::path(
    put,
    path = "/booking/update",
    request_body = BookingUpdateRequest,
    responses(
        (status = 200, description = "Affected row count", body = EnvelopeSchema),
        (status = 404, description = "Unknown booking", body = EnvelopeSchema),
        (status = 422, description = "Rejected input", body = EnvelopeSchema),
        (status = 400, description = "Update failed", body = EnvelopeSchema)
    ),
    tags = ["bookings"],
    operation_id = "updateBooking"
)]
#[put("/booking/update")]
pub async fn update_booking(
    state: web::Data<HttpState>,
    body: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let rows = state.bookings.update(&body).await?;
    Ok(Envelope::new(StatusCode::OK, "Successfully updated booking.", json!(rows)).respond())
}

/// Delete a booking identified by `id` in the body, with its attachments.
#[utoipa::path(
    delete,
    path = "/booking/delete",
    request_body = BookingDeleteRequest,
    responses(
        (status = 200, description = "Deleted row count", body = EnvelopeSchema),
        (status = 404, description = "Unknown booking", body = EnvelopeSchema),
        (status = 422, description = "Missing or malformed id", body = EnvelopeSchema),
        (status = 400, description = "Delete failed", body = EnvelopeSchema)
    ),
    tags = ["bookings"],
    operation_id = "deleteBooking"
)]
#[delete("/booking/delete")]
pub async fn delete_booking(
    state: web::Data<HttpState>,
    body: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let rows = state.bookings.delete(&body).await?;
    Ok(Envelope::new(StatusCode::OK, "Successfully deleted booking.", json!(rows)).respond())
}
