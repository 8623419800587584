//! Country endpoints.
//!
//! ```text
//! GET    /countries
//! POST   /country/store
//! PUT    /country/update/{id}
//! DELETE /country/delete/{id}
//! ```

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, delete, get, post, put, web};
use serde_json::{Value, json};

use crate::domain::{Error, ListParams};
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope::{Envelope, page_response};
use crate::inbound::http::schemas::{CountryRequest, EnvelopeSchema, ListParamsSchema};
use crate::inbound::http::state::HttpState;

fn path_id(raw: &str) -> Result<i64, Error> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| Error::validation("The id must be a positive integer."))
}

/// List countries with search, sort, and pagination.
#[utoipa::path(
    get,
    path = "/countries",
    params(ListParamsSchema),
    responses(
        (status = 200, description = "Page of countries", body = EnvelopeSchema),
        (status = 404, description = "No countries match", body = EnvelopeSchema),
        (status = 422, description = "Unknown sort column or direction", body = EnvelopeSchema)
    ),
    tags = ["countries"],
    operation_id = "listCountries"
)]
#[get("/countries")]
pub async fn list_countries(
    state: web::Data<HttpState>,
    query: web::Query<ListParams>,
) -> ApiResult<HttpResponse> {
    let page = state.countries.list(&query).await?;
    Ok(page_response(
        page,
        "Successfully retrieved countries.",
        "No countries found based on the provided criteria.",
    ))
}

/// Create a country; `data` is the new id.
#[utoipa::path(
    post,
    path = "/country/store",
    request_body = CountryRequest,
    responses(
        (status = 201, description = "Country created", body = EnvelopeSchema),
        (status = 422, description = "Rejected input", body = EnvelopeSchema),
        (status = 400, description = "Insert failed", body = EnvelopeSchema)
    ),
    tags = ["countries"],
    operation_id = "storeCountry"
)]
#[post("/country/store")]
pub async fn store_country(
    state: web::Data<HttpState>,
    body: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let country = state.countries.store(&body).await?;
    Ok(Envelope::new(
        StatusCode::CREATED,
        "Country created successfully.",
        json!(country.id),
    )
    .respond())
}

/// Overwrite a country.
#[utoipa::path(
    put,
    path = "/country/update/{id}",
    params(("id" = i64, Path, description = "Country id")),
    request_body = CountryRequest,
    responses(
        (status = 200, description = "Affected row count", body = EnvelopeSchema),
        (status = 404, description = "Unknown country", body = EnvelopeSchema),
        (status = 422, description = "Rejected input", body = EnvelopeSchema),
        (status = 400, description = "Update failed", body = EnvelopeSchema)
    ),
    tags = ["countries"],
    operation_id = "updateCountry"
)]
#[put("/country/update/{id}")]
pub async fn update_country(
    state: web::Data<HttpState>,
    id: web::Path<String>,
    body: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let rows = state.countries.update(path_id(&id)?, &body).await?;
    Ok(Envelope::new(StatusCode::OK, "Country updated successfully.", json!(rows)).respond())
}

/// Delete a country.
#[utoipa::path(
    delete,
    path = "/country/delete/{id}",
    params(("id" = i64, Path, description = "Country id")),
    responses(
        (status = 200, description = "Deleted row count", body = EnvelopeSchema),
        (status = 404, description = "Unknown country", body = EnvelopeSchema),
        (status = 422, description = "Malformed id", body = EnvelopeSchema),
        (status = 400, description = "Delete failed", body = EnvelopeSchema)
    ),
    tags = ["countries"],
    operation_id = "deleteCountry"
)]
#[delete("/country/delete/{id}")]
pub async fn delete_country(
    state: web::Data<HttpState>,
    id: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let rows = state.countries.delete(path_id(&id)?).await?;
    Ok(Envelope::new(StatusCode::OK, "Country deleted successfully.", json!(rows)).respond())
}
