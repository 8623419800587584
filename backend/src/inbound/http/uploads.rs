//! Serves stored attachments at `GET /uploads/{name}`.
//!
//! The URLs recorded in attachment rows point here. Names are the generated
//! `<uuid>.<ext>` values; anything containing a path separator is rejected
//! by the storage adapter.

use actix_web::http::header::{self, ContentType};
use actix_web::{HttpResponse, get, web};
use tracing::warn;

use crate::domain::Error;
use crate::domain::extension_of;
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

fn content_type(name: &str) -> ContentType {
    match extension_of(name).to_ascii_lowercase().as_str() {
        "png" => ContentType::png(),
        "jpg" | "jpeg" => ContentType::jpeg(),
        "txt" => ContentType::plaintext(),
        "json" => ContentType::json(),
        "pdf" => ContentType(actix_web::mime::APPLICATION_PDF),
        _ => ContentType::octet_stream(),
    }
}

/// Return the bytes of a stored attachment.
#[utoipa::path(
    get,
    path = "/uploads/{name}",
    params(("name" = String, Path, description = "Generated file name")),
    responses(
        (status = 200, description = "File content"),
        (status = 404, description = "No such file")
    ),
    tags = ["uploads"],
    operation_id = "getUpload"
)]
#[get("/uploads/{name}")]
pub async fn get_upload(
    state: web::Data<HttpState>,
    name: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let bytes = state.attachments.read(&name).await.map_err(|err| {
        warn!(error = %err, file = %name, "attachment read failed");
        Error::not_found("File not found.")
    })?;
    let Some(bytes) = bytes else {
        return Err(Error::not_found("File not found."));
    };
    Ok(HttpResponse::Ok()
        .insert_header(content_type(&name))
        .insert_header((header::CACHE_CONTROL, "public, max-age=86400"))
        .body(bytes))
}
