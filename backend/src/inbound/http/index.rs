//! Service banner at `GET /`.

use actix_web::{HttpResponse, get};
use serde::Serialize;
use utoipa::ToSchema;

/// Package name and version.
#[derive(Debug, Serialize, ToSchema)]
pub struct IndexResponse {
    /// `<package> <version>`.
    #[schema(example = "booking-backend 0.1.0")]
    pub message: String,
}

impl IndexResponse {
    /// Banner for this build.
    pub fn current() -> Self {
        Self {
            message: format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Report the running package and version.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service banner", body = IndexResponse)),
    tags = ["index"],
    operation_id = "getIndex"
)]
#[get("/")]
pub async fn index() -> HttpResponse {
    HttpResponse::Ok().json(IndexResponse::current())
}
