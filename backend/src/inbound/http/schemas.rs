//! OpenAPI schema definitions for domain types and request bodies.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. The
//! wrappers here mirror their shape for the generated document only; handlers
//! read bodies as raw JSON so validation can report every field in its own
//! words.

use utoipa::{IntoParams, ToSchema};

/// OpenAPI schema for the response envelope.
#[derive(ToSchema)]
#[schema(as = Envelope)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct EnvelopeSchema {
    /// Human-readable outcome.
    #[schema(example = "Successfully retrieve bookings.")]
    message: String,
    /// Payload; shape depends on the endpoint.
    data: Option<serde_json::Value>,
    /// Status code repeated in the body.
    #[schema(example = 200)]
    status_code: u16,
    /// Present on list responses.
    metadata: Option<PageMetaSchema>,
}

/// OpenAPI schema for [`pagination::PageMeta`].
#[derive(ToSchema)]
#[schema(as = PageMeta)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct PageMetaSchema {
    /// Total matching rows.
    #[schema(example = 25)]
    total: u64,
    /// Page size.
    #[schema(example = 10)]
    per_page: u32,
    /// 1-indexed page number.
    #[schema(example = 3)]
    current_page: u32,
    /// Final page number; at least one.
    #[schema(example = 3)]
    last_page: u64,
    /// Position of the first item on the page.
    #[schema(example = 21)]
    from: Option<u64>,
    /// Position of the last item on the page.
    #[schema(example = 25)]
    to: Option<u64>,
}

/// OpenAPI schema for [`crate::domain::FileLink`].
#[derive(ToSchema)]
#[schema(as = FileLink)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct FileLinkSchema {
    /// Name the file was uploaded under.
    #[schema(example = "board.png")]
    file_name: String,
    /// Public URL of the stored file.
    #[schema(example = "http://localhost:8080/uploads/6f1c2d3e4b5a49788a1b2c3d4e5f6a7b.png")]
    src: String,
}

/// OpenAPI schema for [`crate::domain::BookingView`].
#[derive(ToSchema)]
#[schema(as = Booking)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct BookingSchema {
    #[schema(example = 1)]
    id: i64,
    #[schema(example = "Ana Costa")]
    customer_name: String,
    #[schema(example = "PT")]
    country_code: String,
    #[schema(example = "ana@example.com")]
    customer_email: String,
    #[schema(example = "+351 900 000 000")]
    customer_phone: String,
    #[schema(example = 4)]
    surfing_experience: i16,
    /// `YYYY-MM-DD`.
    #[schema(value_type = String, format = Date, example = "2024-07-05")]
    visit_date: String,
    #[schema(example = "longboard")]
    desired_board: String,
    #[schema(value_type = Option<String>, format = DateTime)]
    created_at: Option<String>,
    files: Vec<FileLinkSchema>,
}

/// OpenAPI schema for [`crate::domain::Country`].
#[derive(ToSchema)]
#[schema(as = Country)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct CountrySchema {
    #[schema(example = 1)]
    id: i64,
    #[schema(example = "PT")]
    code: String,
    #[schema(example = "Portugal")]
    name: String,
    #[schema(value_type = Option<String>, format = DateTime)]
    created_at: Option<String>,
    #[schema(value_type = Option<String>, format = DateTime)]
    updated_at: Option<String>,
}

/// One base64 attachment in a booking create request.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct FileUploadSchema {
    /// File content, optionally prefixed with a `data:<mime>;base64,` header.
    #[schema(example = "data:text/plain;base64,aGVsbG8=")]
    base64: String,
    /// Original file name; its extension is kept when it is plain alphanumerics.
    #[schema(example = "note.txt")]
    name: String,
    /// Size in bytes as reported by the client.
    #[schema(example = 5)]
    size: u64,
}

/// Booking create body.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct BookingStoreRequest {
    #[schema(example = "Ana Costa")]
    customer_name: String,
    /// Code of an existing country.
    #[schema(example = "PT")]
    country_code: String,
    #[schema(example = "ana@example.com")]
    customer_email: String,
    #[schema(example = "+351 900 000 000")]
    customer_phone: String,
    /// 0 to 127.
    #[schema(example = 4)]
    surfing_experience: i16,
    /// `d/m/Y`.
    #[schema(example = "05/07/2024")]
    visit_date: String,
    #[schema(example = "longboard")]
    desired_board: String,
    file_uploads: Vec<FileUploadSchema>,
}

/// Booking update body.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct BookingUpdateRequest {
    #[schema(example = 1)]
    id: i64,
    #[schema(example = "Ana Costa")]
    customer_name: String,
    #[schema(example = "PT")]
    country_code: String,
    #[schema(example = "ana@example.com")]
    customer_email: String,
    #[schema(example = "+351 900 000 000")]
    customer_phone: String,
    #[schema(example = 5)]
    surfing_experience: i16,
    #[schema(example = "06/07/2024")]
    visit_date: String,
    #[schema(example = "shortboard")]
    desired_board: String,
}

/// Booking delete body.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct BookingDeleteRequest {
    #[schema(example = 1)]
    id: i64,
}

/// Country create and update body.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct CountryRequest {
    #[schema(example = "PT")]
    code: String,
    #[schema(example = "Portugal")]
    name: String,
}

/// Query parameters shared by list endpoints.
#[derive(IntoParams)]
#[into_params(parameter_in = Query)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ListParamsSchema {
    /// 1-indexed page, default 1.
    page: Option<u32>,
    /// Page size, default 10.
    per_page: Option<u32>,
    /// Case-insensitive substring filter.
    search: Option<String>,
    /// Column to order by; requires `sort_order`.
    sort_by: Option<String>,
    /// `asc` or `desc`; requires `sort_by`.
    sort_order: Option<String>,
}
