//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every booking, country, upload, and health endpoint
//! together with schema wrappers from [`crate::inbound::http::schemas`], so
//! domain types stay free of utoipa derives. The bearer scheme documents the
//! optional `BOOKING_API_TOKEN` guard.
//!
//! The generated OpenAPI document is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::index::IndexResponse;
use crate::inbound::http::schemas::{
    BookingDeleteRequest, BookingSchema, BookingStoreRequest, BookingUpdateRequest,
    CountryRequest, CountrySchema, EnvelopeSchema, FileLinkSchema, FileUploadSchema,
    PageMetaSchema,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .description(Some(
                        "Static API token; required only when the server is configured with one.",
                    ))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Booking backend API",
        description = "Surf-trip bookings with file attachments, and the countries they reference."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::index::index,
        crate::inbound::http::bookings::list_bookings,
        crate::inbound::http::bookings::store_booking,
        crate::inbound::http::bookings::update_booking,
        crate::inbound::http::bookings::delete_booking,
        crate::inbound::http::countries::list_countries,
        crate::inbound::http::countries::store_country,
        crate::inbound::http::countries::update_country,
        crate::inbound::http::countries::delete_country,
        crate::inbound::http::uploads::get_upload,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        IndexResponse,
        EnvelopeSchema,
        PageMetaSchema,
        FileLinkSchema,
        BookingSchema,
        CountrySchema,
        FileUploadSchema,
        BookingStoreRequest,
        BookingUpdateRequest,
        BookingDeleteRequest,
        CountryRequest,
    )),
    tags(
        (name = "index", description = "Service banner"),
        (name = "bookings", description = "Booking records and their attachments"),
        (name = "countries", description = "Country reference data"),
        (name = "uploads", description = "Stored attachment files"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying OpenAPI registration and schema field structure.

    use super::*;
    use rstest::rstest;
    use utoipa::OpenApi;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    /// Assert that an Object schema contains a field with the given name.
    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case("Envelope", &["message", "data", "status_code", "metadata"])]
    #[case("Booking", &["id", "customer_email", "visit_date", "files"])]
    #[case("Country", &["id", "code", "name"])]
    #[case("PageMeta", &["total", "per_page", "current_page", "last_page", "from", "to"])]
    fn schemas_have_expected_fields(#[case] name: &str, #[case] fields: &[&str]) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let schema = schemas.get(name).expect("schema registered");
        for field in fields {
            assert_object_schema_has_field(schema, field);
        }
    }

    #[rstest]
    #[case("/bookings")]
    #[case("/booking/store")]
    #[case("/booking/update")]
    #[case("/booking/delete")]
    #[case("/countries")]
    #[case("/country/store")]
    #[case("/country/update/{id}")]
    #[case("/country/delete/{id}")]
    #[case("/uploads/{name}")]
    #[case("/health/ready")]
    fn every_route_is_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing path {path}");
    }

    #[rstest]
    fn bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("BearerToken"));
    }
}
