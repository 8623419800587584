//! HTTP inbound adapter exposing the REST endpoints.
//!
//! [`configure`] registers the resource routes together with JSON and query
//! extractor settings that turn malformed input into `422` envelopes. Callers
//! wrap the scope with [`crate::BearerAuth`] and mount the health probes
//! beside it.

pub mod bookings;
pub mod countries;
pub mod envelope;
pub mod error;
pub mod health;
pub mod index;
pub mod schemas;
pub mod state;
pub mod uploads;

use actix_web::web;

use crate::domain::Error;

pub use error::ApiResult;

/// Request body limit used when none is configured. Attachments travel as
/// base64 inside the JSON body, so this sits well above actix's 2 MiB.
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Register extractor settings and the resource routes, accepting JSON bodies
/// up to `max_body_bytes`.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use booking_backend::inbound::http::{DEFAULT_MAX_BODY_BYTES, configure};
///
/// let app = App::new().service(web::scope("").configure(configure(DEFAULT_MAX_BODY_BYTES)));
/// ```
pub fn configure(max_body_bytes: usize) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(
            web::JsonConfig::default()
                .limit(max_body_bytes)
                .error_handler(|err, _req| invalid_input("request body", &err).into()),
        )
        .app_data(
            web::QueryConfig::default()
                .error_handler(|err, _req| invalid_input("query string", &err).into()),
        )
        .service(index::index)
        .service(bookings::list_bookings)
        .service(bookings::store_booking)
        .service(bookings::update_booking)
        .service(bookings::delete_booking)
        .service(countries::list_countries)
        .service(countries::store_country)
        .service(countries::update_country)
        .service(countries::delete_country);
    }
}

/// Validation error for an extractor failure. Actix messages sometimes end
/// with a full stop already.
fn invalid_input(part: &str, err: &dyn std::fmt::Display) -> Error {
    let detail = err.to_string();
    Error::validation(format!(
        "The {part} is invalid: {}.",
        detail.trim_end().trim_end_matches('.')
    ))
}
