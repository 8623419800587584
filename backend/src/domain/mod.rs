//! Domain types, rules, and use-cases.
//!
//! Purpose: hold everything that does not depend on a transport or store.
//! Adapters reach the domain through the traits in [`ports`]; HTTP handlers
//! call the services.
//!
//! Public surface:
//! - Error / ErrorCode: failure payload and its stable code.
//! - Booking*, Country*: aggregates and client-facing views.
//! - ListParams / ListQuery: filter, sort, and pagination input.
//! - RuleSet / Validator: declarative body validation.
//! - CacheAside: cache-aside reads over a `ResponseCache`.
//! - BookingService / CountryService: the use-cases.

pub mod attachments;
pub mod booking;
pub mod booking_service;
pub mod cache_aside;
pub mod cache_key;
pub mod country;
pub mod country_service;
pub mod error;
pub mod listing;
pub mod ports;
pub mod trace_id;
pub mod validation;

pub use self::attachments::{
    AttachmentUrls, DecodedUpload, UPLOADS_PATH, decode_payload, extension_of, storable_extension,
    strip_data_uri,
};
pub use self::booking::{
    Booking, BookingColumn, BookingDetails, BookingFile, BookingView, DeletedBooking, FileLink,
    NewBookingFile, VISIT_DATE_INPUT_FORMAT,
};
pub use self::booking_service::{BookingPorts, BookingService};
pub use self::cache_aside::{CacheAside, DEFAULT_CACHE_TTL};
pub use self::cache_key::{
    BOOKINGS_CACHE_PREFIX, COUNTRIES_CACHE_PREFIX, ListCacheKey, ListCacheKeyParts,
};
pub use self::country::{Country, CountryColumn, CountryDetails};
pub use self::country_service::CountryService;
pub use self::error::{Error, ErrorCode};
pub use self::listing::{ListParams, ListQuery, Sort, SortOrder, SortableColumn, like_pattern};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::validation::{Rule, RuleSet, Validator, attribute_label, field_i64, field_str};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use booking_backend::domain::{ApiResult, Error};
///
/// fn lookup() -> ApiResult<u64> {
///     Err(Error::not_found("Booking not found."))
/// }
/// assert!(lookup().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
