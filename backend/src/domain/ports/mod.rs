//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod attachment_storage;
mod booking_repository;
mod country_repository;
mod reference_lookup;
mod response_cache;

pub use attachment_storage::{AttachmentStorage, AttachmentStorageError};
#[cfg(test)]
pub use attachment_storage::MockAttachmentStorage;
pub use booking_repository::{BookingRepository, BookingRepositoryError};
#[cfg(test)]
pub use booking_repository::MockBookingRepository;
pub use country_repository::{CountryRepository, CountryRepositoryError};
#[cfg(test)]
pub use country_repository::MockCountryRepository;
pub use reference_lookup::{ColumnRef, ReferenceLookup, ReferenceLookupError};
#[cfg(test)]
pub use reference_lookup::MockReferenceLookup;
pub use response_cache::{ResponseCache, ResponseCacheError};
#[cfg(test)]
pub use response_cache::MockResponseCache;
