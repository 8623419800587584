//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repository implementations only translate between Diesel rows and domain
//! types; row structs (`models.rs`) and table definitions (`schema.rs`) stay
//! private to this module. Connections come from a `bb8` pool through
//! `diesel-async`.
//!
//! # Example
//!
//! ```no_run
//! use booking_backend::outbound::persistence::{DbPool, DieselBookingRepository, PoolConfig};
//!
//! # async fn connect() -> Result<(), booking_backend::outbound::persistence::PoolError> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/bookings")).await?;
//! let bookings = DieselBookingRepository::new(pool);
//! # let _ = bookings;
//! # Ok(())
//! # }
//! ```

mod diesel_booking_repository;
mod diesel_country_repository;
mod diesel_error_mapping;
mod diesel_reference_lookup;
mod models;
mod pool;
mod schema;

pub use diesel_booking_repository::DieselBookingRepository;
pub use diesel_country_repository::DieselCountryRepository;
pub use diesel_reference_lookup::DieselReferenceLookup;
pub use pool::{DbPool, PoolConfig, PoolError};
