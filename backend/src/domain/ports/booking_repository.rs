//! Port for booking and attachment persistence.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use pagination::Page;

use crate::domain::{
    Booking, BookingColumn, BookingDetails, BookingFile, DeletedBooking, ListQuery,
    NewBookingFile,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by booking repository adapters.
    pub enum BookingRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "booking repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "booking repository query failed: {message}",
        /// Another booking already uses this email on this date.
        DuplicateVisit => "booking already exists for this email and visit date",
    }
}

/// Booking storage.
///
/// Listing applies the query's search across `customer_name`,
/// `customer_email`, and `customer_phone`, orders by the requested column with
/// `id ASC` as tie-breaker, and returns the requested page with the total
/// match count.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Return one page of bookings.
    async fn list(
        &self,
        query: &ListQuery<BookingColumn>,
    ) -> Result<Page<Booking>, BookingRepositoryError>;

    /// Attachments owned by any of `booking_ids`, ordered by id.
    async fn files_for(&self, booking_ids: &[i64])
    -> Result<Vec<BookingFile>, BookingRepositoryError>;

    /// Fetch a booking by id.
    async fn find(&self, id: i64) -> Result<Option<Booking>, BookingRepositoryError>;

    /// Whether a booking other than `except_id` uses `email` on `visit_date`.
    async fn visit_taken(
        &self,
        email: &str,
        visit_date: NaiveDate,
        except_id: Option<i64>,
    ) -> Result<bool, BookingRepositoryError>;

    /// Insert a booking stamped with `now`.
    async fn insert(
        &self,
        details: &BookingDetails,
        now: DateTime<Utc>,
    ) -> Result<Booking, BookingRepositoryError>;

    /// Overwrite a booking's details, returning the affected row count.
    async fn update(
        &self,
        id: i64,
        details: &BookingDetails,
        now: DateTime<Utc>,
    ) -> Result<u64, BookingRepositoryError>;

    /// Delete a booking and its attachment rows together.
    async fn delete(&self, id: i64) -> Result<DeletedBooking, BookingRepositoryError>;

    /// Record an attachment.
    async fn insert_file(&self, file: &NewBookingFile)
    -> Result<BookingFile, BookingRepositoryError>;
}
