//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only depend
//! on the domain services and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::AttachmentStorage;
use crate::domain::{BookingService, CountryService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Booking use-cases.
    pub bookings: Arc<BookingService>,
    /// Country use-cases.
    pub countries: Arc<CountryService>,
    /// Read access to stored uploads.
    pub attachments: Arc<dyn AttachmentStorage>,
}

impl HttpState {
    /// Bundle the services.
    pub fn new(
        bookings: Arc<BookingService>,
        countries: Arc<CountryService>,
        attachments: Arc<dyn AttachmentStorage>,
    ) -> Self {
        Self {
            bookings,
            countries,
            attachments,
        }
    }
}
