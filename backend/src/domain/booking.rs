//! Booking aggregate, its attachments, and the client-facing view.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Error;
use super::listing::SortableColumn;
use super::validation::{field_i64, field_str};

/// Format used for `visit_date` in request bodies.
pub const VISIT_DATE_INPUT_FORMAT: &str = "%d/%m/%Y";

/// Stored booking row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    /// Generated identifier.
    pub id: i64,
    /// Client-editable fields.
    pub details: BookingDetails,
    /// Insert timestamp.
    pub created_at: Option<DateTime<Utc>>,
    /// Last update timestamp.
    pub updated_at: Option<DateTime<Utc>>,
}

/// Fields supplied by clients on create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingDetails {
    /// Customer's full name.
    pub customer_name: String,
    /// Code of an existing country.
    pub country_code: String,
    /// Contact email; unique per visit date.
    pub customer_email: String,
    /// Contact phone number.
    pub customer_phone: String,
    /// Self-assessed experience level, 0 to 127.
    pub surfing_experience: i16,
    /// Day of the visit.
    pub visit_date: NaiveDate,
    /// Requested board.
    pub desired_board: String,
}

impl BookingDetails {
    /// Extract details from a body that already passed the booking rules.
    ///
    /// # Errors
    ///
    /// Returns a validation [`Error`] if a field is missing or mistyped.
    pub fn from_validated(body: &Value) -> Result<Self, Error> {
        let surfing_experience = i16::try_from(field_i64(body, "surfing_experience")?)
            .map_err(|_| Error::validation("The surfing experience must not be greater than 127."))?;
        let visit_date =
            NaiveDate::parse_from_str(field_str(body, "visit_date")?, VISIT_DATE_INPUT_FORMAT)
                .map_err(|_| {
                    Error::validation("The visit date does not match the format d/m/Y.")
                })?;
        Ok(Self {
            customer_name: field_str(body, "customer_name")?.to_owned(),
            country_code: field_str(body, "country_code")?.to_owned(),
            customer_email: field_str(body, "customer_email")?.to_owned(),
            customer_phone: field_str(body, "customer_phone")?.to_owned(),
            surfing_experience,
            visit_date,
            desired_board: field_str(body, "desired_board")?.to_owned(),
        })
    }
}

/// Stored attachment row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingFile {
    /// Generated identifier.
    pub id: i64,
    /// Owning booking.
    pub booking_id: i64,
    /// Name the client uploaded the file under.
    pub file_name: String,
    /// Extension of the original name, without the dot.
    pub file_type: String,
    /// Public URL of the stored bytes.
    pub file_url: String,
}

impl BookingFile {
    /// Name of the stored file, taken from the last URL segment.
    #[must_use]
    pub fn stored_name(&self) -> Option<&str> {
        self.file_url
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty())
    }
}

/// Attachment row to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBookingFile {
    /// Owning booking.
    pub booking_id: i64,
    /// Name the client uploaded the file under.
    pub file_name: String,
    /// Extension of the original name, without the dot.
    pub file_type: String,
    /// Public URL of the stored bytes.
    pub file_url: String,
}

/// Outcome of deleting a booking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletedBooking {
    /// Booking rows removed; zero when the id did not exist.
    pub rows: u64,
    /// Attachment rows removed alongside the booking.
    pub files: Vec<BookingFile>,
}

/// Attachment as shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileLink {
    /// Original file name.
    pub file_name: String,
    /// Public URL.
    pub src: String,
}

impl From<&BookingFile> for FileLink {
    fn from(file: &BookingFile) -> Self {
        Self {
            file_name: file.file_name.clone(),
            src: file.file_url.clone(),
        }
    }
}

/// Booking as returned by the API, attachments included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingView {
    /// Identifier.
    pub id: i64,
    /// Customer's full name.
    pub customer_name: String,
    /// Country code.
    pub country_code: String,
    /// Contact email.
    pub customer_email: String,
    /// Contact phone number.
    pub customer_phone: String,
    /// Experience level.
    pub surfing_experience: i16,
    /// Visit date, `YYYY-MM-DD`.
    pub visit_date: NaiveDate,
    /// Requested board.
    pub desired_board: String,
    /// Insert timestamp.
    pub created_at: Option<DateTime<Utc>>,
    /// Attachments in upload order.
    pub files: Vec<FileLink>,
}

impl BookingView {
    /// Combine a booking with its attachments.
    #[must_use]
    pub fn new(booking: Booking, files: Vec<FileLink>) -> Self {
        let Booking {
            id,
            details,
            created_at,
            ..
        } = booking;
        Self {
            id,
            customer_name: details.customer_name,
            country_code: details.country_code,
            customer_email: details.customer_email,
            customer_phone: details.customer_phone,
            surfing_experience: details.surfing_experience,
            visit_date: details.visit_date,
            desired_board: details.desired_board,
            created_at,
            files,
        }
    }
}

/// Columns bookings may be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookingColumn {
    /// `id`
    Id,
    /// `customer_name`
    CustomerName,
    /// `country_code`
    CountryCode,
    /// `customer_email`
    CustomerEmail,
    /// `customer_phone`
    CustomerPhone,
    /// `surfing_experience`
    SurfingExperience,
    /// `visit_date`
    VisitDate,
    /// `desired_board`
    DesiredBoard,
    /// `created_at`
    CreatedAt,
}

impl SortableColumn for BookingColumn {
    fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "id" => Self::Id,
            "customer_name" => Self::CustomerName,
            "country_code" => Self::CountryCode,
            "customer_email" => Self::CustomerEmail,
            "customer_phone" => Self::CustomerPhone,
            "surfing_experience" => Self::SurfingExperience,
            "visit_date" => Self::VisitDate,
            "desired_board" => Self::DesiredBoard,
            "created_at" => Self::CreatedAt,
            _ => return None,
        })
    }

    fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::CustomerName => "customer_name",
            Self::CountryCode => "country_code",
            Self::CustomerEmail => "customer_email",
            Self::CustomerPhone => "customer_phone",
            Self::SurfingExperience => "surfing_experience",
            Self::VisitDate => "visit_date",
            Self::DesiredBoard => "desired_board",
            Self::CreatedAt => "created_at",
        }
    }
}
