//! Internal Diesel row structs for database operations.
//!
//! These types never leave the persistence layer; repositories convert them
//! to domain types.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;

use crate::domain::{Booking, BookingDetails, BookingFile, Country, NewBookingFile};

use super::schema::{bookings, countries, files};

// ---------------------------------------------------------------------------
// Countries
// ---------------------------------------------------------------------------

/// Row struct for reading from the countries table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = countries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CountryRow {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<CountryRow> for Country {
    fn from(row: CountryRow) -> Self {
        Self {
            id: row.id,
            code: row.code,
            name: row.name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Insertable struct for creating country records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = countries)]
pub(crate) struct NewCountryRow<'a> {
    pub code: &'a str,
    pub name: &'a str,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Changeset struct for updating country records.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = countries)]
pub(crate) struct CountryChanges<'a> {
    pub code: &'a str,
    pub name: &'a str,
    pub updated_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Bookings
// ---------------------------------------------------------------------------

/// Row struct for reading from the bookings table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = bookings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BookingRow {
    pub id: i64,
    pub customer_name: String,
    pub country_code: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub surfing_experience: i16,
    pub visit_date: NaiveDate,
    pub desired_board: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        Self {
            id: row.id,
            details: BookingDetails {
                customer_name: row.customer_name,
                country_code: row.country_code,
                customer_email: row.customer_email,
                customer_phone: row.customer_phone,
                surfing_experience: row.surfing_experience,
                visit_date: row.visit_date,
                desired_board: row.desired_board,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Column values shared by booking inserts and updates.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = bookings)]
pub(crate) struct BookingValues<'a> {
    pub customer_name: &'a str,
    pub country_code: &'a str,
    pub customer_email: &'a str,
    pub customer_phone: &'a str,
    pub surfing_experience: i16,
    pub visit_date: NaiveDate,
    pub desired_board: &'a str,
    pub updated_at: Option<DateTime<Utc>>,
}

impl<'a> BookingValues<'a> {
    pub(crate) fn new(details: &'a BookingDetails, now: DateTime<Utc>) -> Self {
        Self {
            customer_name: &details.customer_name,
            country_code: &details.country_code,
            customer_email: &details.customer_email,
            customer_phone: &details.customer_phone,
            surfing_experience: details.surfing_experience,
            visit_date: details.visit_date,
            desired_board: &details.desired_board,
            updated_at: Some(now),
        }
    }
}

/// Insertable struct for creating booking records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = bookings)]
pub(crate) struct NewBookingRow<'a> {
    #[diesel(embed)]
    pub values: BookingValues<'a>,
    pub created_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

/// Row struct for reading from the files table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = files)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct FileRow {
    pub id: i64,
    pub file_name: String,
    pub file_url: String,
    pub file_type: String,
    pub booking_id: i64,
}

impl From<FileRow> for BookingFile {
    fn from(row: FileRow) -> Self {
        Self {
            id: row.id,
            booking_id: row.booking_id,
            file_name: row.file_name,
            file_type: row.file_type,
            file_url: row.file_url,
        }
    }
}

/// Insertable struct for creating attachment records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = files)]
pub(crate) struct NewFileRow<'a> {
    pub file_name: &'a str,
    pub file_url: &'a str,
    pub file_type: &'a str,
    pub booking_id: i64,
}

impl<'a> From<&'a NewBookingFile> for NewFileRow<'a> {
    fn from(file: &'a NewBookingFile) -> Self {
        Self {
            file_name: &file.file_name,
            file_url: &file.file_url,
            file_type: &file.file_type,
            booking_id: file.booking_id,
        }
    }
}
