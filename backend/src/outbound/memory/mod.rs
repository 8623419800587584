//! Process-local repositories used when no database is configured.
//!
//! [`InMemoryStore`] holds bookings, attachments, and countries behind one
//! mutex and hands out port implementations that share it, so `exists` rules
//! see countries created through the country repository. The store enforces
//! the same unique constraints as the PostgreSQL schema: one booking per
//! `(customer_email, visit_date)` and one country per `code`.

mod listing;

use std::cmp::Ordering;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use pagination::Page;

use crate::domain::ports::{
    BookingRepository, BookingRepositoryError, ColumnRef, CountryRepository,
    CountryRepositoryError, ReferenceLookup, ReferenceLookupError,
};
use crate::domain::{
    Booking, BookingColumn, BookingDetails, BookingFile, Country, CountryColumn, CountryDetails,
    DeletedBooking, ListQuery, NewBookingFile,
};

use listing::{Listable, contains, nulls_last, page_of};

#[derive(Default)]
struct Tables {
    bookings: Vec<Booking>,
    files: Vec<BookingFile>,
    countries: Vec<Country>,
    last_booking_id: i64,
    last_file_id: i64,
    last_country_id: i64,
}

impl Tables {
    fn visit_taken(&self, email: &str, visit_date: NaiveDate, except_id: Option<i64>) -> bool {
        self.bookings.iter().any(|booking| {
            Some(booking.id) != except_id
                && booking.details.customer_email == email
                && booking.details.visit_date == visit_date
        })
    }

    fn code_taken(&self, code: &str, except_id: Option<i64>) -> bool {
        self.countries
            .iter()
            .any(|country| Some(country.id) != except_id && country.code == code)
    }
}

/// Shared in-memory tables.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Booking repository backed by this store.
    pub fn bookings(&self) -> InMemoryBookingRepository {
        InMemoryBookingRepository {
            store: self.clone(),
        }
    }

    /// Country repository backed by this store.
    pub fn countries(&self) -> InMemoryCountryRepository {
        InMemoryCountryRepository {
            store: self.clone(),
        }
    }

    /// Reference lookup backed by this store.
    pub fn lookup(&self) -> InMemoryReferenceLookup {
        InMemoryReferenceLookup {
            store: self.clone(),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, &'static str> {
        self.tables
            .lock()
            .map_err(|_| "in-memory store lock poisoned")
    }
}

impl Listable for Booking {
    type Column = BookingColumn;

    fn id(&self) -> i64 {
        self.id
    }

    fn matches(&self, needle: &str) -> bool {
        contains(&self.details.customer_name, needle)
            || contains(&self.details.customer_email, needle)
            || contains(&self.details.customer_phone, needle)
    }

    fn compare(&self, other: &Self, column: BookingColumn) -> Ordering {
        let (left, right) = (&self.details, &other.details);
        match column {
            BookingColumn::Id => self.id.cmp(&other.id),
            BookingColumn::CustomerName => left.customer_name.cmp(&right.customer_name),
            BookingColumn::CountryCode => left.country_code.cmp(&right.country_code),
            BookingColumn::CustomerEmail => left.customer_email.cmp(&right.customer_email),
            BookingColumn::CustomerPhone => left.customer_phone.cmp(&right.customer_phone),
            BookingColumn::SurfingExperience => {
                left.surfing_experience.cmp(&right.surfing_experience)
            }
            BookingColumn::VisitDate => left.visit_date.cmp(&right.visit_date),
            BookingColumn::DesiredBoard => left.desired_board.cmp(&right.desired_board),
            BookingColumn::CreatedAt => {
                nulls_last(self.created_at.as_ref(), other.created_at.as_ref())
            }
        }
    }
}

impl Listable for Country {
    type Column = CountryColumn;

    fn id(&self) -> i64 {
        self.id
    }

    fn matches(&self, needle: &str) -> bool {
        contains(&self.name, needle) || contains(&self.code, needle)
    }

    fn compare(&self, other: &Self, column: CountryColumn) -> Ordering {
        match column {
            CountryColumn::Id => self.id.cmp(&other.id),
            CountryColumn::Code => self.code.cmp(&other.code),
            CountryColumn::Name => self.name.cmp(&other.name),
            CountryColumn::CreatedAt => {
                nulls_last(self.created_at.as_ref(), other.created_at.as_ref())
            }
            CountryColumn::UpdatedAt => {
                nulls_last(self.updated_at.as_ref(), other.updated_at.as_ref())
            }
        }
    }
}

/// `BookingRepository` over an [`InMemoryStore`].
#[derive(Clone)]
pub struct InMemoryBookingRepository {
    store: InMemoryStore,
}

impl InMemoryBookingRepository {
    fn tables(&self) -> Result<MutexGuard<'_, Tables>, BookingRepositoryError> {
        self.store.lock().map_err(BookingRepositoryError::connection)
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn list(
        &self,
        query: &ListQuery<BookingColumn>,
    ) -> Result<Page<Booking>, BookingRepositoryError> {
        Ok(page_of(&self.tables()?.bookings, query))
    }

    async fn files_for(
        &self,
        booking_ids: &[i64],
    ) -> Result<Vec<BookingFile>, BookingRepositoryError> {
        Ok(self
            .tables()?
            .files
            .iter()
            .filter(|file| booking_ids.contains(&file.booking_id))
            .cloned()
            .collect())
    }

    async fn find(&self, id: i64) -> Result<Option<Booking>, BookingRepositoryError> {
        Ok(self
            .tables()?
            .bookings
            .iter()
            .find(|booking| booking.id == id)
            .cloned())
    }

    async fn visit_taken(
        &self,
        email: &str,
        visit_date: NaiveDate,
        except_id: Option<i64>,
    ) -> Result<bool, BookingRepositoryError> {
        Ok(self.tables()?.visit_taken(email, visit_date, except_id))
    }

    async fn insert(
        &self,
        details: &BookingDetails,
        now: DateTime<Utc>,
    ) -> Result<Booking, BookingRepositoryError> {
        let mut tables = self.tables()?;
        if tables.visit_taken(&details.customer_email, details.visit_date, None) {
            return Err(BookingRepositoryError::duplicate_visit());
        }
        tables.last_booking_id += 1;
        let booking = Booking {
            id: tables.last_booking_id,
            details: details.clone(),
            created_at: Some(now),
            updated_at: Some(now),
        };
        tables.bookings.push(booking.clone());
        Ok(booking)
    }

    async fn update(
        &self,
        id: i64,
        details: &BookingDetails,
        now: DateTime<Utc>,
    ) -> Result<u64, BookingRepositoryError> {
        let mut tables = self.tables()?;
        if tables.visit_taken(&details.customer_email, details.visit_date, Some(id)) {
            return Err(BookingRepositoryError::duplicate_visit());
        }
        let Some(booking) = tables.bookings.iter_mut().find(|booking| booking.id == id) else {
            return Ok(0);
        };
        booking.details = details.clone();
        booking.updated_at = Some(now);
        Ok(1)
    }

    async fn delete(&self, id: i64) -> Result<DeletedBooking, BookingRepositoryError> {
        let mut tables = self.tables()?;
        let before = tables.bookings.len();
        tables.bookings.retain(|booking| booking.id != id);
        let rows = u64::from(tables.bookings.len() < before);
        let (files, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut tables.files)
            .into_iter()
            .partition(|file| file.booking_id == id);
        tables.files = kept;
        Ok(DeletedBooking { rows, files })
    }

    async fn insert_file(
        &self,
        file: &NewBookingFile,
    ) -> Result<BookingFile, BookingRepositoryError> {
        let mut tables = self.tables()?;
        if !tables.bookings.iter().any(|booking| booking.id == file.booking_id) {
            return Err(BookingRepositoryError::query(format!(
                "booking {} does not exist",
                file.booking_id
            )));
        }
        tables.last_file_id += 1;
        let stored = BookingFile {
            id: tables.last_file_id,
            booking_id: file.booking_id,
            file_name: file.file_name.clone(),
            file_type: file.file_type.clone(),
            file_url: file.file_url.clone(),
        };
        tables.files.push(stored.clone());
        Ok(stored)
    }
}

/// `CountryRepository` over an [`InMemoryStore`].
#[derive(Clone)]
pub struct InMemoryCountryRepository {
    store: InMemoryStore,
}

impl InMemoryCountryRepository {
    fn tables(&self) -> Result<MutexGuard<'_, Tables>, CountryRepositoryError> {
        self.store.lock().map_err(CountryRepositoryError::connection)
    }
}

#[async_trait]
impl CountryRepository for InMemoryCountryRepository {
    async fn list(
        &self,
        query: &ListQuery<CountryColumn>,
    ) -> Result<Page<Country>, CountryRepositoryError> {
        Ok(page_of(&self.tables()?.countries, query))
    }

    async fn find(&self, id: i64) -> Result<Option<Country>, CountryRepositoryError> {
        Ok(self
            .tables()?
            .countries
            .iter()
            .find(|country| country.id == id)
            .cloned())
    }

    async fn insert(
        &self,
        details: &CountryDetails,
        now: DateTime<Utc>,
    ) -> Result<Country, CountryRepositoryError> {
        let mut tables = self.tables()?;
        if tables.code_taken(&details.code, None) {
            return Err(CountryRepositoryError::duplicate_code(details.code.as_str()));
        }
        tables.last_country_id += 1;
        let country = Country {
            id: tables.last_country_id,
            code: details.code.clone(),
            name: details.name.clone(),
            created_at: Some(now),
            updated_at: Some(now),
        };
        tables.countries.push(country.clone());
        Ok(country)
    }

    async fn update(
        &self,
        id: i64,
        details: &CountryDetails,
        now: DateTime<Utc>,
    ) -> Result<u64, CountryRepositoryError> {
        let mut tables = self.tables()?;
        if tables.code_taken(&details.code, Some(id)) {
            return Err(CountryRepositoryError::duplicate_code(details.code.as_str()));
        }
        let Some(country) = tables.countries.iter_mut().find(|country| country.id == id) else {
            return Ok(0);
        };
        country.code = details.code.clone();
        country.name = details.name.clone();
        country.updated_at = Some(now);
        Ok(1)
    }

    async fn delete(&self, id: i64) -> Result<u64, CountryRepositoryError> {
        let mut tables = self.tables()?;
        let before = tables.countries.len();
        tables.countries.retain(|country| country.id != id);
        Ok(u64::from(tables.countries.len() < before))
    }
}

/// `ReferenceLookup` over an [`InMemoryStore`].
#[derive(Clone)]
pub struct InMemoryReferenceLookup {
    store: InMemoryStore,
}

#[async_trait]
impl ReferenceLookup for InMemoryReferenceLookup {
    async fn value_exists(
        &self,
        column: ColumnRef,
        value: &str,
        except_id: Option<i64>,
    ) -> Result<bool, ReferenceLookupError> {
        if column != ColumnRef::COUNTRY_CODE {
            return Err(ReferenceLookupError::query(format!(
                "unsupported lookup column {column}"
            )));
        }
        let tables = self
            .store
            .lock()
            .map_err(ReferenceLookupError::connection)?;
        Ok(tables.code_taken(value, except_id))
    }
}
