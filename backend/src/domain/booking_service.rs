//! Booking use-cases: cached listing, create with attachments, update, and
//! delete.

use std::collections::HashMap;
use std::sync::Arc;

use mockable::Clock;
use pagination::Page;
use serde_json::Value;
use tracing::{error, info, warn};

use super::attachments::{AttachmentUrls, DecodedUpload};
use super::cache_aside::CacheAside;
use super::cache_key::BOOKINGS_CACHE_PREFIX;
use super::ports::{
    AttachmentStorage, BookingRepository, BookingRepositoryError, ColumnRef, ReferenceLookup,
};
use super::validation::{Rule, RuleSet, Validator, field_i64};
use super::{
    Booking, BookingColumn, BookingDetails, BookingFile, BookingView, Error, FileLink, ListParams,
    ListQuery, NewBookingFile,
};

const VISIT_DATE_DISPLAY_FORMAT: &str = "%d/%m/%Y";

/// Ports the booking service drives.
#[derive(Clone)]
pub struct BookingPorts {
    /// Booking and attachment rows.
    pub bookings: Arc<dyn BookingRepository>,
    /// Resolves `exists`/`unique` rules.
    pub lookup: Arc<dyn ReferenceLookup>,
    /// Attachment bytes.
    pub storage: Arc<dyn AttachmentStorage>,
}

/// Booking service.
#[derive(Clone)]
pub struct BookingService {
    ports: BookingPorts,
    cache: CacheAside,
    urls: AttachmentUrls,
    clock: Arc<dyn Clock>,
}

fn text_rules() -> [Rule; 3] {
    [Rule::Required, Rule::String, Rule::Max(255)]
}

fn detail_rules(rules: RuleSet) -> RuleSet {
    rules
        .field("customer_name", text_rules())
        .field(
            "country_code",
            [
                Rule::Required,
                Rule::String,
                Rule::Max(255),
                Rule::Exists(ColumnRef::COUNTRY_CODE),
            ],
        )
        .field(
            "customer_email",
            [Rule::Required, Rule::Email, Rule::Max(255)],
        )
        .field("customer_phone", text_rules())
        .field(
            "surfing_experience",
            [
                Rule::Required,
                Rule::Numeric,
                Rule::Integer,
                Rule::Min(0),
                Rule::Max(127),
            ],
        )
        .field("visit_date", [Rule::Required, Rule::DateDmy])
        .field("desired_board", text_rules())
}

fn id_rules() -> [Rule; 3] {
    [Rule::Required, Rule::Integer, Rule::Min(1)]
}

/// Rules for `POST /booking/store`.
#[must_use]
pub fn store_rules() -> RuleSet {
    detail_rules(RuleSet::new())
        .field("file_uploads", [Rule::Array])
        .field(
            "file_uploads.*.base64",
            [Rule::Required, Rule::String, Rule::Base64],
        )
        .field("file_uploads.*.name", text_rules())
        .field("file_uploads.*.size", [Rule::Required, Rule::Numeric])
}

/// Rules for `PUT /booking/update`.
#[must_use]
pub fn update_rules() -> RuleSet {
    detail_rules(RuleSet::new().field("id", id_rules()))
}

/// Rules for `DELETE /booking/delete`.
#[must_use]
pub fn delete_rules() -> RuleSet {
    RuleSet::new().field("id", id_rules())
}

fn duplicate_visit(details: &BookingDetails) -> Error {
    Error::duplicate(format!(
        "{} already book on {}. please choose another visit date.",
        details.customer_email,
        details.visit_date.format(VISIT_DATE_DISPLAY_FORMAT)
    ))
}

fn repository_failure(err: &BookingRepositoryError, message: &'static str) -> Error {
    error!(error = %err, "booking repository failed");
    Error::persistence(message)
}

impl BookingService {
    /// Build the service.
    pub fn new(
        ports: BookingPorts,
        cache: CacheAside,
        urls: AttachmentUrls,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            ports,
            cache,
            urls,
            clock,
        }
    }

    /// One page of bookings with their attachments, served from the cache
    /// when possible.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a rejected sort, or a persistence error
    /// when the repository fails on a miss.
    pub async fn list(&self, params: &ListParams) -> Result<Page<BookingView>, Error> {
        let query = ListQuery::<BookingColumn>::from_params(params)?;
        let key = query.cache_key(BOOKINGS_CACHE_PREFIX);
        self.cache
            .fetch(key.as_str(), || self.load_page(&query))
            .await
    }

    async fn load_page(&self, query: &ListQuery<BookingColumn>) -> Result<Page<BookingView>, Error> {
        const FAILED: &str = "Failed to retrieve bookings.";
        let page = self
            .ports
            .bookings
            .list(query)
            .await
            .map_err(|err| repository_failure(&err, FAILED))?;
        let ids: Vec<i64> = page.items.iter().map(|booking| booking.id).collect();
        let files = if ids.is_empty() {
            Vec::new()
        } else {
            self.ports
                .bookings
                .files_for(&ids)
                .await
                .map_err(|err| repository_failure(&err, FAILED))?
        };
        let mut by_booking: HashMap<i64, Vec<FileLink>> = HashMap::new();
        for file in &files {
            by_booking
                .entry(file.booking_id)
                .or_default()
                .push(FileLink::from(file));
        }
        Ok(page.map(|booking| {
            let links = by_booking.remove(&booking.id).unwrap_or_default();
            BookingView::new(booking, links)
        }))
    }

    /// Create a booking and store its attachments.
    ///
    /// Attachments are written after the booking row. If any attachment
    /// fails, written files and the booking are removed again.
    ///
    /// # Errors
    ///
    /// Validation and duplicate errors for bad input; a persistence error
    /// when the insert or an attachment fails.
    pub async fn store(&self, body: &Value) -> Result<BookingView, Error> {
        Validator::new(self.ports.lookup.as_ref())
            .validate(&store_rules(), body)
            .await?;
        let details = BookingDetails::from_validated(body)?;
        let uploads = DecodedUpload::all_from(body)?;
        self.ensure_visit_free(&details, None).await?;

        let booking = self
            .ports
            .bookings
            .insert(&details, self.clock.utc())
            .await
            .map_err(|err| match err {
                BookingRepositoryError::DuplicateVisit => duplicate_visit(&details),
                other => repository_failure(&other, "Failed to insert booking."),
            })?;
        let files = self.attach(&booking, uploads).await?;

        self.cache.invalidate(BOOKINGS_CACHE_PREFIX).await;
        info!(booking_id = booking.id, files = files.len(), "booking created");
        let links = files.iter().map(FileLink::from).collect();
        Ok(BookingView::new(booking, links))
    }

    async fn attach(
        &self,
        booking: &Booking,
        uploads: Vec<DecodedUpload>,
    ) -> Result<Vec<BookingFile>, Error> {
        let mut written: Vec<String> = Vec::with_capacity(uploads.len());
        let mut files = Vec::with_capacity(uploads.len());
        for upload in uploads {
            let DecodedUpload {
                original_name,
                extension,
                stored_name,
                bytes,
            } = upload;
            if let Err(err) = self.ports.storage.store(&stored_name, bytes).await {
                error!(error = %err, booking_id = booking.id, "attachment write failed");
                self.compensate(booking.id, &written).await;
                return Err(Error::persistence(format!(
                    "Failed to store file {original_name}."
                )));
            }
            written.push(stored_name.clone());
            let row = NewBookingFile {
                booking_id: booking.id,
                file_name: original_name.clone(),
                file_type: extension,
                file_url: self.urls.url_for(&stored_name),
            };
            match self.ports.bookings.insert_file(&row).await {
                Ok(file) => files.push(file),
                Err(err) => {
                    error!(error = %err, booking_id = booking.id, "attachment row insert failed");
                    self.compensate(booking.id, &written).await;
                    return Err(Error::persistence(format!(
                        "Failed to store file {original_name}."
                    )));
                }
            }
        }
        Ok(files)
    }

    async fn compensate(&self, booking_id: i64, written: &[String]) {
        for name in written {
            if let Err(err) = self.ports.storage.remove(name).await {
                warn!(error = %err, file = %name, "attachment cleanup failed");
            }
        }
        if let Err(err) = self.ports.bookings.delete(booking_id).await {
            warn!(error = %err, booking_id, "booking rollback failed");
        }
    }

    async fn ensure_visit_free(
        &self,
        details: &BookingDetails,
        except_id: Option<i64>,
    ) -> Result<(), Error> {
        let taken = self
            .ports
            .bookings
            .visit_taken(&details.customer_email, details.visit_date, except_id)
            .await
            .map_err(|err| repository_failure(&err, "Failed to check existing bookings."))?;
        if taken {
            return Err(duplicate_visit(details));
        }
        Ok(())
    }

    /// Overwrite a booking, returning the affected row count.
    ///
    /// # Errors
    ///
    /// Validation and duplicate errors for bad input, not found for an
    /// unknown id, a persistence error when the update fails.
    pub async fn update(&self, body: &Value) -> Result<u64, Error> {
        const FAILED: &str = "Failed to update booking.";
        Validator::new(self.ports.lookup.as_ref())
            .validate(&update_rules(), body)
            .await?;
        let id = field_i64(body, "id")?;
        let details = BookingDetails::from_validated(body)?;
        let existing = self
            .ports
            .bookings
            .find(id)
            .await
            .map_err(|err| repository_failure(&err, FAILED))?;
        if existing.is_none() {
            return Err(Error::not_found("Booking not found."));
        }
        self.ensure_visit_free(&details, Some(id)).await?;

        let rows = self
            .ports
            .bookings
            .update(id, &details, self.clock.utc())
            .await
            .map_err(|err| match err {
                BookingRepositoryError::DuplicateVisit => duplicate_visit(&details),
                other => repository_failure(&other, FAILED),
            })?;
        self.cache.invalidate(BOOKINGS_CACHE_PREFIX).await;
        info!(booking_id = id, rows, "booking updated");
        Ok(rows)
    }

    /// Delete a booking with its attachments, returning the deleted row
    /// count.
    ///
    /// # Errors
    ///
    /// A validation error for a bad id, not found for an unknown id, a
    /// persistence error when the delete fails.
    pub async fn delete(&self, body: &Value) -> Result<u64, Error> {
        Validator::new(self.ports.lookup.as_ref())
            .validate(&delete_rules(), body)
            .await?;
        let id = field_i64(body, "id")?;
        let deleted = self
            .ports
            .bookings
            .delete(id)
            .await
            .map_err(|err| repository_failure(&err, "Failed to delete booking."))?;
        if deleted.rows == 0 {
            return Err(Error::not_found("Booking not found."));
        }
        for name in deleted.files.iter().filter_map(BookingFile::stored_name) {
            if let Err(err) = self.ports.storage.remove(name).await {
                warn!(error = %err, file = %name, "attachment removal failed");
            }
        }
        self.cache.invalidate(BOOKINGS_CACHE_PREFIX).await;
        info!(booking_id = id, files = deleted.files.len(), "booking deleted");
        Ok(deleted.rows)
    }
}

#[cfg(test)]
mod tests;
