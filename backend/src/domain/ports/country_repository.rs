//! Port for country persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::Page;

use crate::domain::{Country, CountryColumn, CountryDetails, ListQuery};

use super::define_port_error;

define_port_error! {
    /// Errors raised by country repository adapters.
    pub enum CountryRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "country repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "country repository query failed: {message}",
        /// The code is already used by another country.
        DuplicateCode { code: String } => "country code {code} already exists",
    }
}

/// Country storage. Search covers `name` and `code`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CountryRepository: Send + Sync {
    /// Return one page of countries.
    async fn list(
        &self,
        query: &ListQuery<CountryColumn>,
    ) -> Result<Page<Country>, CountryRepositoryError>;

    /// Fetch a country by id.
    async fn find(&self, id: i64) -> Result<Option<Country>, CountryRepositoryError>;

    /// Insert a country stamped with `now`.
    async fn insert(
        &self,
        details: &CountryDetails,
        now: DateTime<Utc>,
    ) -> Result<Country, CountryRepositoryError>;

    /// Overwrite a country, returning the affected row count.
    async fn update(
        &self,
        id: i64,
        details: &CountryDetails,
        now: DateTime<Utc>,
    ) -> Result<u64, CountryRepositoryError>;

    /// Delete a country, returning the affected row count.
    async fn delete(&self, id: i64) -> Result<u64, CountryRepositoryError>;
}
