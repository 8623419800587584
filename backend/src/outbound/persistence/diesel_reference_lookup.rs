//! PostgreSQL-backed `ReferenceLookup` for `exists`/`unique` rules.
//!
//! Only columns named by a [`ColumnRef`] constant are supported; each maps to
//! a typed Diesel query rather than interpolated SQL.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ColumnRef, ReferenceLookup, ReferenceLookupError};

use super::diesel_error_mapping::{DieselFailure, classify};
use super::pool::DbPool;
use super::schema::countries;

/// Diesel-backed implementation of the `ReferenceLookup` port.
#[derive(Clone)]
pub struct DieselReferenceLookup {
    pool: DbPool,
}

impl DieselReferenceLookup {
    /// Create a lookup with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> ReferenceLookupError {
    match classify(error) {
        DieselFailure::Connection(message) => ReferenceLookupError::connection(message),
        DieselFailure::UniqueViolation { .. } => ReferenceLookupError::query("database error"),
        DieselFailure::Query(message) => ReferenceLookupError::query(message),
    }
}

#[async_trait]
impl ReferenceLookup for DieselReferenceLookup {
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
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| ReferenceLookupError::connection(err.into_message()))?;
        let mut query = countries::table
            .filter(countries::code.eq(value.to_owned()))
            .count()
            .into_boxed();
        if let Some(id) = except_id {
            query = query.filter(countries::id.ne(id));
        }
        let matches: i64 = query
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(matches > 0)
    }
}
