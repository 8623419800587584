//! Shared classification of Diesel failures.
//!
//! Repositories only need to tell a dropped connection, a unique constraint
//! violation, and everything else apart. Each one maps [`DieselFailure`] onto
//! its own port error.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

/// What went wrong, in the terms repositories care about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DieselFailure {
    /// The connection was lost.
    Connection(&'static str),
    /// A unique index rejected the write.
    UniqueViolation {
        /// Name of the violated constraint, when the server reports one.
        constraint: Option<String>,
    },
    /// Any other query failure.
    Query(&'static str),
}

/// Classify a Diesel error, logging the driver detail at debug level.
pub(crate) fn classify(error: DieselError) -> DieselFailure {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => DieselFailure::Query("record not found"),
        DieselError::QueryBuilderError(_) => DieselFailure::Query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            DieselFailure::UniqueViolation {
                constraint: info.constraint_name().map(str::to_owned),
            }
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            DieselFailure::Connection("database connection error")
        }
        _ => DieselFailure::Query("database error"),
    }
}

/// Convert a row count reported by Diesel.
pub(crate) fn affected(rows: usize) -> u64 {
    u64::try_from(rows).unwrap_or(u64::MAX)
}

/// Convert a page window bound for `LIMIT`/`OFFSET`.
pub(crate) fn sql_bound(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn not_found_is_a_query_failure() {
        assert_eq!(
            classify(DieselError::NotFound),
            DieselFailure::Query("record not found")
        );
    }

    #[rstest]
    fn unique_violation_is_recognised() {
        let error = DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key value violates unique constraint".to_owned()),
        );
        assert_eq!(
            classify(error),
            DieselFailure::UniqueViolation { constraint: None }
        );
    }

    #[rstest]
    fn closed_connection_is_a_connection_failure() {
        let error = DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection,
            Box::new("server closed the connection".to_owned()),
        );
        assert!(matches!(classify(error), DieselFailure::Connection(_)));
    }

    #[rstest]
    fn bounds_saturate() {
        assert_eq!(sql_bound(u64::MAX), i64::MAX);
        assert_eq!(sql_bound(20), 20);
    }
}
