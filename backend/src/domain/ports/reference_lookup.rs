//! Port answering `exists` and `unique` validation rules.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised while checking a stored value.
    pub enum ReferenceLookupError {
        /// Lookup backend could not be reached.
        Connection { message: String } => "reference lookup connection failed: {message}",
        /// Query failed, or the column is not one the adapter can check.
        Query { message: String } => "reference lookup query failed: {message}",
    }
}

/// A `table.column` pair named by a validation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    /// Table name.
    pub table: &'static str,
    /// Column name.
    pub column: &'static str,
}

impl ColumnRef {
    /// `countries.code`
    pub const COUNTRY_CODE: Self = Self {
        table: "countries",
        column: "code",
    };
}

impl std::fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

/// Checks whether a value is already stored in a column.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReferenceLookup: Send + Sync {
    /// Whether any row other than `except_id` holds `value` in `column`.
    async fn value_exists(
        &self,
        column: ColumnRef,
        value: &str,
        except_id: Option<i64>,
    ) -> Result<bool, ReferenceLookupError>;
}
