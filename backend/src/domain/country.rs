//! Country reference data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Error;
use super::listing::SortableColumn;
use super::validation::field_str;

/// Stored country row, also the shape returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    /// Generated identifier.
    pub id: i64,
    /// Unique country code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Insert timestamp.
    pub created_at: Option<DateTime<Utc>>,
    /// Last update timestamp.
    pub updated_at: Option<DateTime<Utc>>,
}

/// Fields supplied by clients on create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryDetails {
    /// Unique country code.
    pub code: String,
    /// Display name.
    pub name: String,
}

impl CountryDetails {
    /// Extract details from a body that already passed the country rules.
    ///
    /// # Errors
    ///
    /// Returns a validation [`Error`] if a field is missing or mistyped.
    pub fn from_validated(body: &Value) -> Result<Self, Error> {
        Ok(Self {
            code: field_str(body, "code")?.to_owned(),
            name: field_str(body, "name")?.to_owned(),
        })
    }
}

/// Columns countries may be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CountryColumn {
    /// `id`
    Id,
    /// `code`
    Code,
    /// `name`
    Name,
    /// `created_at`
    CreatedAt,
    /// `updated_at`
    UpdatedAt,
}

impl SortableColumn for CountryColumn {
    fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "id" => Self::Id,
            "code" => Self::Code,
            "name" => Self::Name,
            "created_at" => Self::CreatedAt,
            "updated_at" => Self::UpdatedAt,
            _ => return None,
        })
    }

    fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Code => "code",
            Self::Name => "name",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}
