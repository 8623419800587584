//! Cache keys for paginated list responses.
//!
//! A key is the resource prefix followed by the request's effective
//! parameters in a fixed order:
//!
//! ```text
//! <prefix>p_<page>[_s_<search>][_sort_<column>_<order>][_perpage_<n>]
//! ```
//!
//! Every key for a resource starts with that resource's prefix so a write can
//! drop all cached pages with a single prefix invalidation.

/// Prefix shared by every cached bookings page.
pub const BOOKINGS_CACHE_PREFIX: &str = "bookings_";

/// Prefix shared by every cached countries page.
pub const COUNTRIES_CACHE_PREFIX: &str = "cache_country_";

/// Effective list parameters contributing to a cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListCacheKeyParts<'a> {
    /// Resolved page number.
    pub page: u32,
    /// Search term, when one was supplied.
    pub search: Option<&'a str>,
    /// Column and direction, when both were supplied.
    pub sort: Option<(&'a str, &'a str)>,
    /// Page size, when the client supplied one.
    pub per_page: Option<u32>,
}

/// Key under which one list response page is cached.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListCacheKey(String);

impl ListCacheKey {
    /// Build the key for `parts` under `prefix`.
    ///
    /// # Examples
    /// ```
    /// use booking_backend::domain::{ListCacheKey, ListCacheKeyParts};
    ///
    /// let key = ListCacheKey::derive(
    ///     "bookings_",
    ///     &ListCacheKeyParts {
    ///         page: 2,
    ///         search: Some("ana"),
    ///         sort: Some(("visit_date", "desc")),
    ///         per_page: Some(5),
    ///     },
    /// );
    /// assert_eq!(key.as_str(), "bookings_p_2_s_ana_sort_visit_date_desc_perpage_5");
    /// ```
    #[must_use]
    pub fn derive(prefix: &str, parts: &ListCacheKeyParts<'_>) -> Self {
        let mut key = format!("{prefix}p_{}", parts.page);
        if let Some(search) = parts.search {
            key.push_str("_s_");
            key.push_str(search);
        }
        if let Some((column, order)) = parts.sort {
            key.push_str("_sort_");
            key.push_str(column);
            key.push('_');
            key.push_str(order);
        }
        if let Some(per_page) = parts.per_page {
            key.push_str("_perpage_");
            key.push_str(&per_page.to_string());
        }
        Self(key)
    }

    /// Borrow the key text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for ListCacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for ListCacheKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
