//! Filter, sort, and pagination parameters for list endpoints.
//!
//! [`ListParams`] is the raw query string as received. [`ListQuery`] is the
//! validated form handed to repositories: the page window is resolved, blank
//! values are dropped, and the sort column has been checked against the
//! resource's allowlist ([`SortableColumn`]).

use pagination::PageRequest;
use serde::Deserialize;

use super::Error;
use super::cache_key::{ListCacheKey, ListCacheKeyParts};
use super::validation::attribute_label;

/// Raw list query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListParams {
    /// Requested 1-indexed page.
    pub page: Option<String>,
    /// Requested page size.
    pub per_page: Option<String>,
    /// Free-text search term.
    pub search: Option<String>,
    /// Column to order by.
    pub sort_by: Option<String>,
    /// `asc` or `desc`.
    pub sort_order: Option<String>,
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.trim().is_empty())
}

/// Ordering direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOrder {
    /// Smallest first.
    Asc,
    /// Largest first.
    Desc,
}

impl SortOrder {
    /// Parse `asc`/`desc`, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    /// Lower-case keyword.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Column set a resource allows clients to sort by.
pub trait SortableColumn: Copy + Send + Sync + std::fmt::Debug + 'static {
    /// Resolve a client-supplied column name.
    fn parse(name: &str) -> Option<Self>;

    /// Column name as exposed to clients.
    fn name(self) -> &'static str;
}

/// Validated ordering request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort<C> {
    /// Column to order by.
    pub column: C,
    /// Direction.
    pub order: SortOrder,
}

/// Validated list request for one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery<C> {
    page: PageRequest,
    per_page_supplied: bool,
    search: Option<String>,
    sort: Option<Sort<C>>,
}

impl<C: SortableColumn> ListQuery<C> {
    /// Validate raw parameters.
    ///
    /// Sorting only applies when both `sort_by` and `sort_order` are
    /// supplied. When they are, an unknown column or direction is rejected.
    ///
    /// # Errors
    ///
    /// Returns a validation [`Error`] naming the rejected parameter.
    pub fn from_params(params: &ListParams) -> Result<Self, Error> {
        let page = PageRequest::from_raw(
            present(params.page.as_ref()),
            present(params.per_page.as_ref()),
        );
        let sort = match (
            present(params.sort_by.as_ref()),
            present(params.sort_order.as_ref()),
        ) {
            (Some(column), Some(order)) => Some(Sort {
                column: C::parse(column.trim()).ok_or_else(|| invalid_selection("sort_by"))?,
                order: SortOrder::parse(order).ok_or_else(|| invalid_selection("sort_order"))?,
            }),
            _ => None,
        };
        Ok(Self {
            page,
            per_page_supplied: present(params.per_page.as_ref()).is_some(),
            search: present(params.search.as_ref()).map(|term| term.trim().to_owned()),
            sort,
        })
    }

    /// Unfiltered, unsorted request for the given window.
    #[must_use]
    pub fn page_only(page: PageRequest) -> Self {
        Self {
            page,
            per_page_supplied: false,
            search: None,
            sort: None,
        }
    }

    /// Add a search term.
    #[must_use]
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    /// Add an ordering.
    #[must_use]
    pub fn with_sort(mut self, column: C, order: SortOrder) -> Self {
        self.sort = Some(Sort { column, order });
        self
    }

    /// Requested page window.
    #[must_use]
    pub fn page(&self) -> PageRequest {
        self.page
    }

    /// Search term, if any.
    #[must_use]
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// Requested ordering, if any. Repositories append `id ASC` as a
    /// tie-breaker.
    #[must_use]
    pub fn sort(&self) -> Option<Sort<C>> {
        self.sort
    }

    /// Derive the cache key for this request under `prefix`.
    #[must_use]
    pub fn cache_key(&self, prefix: &str) -> ListCacheKey {
        ListCacheKey::derive(
            prefix,
            &ListCacheKeyParts {
                page: self.page.page(),
                search: self.search.as_deref(),
                sort: self.sort.map(|sort| (sort.column.name(), sort.order.as_str())),
                per_page: self.per_page_supplied.then(|| self.page.per_page()),
            },
        )
    }
}

fn invalid_selection(field: &str) -> Error {
    Error::validation(format!("The selected {} is invalid.", attribute_label(field)))
}

/// Escape `LIKE` wildcards so a search term matches literally.
///
/// # Examples
/// ```
/// use booking_backend::domain::like_pattern;
///
/// assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
/// ```
#[must_use]
pub fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
