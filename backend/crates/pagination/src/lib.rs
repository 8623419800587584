//! Offset pagination primitives shared by list endpoints.
//!
//! A [`PageRequest`] is the validated `(page, per_page)` pair a listing was
//! asked for. Once the adapter knows the total row count it builds a
//! [`PageMeta`] describing where the returned slice sits inside the full
//! result set. [`Page`] bundles both with the items themselves.
//!
//! Pages are 1-indexed. `last_page` never drops below one so an empty result
//! still reports a single (empty) page, and `from`/`to` are `None` whenever
//! the page holds no items.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Page size applied when a request does not supply a usable `per_page`.
pub const DEFAULT_PER_PAGE: u32 = 10;

/// Page number applied when a request does not supply a usable `page`.
pub const DEFAULT_PAGE: u32 = 1;

/// Errors raised when constructing a [`PageRequest`] from explicit values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PaginationError {
    /// Page numbers start at one.
    #[error("page must be at least 1")]
    ZeroPage,
    /// Pages must hold at least one item.
    #[error("per_page must be at least 1")]
    ZeroPerPage,
}

/// Requested window into a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PageRequest {
    /// Build a request from explicit values.
    ///
    /// # Errors
    ///
    /// Returns [`PaginationError`] when either value is zero.
    ///
    /// # Examples
    /// ```
    /// use pagination::PageRequest;
    ///
    /// let request = PageRequest::new(2, 10).expect("valid request");
    /// assert_eq!(request.offset(), 10);
    /// ```
    pub const fn new(page: u32, per_page: u32) -> Result<Self, PaginationError> {
        if page == 0 {
            return Err(PaginationError::ZeroPage);
        }
        if per_page == 0 {
            return Err(PaginationError::ZeroPerPage);
        }
        Ok(Self { page, per_page })
    }

    /// Build a request from raw query-string values.
    ///
    /// Missing, non-numeric, or zero values fall back to [`DEFAULT_PAGE`] and
    /// [`DEFAULT_PER_PAGE`] respectively.
    ///
    /// # Examples
    /// ```
    /// use pagination::PageRequest;
    ///
    /// let request = PageRequest::from_raw(Some("3"), Some("oops"));
    /// assert_eq!(request.page(), 3);
    /// assert_eq!(request.per_page(), 10);
    /// ```
    #[must_use]
    pub fn from_raw(page: Option<&str>, per_page: Option<&str>) -> Self {
        Self {
            page: parse_positive(page).unwrap_or(DEFAULT_PAGE),
            per_page: parse_positive(per_page).unwrap_or(DEFAULT_PER_PAGE),
        }
    }

    /// 1-indexed page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Maximum number of items on the page.
    #[must_use]
    pub const fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Number of rows to skip before the first item of this page.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.per_page as u64
    }

    /// Number of rows to fetch for this page.
    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.per_page as u64
    }
}

fn parse_positive(raw: Option<&str>) -> Option<u32> {
    raw.map(str::trim)
        .and_then(|value| value.parse::<u32>().ok())
        .filter(|value| *value > 0)
}

/// Position of a page within the full result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    /// Total number of matching rows across all pages.
    pub total: u64,
    /// Requested page size.
    pub per_page: u32,
    /// 1-indexed number of this page.
    pub current_page: u32,
    /// Number of the final page; at least one.
    pub last_page: u64,
    /// 1-indexed position of the first item on this page, if any.
    pub from: Option<u64>,
    /// 1-indexed position of the last item on this page, if any.
    pub to: Option<u64>,
}

impl PageMeta {
    /// Describe a page holding `item_count` items out of `total`.
    ///
    /// # Examples
    /// ```
    /// use pagination::{PageMeta, PageRequest};
    ///
    /// let request = PageRequest::new(3, 10).expect("valid request");
    /// let meta = PageMeta::new(request, 25, 5);
    /// assert_eq!(meta.last_page, 3);
    /// assert_eq!(meta.from, Some(21));
    /// assert_eq!(meta.to, Some(25));
    /// ```
    #[must_use]
    pub fn new(request: PageRequest, total: u64, item_count: usize) -> Self {
        let per_page = u64::from(request.per_page());
        let last_page = total.div_ceil(per_page).max(1);
        let count = u64::try_from(item_count).unwrap_or(u64::MAX);
        let (from, to) = if count == 0 {
            (None, None)
        } else {
            let first = request.offset().saturating_add(1);
            (Some(first), Some(request.offset().saturating_add(count)))
        };
        Self {
            total,
            per_page: request.per_page(),
            current_page: request.page(),
            last_page,
            from,
            to,
        }
    }
}

/// A slice of items together with its pagination metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page, in result order.
    pub items: Vec<T>,
    /// Where this page sits in the full result set.
    pub meta: PageMeta,
}

impl<T> Page<T> {
    /// Assemble a page, deriving metadata from the item count.
    #[must_use]
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        let meta = PageMeta::new(request, total, items.len());
        Self { items, meta }
    }

    /// Whether the page holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Transform every item while keeping the metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}
