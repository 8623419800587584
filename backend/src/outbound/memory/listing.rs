//! Search, ordering, and paging over in-memory rows.
//!
//! Mirrors what the Diesel repositories do in SQL: case-insensitive substring
//! search, the requested ordering with `id ASC` as tie-breaker, then the page
//! window. `NULL` timestamps sort last in ascending order, as in PostgreSQL.

use std::cmp::Ordering;

use pagination::Page;

use crate::domain::{ListQuery, Sort, SortOrder, SortableColumn};

/// Row kind the in-memory store can list.
pub(super) trait Listable: Clone {
    type Column: SortableColumn;

    fn id(&self) -> i64;

    /// Whether any searchable column contains `needle` (already lower-cased).
    fn matches(&self, needle: &str) -> bool;

    fn compare(&self, other: &Self, column: Self::Column) -> Ordering;
}

pub(super) fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

pub(super) fn nulls_last<T: Ord>(left: Option<&T>, right: Option<&T>) -> Ordering {
    match (left, right) {
        (Some(left), Some(right)) => left.cmp(right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub(super) fn page_of<T: Listable>(rows: &[T], query: &ListQuery<T::Column>) -> Page<T> {
    let needle = query.search().map(str::to_lowercase);
    let mut matched: Vec<T> = rows
        .iter()
        .filter(|row| needle.as_deref().is_none_or(|needle| row.matches(needle)))
        .cloned()
        .collect();

    let sort = query.sort();
    matched.sort_by(|left, right| {
        let primary = match sort {
            Some(Sort { column, order }) => {
                let ordering = left.compare(right, column);
                match order {
                    SortOrder::Asc => ordering,
                    SortOrder::Desc => ordering.reverse(),
                }
            }
            None => Ordering::Equal,
        };
        primary.then_with(|| left.id().cmp(&right.id()))
    });

    let window = query.page();
    let total = u64::try_from(matched.len()).unwrap_or(u64::MAX);
    let skip = usize::try_from(window.offset()).unwrap_or(usize::MAX);
    let take = usize::try_from(window.limit()).unwrap_or(usize::MAX);
    let items = matched.into_iter().skip(skip).take(take).collect();
    Page::new(items, window, total)
}
