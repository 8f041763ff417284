//! Header activation reducer.
//!
//! A column toggles between ascending and descending; it never returns to
//! unsorted. Activating another column starts it ascending.

use shared::ordering::SortDirection;

use crate::query::{ActiveSort, GridState, SortColumn};

pub fn next_sort(current: Option<ActiveSort>, column: SortColumn) -> ActiveSort {
    match current {
        Some(ActiveSort {
            column: active,
            direction: SortDirection::Ascending,
        }) if active == column => ActiveSort::descending(column),
        _ => ActiveSort::ascending(column),
    }
}

/// State after activating `column`'s header. The page goes back to 1.
pub fn toggle_sort(state: &GridState, column: SortColumn) -> GridState {
    GridState {
        page: 1,
        sort: Some(next_sort(state.sort, column)),
    }
}

#[cfg(test)]
#[path = "tests/sort_tests.rs"]
mod tests;
