use super::*;
use crate::{query::ActiveSort, query::SortColumn, test_support::sample_documents};

fn result(rows: usize, has_next_page: bool, total_count: u64) -> PageResult {
    PageResult {
        rows: sample_documents(rows),
        has_next_page,
        total_count,
    }
}

#[test]
fn moving_to_another_page_keeps_the_sort() {
    let state = GridState {
        page: 1,
        sort: Some(ActiveSort::descending(SortColumn::UpdatedAt)),
    };
    let next = go_to_page(&state, 2).expect("valid").expect("changed");
    assert_eq!(next.page, 2);
    assert_eq!(next.sort, state.sort);
}

#[test]
fn current_page_is_a_no_op() {
    let state = GridState { page: 2, sort: None };
    assert!(go_to_page(&state, 2).expect("valid").is_none());
}

#[test]
fn page_zero_is_rejected_locally() {
    let state = GridState::default();
    assert!(matches!(
        go_to_page(&state, 0),
        Err(GridError::InvalidPage(0))
    ));
}

#[test]
fn far_pages_are_not_bounds_checked() {
    let state = GridState::default();
    let next = go_to_page(&state, 999).expect("valid").expect("changed");
    assert_eq!(next.page, 999);
}

#[test]
fn page_count_from_full_page_and_total() {
    assert_eq!(known_page_count(1, &result(20, true, 45)), 3);
    assert_eq!(known_page_count(2, &result(20, true, 41)), 3);
}

#[test]
fn last_page_ends_the_listing() {
    assert_eq!(known_page_count(3, &result(5, false, 45)), 3);
    assert_eq!(known_page_count(1, &result(0, false, 0)), 1);
}
