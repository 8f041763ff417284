use crate::{backend::PageResult, error::GridError, query::GridState};

/// State after activating "go to page `page`", or `None` when that page is
/// already the current one (displayed, or requested and in flight). Upper
/// bounds are the backend's call.
pub fn go_to_page(state: &GridState, page: u32) -> Result<Option<GridState>, GridError> {
    if page == 0 {
        return Err(GridError::InvalidPage(page));
    }
    if page == state.page {
        return Ok(None);
    }
    Ok(Some(GridState { page, ..*state }))
}

/// Number of pages known from a result shown for `displayed_page`.
///
/// A full page followed by more rows fixes the page size, so the total can be
/// derived from the backend's count. A last page ends the listing.
pub fn known_page_count(displayed_page: u32, result: &PageResult) -> u32 {
    if !result.has_next_page {
        return displayed_page.max(1);
    }
    let per_page = result.rows.len() as u64;
    let from_count = if per_page == 0 {
        0
    } else {
        u32::try_from(result.total_count.div_ceil(per_page)).unwrap_or(u32::MAX)
    };
    from_count.max(displayed_page.saturating_add(1))
}

#[cfg(test)]
#[path = "tests/pagination_tests.rs"]
mod tests;
