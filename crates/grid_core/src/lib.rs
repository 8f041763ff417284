//! Headless documents grid: sortable columns and paged results over the
//! `/documents/` listing endpoint.
//!
//! User actions go through [`DocumentGrid`], which reduces its
//! [`GridState`], derives a [`DocumentsRequest`] and hands it to the
//! [`DocumentsFetcher`]. [`GridView`] is what a front end draws.

pub mod backend;
pub mod error;
pub mod events;
pub mod fetcher;
pub mod grid;
pub mod pagination;
pub mod query;
pub mod sort;
pub mod view;

pub use backend::{DocumentsBackend, HttpDocumentsBackend, PageResult, DEFAULT_REQUEST_TIMEOUT};
pub use error::GridError;
pub use events::GridEvent;
pub use fetcher::{DocumentsFetcher, FetchHandle, FetchOutcome, FetchSnapshot};
pub use grid::{DocumentGrid, DocumentRouter, NoopRouter};
pub use query::{build_request, ActiveSort, DocumentsRequest, GridState, SortColumn};
pub use view::{GridRow, GridView, COLUMN_HEADERS, LOADING_LABEL};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
