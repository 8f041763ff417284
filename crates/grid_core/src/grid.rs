use std::sync::Arc;

use shared::domain::DocumentId;
use tokio::sync::{broadcast, Mutex, MutexGuard};
use tracing::{debug, info};

use crate::{
    backend::DocumentsBackend,
    error::GridError,
    events::GridEvent,
    fetcher::{DocumentsFetcher, FetchHandle, FetchSnapshot},
    pagination,
    query::{build_request, GridState, SortColumn},
    sort,
    view::{self, GridView},
};

/// Navigation to a document's detail view, owned by the embedding app.
pub trait DocumentRouter: Send + Sync {
    fn open_document(&self, document_id: DocumentId);
}

pub struct NoopRouter;

impl DocumentRouter for NoopRouter {
    fn open_document(&self, _document_id: DocumentId) {}
}

/// The documents grid: one grid state, one fetcher.
///
/// The grid-state lock is held while a transition reduces the state and
/// issues its request, so request sequence numbers follow the order of
/// user actions. Once the newest request has settled, the state is the one
/// the displayed rows were fetched with; a failed transition falls back to it.
pub struct DocumentGrid {
    fetcher: Arc<DocumentsFetcher>,
    state: Mutex<GridState>,
    router: Arc<dyn DocumentRouter>,
}

impl DocumentGrid {
    pub fn new(backend: Arc<dyn DocumentsBackend>, router: Arc<dyn DocumentRouter>) -> Self {
        Self {
            fetcher: DocumentsFetcher::new(backend),
            state: Mutex::new(GridState::default()),
            router,
        }
    }

    /// Loads the current state's page; called once when the grid is shown.
    pub async fn mount(&self) -> FetchHandle {
        let state = self.lock_settled().await;
        self.fetcher.issue(build_request(&state)).await
    }

    /// Re-fetches the current state without changing it.
    pub async fn refresh(&self) -> FetchHandle {
        self.mount().await
    }

    pub async fn activate_header(&self, column: SortColumn) -> FetchHandle {
        let mut state = self.lock_settled().await;
        let next = sort::toggle_sort(&state, column);
        info!(column = %column, sort = ?next.sort, "sort changed");
        *state = next;
        self.fetcher.issue(build_request(&next)).await
    }

    /// Moves to `page`. Returns `None` without fetching when it is already
    /// the displayed page, or the page of a request still in flight.
    pub async fn go_to_page(&self, page: u32) -> Result<Option<FetchHandle>, GridError> {
        let mut state = self.lock_settled().await;
        let Some(next) = pagination::go_to_page(&state, page)? else {
            debug!(page, "already on requested page");
            return Ok(None);
        };
        info!(from = state.page, to = page, "page changed");
        *state = next;
        Ok(Some(self.fetcher.issue(build_request(&next)).await))
    }

    /// Activates the name cell of the `row`-th displayed row (0-based).
    pub async fn activate_document_name(&self, row: usize) -> Result<DocumentId, GridError> {
        let snapshot = self.fetcher.snapshot().await;
        let document_id = snapshot
            .page
            .as_ref()
            .and_then(|page| page.rows.get(row))
            .map(|doc| doc.id)
            .ok_or(GridError::UnknownRow(row))?;
        info!(%document_id, "opening document");
        self.router.open_document(document_id);
        Ok(document_id)
    }

    pub async fn state(&self) -> GridState {
        *self.lock_settled().await
    }

    pub async fn snapshot(&self) -> FetchSnapshot {
        self.fetcher.snapshot().await
    }

    pub async fn view(&self) -> GridView {
        let state = self.state.lock().await;
        let snapshot = self.fetcher.snapshot().await;
        view::render(&settled(*state, &snapshot), &snapshot)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GridEvent> {
        self.fetcher.subscribe()
    }

    async fn lock_settled(&self) -> MutexGuard<'_, GridState> {
        let mut state = self.state.lock().await;
        let snapshot = self.fetcher.snapshot().await;
        *state = settled(*state, &snapshot);
        state
    }
}

fn settled(state: GridState, snapshot: &FetchSnapshot) -> GridState {
    match snapshot.displayed {
        Some(displayed) if !snapshot.loading => displayed.into(),
        _ => state,
    }
}

#[cfg(test)]
#[path = "tests/grid_tests.rs"]
mod tests;
