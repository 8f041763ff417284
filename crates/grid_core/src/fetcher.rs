//! Issues listing requests and keeps the last authoritative result.
//!
//! Every request gets a sequence number. A response is applied only when
//! its number is still the latest issued, so the last-triggered request
//! wins regardless of the order in which responses arrive. Superseded
//! requests are left to finish and their results are dropped.

use std::sync::Arc;

use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    backend::{DocumentsBackend, PageResult},
    error::GridError,
    events::GridEvent,
    query::DocumentsRequest,
};

/// Point-in-time view of the fetcher's observable state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchSnapshot {
    pub loading: bool,
    /// Last successful result; kept as-is across failures.
    pub page: Option<PageResult>,
    /// Request that produced `page`.
    pub displayed: Option<DocumentsRequest>,
    pub error: Option<String>,
    pub latest_seq: u64,
}

#[derive(Debug)]
pub enum FetchOutcome {
    Applied,
    Failed(GridError),
    Superseded,
}

impl FetchOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, FetchOutcome::Applied)
    }
}

/// An issued request whose response may still be outstanding.
pub struct FetchHandle {
    seq: u64,
    task: JoinHandle<FetchOutcome>,
}

impl FetchHandle {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub async fn wait(self) -> FetchOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(err) => FetchOutcome::Failed(GridError::TaskAborted(err.to_string())),
        }
    }
}

pub struct DocumentsFetcher {
    backend: Arc<dyn DocumentsBackend>,
    state: Mutex<FetchSnapshot>,
    events: broadcast::Sender<GridEvent>,
}

impl DocumentsFetcher {
    pub fn new(backend: Arc<dyn DocumentsBackend>) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            backend,
            state: Mutex::new(FetchSnapshot::default()),
            events,
        })
    }

    /// Marks the fetcher loading, assigns the next sequence number and starts
    /// the request in the background.
    pub async fn issue(self: &Arc<Self>, request: DocumentsRequest) -> FetchHandle {
        let seq = {
            let mut guard = self.state.lock().await;
            guard.latest_seq += 1;
            guard.loading = true;
            guard.latest_seq
        };
        info!(seq, request = %request.path_and_query(), "documents fetch started");
        let _ = self.events.send(GridEvent::FetchStarted { seq, request });

        let this = Arc::clone(self);
        let task = tokio::spawn(async move {
            let result = this.backend.list_documents(&request).await;
            this.complete(seq, request, result).await
        });
        FetchHandle { seq, task }
    }

    pub async fn fetch(self: &Arc<Self>, request: DocumentsRequest) -> FetchOutcome {
        self.issue(request).await.wait().await
    }

    async fn complete(
        &self,
        seq: u64,
        request: DocumentsRequest,
        result: Result<PageResult, GridError>,
    ) -> FetchOutcome {
        let mut guard = self.state.lock().await;
        if seq != guard.latest_seq {
            debug!(
                seq,
                latest_seq = guard.latest_seq,
                "discarding stale documents response"
            );
            let _ = self.events.send(GridEvent::StaleResponseDiscarded {
                seq,
                latest_seq: guard.latest_seq,
            });
            return FetchOutcome::Superseded;
        }

        guard.loading = false;
        match result {
            Ok(page) => {
                info!(
                    seq,
                    rows = page.rows.len(),
                    has_next_page = page.has_next_page,
                    "documents page loaded"
                );
                guard.page = Some(page.clone());
                guard.displayed = Some(request);
                guard.error = None;
                let _ = self.events.send(GridEvent::PageLoaded { seq, request, page });
                FetchOutcome::Applied
            }
            Err(err) => {
                warn!(seq, error = %err, "documents fetch failed");
                let message = err.to_string();
                guard.error = Some(message.clone());
                let _ = self.events.send(GridEvent::FetchFailed {
                    seq,
                    request,
                    message,
                });
                FetchOutcome::Failed(err)
            }
        }
    }

    pub async fn snapshot(&self) -> FetchSnapshot {
        self.state.lock().await.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GridEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
#[path = "tests/fetcher_tests.rs"]
mod tests;
