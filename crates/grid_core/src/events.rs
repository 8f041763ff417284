//! Fetch lifecycle notifications published to subscribers.

use crate::{backend::PageResult, query::DocumentsRequest};

#[derive(Debug, Clone)]
pub enum GridEvent {
    FetchStarted {
        seq: u64,
        request: DocumentsRequest,
    },
    PageLoaded {
        seq: u64,
        request: DocumentsRequest,
        page: PageResult,
    },
    FetchFailed {
        seq: u64,
        request: DocumentsRequest,
        message: String,
    },
    /// A response arrived for a request that a later one has superseded.
    StaleResponseDiscarded {
        seq: u64,
        latest_seq: u64,
    },
}
