//! Fixtures shared by the unit tests: an in-memory listing, a backend whose
//! responses can be held back per request, and a loopback HTTP stub.

use std::{
    cmp::Ordering,
    collections::HashMap,
    sync::{Arc, Mutex as StdMutex},
};

use async_trait::async_trait;
use axum::{
    extract::{OriginalUri, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{Duration, TimeZone, Utc};
use shared::{
    domain::{DocumentId, Role},
    error::ApiError,
    ordering::{DocumentOrdering, OrderingField, SortDirection},
    protocol::{DocumentSummary, DocumentsPage, DOCUMENTS_PATH, USER_ID_HEADER},
};
use tokio::{net::TcpListener, sync::oneshot};
use uuid::Uuid;

use crate::{
    backend::{DocumentsBackend, PageResult},
    error::GridError,
    query::DocumentsRequest,
};

const TITLES: [&str; 8] = [
    "quarterly report",
    "Budget",
    "onboarding",
    "Zephyr notes",
    "alpha draft",
    "Meeting minutes",
    "roadmap",
    "Charter",
];

/// `count` documents with mixed-case titles, cycling roles and distinct timestamps.
pub fn sample_documents(count: usize) -> Vec<DocumentSummary> {
    let base = Utc
        .with_ymd_and_hms(2024, 1, 15, 10, 0, 0)
        .single()
        .expect("timestamp");
    (0..count)
        .map(|index| {
            let created_at = base + Duration::hours(index as i64);
            DocumentSummary {
                id: DocumentId(Uuid::from_u128(index as u128 + 1)),
                title: format!("{} {index:02}", TITLES[index % TITLES.len()]),
                created_at,
                updated_at: created_at + Duration::minutes(((index * 37) % 100) as i64),
                user_role: Role::ALL[index % Role::ALL.len()],
                member_count: (index % 5) as u32 + 1,
            }
        })
        .collect()
}

fn compare(a: &DocumentSummary, b: &DocumentSummary, field: OrderingField) -> Ordering {
    let primary = match field {
        OrderingField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        OrderingField::CreatedAt => a.created_at.cmp(&b.created_at),
        OrderingField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

/// Sorts and slices `documents` the way the listing endpoint does.
pub fn listing_page(
    documents: &[DocumentSummary],
    page_size: usize,
    page: u32,
    ordering: Option<DocumentOrdering>,
    documents_url: &str,
) -> Result<DocumentsPage, ApiError> {
    let mut sorted = documents.to_vec();
    let ordering = ordering.unwrap_or(DocumentOrdering::descending(OrderingField::CreatedAt));
    sorted.sort_by(|a, b| {
        let ord = compare(a, b, ordering.field);
        match ordering.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });

    let last_page = sorted.len().div_ceil(page_size).max(1);
    let page_index = page as usize;
    if page_index == 0 || page_index > last_page {
        return Err(ApiError::not_found("invalid page"));
    }
    let results: Vec<_> = sorted
        .into_iter()
        .skip((page_index - 1) * page_size)
        .take(page_size)
        .collect();
    let link = |page: usize| format!("{documents_url}?page={page}&ordering={ordering}");
    Ok(DocumentsPage {
        count: documents.len() as u64,
        next: (page_index < last_page).then(|| link(page_index + 1)),
        previous: (page_index > 1).then(|| link(page_index - 1)),
        results,
    })
}

#[derive(Debug)]
pub enum GateAction {
    Respond,
    Fail(u16),
}

/// In-memory backend; responses for gated requests wait until released.
pub struct FixtureBackend {
    documents: Vec<DocumentSummary>,
    page_size: usize,
    gates: StdMutex<HashMap<DocumentsRequest, oneshot::Receiver<GateAction>>>,
    calls: StdMutex<Vec<DocumentsRequest>>,
}

impl FixtureBackend {
    pub fn new(documents: Vec<DocumentSummary>, page_size: usize) -> Arc<Self> {
        Arc::new(Self {
            documents,
            page_size,
            gates: StdMutex::new(HashMap::new()),
            calls: StdMutex::new(Vec::new()),
        })
    }

    /// Holds back the next response to `request` until the returned sender fires.
    pub fn gate(&self, request: DocumentsRequest) -> oneshot::Sender<GateAction> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().expect("gates").insert(request, rx);
        tx
    }

    pub fn calls(&self) -> Vec<DocumentsRequest> {
        self.calls.lock().expect("calls").clone()
    }

    pub fn page(&self, request: &DocumentsRequest) -> Result<PageResult, GridError> {
        listing_page(
            &self.documents,
            self.page_size,
            request.page,
            request.ordering,
            "http://fixture/documents/",
        )
        .map(PageResult::from)
        .map_err(|err| GridError::Status {
            url: request.path_and_query(),
            status: 404,
            code: Some(err.code),
            message: err.message,
        })
    }
}

#[async_trait]
impl DocumentsBackend for FixtureBackend {
    async fn list_documents(&self, request: &DocumentsRequest) -> Result<PageResult, GridError> {
        self.calls.lock().expect("calls").push(*request);
        let gate = self.gates.lock().expect("gates").remove(request);
        if let Some(gate) = gate {
            if let Ok(GateAction::Fail(status)) = gate.await {
                return Err(GridError::Status {
                    url: request.path_and_query(),
                    status,
                    code: None,
                    message: "injected failure".into(),
                });
            }
        }
        self.page(request)
    }
}

#[derive(Clone)]
struct StubState {
    documents: Arc<Vec<DocumentSummary>>,
    page_size: usize,
    base_url: String,
    seen: Arc<StdMutex<Vec<SeenRequest>>>,
}

#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub path_and_query: String,
    pub user_id: Option<String>,
}

pub struct StubServer {
    pub url: String,
    seen: Arc<StdMutex<Vec<SeenRequest>>>,
}

impl StubServer {
    pub fn seen(&self) -> Vec<SeenRequest> {
        self.seen.lock().expect("seen").clone()
    }
}

async fn stub_list_documents(
    State(state): State<StubState>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.seen.lock().expect("seen").push(SeenRequest {
        path_and_query: uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_default(),
        user_id: headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
    });

    let page = params
        .get("page")
        .map(|raw| raw.parse::<u32>().unwrap_or(0))
        .unwrap_or(1);
    let ordering = match params.get("ordering").map(|raw| raw.parse()).transpose() {
        Ok(ordering) => ordering,
        Err(err) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiError::validation(format!("{err}"))),
            )
                .into_response()
        }
    };
    let documents_url = format!("{}{DOCUMENTS_PATH}", state.base_url);
    match listing_page(&state.documents, state.page_size, page, ordering, &documents_url) {
        Ok(body) => Json(body).into_response(),
        Err(err) => (StatusCode::NOT_FOUND, Json(err)).into_response(),
    }
}

pub async fn spawn_stub_server(documents: Vec<DocumentSummary>, page_size: usize) -> StubServer {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let url = format!("http://{addr}");
    let seen = Arc::new(StdMutex::new(Vec::new()));
    let state = StubState {
        documents: Arc::new(documents),
        page_size,
        base_url: url.clone(),
        seen: Arc::clone(&seen),
    };
    let app = Router::new()
        .route(DOCUMENTS_PATH, get(stub_list_documents))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    StubServer { url, seen }
}

/// Serves a fixed status and body for every listing request.
pub async fn spawn_raw_server(status: StatusCode, body: serde_json::Value) -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let app = Router::new().route(
        DOCUMENTS_PATH,
        get(move || {
            let body = body.clone();
            async move { (status, Json(body)) }
        }),
    );
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}
