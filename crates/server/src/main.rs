use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use server_api::{list_documents, ApiContext};
use shared::{
    domain::UserId,
    error::{ApiError, ErrorCode},
    ordering::DocumentOrdering,
    protocol::{DocumentsPage, DOCUMENTS_PATH, USER_ID_HEADER},
};
use storage::Storage;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod config;

use config::{load_settings, prepare_database_url};

#[derive(Clone)]
struct AppState {
    api: ApiContext,
}

/// Raw listing query; parsed by hand so bad pages map to 404 instead of a 400 rejection.
#[derive(Debug, Deserialize)]
struct ListDocumentsParams {
    page: Option<String>,
    ordering: Option<String>,
}

type ApiRejection = (StatusCode, Json<ApiError>);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = load_settings();
    let database_url = prepare_database_url(&settings.database_url)?;
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;
    let api = ApiContext {
        storage,
        page_size: settings.page_size,
        documents_url: settings.documents_url()?,
    };

    let app = build_router(Arc::new(AppState { api }));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, page_size = settings.page_size, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(DOCUMENTS_PATH, get(http_list_documents))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz(State(state): State<Arc<AppState>>) -> Result<&'static str, StatusCode> {
    state.api.storage.health_check().await.map_err(|error| {
        warn!(%error, "health check failed");
        StatusCode::SERVICE_UNAVAILABLE
    })?;
    Ok("ok")
}

async fn http_list_documents(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<ListDocumentsParams>,
) -> Result<Json<DocumentsPage>, ApiRejection> {
    let user_id = viewer_from_headers(&headers).map_err(reject)?;
    let page = parse_page(params.page.as_deref()).map_err(reject)?;
    let ordering = params
        .ordering
        .as_deref()
        .filter(|raw| !raw.trim().is_empty())
        .map(str::parse::<DocumentOrdering>)
        .transpose()
        .map_err(|err| reject(ApiError::validation(err.to_string())))?;

    list_documents(&state.api, user_id, page, ordering)
        .await
        .map(Json)
        .map_err(reject)
}

fn viewer_from_headers(headers: &HeaderMap) -> Result<UserId, ApiError> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<i64>().ok())
        .map(UserId)
        .ok_or_else(|| ApiError::unauthorized(format!("missing or invalid {USER_ID_HEADER} header")))
}

fn parse_page(raw: Option<&str>) -> Result<u32, ApiError> {
    let Some(raw) = raw else {
        return Ok(1);
    };
    match raw.trim().parse::<u32>() {
        Ok(page) if page > 0 => Ok(page),
        _ => Err(ApiError::not_found("invalid page")),
    }
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn reject(err: ApiError) -> ApiRejection {
    if err.code == ErrorCode::Internal {
        error!(message = %err.message, "documents listing failed");
    }
    (status_for(err.code), Json(err))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
