use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::UserId,
    error::ApiError,
    protocol::{DocumentSummary, DocumentsPage, USER_ID_HEADER},
};
use tracing::debug;

use crate::{error::GridError, query::DocumentsRequest};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// One fetched page, replaced wholesale on every successful fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult {
    pub rows: Vec<DocumentSummary>,
    pub has_next_page: bool,
    pub total_count: u64,
}

impl From<DocumentsPage> for PageResult {
    fn from(page: DocumentsPage) -> Self {
        Self {
            has_next_page: page.next.is_some(),
            total_count: page.count,
            rows: page.results,
        }
    }
}

#[async_trait]
pub trait DocumentsBackend: Send + Sync {
    async fn list_documents(&self, request: &DocumentsRequest) -> Result<PageResult, GridError>;
}

/// Listing endpoint client over HTTP.
pub struct HttpDocumentsBackend {
    http: Client,
    server_url: String,
    user_id: UserId,
}

impl HttpDocumentsBackend {
    pub fn new(
        server_url: impl Into<String>,
        user_id: UserId,
        timeout: Duration,
    ) -> Result<Self, GridError> {
        let server_url = server_url.into().trim_end_matches('/').to_string();
        if !(server_url.starts_with("http://") || server_url.starts_with("https://")) {
            return Err(GridError::InvalidServerUrl(server_url));
        }
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| GridError::Transport {
                url: server_url.clone(),
                source,
            })?;
        Ok(Self {
            http,
            server_url,
            user_id,
        })
    }

    pub fn request_url(&self, request: &DocumentsRequest) -> String {
        format!("{}{}", self.server_url, request.path_and_query())
    }
}

#[async_trait]
impl DocumentsBackend for HttpDocumentsBackend {
    async fn list_documents(&self, request: &DocumentsRequest) -> Result<PageResult, GridError> {
        let url = self.request_url(request);
        let transport = |source| GridError::Transport {
            url: url.clone(),
            source,
        };

        let response = self
            .http
            .get(&url)
            .header(USER_ID_HEADER, self.user_id.0.to_string())
            .send()
            .await
            .map_err(transport)?;
        let status = response.status();
        let body = response.bytes().await.map_err(transport)?;
        debug!(%url, status = status.as_u16(), bytes = body.len(), "documents response");

        if !status.is_success() {
            let api_error = serde_json::from_slice::<ApiError>(&body).ok();
            return Err(GridError::Status {
                url,
                status: status.as_u16(),
                code: api_error.as_ref().map(|err| err.code),
                message: api_error.map(|err| err.message).unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("unexpected status")
                        .to_string()
                }),
            });
        }

        let page: DocumentsPage =
            serde_json::from_slice(&body).map_err(|source| GridError::Decode {
                url: url.clone(),
                source,
            })?;
        Ok(page.into())
    }
}

#[cfg(test)]
#[path = "tests/backend_tests.rs"]
mod tests;
