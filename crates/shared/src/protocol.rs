use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    domain::{DocumentId, Role},
    ordering::DocumentOrdering,
};

/// Header carrying the viewer's user id on listing requests.
pub const USER_ID_HEADER: &str = "x-user-id";

pub const DOCUMENTS_PATH: &str = "/documents/";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: DocumentId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_role: Role,
    pub member_count: u32,
}

/// One page of the documents listing, in the page-number pagination envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentsPage {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<DocumentSummary>,
}

/// Query string of `GET /documents/`. Field order is the wire order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListDocumentsQuery {
    pub page: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordering: Option<DocumentOrdering>,
}

impl ListDocumentsQuery {
    pub fn to_query_string(&self) -> String {
        match self.ordering {
            Some(ordering) => format!("page={}&ordering={ordering}", self.page),
            None => format!("page={}", self.page),
        }
    }
}
