//! Grid state and the request it maps to.

use std::{fmt, str::FromStr};

use shared::{
    ordering::{DocumentOrdering, OrderingField, SortDirection},
    protocol::{ListDocumentsQuery, DOCUMENTS_PATH},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortColumn {
    Title,
    CreatedAt,
    UpdatedAt,
}

impl SortColumn {
    pub const ALL: [SortColumn; 3] = [SortColumn::Title, SortColumn::CreatedAt, SortColumn::UpdatedAt];

    pub fn ordering_field(self) -> OrderingField {
        match self {
            SortColumn::Title => OrderingField::Title,
            SortColumn::CreatedAt => OrderingField::CreatedAt,
            SortColumn::UpdatedAt => OrderingField::UpdatedAt,
        }
    }

    pub fn from_ordering_field(field: OrderingField) -> Self {
        match field {
            OrderingField::Title => SortColumn::Title,
            OrderingField::CreatedAt => SortColumn::CreatedAt,
            OrderingField::UpdatedAt => SortColumn::UpdatedAt,
        }
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ordering_field().as_str())
    }
}

impl FromStr for SortColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "title" | "name" => Ok(SortColumn::Title),
            "created_at" | "created" => Ok(SortColumn::CreatedAt),
            "updated_at" | "updated" => Ok(SortColumn::UpdatedAt),
            other => Err(format!("unknown sort column `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveSort {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl ActiveSort {
    pub fn ascending(column: SortColumn) -> Self {
        Self {
            column,
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(column: SortColumn) -> Self {
        Self {
            column,
            direction: SortDirection::Descending,
        }
    }
}

/// What the user has selected: a 1-based page and at most one sorted column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridState {
    pub page: u32,
    pub sort: Option<ActiveSort>,
}

impl Default for GridState {
    fn default() -> Self {
        Self { page: 1, sort: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentsRequest {
    pub page: u32,
    pub ordering: Option<DocumentOrdering>,
}

impl DocumentsRequest {
    pub fn query(&self) -> ListDocumentsQuery {
        ListDocumentsQuery {
            page: self.page,
            ordering: self.ordering,
        }
    }

    /// `/documents/?page=N[&ordering=...]`
    pub fn path_and_query(&self) -> String {
        format!("{DOCUMENTS_PATH}?{}", self.query().to_query_string())
    }
}

/// The state a displayed request was built from.
impl From<DocumentsRequest> for GridState {
    fn from(request: DocumentsRequest) -> Self {
        Self {
            page: request.page,
            sort: request.ordering.map(|ordering| ActiveSort {
                column: SortColumn::from_ordering_field(ordering.field),
                direction: ordering.direction,
            }),
        }
    }
}

pub fn build_request(state: &GridState) -> DocumentsRequest {
    DocumentsRequest {
        page: state.page,
        ordering: state.sort.map(|sort| DocumentOrdering {
            field: sort.column.ordering_field(),
            direction: sort.direction,
        }),
    }
}

#[cfg(test)]
#[path = "tests/query_tests.rs"]
mod tests;
