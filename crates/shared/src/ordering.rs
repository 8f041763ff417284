//! The `ordering` query parameter of the documents listing.
//!
//! The wire form is the backend field name, prefixed with `-` for a
//! descending sort: `title`, `-created_at`, `updated_at`.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderingField {
    Title,
    CreatedAt,
    UpdatedAt,
}

impl OrderingField {
    pub const ALL: [OrderingField; 3] = [
        OrderingField::Title,
        OrderingField::CreatedAt,
        OrderingField::UpdatedAt,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderingField::Title => "title",
            OrderingField::CreatedAt => "created_at",
            OrderingField::UpdatedAt => "updated_at",
        }
    }
}

impl fmt::Display for OrderingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderingParseError {
    #[error("ordering must not be empty")]
    Empty,
    #[error("unsupported ordering field `{0}`")]
    UnknownField(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentOrdering {
    pub field: OrderingField,
    pub direction: SortDirection,
}

impl DocumentOrdering {
    pub fn ascending(field: OrderingField) -> Self {
        Self {
            field,
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(field: OrderingField) -> Self {
        Self {
            field,
            direction: SortDirection::Descending,
        }
    }
}

impl fmt::Display for DocumentOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            SortDirection::Ascending => write!(f, "{}", self.field),
            SortDirection::Descending => write!(f, "-{}", self.field),
        }
    }
}

impl FromStr for DocumentOrdering {
    type Err = OrderingParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        if raw.is_empty() {
            return Err(OrderingParseError::Empty);
        }
        let (direction, name) = match raw.strip_prefix('-') {
            Some(name) => (SortDirection::Descending, name),
            None => (SortDirection::Ascending, raw),
        };
        let field = OrderingField::ALL
            .into_iter()
            .find(|field| field.as_str() == name)
            .ok_or_else(|| OrderingParseError::UnknownField(name.to_string()))?;
        Ok(Self { field, direction })
    }
}

impl TryFrom<String> for DocumentOrdering {
    type Error = OrderingParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DocumentOrdering> for String {
    fn from(value: DocumentOrdering) -> Self {
        value.to_string()
    }
}
