//! Headless rendering of the grid: labels, headers, cells and page controls.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use shared::{domain::DocumentId, ordering::SortDirection, protocol::DocumentSummary};

use crate::{
    fetcher::FetchSnapshot,
    pagination::known_page_count,
    query::{GridState, SortColumn},
};

pub const COLUMN_HEADERS: [&str; 5] = [
    "Document name",
    "Created at",
    "Updated at",
    "Your role",
    "Users number",
];

pub const LOADING_LABEL: &str = "Loading data";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

pub fn grid_label(page: u32) -> String {
    format!("Datagrid of the documents page {page}")
}

pub fn page_control_label(page: u32) -> String {
    format!("Go to page {page}")
}

pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub label: &'static str,
    /// Column this header sorts by; `None` for non-sortable headers.
    pub column: Option<SortColumn>,
    pub sorted: Option<SortDirection>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridRow {
    pub document_id: DocumentId,
    /// One cell per entry of [`COLUMN_HEADERS`], same order.
    pub cells: [String; 5],
}

impl GridRow {
    fn from_document(doc: &DocumentSummary) -> Self {
        Self {
            document_id: doc.id,
            cells: [
                doc.title.clone(),
                format_timestamp(&doc.created_at),
                format_timestamp(&doc.updated_at),
                doc.user_role.label().to_string(),
                doc.member_count.to_string(),
            ],
        }
    }

    pub fn name(&self) -> &str {
        &self.cells[0]
    }

    pub fn role(&self) -> &str {
        &self.cells[3]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageControl {
    pub page: u32,
    pub label: String,
    pub current: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridView {
    pub label: String,
    pub headers: Vec<HeaderCell>,
    pub rows: Vec<GridRow>,
    /// Present only while a fetch is in flight.
    pub loading_indicator: Option<&'static str>,
    pub page_controls: Vec<PageControl>,
    pub error: Option<String>,
}

pub fn render(state: &GridState, snapshot: &FetchSnapshot) -> GridView {
    let headers = COLUMN_HEADERS
        .into_iter()
        .zip(header_columns())
        .map(|(label, column)| HeaderCell {
            label,
            column,
            sorted: state
                .sort
                .filter(|sort| Some(sort.column) == column)
                .map(|sort| sort.direction),
        })
        .collect();

    let rows = snapshot
        .page
        .as_ref()
        .map(|page| page.rows.iter().map(GridRow::from_document).collect())
        .unwrap_or_default();

    let page_count = match (&snapshot.page, &snapshot.displayed) {
        (Some(page), Some(request)) => known_page_count(request.page, page),
        _ => 1,
    }
    .max(state.page);
    let page_controls = (1..=page_count)
        .map(|page| PageControl {
            page,
            label: page_control_label(page),
            current: page == state.page,
        })
        .collect();

    GridView {
        label: grid_label(state.page),
        headers,
        rows,
        loading_indicator: snapshot.loading.then_some(LOADING_LABEL),
        page_controls,
        error: snapshot.error.clone(),
    }
}

fn header_columns() -> [Option<SortColumn>; 5] {
    [
        Some(SortColumn::Title),
        Some(SortColumn::CreatedAt),
        Some(SortColumn::UpdatedAt),
        None,
        None,
    ]
}

impl GridView {
    pub fn header(&self, label: &str) -> Option<&HeaderCell> {
        self.headers.iter().find(|header| header.label == label)
    }

    /// Plain-text table for terminals.
    pub fn to_text(&self) -> String {
        let mut widths: Vec<usize> = self
            .headers
            .iter()
            .map(|header| header.label.chars().count() + 2)
            .collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(&row.cells) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        let _ = writeln!(out, "{}", self.label);
        let header_line: Vec<String> = self
            .headers
            .iter()
            .zip(&widths)
            .map(|(header, width)| {
                let marker = match header.sorted {
                    Some(SortDirection::Ascending) => " ^",
                    Some(SortDirection::Descending) => " v",
                    None => "",
                };
                pad(&format!("{}{marker}", header.label), *width)
            })
            .collect();
        let _ = writeln!(out, "  # | {}", header_line.join(" | "));
        for (index, row) in self.rows.iter().enumerate() {
            let cells: Vec<String> = row
                .cells
                .iter()
                .zip(&widths)
                .map(|(cell, width)| pad(cell, *width))
                .collect();
            let _ = writeln!(out, "{:>3} | {}", index + 1, cells.join(" | "));
        }
        if self.rows.is_empty() {
            let _ = writeln!(out, "    (no documents)");
        }
        if let Some(label) = self.loading_indicator {
            let _ = writeln!(out, "[{label}]");
        }
        if let Some(error) = &self.error {
            let _ = writeln!(out, "error: {error}");
        }
        let controls: Vec<String> = self
            .page_controls
            .iter()
            .map(|control| {
                if control.current {
                    format!("[{}]", control.page)
                } else {
                    control.page.to_string()
                }
            })
            .collect();
        let _ = writeln!(out, "pages: {}", controls.join(" "));
        out
    }
}

fn pad(text: &str, width: usize) -> String {
    format!("{text:<width$}")
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
