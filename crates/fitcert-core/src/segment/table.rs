//! Table recognition: HTML `<table>` blocks and markdown pipe tables.

use tracing::debug;

use crate::certificate::rules::patterns;

/// What a recognized table is about, inferred from its header text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableType {
    MedicalTests,
    FitnessDeclaration,
    Restrictions,
    ExaminationType,
    Unknown,
}

/// A recognized table, flattened to trimmed cell text.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub table_type: TableType,
    /// The raw block the table was recognized from.
    pub original_form: String,
}

impl Table {
    /// Index of the first column whose header contains `keyword`
    /// (case-insensitive).
    pub fn column_by_header(&self, keyword: &str) -> Option<usize> {
        let keyword = keyword.to_lowercase();
        self.headers
            .iter()
            .position(|h| h.to_lowercase().contains(&keyword))
    }
}

/// Recognizes every HTML and pipe table in `text`, in document order
/// (HTML tables first, matching the scan order of the source passes).
pub fn extract_tables(text: &str) -> Vec<Table> {
    let mut tables = Vec::new();
    for m in patterns::HTML_TABLE.find_iter(text) {
        if let Some(table) = parse_html_table(m.as_str()) {
            tables.push(table);
        }
    }
    for caps in patterns::PIPE_TABLE.captures_iter(text) {
        if let Some(table) = parse_pipe_table(&caps) {
            tables.push(table);
        }
    }
    debug!(count = tables.len(), "recognized tables");
    tables
}

fn parse_html_table(block: &str) -> Option<Table> {
    let mut headers = Vec::new();
    let mut rows = Vec::new();
    for row_caps in patterns::HTML_TABLE_ROW.captures_iter(block) {
        let row_html = row_caps.get(1)?.as_str();
        let header_cells: Vec<String> = patterns::HTML_TABLE_HEADER
            .captures_iter(row_html)
            .filter_map(|c| c.get(1))
            .map(|m| flatten_cell(m.as_str()))
            .collect();
        if !header_cells.is_empty() {
            if headers.is_empty() {
                headers = header_cells;
            }
            continue;
        }
        let cells: Vec<String> = patterns::HTML_TABLE_CELL
            .captures_iter(row_html)
            .filter_map(|c| c.get(1))
            .map(|m| flatten_cell(m.as_str()))
            .collect();
        if !cells.is_empty() {
            rows.push(cells);
        }
    }
    if headers.is_empty() && rows.is_empty() {
        return None;
    }
    let table_type = infer_table_type(&headers, &rows);
    Some(Table {
        headers,
        rows,
        table_type,
        original_form: block.to_string(),
    })
}

fn parse_pipe_table(caps: &regex::Captures<'_>) -> Option<Table> {
    let headers = split_pipe_row(caps.get(1)?.as_str());
    let rows: Vec<Vec<String>> = caps
        .get(3)?
        .as_str()
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with('|'))
        .map(|line| split_pipe_row(line.trim_matches('|')))
        .filter(|cells| !cells.iter().all(String::is_empty))
        .collect();
    if rows.is_empty() {
        return None;
    }
    let table_type = infer_table_type(&headers, &rows);
    Some(Table {
        headers,
        rows,
        table_type,
        original_form: caps.get(0).map(|m| m.as_str().to_string()).unwrap_or_default(),
    })
}

fn split_pipe_row(row: &str) -> Vec<String> {
    row.split('|').map(|cell| cell.trim().to_string()).collect()
}

fn flatten_cell(cell: &str) -> String {
    let stripped = patterns::HTML_TAG.replace_all(cell, " ");
    patterns::WHITESPACE_RUN
        .replace_all(&stripped, " ")
        .trim()
        .to_string()
}

/// Header-keyword classification, first hit wins:
/// medicalTests → fitnessDeclaration → restrictions → examinationType.
/// Falls back to the first data row when there are no headers.
fn infer_table_type(headers: &[String], rows: &[Vec<String>]) -> TableType {
    let mut probe = headers.join(" ").to_lowercase();
    if probe.trim().is_empty() {
        if let Some(first) = rows.first() {
            probe = first.join(" ").to_lowercase();
        }
    }
    if probe.contains("test") && (probe.contains("done") || probe.contains("result")) {
        TableType::MedicalTests
    } else if probe.contains("fit") {
        TableType::FitnessDeclaration
    } else if probe.contains("restriction") {
        TableType::Restrictions
    } else if probe.contains("pre-employment")
        || probe.contains("pre employment")
        || probe.contains("periodical")
        || probe.contains("exit")
    {
        TableType::ExaminationType
    } else {
        TableType::Unknown
    }
}
