//! Fixed-width pipe tables.
//!
//! Rendering pads every cell to its column width so that all rows, the
//! header and the separator have the same length. Parsing reads such a
//! table back (including tables a human edited by hand).

use std::collections::HashMap;

/// A record that can be projected onto table columns.
pub trait TableRow {
    /// Text for `column`; `None` renders as an empty cell.
    fn cell(&self, column: &str) -> Option<String>;
}

impl TableRow for HashMap<String, String> {
    fn cell(&self, column: &str) -> Option<String> {
        self.get(column).cloned()
    }
}

/// Renders `rows` as a markdown table with the given column order.
///
/// Zero rows still yield a header and a separator.
pub fn render_table<R: TableRow>(rows: &[R], columns: &[&str]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|c| escape_cell(&row.cell(c).unwrap_or_default()))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, header)| {
            cells
                .iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let header: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();

    let mut lines = Vec::with_capacity(cells.len() + 2);
    lines.push(format_row(&header, &widths));
    lines.push(format_row(&separator, &widths));
    lines.extend(cells.iter().map(|r| format_row(r, &widths)));
    lines.join("\n")
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, w)| format!("{cell:<w$}", w = *w))
        .collect();
    format!("| {} |", padded.join(" | "))
}

// Pipes would split the cell on the way back in; newlines would end the row.
fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|").replace(['\r', '\n'], " ")
}

/// Parses the first pipe table found in `text`.
///
/// The first pipe row is the header; separator rows are skipped. Each data
/// row becomes a map from header label to trimmed cell text.
pub fn parse_table(text: &str) -> Vec<HashMap<String, String>> {
    let mut header: Option<Vec<String>> = None;
    let mut rows = Vec::new();

    for line in text.lines().map(str::trim) {
        if !line.starts_with('|') {
            if header.is_some() {
                break;
            }
            continue;
        }

        let cells = split_row(line);
        if is_separator(&cells) {
            continue;
        }

        match &header {
            None => header = Some(cells),
            Some(labels) => rows.push(
                labels
                    .iter()
                    .cloned()
                    .zip(cells.into_iter().chain(std::iter::repeat(String::new())))
                    .collect(),
            ),
        }
    }

    rows
}

fn split_row(line: &str) -> Vec<String> {
    let inner = line.strip_prefix('|').unwrap_or(line);
    let inner = match inner.strip_suffix('|') {
        Some(rest) if !rest.ends_with('\\') => rest,
        _ => inner,
    };

    let mut cells = Vec::new();
    let mut current = String::new();
    let mut chars = inner.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' if chars.peek() == Some(&'|') => {
                current.push('|');
                chars.next();
            }
            '|' => cells.push(std::mem::take(&mut current).trim().to_string()),
            _ => current.push(ch),
        }
    }
    cells.push(current.trim().to_string());
    cells
}

fn is_separator(cells: &[String]) -> bool {
    cells.iter().any(|c| !c.is_empty())
        && cells
            .iter()
            .all(|c| !c.is_empty() && c.chars().all(|ch| ch == '-' || ch == ':'))
}
