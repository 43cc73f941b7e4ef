//! Format-specific document loaders
//!
//! Turns heterogeneous source files into per-source document texts, then
//! into overlapping chunks. Tabular sources become one document per data
//! row in `header: value` form so each row survives retrieval as a
//! self-describing record. Unsupported extensions are skipped with a
//! warning, never a failure.

use std::path::Path;

use tracing::warn;

use crate::core::{Result, TableqaError};
use crate::retrieval::chunk::{split_text, DocumentChunk};
use crate::table::grid::Grid;
use crate::table::headers::{structure_headers, NormalizedTable};

/// Load one source file into a sequence of document texts
pub fn load_documents(path: &Path) -> Result<Vec<String>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    match extension.as_str() {
        "csv" => load_csv(path),
        "txt" => load_txt(path),
        "json" => load_json(path),
        "xlsx" => load_xlsx(path),
        other => Err(TableqaError::ingestion(format!(
            "unsupported extension: .{}",
            other
        ))),
    }
}

/// Whether the loader recognizes this path's extension
pub fn is_supported(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str(),
        "csv" | "txt" | "json" | "xlsx"
    )
}

fn load_csv(path: &Path) -> Result<Vec<String>> {
    let grid = Grid::from_csv_path(path)?;
    if grid.row_count() < 2 {
        return Ok(Vec::new());
    }
    let headers: Vec<String> = (0..grid.col_count()).map(|c| grid.text(0, c)).collect();
    Ok(row_documents(&headers, (1..grid.row_count()).map(|row| {
        (0..grid.col_count())
            .map(|col| grid.text(row, col))
            .collect()
    })))
}

fn load_txt(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)?;
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(vec![text])
}

fn load_json(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&text)?;
    match value {
        serde_json::Value::Array(items) => Ok(items
            .iter()
            .map(|item| item.to_string())
            .filter(|s| !s.is_empty())
            .collect()),
        other => Ok(vec![other.to_string()]),
    }
}

fn load_xlsx(path: &Path) -> Result<Vec<String>> {
    let grid = Grid::from_xlsx_path(path)?;
    let flattened = structure_headers(&grid, 1, 1);
    let table = NormalizedTable::from_grid(&grid, &flattened);
    Ok(row_documents(
        &table.headers,
        table.rows.iter().cloned(),
    ))
}

/// Render data rows as `header: value` documents, one per row
fn row_documents(
    headers: &[String],
    rows: impl Iterator<Item = Vec<String>>,
) -> Vec<String> {
    rows.map(|row| {
        headers
            .iter()
            .zip(row.iter())
            .map(|(h, v)| format!("{}: {}", h, v))
            .collect::<Vec<_>>()
            .join("\n")
    })
    .filter(|doc| !doc.trim().is_empty())
    .collect()
}

/// Load a source and split its documents into chunks.
///
/// Returns None (after logging) for unsupported extensions or unreadable
/// sources so ingestion can continue with the rest of the corpus.
pub fn load_and_chunk(path: &Path, window: usize, overlap: usize) -> Option<Vec<DocumentChunk>> {
    if !is_supported(path) {
        warn!(path = %path.display(), "unsupported path type, skipping");
        return None;
    }

    match load_documents(path) {
        Ok(documents) => {
            let source = path.to_string_lossy();
            let chunks = documents
                .iter()
                .flat_map(|doc| split_text(&source, doc, window, overlap))
                .collect();
            Some(chunks)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to process path, skipping");
            None
        }
    }
}
