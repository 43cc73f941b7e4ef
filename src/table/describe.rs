//! Corpus preprocessing and description
//!
//! Walks a data directory, normalizes every spreadsheet (xlsx headers are
//! flattened and written as a sibling csv), then renders one description
//! block per table: name, flat headers, and the distinct values of the key
//! column. The concatenated blocks become the data-description section of
//! the reasoning prompt.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::core::Result;
use crate::table::grid::{render_csv_record, Grid};
use crate::table::headers::{structure_headers, NormalizedTable};

/// Leading index columns merged into the composite key, by position
const KEY_COLUMNS: [usize; 2] = [0, 1];

/// Recursively collect all file paths under a directory
pub fn collect_file_paths(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    collect_into(dir, &mut paths)?;
    paths.sort();
    Ok(paths)
}

fn collect_into(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_into(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}

/// Normalize every xlsx under `dir` into a sibling csv with flattened
/// headers and a composite key column, then describe every csv found.
///
/// Per-file failures are logged and skipped; the description covers
/// whatever succeeded.
pub fn preprocess_tables(dir: &Path) -> Result<String> {
    for path in collect_file_paths(dir)? {
        if path.extension().and_then(|e| e.to_str()) == Some("xlsx") {
            if let Err(e) = normalize_xlsx(&path) {
                warn!(path = %path.display(), error = %e, "skipping spreadsheet");
            }
        }
    }

    let mut blocks = Vec::new();
    for path in collect_file_paths(dir)? {
        if path.extension().and_then(|e| e.to_str()) != Some("csv") {
            continue;
        }
        match describe_csv(&path) {
            Ok(block) => blocks.push(block),
            Err(e) => warn!(path = %path.display(), error = %e, "skipping table description"),
        }
    }

    Ok(blocks.join("\n"))
}

/// Flatten an xlsx's header block and write the normalized table as a
/// sibling `.csv`. Returns the path of the csv written.
pub fn normalize_xlsx(path: &Path) -> Result<PathBuf> {
    let grid = Grid::from_xlsx_path(path)?;
    let flattened = structure_headers(&grid, 1, 1);
    let mut table = NormalizedTable::from_grid(&grid, &flattened);
    table.merge_key_columns(&KEY_COLUMNS);

    let csv_path = path.with_extension("csv");
    let mut lines = Vec::with_capacity(table.rows.len() + 1);
    lines.push(render_csv_record(&table.headers));
    for row in &table.rows {
        lines.push(render_csv_record(row));
    }
    fs::write(&csv_path, lines.join("\n"))?;
    Ok(csv_path)
}

/// Render one description block for a normalized csv table
pub fn describe_csv(path: &Path) -> Result<String> {
    let grid = Grid::from_csv_path(path)?;
    let flattened = crate::table::headers::FlattenedHeaders {
        headers: (0..grid.col_count()).map(|c| grid.text(0, c)).collect(),
        data_start_row: 1,
    };
    let table = NormalizedTable::from_grid(&grid, &flattened);

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let headers = table
        .headers
        .iter()
        .map(|h| h.replace(' ', ""))
        .collect::<Vec<_>>()
        .join("; ");
    let (key_header, key_values) = table.key_column_values();

    Ok(format!(
        "Table: {}\nHeaders: {}\nKey column:\n{}: {}\n",
        name,
        headers,
        key_header,
        key_values.join(";")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_describe_csv_block() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.csv");
        fs::write(
            &path,
            "period-region,total\n2023-north,9\n2023-south,8\n2024-north,7\n",
        )
        .unwrap();

        let block = describe_csv(&path).unwrap();
        assert!(block.starts_with("Table: output.csv\n"));
        assert!(block.contains("Headers: period-region; total"));
        assert!(block.contains("period-region: 2023-north;2023-south;2024-north"));
    }

    #[test]
    fn test_preprocess_skips_unreadable_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("good.csv"), "region,total\nnorth,1\n").unwrap();
        // An xlsx that is not a zip archive must be skipped, not fatal.
        fs::write(dir.path().join("broken.xlsx"), "not a zip").unwrap();

        let description = preprocess_tables(dir.path()).unwrap();
        assert!(description.contains("Table: good.csv"));
        assert!(!description.contains("broken"));
    }

    #[test]
    fn test_collect_file_paths_recursive() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("a.csv"), "x\n1\n").unwrap();
        fs::write(dir.path().join("sub/b.txt"), "hello").unwrap();

        let paths = collect_file_paths(dir.path()).unwrap();
        assert_eq!(paths.len(), 2);
    }
}
