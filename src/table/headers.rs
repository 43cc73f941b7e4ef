//! Header normalization for multi-row / multi-column header blocks
//!
//! Raw statistical spreadsheets often carry a header block spanning several
//! rows (merged cells, grouped measures) and lead with more than one index
//! column. This module finds the header/data boundary, flattens each
//! column's header fragments into a single `A-B-C` string, and optionally
//! merges leading index columns into one composite key column.

use crate::table::grid::{Cell, Grid};

/// Result of the boundary scan and flatten pass
#[derive(Debug, Clone)]
pub struct FlattenedHeaders {
    /// One flat header per column, fragments joined with `-`
    pub headers: Vec<String>,
    /// Index of the first data row
    pub data_start_row: usize,
}

/// Scan for the header/data boundary and flatten the header block.
///
/// `start_row` and `start_col` are 1-based, matching how analysts count
/// spreadsheet rows. The first row whose non-empty type signature equals
/// its successor's is the first data row; everything above is header. When
/// no two adjacent rows agree, the penultimate row is treated as the
/// boundary (a single row of data).
pub fn structure_headers(grid: &Grid, start_row: usize, start_col: usize) -> FlattenedHeaders {
    let start_row = start_row.saturating_sub(1);
    let start_col = start_col.saturating_sub(1);
    let rows = grid.row_count();

    let mut data_start_row = None;
    for row in start_row..rows.saturating_sub(1) {
        let current = grid.type_signature(row, start_col);
        let next = grid.type_signature(row + 1, start_col);
        if !current.is_empty() && current == next {
            data_start_row = Some(row);
            break;
        }
    }
    let data_start_row = data_start_row.unwrap_or(rows.saturating_sub(1));

    FlattenedHeaders {
        headers: flatten_header_block(grid, data_start_row),
        data_start_row,
    }
}

/// Flatten the first `header_rows` rows of a grid into one header per column.
pub fn flatten_header_block(grid: &Grid, header_rows: usize) -> Vec<String> {
    (0..grid.col_count())
        .map(|col| flatten_column(grid, col, header_rows))
        .collect()
}

/// Flatten one column of the header block.
///
/// Reads top-to-bottom carrying the last non-blank cell into blanks
/// (fill-down). A blank cell with an empty carry backfills from the
/// nearest non-blank cell to the left in the same row; if the scan
/// reaches column zero without one, the fragment stays empty. Repeated
/// fragments collapse so merged-cell fills don't duplicate.
fn flatten_column(grid: &Grid, col: usize, header_rows: usize) -> String {
    let mut fragments: Vec<String> = Vec::new();
    let mut carry = String::new();

    for row in 0..header_rows {
        let value = grid.text(row, col);
        if value.is_empty() {
            if carry.is_empty() {
                if let Some(left) = backfill_left(grid, row, col) {
                    fragments.push(left);
                }
            }
            // Non-empty carry: vertical fill-down, nothing new to record.
            continue;
        }
        carry = value.clone();
        fragments.push(value);
    }

    fragments.dedup();
    fragments.retain(|f| !f.trim().is_empty());
    fragments.join("-")
}

/// Nearest non-blank cell to the left of (row, col), scanning to column zero
fn backfill_left(grid: &Grid, row: usize, col: usize) -> Option<String> {
    (0..col).rev().find_map(|c| {
        let text = grid.text(row, c);
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    })
}

/// A materialized table with a flat single-row header
#[derive(Debug, Clone)]
pub struct NormalizedTable {
    /// Flattened column headers
    pub headers: Vec<String>,
    /// Data rows rendered as display text
    pub rows: Vec<Vec<String>>,
}

impl NormalizedTable {
    /// Materialize a normalized table from a grid using flattened headers
    pub fn from_grid(grid: &Grid, flattened: &FlattenedHeaders) -> Self {
        let rows = (flattened.data_start_row..grid.row_count())
            .map(|row| {
                (0..grid.col_count())
                    .map(|col| grid.text(row, col))
                    .collect()
            })
            .collect();

        Self {
            headers: flattened.headers.clone(),
            rows,
        }
    }

    /// Merge the given leading index columns into one composite key column.
    ///
    /// Column headers and per-row values are joined with `-`; the merged
    /// column replaces the originals at position zero. Out-of-range or
    /// too-few columns leave the table unchanged.
    pub fn merge_key_columns(&mut self, columns: &[usize]) {
        if columns.len() < 2 || columns.iter().any(|&c| c >= self.headers.len()) {
            return;
        }

        let merged_header = columns
            .iter()
            .map(|&c| self.headers[c].clone())
            .collect::<Vec<_>>()
            .join("-");

        let mut keep: Vec<usize> = (0..self.headers.len())
            .filter(|i| !columns.contains(i))
            .collect();
        keep.sort_unstable();

        let mut headers = vec![merged_header];
        headers.extend(keep.iter().map(|&i| self.headers[i].clone()));

        let rows = self
            .rows
            .iter()
            .map(|row| {
                let key = columns
                    .iter()
                    .map(|&c| row.get(c).cloned().unwrap_or_default())
                    .collect::<Vec<_>>()
                    .join("-");
                let mut out = vec![key];
                out.extend(keep.iter().map(|&i| row.get(i).cloned().unwrap_or_default()));
                out
            })
            .collect();

        self.headers = headers;
        self.rows = rows;
    }

    /// Distinct non-numeric values of the key (first) column, in first-seen order
    pub fn key_column_values(&self) -> (String, Vec<String>) {
        let header = self.headers.first().cloned().unwrap_or_default();
        let mut seen = std::collections::HashSet::new();
        let values = self
            .rows
            .iter()
            .filter_map(|row| row.first())
            .filter(|v| !v.is_empty() && matches!(Cell::parse(v), Cell::Text(_)))
            .filter(|v| seen.insert((*v).clone()))
            .cloned()
            .collect();
        (header, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::grid::Grid;

    #[test]
    fn test_two_row_header_block_flattens() {
        let grid = Grid::from_csv_str("A,A,B\nx,y,z\n");
        let headers = flatten_header_block(&grid, 2);
        assert_eq!(headers, vec!["A-x", "A-y", "B-z"]);
    }

    #[test]
    fn test_single_row_header_boundary() {
        let grid = Grid::from_csv_str("name,count\nalpha,1\nbeta,2\n");
        let flattened = structure_headers(&grid, 1, 1);
        assert_eq!(flattened.headers, vec!["name", "count"]);
        assert_eq!(flattened.data_start_row, 1);
    }

    #[test]
    fn test_multi_row_header_boundary() {
        // Header rows have differing non-empty counts; the first pair of
        // matching signatures is the numeric data block.
        let grid =
            Grid::from_csv_str("period,value,,\n,total,part,share\nq1,10,4,6\nq2,11,5,6\n");
        let flattened = structure_headers(&grid, 1, 1);
        assert_eq!(flattened.data_start_row, 2);
        assert_eq!(flattened.headers[0], "period");
        assert_eq!(flattened.headers[1], "value-total");
    }

    #[test]
    fn test_no_boundary_defaults_to_penultimate() {
        // No two adjacent rows share a type signature.
        let grid = Grid::from_csv_str("title,,\nperiod,region,total\nq1,north,9\n");
        let flattened = structure_headers(&grid, 1, 1);
        assert_eq!(flattened.data_start_row, 2);
    }

    #[test]
    fn test_fill_down_does_not_duplicate() {
        // Vertically merged "output" spans two header rows in column 1.
        let grid = Grid::from_csv_str("region,output\n,\nnorth,10\nsouth,20\n");
        let flattened = structure_headers(&grid, 1, 1);
        assert_eq!(flattened.data_start_row, 2);
        assert_eq!(flattened.headers[1], "output");
    }

    #[test]
    fn test_leftward_backfill() {
        // Columns 2 and 3 start blank and inherit "value" from the left
        // before appending their own second-row fragments.
        let grid =
            Grid::from_csv_str("period,value,,\n,total,part,share\nq1,10,4,6\nq2,11,5,6\n");
        let flattened = structure_headers(&grid, 1, 1);
        assert_eq!(flattened.headers[2], "value-part");
        assert_eq!(flattened.headers[3], "value-share");
    }

    #[test]
    fn test_backfill_exhausted_leaves_fragment_empty() {
        let grid = Grid::from_csv_str(",metric,\n,count,sub\nx,1,2\ny,3,4\n");
        let flattened = structure_headers(&grid, 1, 1);
        assert_eq!(flattened.headers[0], "");
    }

    #[test]
    fn test_merge_key_columns() {
        let grid = Grid::from_csv_str("period,region,total\nq1,north,9\nq2,south,8\n");
        let flattened = structure_headers(&grid, 1, 1);
        let mut table = NormalizedTable::from_grid(&grid, &flattened);
        table.merge_key_columns(&[0, 1]);

        assert_eq!(table.headers, vec!["period-region", "total"]);
        assert_eq!(table.rows[0], vec!["q1-north", "9"]);
        assert_eq!(table.rows[1], vec!["q2-south", "8"]);
    }

    #[test]
    fn test_key_column_values_distinct_text_only() {
        let grid = Grid::from_csv_str("region,total\nnorth,9\nsouth,8\nnorth,7\n");
        let flattened = structure_headers(&grid, 1, 1);
        let table = NormalizedTable::from_grid(&grid, &flattened);
        let (header, values) = table.key_column_values();
        assert_eq!(header, "region");
        assert_eq!(values, vec!["north", "south"]);
    }
}
