//! Spreadsheet grid readers
//!
//! Loads csv and xlsx sources into a uniform cell grid so the header
//! normalization pass can work over either format. The xlsx path reads
//! the first worksheet plus the shared-strings table directly from the
//! OOXML archive.

use std::io::Read;
use std::path::Path;

use crate::core::{Result, TableqaError};

/// Maximum decompressed bytes to read from a single ZIP entry
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

/// One spreadsheet cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Missing or blank cell
    Empty,
    /// Text content
    Text(String),
    /// Numeric content
    Number(f64),
}

/// The type tag of a cell, used for header/data boundary signatures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Text,
    Number,
}

impl Cell {
    /// Parse a raw field: empty stays empty, numerics become numbers
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Cell::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(n) => Cell::Number(n),
            Err(_) => Cell::Text(trimmed.to_string()),
        }
    }

    /// The cell's type tag, None for empty cells
    pub fn kind(&self) -> Option<CellKind> {
        match self {
            Cell::Empty => None,
            Cell::Text(_) => Some(CellKind::Text),
            Cell::Number(_) => Some(CellKind::Number),
        }
    }

    /// Render the cell as display text (empty string for blanks)
    pub fn text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
        }
    }
}

/// A rectangular grid of cells read from a spreadsheet
#[derive(Debug, Clone)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
    cols: usize,
}

impl Grid {
    /// Build a grid from raw rows, padding every row to the widest
    pub fn new(mut rows: Vec<Vec<Cell>>) -> Self {
        let cols = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(cols, Cell::Empty);
        }
        Self { rows, cols }
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns
    pub fn col_count(&self) -> usize {
        self.cols
    }

    /// Cell at (row, col); Empty outside the grid
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&Cell::Empty)
    }

    /// Trimmed display text at (row, col)
    pub fn text(&self, row: usize, col: usize) -> String {
        self.cell(row, col).text()
    }

    /// Sequence of non-empty cell type tags for one row, from `start_col`
    pub fn type_signature(&self, row: usize, start_col: usize) -> Vec<CellKind> {
        (start_col..self.cols)
            .filter_map(|col| self.cell(row, col).kind())
            .collect()
    }

    /// Parse CSV text into a grid
    pub fn from_csv_str(content: &str) -> Self {
        let rows = content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| parse_csv_record(line).iter().map(|f| Cell::parse(f)).collect())
            .collect();
        Self::new(rows)
    }

    /// Read a CSV file into a grid
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_csv_str(&content))
    }

    /// Read the first worksheet of an xlsx file into a grid
    pub fn from_xlsx_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes.as_slice()))
            .map_err(|e| TableqaError::ingestion(format!("not a valid xlsx archive: {}", e)))?;

        let shared = read_shared_strings(&mut archive)?;
        let sheet_name = first_worksheet_name(&mut archive)?;
        let sheet_xml = read_zip_entry(&mut archive, &sheet_name)?;
        read_sheet_grid(&sheet_xml, &shared)
    }
}

/// Parse one CSV record, honoring double-quoted fields with embedded
/// commas and `""` escapes.
pub fn parse_csv_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.is_empty() => in_quotes = true,
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut field));
            }
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}

/// Render one CSV record, quoting fields that need it
pub fn render_csv_record(fields: &[String]) -> String {
    fields
        .iter()
        .map(|f| {
            if f.contains(',') || f.contains('"') || f.contains('\n') {
                format!("\"{}\"", f.replace('"', "\"\""))
            } else {
                f.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

type XlsxArchive<'a> = zip::ZipArchive<std::io::Cursor<&'a [u8]>>;

fn read_zip_entry(archive: &mut XlsxArchive<'_>, name: &str) -> Result<Vec<u8>> {
    let entry = archive
        .by_name(name)
        .map_err(|e| TableqaError::ingestion(format!("missing xlsx entry {}: {}", name, e)))?;
    let mut out = Vec::new();
    entry
        .take(MAX_XML_ENTRY_BYTES)
        .read_to_end(&mut out)
        .map_err(|e| TableqaError::ingestion(format!("failed reading {}: {}", name, e)))?;
    if out.len() as u64 >= MAX_XML_ENTRY_BYTES {
        return Err(TableqaError::ingestion(format!(
            "xlsx entry {} exceeds size limit",
            name
        )));
    }
    Ok(out)
}

fn first_worksheet_name(archive: &mut XlsxArchive<'_>) -> Result<String> {
    let mut names: Vec<String> = archive
        .file_names()
        .filter(|n| n.starts_with("xl/worksheets/sheet") && n.ends_with(".xml"))
        .map(|s| s.to_string())
        .collect();
    names.sort_by_key(|name| {
        name.trim_start_matches("xl/worksheets/sheet")
            .trim_end_matches(".xml")
            .parse::<u32>()
            .unwrap_or(u32::MAX)
    });
    names
        .into_iter()
        .next()
        .ok_or_else(|| TableqaError::ingestion("xlsx contains no worksheets"))
}

fn read_shared_strings(archive: &mut XlsxArchive<'_>) -> Result<Vec<String>> {
    // Workbooks without string cells omit the shared-strings part entirely.
    if archive.by_name("xl/sharedStrings.xml").is_err() {
        return Ok(Vec::new());
    }
    let xml = read_zip_entry(archive, "xl/sharedStrings.xml")?;

    let mut strings = Vec::new();
    let mut reader = quick_xml::Reader::from_reader(xml.as_slice());
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut in_si = false;
    let mut current = String::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) => {
                if e.local_name().as_ref() == b"si" {
                    in_si = true;
                    current.clear();
                } else if in_si && e.local_name().as_ref() == b"t" {
                    if let Ok(quick_xml::events::Event::Text(te)) = reader.read_event_into(&mut buf)
                    {
                        current.push_str(te.unescape().unwrap_or_default().as_ref());
                    }
                }
            }
            Ok(quick_xml::events::Event::End(e)) => {
                if e.local_name().as_ref() == b"si" {
                    in_si = false;
                    strings.push(std::mem::take(&mut current));
                }
            }
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => {
                return Err(TableqaError::ingestion(format!(
                    "sharedStrings parse error: {}",
                    e
                )))
            }
            _ => {}
        }
        buf.clear();
    }
    Ok(strings)
}

/// Parse a worksheet XML blob into a cell grid.
///
/// Cells carry their address in the `r` attribute (`B3`), so sparse rows
/// are placed correctly and gaps become empty cells.
fn read_sheet_grid(xml: &[u8], shared: &[String]) -> Result<Grid> {
    let mut rows: Vec<Vec<Cell>> = Vec::new();
    let mut reader = quick_xml::Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    let mut cell_pos: Option<(usize, usize)> = None;
    let mut cell_type: Vec<u8> = Vec::new();
    let mut in_v = false;
    let mut in_is_t = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) | Ok(quick_xml::events::Event::Empty(e)) => {
                match e.local_name().as_ref() {
                    b"c" => {
                        cell_pos = None;
                        cell_type = b"n".to_vec();
                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"r" => {
                                    cell_pos = parse_cell_ref(&attr.value);
                                }
                                b"t" => {
                                    cell_type = attr.value.to_vec();
                                }
                                _ => {}
                            }
                        }
                    }
                    b"v" => in_v = true,
                    b"t" => in_is_t = cell_type == b"inlineStr",
                    _ => {}
                }
            }
            Ok(quick_xml::events::Event::Text(te)) if in_v || in_is_t => {
                let raw = te.unescape().unwrap_or_default().into_owned();
                if let Some((row, col)) = cell_pos {
                    let cell = if in_is_t || cell_type == b"str" {
                        Cell::parse(&raw)
                    } else if cell_type == b"s" {
                        match raw.trim().parse::<usize>() {
                            Ok(i) if i < shared.len() => Cell::parse(&shared[i]),
                            _ => Cell::Empty,
                        }
                    } else {
                        Cell::parse(&raw)
                    };
                    place_cell(&mut rows, row, col, cell);
                }
                in_v = false;
                in_is_t = false;
            }
            Ok(quick_xml::events::Event::End(e)) => match e.local_name().as_ref() {
                b"v" => in_v = false,
                b"t" => in_is_t = false,
                _ => {}
            },
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => {
                return Err(TableqaError::ingestion(format!(
                    "worksheet parse error: {}",
                    e
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(Grid::new(rows))
}

fn place_cell(rows: &mut Vec<Vec<Cell>>, row: usize, col: usize, cell: Cell) {
    if rows.len() <= row {
        rows.resize_with(row + 1, Vec::new);
    }
    let r = &mut rows[row];
    if r.len() <= col {
        r.resize(col + 1, Cell::Empty);
    }
    r[col] = cell;
}

/// Parse an A1-style cell reference into (row, col), both 0-based
fn parse_cell_ref(reference: &[u8]) -> Option<(usize, usize)> {
    let text = std::str::from_utf8(reference).ok()?;
    let split = text.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = text.split_at(split);

    let mut col = 0usize;
    for c in letters.chars() {
        let c = c.to_ascii_uppercase();
        if !c.is_ascii_uppercase() {
            return None;
        }
        col = col * 26 + (c as usize - 'A' as usize + 1);
    }
    let row: usize = digits.parse().ok()?;
    if col == 0 || row == 0 {
        return None;
    }
    Some((row - 1, col - 1))
}
