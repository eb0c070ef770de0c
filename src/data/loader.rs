use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use super::model::{CellValue, Column, ColumnKind, Table};
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// File formats
// ---------------------------------------------------------------------------

/// Declared format of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FileFormat {
    /// Comma-delimited text.
    Csv,
    /// Tab-delimited text.
    Txt,
}

impl FileFormat {
    pub const ALL: [FileFormat; 2] = [FileFormat::Csv, FileFormat::Txt];

    pub fn delimiter(self) -> u8 {
        match self {
            FileFormat::Csv => b',',
            FileFormat::Txt => b'\t',
        }
    }

    /// The tag shown in the format selector.
    pub fn tag(self) -> &'static str {
        match self {
            FileFormat::Csv => "CSV",
            FileFormat::Txt => "TXT",
        }
    }

    /// Parse a declared format tag (`"CSV"` or `"TXT"`).
    pub fn from_tag(tag: &str) -> Result<Self, LoadError> {
        match tag {
            "CSV" => Ok(FileFormat::Csv),
            "TXT" => Ok(FileFormat::Txt),
            other => Err(LoadError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Guess the format from a file extension (used for drag-and-drop).
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "csv" => Ok(FileFormat::Csv),
            "txt" | "tsv" => Ok(FileFormat::Txt),
            other => Err(LoadError::UnsupportedFormat(format!(".{other}"))),
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Parse a byte buffer with a declared format tag. Unsupported tags fail
/// before any parsing happens.
pub fn read_tagged(bytes: &[u8], tag: &str) -> Result<Table, LoadError> {
    let format = FileFormat::from_tag(tag)?;
    read_table(bytes, format)
}

/// Parse a delimited byte buffer into a [`Table`].
///
/// The first row is the header. Either the whole buffer parses or an error
/// is returned; there is no partial table.
pub fn read_table(bytes: &[u8], format: FileFormat) -> Result<Table, LoadError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(format.delimiter())
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let raw_headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    if raw_headers.is_empty() {
        return Err(LoadError::NoColumns);
    }
    let headers = dedupe_headers(&raw_headers);
    let n_cols = headers.len();

    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); n_cols];

    for result in reader.records() {
        let record = result?;
        if record.len() > n_cols {
            return Err(LoadError::TooManyFields {
                line: record.position().map_or(0, |p| p.line()),
                expected: n_cols,
                found: record.len(),
            });
        }
        for (col_idx, column) in cells.iter_mut().enumerate() {
            let cell = record.get(col_idx).filter(|s| !is_na(s));
            column.push(cell.map(|s| s.to_string()));
        }
    }

    let columns: Vec<Column> = headers
        .into_iter()
        .zip(cells)
        .map(|(name, raw)| infer_column(name, raw))
        .collect();

    let table = Table::from_columns(columns).ok_or(LoadError::NoColumns)?;
    log::debug!(
        "parsed {} rows x {} columns as {format}",
        table.len(),
        table.n_columns()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// Header handling
// ---------------------------------------------------------------------------

/// Name blank headers `Unnamed: <i>` and suffix repeated names with `.1`,
/// `.2`, ... so every column name is unique.
fn dedupe_headers(raw: &[String]) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(raw.len());

    for (i, name) in raw.iter().enumerate() {
        let base = if name.is_empty() {
            format!("Unnamed: {i}")
        } else {
            name.clone()
        };
        let mut candidate = base.clone();
        let mut suffix = 1;
        while used.contains(&candidate) {
            candidate = format!("{base}.{suffix}");
            suffix += 1;
        }
        used.insert(candidate.clone());
        out.push(candidate);
    }
    out
}

// ---------------------------------------------------------------------------
// Cell typing
// ---------------------------------------------------------------------------

const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn is_na(s: &str) -> bool {
    NA_VALUES.contains(&s)
}

fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Pick the narrowest storage kind that fits every non-missing cell.
fn infer_column(name: String, raw: Vec<Option<String>>) -> Column {
    let present: Vec<&str> = raw.iter().flatten().map(|s| s.trim()).collect();
    let has_missing = present.len() != raw.len();
    let all_present = |f: &dyn Fn(&str) -> bool| !present.is_empty() && present.iter().all(|s| f(s));

    if !has_missing && all_present(&|s: &str| s.parse::<i64>().is_ok()) {
        let values = raw
            .iter()
            .map(|c| {
                c.as_deref()
                    .and_then(|s| s.trim().parse::<i64>().ok())
                    .map_or(CellValue::Null, CellValue::Integer)
            })
            .collect();
        return Column::new(name, ColumnKind::Integer, values);
    }

    if all_present(&|s: &str| s.parse::<f64>().is_ok()) {
        let values = raw
            .iter()
            .map(|c| {
                CellValue::Float(
                    c.as_deref()
                        .and_then(|s| s.trim().parse::<f64>().ok())
                        .unwrap_or(f64::NAN),
                )
            })
            .collect();
        return Column::new(name, ColumnKind::Float, values);
    }

    if !has_missing && all_present(&|s: &str| parse_bool(s).is_some()) {
        let values = raw
            .iter()
            .map(|c| {
                c.as_deref()
                    .and_then(|s| parse_bool(s.trim()))
                    .map_or(CellValue::Null, CellValue::Bool)
            })
            .collect();
        return Column::new(name, ColumnKind::Boolean, values);
    }

    let values = raw
        .into_iter()
        .map(|c| c.map_or(CellValue::Null, CellValue::String))
        .collect();
    Column::new(name, ColumnKind::Text, values)
}
