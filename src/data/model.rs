use std::collections::BTreeSet;
use std::fmt;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the loaded table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common spreadsheet dtypes.
/// Using `BTreeMap` / `BTreeSet` downstream so `CellValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// Date or datetime kept as its formatted text.
    Date(String),
    /// Missing value (empty cell, `null`, spreadsheet error).
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
                Date(_) => 5,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) | (Date(a), Date(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) | CellValue::Date(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => write!(f, "<null>"),
            other => write!(f, "{}", other.to_text().unwrap_or_default()),
        }
    }
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Coerce the cell to text for tokenization. `Null` has no text.
    ///
    /// Whole floats keep a trailing `.0` so `3.0` and `3` stay distinguishable.
    pub fn to_text(&self) -> Option<String> {
        match self {
            CellValue::String(s) | CellValue::Date(s) => Some(s.clone()),
            CellValue::Integer(i) => Some(i.to_string()),
            CellValue::Float(v) if v.is_finite() && v.fract() == 0.0 => Some(format!("{v:.1}")),
            CellValue::Float(v) => Some(v.to_string()),
            CellValue::Bool(b) => Some(if *b { "True" } else { "False" }.to_string()),
            CellValue::Null => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Table – the complete loaded sheet
// ---------------------------------------------------------------------------

/// Rows × named columns, immutable once loaded.
///
/// Every row holds exactly one cell per column; column names are unique.
#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Build a table from a raw header row and body rows.
    ///
    /// Header names are normalized (see [`normalize_headers`]); short rows are
    /// padded with `Null` and long rows truncated to the header width.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let columns = normalize_headers(headers);
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Null);
                row
            })
            .collect();
        Table { columns, rows }
    }

    /// Ordered column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Cell at `row` in the named column.
    pub fn cell(&self, row: usize, column: &str) -> Option<&CellValue> {
        let col = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[col])
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Make header names usable as unique column keys.
///
/// Blank names become `Unnamed: <index>`; repeated names get `.1`, `.2`, …
pub fn normalize_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut out = Vec::with_capacity(headers.len());

    for (i, raw) in headers.into_iter().enumerate() {
        let trimmed = raw.trim();
        let base = if trimmed.is_empty() {
            format!("Unnamed: {i}")
        } else {
            trimmed.to_string()
        };

        let mut name = base.clone();
        let mut suffix = 1;
        while seen.contains(&name) {
            name = format!("{base}.{suffix}");
            suffix += 1;
        }
        seen.insert(name.clone());
        out.push(name);
    }
    out
}
