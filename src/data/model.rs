use std::collections::BTreeSet;
use std::fmt;

// ---------------------------------------------------------------------------
// CellValue – a single cell of a column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring the common dataframe dtypes.
/// Category sets are `BTreeSet`s downstream, so `CellValue` must be `Ord`.
#[derive(Debug, Clone)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --
// Equality follows `cmp`: floats compare by `total_cmp`, so NaN equals NaN.

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

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
                Bool(_) => 0,
                Integer(_) => 1,
                Float(_) => 2,
                String(_) => 3,
                Null => 4,
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
            (String(a), String(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) => s.hash(state),
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
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) if v.is_nan() => write!(f, "nan"),
            CellValue::Float(v) if v.fract() == 0.0 && v.is_finite() => write!(f, "{v:.1}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            CellValue::Null => write!(f, "nan"),
        }
    }
}

impl CellValue {
    /// Interpret the value as an `f64` for modeling and plotting.
    /// Booleans map to 1.0 / 0.0; nulls and strings have no numeric value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Float(v) => v.is_nan(),
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Column – one named column of the table
// ---------------------------------------------------------------------------

/// Storage kind inferred for a column when the file is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Float,
    Boolean,
    Text,
}

impl ColumnKind {
    /// `Integer` and `Float` count as numeric storage; booleans do not.
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnKind::Integer | ColumnKind::Float)
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnKind::Integer => "int64",
            ColumnKind::Float => "float64",
            ColumnKind::Boolean => "bool",
            ColumnKind::Text => "object",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub values: Vec<CellValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnKind, values: Vec<CellValue>) -> Self {
        Column {
            name: name.into(),
            kind,
            values,
        }
    }

    /// Sorted set of distinct values; every null-like cell collapses to `Null`.
    pub fn unique_values(&self) -> BTreeSet<CellValue> {
        self.values
            .iter()
            .map(|v| if v.is_null() { CellValue::Null } else { v.clone() })
            .collect()
    }

    /// Numeric view of the column. Cells without a numeric value become NaN.
    pub fn to_f64(&self) -> Vec<f64> {
        self.values
            .iter()
            .map(|v| v.as_f64().unwrap_or(f64::NAN))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Table – the complete loaded dataset
// ---------------------------------------------------------------------------

/// Column-oriented table. All columns have the same length.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    /// Build a table from columns of equal length.
    pub fn from_columns(columns: Vec<Column>) -> Option<Self> {
        let n_rows = columns.first().map_or(0, |c| c.values.len());
        if columns.iter().any(|c| c.values.len() != n_rows) {
            return None;
        }
        Some(Table { columns, n_rows })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.n_rows
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Ordered column names.
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Append a column. Fails (returning the column) on a name clash or a
    /// length mismatch.
    pub fn push_column(&mut self, column: Column) -> Result<(), Column> {
        let len_ok = self.columns.is_empty() || column.values.len() == self.n_rows;
        if !len_ok || self.has_column(&column.name) {
            return Err(column);
        }
        if self.columns.is_empty() {
            self.n_rows = column.values.len();
        }
        self.columns.push(column);
        Ok(())
    }

    /// Remove the named columns, keeping the row count.
    pub fn drop_columns(&mut self, names: &[String]) {
        self.columns.retain(|c| !names.contains(&c.name));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_col(name: &str, vals: &[i64]) -> Column {
        Column::new(
            name,
            ColumnKind::Integer,
            vals.iter().map(|&v| CellValue::Integer(v)).collect(),
        )
    }

    #[test]
    fn from_columns_rejects_ragged_columns() {
        let ok = Table::from_columns(vec![int_col("a", &[1, 2]), int_col("b", &[3, 4])]);
        assert_eq!(ok.map(|t| t.len()), Some(2));

        let ragged = Table::from_columns(vec![int_col("a", &[1, 2]), int_col("b", &[3])]);
        assert!(ragged.is_none());
    }

    #[test]
    fn push_column_rejects_duplicate_names() {
        let mut table = Table::from_columns(vec![int_col("a", &[1, 2])]).unwrap();
        assert!(table.push_column(int_col("a", &[5, 6])).is_err());
        assert!(table.push_column(int_col("b", &[5])).is_err());
        assert!(table.push_column(int_col("b", &[5, 6])).is_ok());
        assert_eq!(table.column_names(), vec!["a", "b"]);
    }

    #[test]
    fn drop_columns_keeps_row_count() {
        let mut table =
            Table::from_columns(vec![int_col("a", &[1, 2, 3]), int_col("b", &[4, 5, 6])]).unwrap();
        table.drop_columns(&["a".to_string()]);
        assert_eq!(table.column_names(), vec!["b"]);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn unique_values_collapse_nulls() {
        let col = Column::new(
            "f",
            ColumnKind::Float,
            vec![
                CellValue::Float(1.5),
                CellValue::Float(f64::NAN),
                CellValue::Null,
                CellValue::Float(1.5),
            ],
        );
        let uniq: Vec<_> = col.unique_values().into_iter().collect();
        assert_eq!(uniq, vec![CellValue::Float(1.5), CellValue::Null]);
    }

    #[test]
    fn equality_agrees_with_ordering_and_hash() {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let hash = |v: &CellValue| {
            let mut h = DefaultHasher::new();
            v.hash(&mut h);
            h.finish()
        };

        let nan = CellValue::Float(f64::NAN);
        assert_eq!(nan, CellValue::Float(f64::NAN));
        assert_eq!(nan.cmp(&CellValue::Float(f64::NAN)), std::cmp::Ordering::Equal);
        assert_eq!(hash(&nan), hash(&CellValue::Float(f64::NAN)));

        assert_ne!(nan, CellValue::Null);
        assert_ne!(CellValue::Integer(1), CellValue::Float(1.0));
        assert_eq!(CellValue::Float(2.5), CellValue::Float(2.5));
    }

    #[test]
    fn display_matches_dataframe_conventions() {
        assert_eq!(CellValue::Float(2.0).to_string(), "2.0");
        assert_eq!(CellValue::Float(2.25).to_string(), "2.25");
        assert_eq!(CellValue::Bool(true).to_string(), "True");
        assert_eq!(CellValue::Null.to_string(), "nan");
    }
}
