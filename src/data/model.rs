use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;

use super::error::TableError;

// ---------------------------------------------------------------------------
// CellValue – a single cell of a loaded sheet
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring what spreadsheets and CSV files hold.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// Date or date-time rendered as `YYYY-MM-DD HH:MM:SS`.
    DateTime(String),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet (distinct counts) --

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
                Text(_) => 4,
                DateTime(_) => 5,
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
            (Text(a), Text(b)) | (DateTime(a), DateTime(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

/// Text form used for matching, display and CSV export.
///
/// Missing values render as the empty string; integral floats keep a
/// trailing `.0` so `95.0` and `95` stay distinguishable.
impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) | CellValue::DateTime(s) => f.write_str(s),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 => {
                write!(f, "{v:.1}")
            }
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(true) => f.write_str("True"),
            CellValue::Bool(false) => f.write_str("False"),
            CellValue::Null => Ok(()),
        }
    }
}

impl CellValue {
    /// Borrow the text form when the cell already holds text, allocate otherwise.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            CellValue::Text(s) | CellValue::DateTime(s) => Cow::Borrowed(s.as_str()),
            CellValue::Null => Cow::Borrowed(""),
            other => Cow::Owned(other.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Try to interpret the value as an `f64` for numeric export.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Short type label used in column summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            CellValue::Text(_) => "text",
            CellValue::Integer(_) => "integer",
            CellValue::Float(_) => "float",
            CellValue::Bool(_) => "bool",
            CellValue::DateTime(_) => "datetime",
            CellValue::Null => "empty",
        }
    }
}

// ---------------------------------------------------------------------------
// Column / Table – the loaded sheet
// ---------------------------------------------------------------------------

/// A named column with one value per row.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<CellValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        Column {
            name: name.into(),
            values,
        }
    }
}

/// In-memory table: ordered, uniquely named columns of equal length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    /// Build a table, checking column lengths and name uniqueness.
    pub fn new(columns: Vec<Column>) -> Result<Self, TableError> {
        let n_rows = columns.first().map_or(0, |c| c.values.len());
        let mut seen = BTreeSet::new();
        for col in &columns {
            if col.values.len() != n_rows {
                return Err(TableError::RaggedColumn {
                    column: col.name.clone(),
                    expected: n_rows,
                    found: col.values.len(),
                });
            }
            if !seen.insert(col.name.as_str()) {
                return Err(TableError::DuplicateColumn(col.name.clone()));
            }
        }
        Ok(Table { columns, n_rows })
    }

    /// Build a table from a header and row-major records.
    ///
    /// Short rows are padded with [`CellValue::Null`]; long rows are an error.
    pub fn from_rows(
        header: Vec<String>,
        rows: impl IntoIterator<Item = Vec<CellValue>>,
    ) -> Result<Self, TableError> {
        let width = header.len();
        let mut columns: Vec<Column> = header
            .into_iter()
            .map(|name| Column::new(name, Vec::new()))
            .collect();

        for (row_no, row) in rows.into_iter().enumerate() {
            if row.len() > width {
                return Err(TableError::RowTooLong {
                    row: row_no,
                    expected: width,
                    found: row.len(),
                });
            }
            let found = row.len();
            for (col, value) in columns.iter_mut().zip(row) {
                col.values.push(value);
            }
            for col in &mut columns[found..] {
                col.values.push(CellValue::Null);
            }
        }

        Table::new(columns)
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of columns.
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Cell at (`row`, `col`); panics on out-of-range indices like slice indexing.
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        &self.columns[col].values[row]
    }

    /// Row `row` as an iterator over its cells in column order.
    pub fn row(&self, row: usize) -> impl Iterator<Item = &CellValue> + '_ {
        self.columns.iter().map(move |c| &c.values[row])
    }

    /// New table holding the given rows, in the order given.
    pub fn take_rows(&self, indices: &[usize]) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                values: indices.iter().map(|&i| c.values[i].clone()).collect(),
            })
            .collect();
        Table {
            columns,
            n_rows: indices.len(),
        }
    }

    /// First `n` rows (or all of them when shorter).
    pub fn head(&self, n: usize) -> Table {
        let indices: Vec<usize> = (0..n.min(self.n_rows)).collect();
        self.take_rows(&indices)
    }

    /// Per-column summary: inferred kind, null counts, distinct count, samples.
    pub fn column_info(&self) -> Vec<ColumnInfo> {
        self.columns.iter().map(ColumnInfo::from_column).collect()
    }
}

// ---------------------------------------------------------------------------
// ColumnInfo – summary shown in "info" views
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    /// Kind shared by all non-null cells, `mixed` otherwise, `empty` if none.
    pub kind: &'static str,
    pub non_null: usize,
    pub nulls: usize,
    pub distinct: usize,
    /// Up to three non-null values, in row order.
    pub samples: Vec<String>,
}

impl ColumnInfo {
    fn from_column(col: &Column) -> Self {
        let mut kind: Option<&'static str> = None;
        let mut distinct = BTreeSet::new();
        let mut samples = Vec::new();
        let mut nulls = 0;

        for value in &col.values {
            if value.is_null() {
                nulls += 1;
                continue;
            }
            kind = match kind {
                None => Some(value.kind()),
                Some(k) if k == value.kind() => Some(k),
                Some(_) => Some("mixed"),
            };
            if samples.len() < 3 {
                samples.push(value.to_string());
            }
            distinct.insert(value);
        }

        ColumnInfo {
            name: col.name.clone(),
            kind: kind.unwrap_or("empty"),
            non_null: col.values.len() - nulls,
            nulls,
            distinct: distinct.len(),
            samples,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people() -> Table {
        Table::new(vec![
            Column::new(
                "Name",
                vec![
                    CellValue::Text("Alice Smith".into()),
                    CellValue::Text("Bob Johnson".into()),
                    CellValue::Null,
                ],
            ),
            Column::new(
                "Score",
                vec![
                    CellValue::Integer(95),
                    CellValue::Integer(87),
                    CellValue::Integer(95),
                ],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn display_coerces_values_to_text() {
        assert_eq!(CellValue::Null.to_string(), "");
        assert_eq!(CellValue::Integer(-3).to_string(), "-3");
        assert_eq!(CellValue::Float(95.0).to_string(), "95.0");
        assert_eq!(CellValue::Float(1.25).to_string(), "1.25");
        assert_eq!(CellValue::Bool(true).to_string(), "True");
        assert_eq!(CellValue::Text("x".into()).as_text(), "x");
    }

    #[test]
    fn new_rejects_ragged_and_duplicate_columns() {
        let ragged = Table::new(vec![
            Column::new("a", vec![CellValue::Null]),
            Column::new("b", vec![]),
        ]);
        assert!(matches!(ragged, Err(TableError::RaggedColumn { .. })));

        let dup = Table::new(vec![
            Column::new("a", vec![CellValue::Null]),
            Column::new("a", vec![CellValue::Null]),
        ]);
        assert!(matches!(dup, Err(TableError::DuplicateColumn(name)) if name == "a"));
    }

    #[test]
    fn from_rows_pads_short_rows_and_rejects_long_ones() {
        let table = Table::from_rows(
            vec!["a".into(), "b".into()],
            vec![vec![CellValue::Integer(1)], vec![CellValue::Integer(2), CellValue::Integer(3)]],
        )
        .unwrap();
        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.cell(0, 1), &CellValue::Null);
        assert_eq!(table.cell(1, 1), &CellValue::Integer(3));

        let err = Table::from_rows(
            vec!["a".into()],
            vec![vec![CellValue::Integer(1), CellValue::Integer(2)]],
        );
        assert!(matches!(err, Err(TableError::RowTooLong { row: 0, .. })));
    }

    #[test]
    fn take_rows_and_head_keep_column_order() {
        let table = people();
        let picked = table.take_rows(&[2, 0]);
        assert_eq!(picked.n_rows(), 2);
        assert_eq!(picked.column_names(), vec!["Name", "Score"]);
        assert_eq!(picked.cell(1, 0), &CellValue::Text("Alice Smith".into()));
        assert_eq!(table.head(10).n_rows(), 3);
        assert_eq!(table.head(1).row(0).count(), 2);
    }

    #[test]
    fn column_info_summarises_values() {
        let info = people().column_info();
        assert_eq!(info[0].kind, "text");
        assert_eq!(info[0].nulls, 1);
        assert_eq!(info[0].non_null, 2);
        assert_eq!(info[1].distinct, 2);
        assert_eq!(info[1].samples, vec!["95", "87", "95"]);
    }
}
