use std::path::PathBuf;

use thiserror::Error;

/// Structural problems when assembling a [`Table`](super::model::Table).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("column '{column}' has {found} values, expected {expected}")]
    RaggedColumn {
        column: String,
        expected: usize,
        found: usize,
    },
    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),
    #[error("row {row} has {found} fields, expected at most {expected}")]
    RowTooLong {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Errors returned by [`load_file`](super::loader::load_file).
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Unsupported file format: .{0} (supported: .csv, .xlsx, .xls)")]
    UnsupportedFormat(String),
    #[error("Could not read {} with any supported encoding ({})", .path.display(), .tried.join(", "))]
    Decode { path: PathBuf, tried: Vec<&'static str> },
    #[error("Malformed file {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Errors returned by [`search`](super::filter::search).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("Invalid columns: {}", .0.join(", "))]
    InvalidColumns(Vec<String>),
    #[error("No columns selected to search in")]
    NoColumns,
    #[error("Invalid regex pattern: {0}")]
    InvalidPattern(String),
}

/// Errors returned by [`export_table`](super::export::export_table).
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("No results to export")]
    EmptyResult,
    #[error("Unsupported export format: .{0} (supported: .csv, .xlsx)")]
    UnsupportedFormat(String),
    #[error("IO error writing {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("CSV error writing {}: {source}", .path.display())]
    Csv { path: PathBuf, source: csv::Error },
    #[error("Workbook error writing {}: {source}", .path.display())]
    Xlsx {
        path: PathBuf,
        source: rust_xlsxwriter::XlsxError,
    },
}
