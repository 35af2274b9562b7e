/// Data layer: core types, loading, searching and export.
///
/// Architecture:
/// ```text
///  .csv / .xlsx / .xls
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  detect format, decode, parse → Table + FileInfo
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Table    │  ordered named columns of CellValue
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  per-column masks, OR-combined → capped result table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  export   │  result table → .csv / .xlsx
///   └──────────┘
/// ```

pub mod error;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod patterns;

pub use error::{ExportError, LoadError, SearchError, TableError};
pub use export::export_table;
pub use filter::{search, MatchMode, MatchOptions, SearchOutcome, SearchRequest, SearchStats};
pub use loader::{load_file, FileInfo, LoadedTable};
pub use model::{CellValue, Column, ColumnInfo, Table};
