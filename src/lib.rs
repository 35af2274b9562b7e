//! In-memory search over spreadsheet and CSV tables.
//!
//! The [`data`] module holds the whole engine: [`data::load_file`] reads a
//! `.csv`, `.xlsx` or `.xls` file into a [`data::Table`], [`data::search`]
//! filters it by substring, exact or regex match across chosen columns, and
//! [`data::export_table`] writes a result back out as `.csv` or `.xlsx`.
//!
//! The desktop viewer (`sheet-search`) and the command line tool
//! (`sheet-search-cli`) are thin front ends over these three calls.

pub mod config;
pub mod data;
pub mod format;
