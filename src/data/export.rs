use std::path::Path;

use rust_xlsxwriter::{Format, Workbook};

use super::error::ExportError;
use super::loader::extension;
use super::model::{CellValue, Table};

/// Supported output formats, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn from_path(path: &Path) -> Result<Self, ExportError> {
        match extension(path).as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "xlsx" => Ok(ExportFormat::Xlsx),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Write `table` to `path` as CSV or XLSX. Returns the number of rows written.
///
/// An empty table is refused before the extension is looked at.
pub fn export_table(table: &Table, path: &Path) -> Result<usize, ExportError> {
    if table.is_empty() {
        return Err(ExportError::EmptyResult);
    }
    match ExportFormat::from_path(path)? {
        ExportFormat::Csv => write_csv(table, path)?,
        ExportFormat::Xlsx => write_xlsx(table, path)?,
    }
    log::info!("Exported {} rows to {}", table.n_rows(), path.display());
    Ok(table.n_rows())
}

fn write_csv(table: &Table, path: &Path) -> Result<(), ExportError> {
    let csv_err = |source| ExportError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    writer
        .write_record(table.columns().iter().map(|c| c.name.as_str()))
        .map_err(csv_err)?;
    for row in 0..table.n_rows() {
        writer
            .write_record(table.row(row).map(|v| v.to_string()))
            .map_err(csv_err)?;
    }
    writer.flush().map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_xlsx(table: &Table, path: &Path) -> Result<(), ExportError> {
    let xlsx_err = |source| ExportError::Xlsx {
        path: path.to_path_buf(),
        source,
    };
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let sheet = workbook.add_worksheet();

    for (c, column) in table.columns().iter().enumerate() {
        let col = u16::try_from(c).map_err(|_| {
            xlsx_err(rust_xlsxwriter::XlsxError::RowColumnLimitError)
        })?;
        sheet
            .write_string_with_format(0, col, &column.name, &header)
            .map_err(xlsx_err)?;
        for (r, value) in column.values.iter().enumerate() {
            // Row 0 is the header; XlsxError reports rows beyond the sheet limit.
            let row = u32::try_from(r + 1)
                .map_err(|_| xlsx_err(rust_xlsxwriter::XlsxError::RowColumnLimitError))?;
            match value {
                CellValue::Null => {}
                CellValue::Bool(b) => {
                    sheet.write_boolean(row, col, *b).map_err(xlsx_err)?;
                }
                CellValue::Integer(_) | CellValue::Float(_) => {
                    let n = value.as_f64().unwrap_or_default();
                    sheet.write_number(row, col, n).map_err(xlsx_err)?;
                }
                CellValue::Text(s) | CellValue::DateTime(s) => {
                    sheet.write_string(row, col, s).map_err(xlsx_err)?;
                }
            }
        }
    }

    workbook.save(path).map_err(xlsx_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_file;
    use crate::data::model::Column;

    fn sample() -> Table {
        Table::new(vec![
            Column::new(
                "Name",
                vec![CellValue::Text("Alice, Smith".into()), CellValue::Null],
            ),
            Column::new("Score", vec![CellValue::Integer(95), CellValue::Float(87.5)]),
            Column::new("Active", vec![CellValue::Bool(true), CellValue::Bool(false)]),
        ])
        .unwrap()
    }

    #[test]
    fn empty_table_is_refused_first() {
        let empty = sample().head(0);
        let err = export_table(&empty, Path::new("out.pdf")).unwrap_err();
        assert!(matches!(err, ExportError::EmptyResult));
    }

    #[test]
    fn unsupported_extension_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["out.xls", "out.json", "out"] {
            let err = export_table(&sample(), &dir.path().join(name)).unwrap_err();
            assert!(matches!(err, ExportError::UnsupportedFormat(_)), "{name}");
        }
    }

    #[test]
    fn csv_export_reloads_to_same_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        assert_eq!(export_table(&sample(), &path).unwrap(), 2);

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Name,Score,Active"));
        assert_eq!(lines.next(), Some("\"Alice, Smith\",95,True"));

        let reloaded = load_file(&path).unwrap().table;
        assert_eq!(reloaded, sample());
    }

    #[test]
    fn xlsx_export_reloads_with_header_and_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.XLSX");
        assert_eq!(export_table(&sample(), &path).unwrap(), 2);

        let reloaded = load_file(&path).unwrap().table;
        assert_eq!(reloaded.column_names(), vec!["Name", "Score", "Active"]);
        assert_eq!(reloaded.cell(0, 0), &CellValue::Text("Alice, Smith".into()));
        assert_eq!(reloaded.cell(1, 0), &CellValue::Null);
        assert_eq!(reloaded.cell(0, 1), &CellValue::Integer(95));
        assert_eq!(reloaded.cell(1, 1), &CellValue::Float(87.5));
        assert_eq!(reloaded.cell(0, 2), &CellValue::Bool(true));
    }
}
