use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use calamine::{open_workbook_auto, Data, Reader};
use encoding_rs::Encoding;

use super::error::LoadError;
use super::model::{CellValue, Table};

/// Files above this size get a warning in the log before loading.
pub const LARGE_FILE_BYTES: u64 = 500 * 1024 * 1024;

/// CSV encodings tried in order; the first that decodes cleanly wins.
const CSV_ENCODINGS: &[(&str, &Encoding)] = &[
    ("utf-8", encoding_rs::UTF_8),
    ("utf-8-sig", encoding_rs::UTF_8),
    ("windows-1256", encoding_rs::WINDOWS_1256),
    ("iso-8859-1", encoding_rs::WINDOWS_1252),
];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Cell texts read as missing values, in CSV fields and Excel strings alike.
const MISSING_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn is_missing_marker(s: &str) -> bool {
    MISSING_MARKERS.contains(&s)
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Facts about a loaded file, reported next to the table.
#[derive(Debug, Clone, PartialEq)]
pub struct FileInfo {
    pub path: PathBuf,
    pub rows: usize,
    pub columns: usize,
    pub file_size_bytes: u64,
    pub load_time: Duration,
    pub column_names: Vec<String>,
    /// Encoding label for CSV input, `None` for workbooks.
    pub encoding: Option<&'static str>,
}

/// A table together with the metadata of the file it came from.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub table: Table,
    pub info: FileInfo,
}

/// Supported input formats, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Excel,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        match extension(path).as_str() {
            "csv" => Ok(InputFormat::Csv),
            "xlsx" | "xls" => Ok(InputFormat::Excel),
            other => Err(LoadError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Lower-cased extension of `path`, or an empty string.
pub(crate) fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

/// Load a table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`          – header row plus records; encoding is sniffed
/// * `.xlsx` / `.xls` – first worksheet, first row is the header
pub fn load_file(path: &Path) -> Result<LoadedTable, LoadError> {
    let start = Instant::now();

    let metadata = match std::fs::metadata(path) {
        Ok(m) if m.is_file() => m,
        Ok(_) => return Err(LoadError::NotFound(path.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(LoadError::NotFound(path.to_path_buf()));
        }
        Err(source) => {
            return Err(LoadError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    let format = InputFormat::from_path(path)?;

    let file_size_bytes = metadata.len();
    if file_size_bytes > LARGE_FILE_BYTES {
        log::warn!(
            "Large file ({}) may take time to load: {}",
            crate::format::file_size(file_size_bytes),
            path.display()
        );
    }

    let (table, encoding) = match format {
        InputFormat::Csv => {
            let (table, label) = load_csv(path)?;
            (table, Some(label))
        }
        InputFormat::Excel => (load_excel(path)?, None),
    };

    let info = FileInfo {
        path: path.to_path_buf(),
        rows: table.n_rows(),
        columns: table.n_cols(),
        file_size_bytes,
        load_time: start.elapsed(),
        column_names: table.column_names(),
        encoding,
    };
    log::info!(
        "Loaded {} rows x {} columns from {} in {:?}",
        info.rows,
        info.columns,
        path.display(),
        info.load_time
    );

    Ok(LoadedTable { table, info })
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<(Table, &'static str), LoadError> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let (text, label) = decode_csv_bytes(&bytes).ok_or_else(|| LoadError::Decode {
        path: path.to_path_buf(),
        tried: CSV_ENCODINGS.iter().map(|(label, _)| *label).collect(),
    })?;
    if label != "utf-8" {
        log::warn!("{} decoded as {label}", path.display());
    }

    let table = parse_csv(&text).map_err(|message| LoadError::Parse {
        path: path.to_path_buf(),
        message,
    })?;
    Ok((table, label))
}

/// Decode raw CSV bytes with the first encoding that accepts them.
///
/// Plain `utf-8` declines BOM-prefixed input so the BOM is stripped by the
/// `utf-8-sig` attempt instead of leaking into the first header.
pub fn decode_csv_bytes(bytes: &[u8]) -> Option<(Cow<'_, str>, &'static str)> {
    CSV_ENCODINGS.iter().find_map(|&(label, encoding)| {
        let input = match label {
            "utf-8" if bytes.starts_with(UTF8_BOM) => return None,
            "utf-8-sig" => bytes.strip_prefix(UTF8_BOM)?,
            _ => bytes,
        };
        encoding
            .decode_without_bom_handling_and_without_replacement(input)
            .map(|text| (text, label))
    })
}

/// Parse decoded CSV text: header row, then typed records.
fn parse_csv(text: &str) -> Result<Table, String> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let raw_headers: Vec<String> = reader
        .headers()
        .map_err(|e| format!("reading CSV headers: {e}"))?
        .iter()
        .map(|h| h.to_string())
        .collect();
    let headers = unique_headers(raw_headers);

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(|e| format!("CSV row {row_no}: {e}"))?;
        rows.push(record.iter().map(guess_cell_type).collect::<Vec<_>>());
    }

    Table::from_rows(headers, rows).map_err(|e| e.to_string())
}

fn guess_cell_type(s: &str) -> CellValue {
    if s.is_empty() || is_missing_marker(s) {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    // "inf" parses as a float but reads better kept as text.
    if let Some(f) = s.parse::<f64>().ok().filter(|f| f.is_finite()) {
        return CellValue::Float(f);
    }
    if s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("false") {
        return CellValue::Bool(s.eq_ignore_ascii_case("true"));
    }
    CellValue::Text(s.to_string())
}

/// Make header names unique and non-blank.
///
/// Names are kept verbatim. Blank (or whitespace-only) headers become
/// `Unnamed: <index>`; repeats get a `.1`, `.2`, …
/// suffix, skipping suffixes that are already taken.
pub fn unique_headers(raw: Vec<String>) -> Vec<String> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    let named: Vec<String> = raw
        .into_iter()
        .enumerate()
        .map(|(i, h)| {
            if h.trim().is_empty() {
                format!("Unnamed: {i}")
            } else {
                h
            }
        })
        .collect();

    let mut taken: BTreeSet<String> = named.iter().cloned().collect();
    let mut out = Vec::with_capacity(named.len());
    for name in named {
        let seen = counts.entry(name.clone()).or_insert(0);
        if *seen == 0 {
            *seen = 1;
            out.push(name);
            continue;
        }
        let mut candidate = format!("{name}.{seen}");
        while taken.contains(&candidate) {
            *seen += 1;
            candidate = format!("{name}.{seen}");
        }
        *seen += 1;
        taken.insert(candidate.clone());
        out.push(candidate);
    }
    out
}

// ---------------------------------------------------------------------------
// Excel loader
// ---------------------------------------------------------------------------

/// Load the first worksheet of an `.xlsx` or `.xls` workbook.
fn load_excel(path: &Path) -> Result<Table, LoadError> {
    let parse_err = |message: String| LoadError::Parse {
        path: path.to_path_buf(),
        message,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| parse_err(e.to_string()))?;
    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range.map_err(|e| parse_err(e.to_string()))?,
        None => return Ok(Table::default()),
    };

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(Table::default());
    };
    let headers = unique_headers(header_row.iter().map(header_text).collect());

    let records = rows.map(|row| row.iter().map(data_to_cell).collect::<Vec<_>>());
    Table::from_rows(headers, records).map_err(|e| parse_err(e.to_string()))
}

fn header_text(data: &Data) -> String {
    match data {
        Data::String(s) => s.clone(),
        other => data_to_cell(other).to_string(),
    }
}

/// Convert a calamine cell into a [`CellValue`].
fn data_to_cell(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Null,
        Data::String(s) if s.is_empty() || is_missing_marker(s) => CellValue::Null,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Integer(*i),
        // Excel stores every number as a double; whole numbers read back as integers.
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => CellValue::Integer(*f as i64),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ndt) => CellValue::DateTime(ndt.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => CellValue::Float(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::DateTime(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, bytes: &[u8]) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        std::fs::File::create(&path)
            .unwrap()
            .write_all(bytes)
            .unwrap();
        (dir, path)
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load_file(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        let (_dir, path) = write_temp("data.txt", b"a,b\n1,2\n");
        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat(ext) if ext == "txt"));
    }

    #[test]
    fn loads_utf8_csv_with_types_and_metadata() {
        let (_dir, path) = write_temp(
            "people.CSV",
            b"ID,Name,Score,Active\n1,Alice Smith,95.5,true\n2,Bob Johnson,,False\n",
        );
        let loaded = load_file(&path).unwrap();
        let table = &loaded.table;
        assert_eq!(table.n_rows(), 2);
        assert_eq!(loaded.info.columns, 4);
        assert_eq!(loaded.info.encoding, Some("utf-8"));
        assert_eq!(loaded.info.file_size_bytes, std::fs::metadata(&path).unwrap().len());
        assert_eq!(table.cell(0, 0), &CellValue::Integer(1));
        assert_eq!(table.cell(0, 2), &CellValue::Float(95.5));
        assert_eq!(table.cell(1, 2), &CellValue::Null);
        assert_eq!(table.cell(1, 3), &CellValue::Bool(false));
    }

    #[test]
    fn bom_is_stripped_by_utf8_sig() {
        let (text, label) = decode_csv_bytes(b"\xEF\xBB\xBFName\nx\n").unwrap();
        assert_eq!(label, "utf-8-sig");
        assert!(text.starts_with("Name"));
    }

    #[test]
    fn arabic_bytes_fall_back_to_windows_1256() {
        // "مرحبا" in windows-1256; invalid as UTF-8.
        let bytes = b"Greeting\n\xE3\xD1\xCD\xC8\xC7\n";
        let (_dir, path) = write_temp("ar.csv", bytes);
        let loaded = load_file(&path).unwrap();
        assert_eq!(loaded.info.encoding, Some("windows-1256"));
        assert_eq!(loaded.table.cell(0, 0), &CellValue::Text("مرحبا".into()));
    }

    #[test]
    fn long_rows_are_a_parse_error() {
        let (_dir, path) = write_temp("bad.csv", b"a,b\n1,2,3\n");
        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
    }

    #[test]
    fn headers_are_made_unique() {
        let headers = unique_headers(vec![
            "A".into(),
            "".into(),
            "A".into(),
            "A.1".into(),
            "A".into(),
        ]);
        assert_eq!(headers, vec!["A", "Unnamed: 1", "A.2", "A.1", "A.3"]);
    }

    #[test]
    fn headers_keep_surrounding_whitespace() {
        let table = parse_csv(" Name ,City\nAlice,Paris\n").unwrap();
        assert_eq!(table.column_names(), vec![" Name ", "City"]);
        assert_eq!(unique_headers(vec!["  ".into()]), vec!["Unnamed: 0"]);
    }

    #[test]
    fn missing_markers_load_as_null() {
        let table = parse_csv("Val\nN/A\nNA\nnan\nNULL\nnothing\n").unwrap();
        let column = table.column("Val").unwrap();
        assert_eq!(
            column.values,
            vec![
                CellValue::Null,
                CellValue::Null,
                CellValue::Null,
                CellValue::Null,
                CellValue::Text("nothing".into()),
            ]
        );
    }

    #[test]
    fn excel_dates_load_as_datetime_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dates.xlsx");
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let date_format = rust_xlsxwriter::Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "When").unwrap();
        sheet.write_string(0, 1, "Who").unwrap();
        let when = rust_xlsxwriter::ExcelDateTime::parse_from_str("2024-01-05 12:00:00").unwrap();
        sheet.write_datetime_with_format(1, 0, &when, &date_format).unwrap();
        sheet.write_string(1, 1, "Alice").unwrap();
        workbook.save(&path).unwrap();

        let loaded = load_file(&path).unwrap();
        assert_eq!(loaded.info.column_names, vec!["When", "Who"]);
        assert_eq!(
            loaded.table.cell(0, 0),
            &CellValue::DateTime("2024-01-05 12:00:00".into())
        );
        assert_eq!(loaded.table.cell(0, 1), &CellValue::Text("Alice".into()));
    }

    #[test]
    fn loads_first_sheet_of_xlsx() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("people.xlsx");
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Name").unwrap();
        sheet.write_string(0, 1, "Score").unwrap();
        sheet.write_string(1, 0, "Alice Smith").unwrap();
        sheet.write_number(1, 1, 95.0).unwrap();
        sheet.write_string(2, 0, "Bob Johnson").unwrap();
        sheet.write_number(2, 1, 87.5).unwrap();
        workbook.save(&path).unwrap();

        let loaded = load_file(&path).unwrap();
        assert_eq!(loaded.info.column_names, vec!["Name", "Score"]);
        assert_eq!(loaded.info.encoding, None);
        assert_eq!(loaded.table.cell(0, 1), &CellValue::Integer(95));
        assert_eq!(loaded.table.cell(1, 1), &CellValue::Float(87.5));
    }
}
