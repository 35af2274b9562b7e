use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;

use sheet_search::config::Settings;
use sheet_search::data::{
    export_table, load_file, patterns, search, LoadedTable, MatchOptions, SearchOutcome,
    SearchRequest, Table,
};
use sheet_search::format;

const EXAMPLES: &str = "\
Examples:
  sheet-search-cli --interactive
  sheet-search-cli data.xlsx -s john -i
  sheet-search-cli data.xlsx -s user@email.com -c Email -o results.xlsx
  sheet-search-cli data.csv -p email -c Contact Notes";

/// Fast search over Excel and CSV tables.
#[derive(Parser, Debug)]
#[command(name = "sheet-search-cli", version, after_help = EXAMPLES)]
struct Cli {
    /// Path to an Excel (.xlsx/.xls) or CSV file
    file: Option<PathBuf>,

    /// Search term
    #[arg(short = 's', long = "search")]
    search: Option<String>,

    /// Named regex preset to search for (see `patterns` in interactive mode)
    #[arg(short = 'p', long = "pattern", conflicts_with = "search")]
    pattern: Option<String>,

    /// Columns to search in (default: the first two)
    #[arg(short = 'c', long = "columns", num_args = 1..)]
    columns: Vec<String>,

    /// Whole-cell match only
    #[arg(short = 'e', long = "exact")]
    exact: bool,

    /// Case insensitive
    #[arg(short = 'i', long = "ignore-case")]
    ignore_case: bool,

    /// Treat the search term as a regular expression
    #[arg(short = 'r', long = "regex")]
    regex: bool,

    /// Write the matching rows to this .csv or .xlsx file
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Maximum number of rows to return
    #[arg(short = 'm', long = "max-results")]
    max_results: Option<usize>,

    /// Start the interactive prompt
    #[arg(long = "interactive")]
    interactive: bool,

    /// JSON settings file
    #[arg(long = "config", env = "SHEET_SEARCH_CONFIG")]
    config: Option<PathBuf>,
}

/// One `search` line typed at the interactive prompt.
#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_help_flag = true)]
struct SearchLine {
    term: Option<String>,
    #[arg(short = 'c', num_args = 1..)]
    columns: Vec<String>,
    #[arg(short = 'e')]
    exact: bool,
    #[arg(short = 'i')]
    ignore_case: bool,
    #[arg(short = 'r')]
    regex: bool,
    #[arg(short = 'p')]
    pattern: Option<String>,
    #[arg(short = 'm')]
    max_results: Option<usize>,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load(cli.config.as_deref()).context("loading settings")?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if cli.interactive || (cli.search.is_none() && cli.pattern.is_none()) {
        let stdin = io::stdin();
        let mut session = Session::new(settings, &mut out);
        if let Some(path) = &cli.file {
            if let Err(e) = session.load(path) {
                writeln!(session.out, "error: {e:#}")?;
            }
        }
        return session.repl(stdin.lock());
    }

    let Some(path) = cli.file.as_deref() else {
        bail!("a file path is required for command line search");
    };
    let (term, use_regex) = resolve_term(cli.search.as_deref(), cli.pattern.as_deref(), cli.regex)?;
    let options = MatchOptions {
        case_sensitive: !cli.ignore_case,
        exact_match: cli.exact,
        use_regex,
    };

    let mut session = Session::new(settings, &mut out);
    session.load(path)?;
    let request = session.request(term, cli.columns, options, cli.max_results)?;
    let outcome = session.search(&request)?;

    if let Some(output) = &cli.output {
        let written = export_table(&outcome.table, output)?;
        writeln!(session.out, "\nExported {written} rows to {}", output.display())?;
    }
    Ok(())
}

/// Turn `-s`/`-p` into the term to search for and whether it is a regex.
fn resolve_term(search: Option<&str>, pattern: Option<&str>, regex: bool) -> Result<(String, bool)> {
    match (search, pattern) {
        (_, Some(name)) => match patterns::preset(name) {
            Some(p) => Ok((p.to_string(), true)),
            None => bail!(
                "unknown pattern '{name}' (available: {})",
                patterns::preset_names().collect::<Vec<_>>().join(", ")
            ),
        },
        (Some(term), None) => Ok((term.to_string(), regex)),
        (None, None) => bail!("please provide a search term"),
    }
}

// ---------------------------------------------------------------------------
// Session: one loaded file plus the last results
// ---------------------------------------------------------------------------

struct Session<W: Write> {
    settings: Settings,
    out: W,
    loaded: Option<LoadedTable>,
    last_results: Option<Table>,
}

impl<W: Write> Session<W> {
    fn new(settings: Settings, out: W) -> Self {
        Self {
            settings,
            out,
            loaded: None,
            last_results: None,
        }
    }

    fn loaded(&self) -> Result<&LoadedTable> {
        self.loaded
            .as_ref()
            .context("no file loaded (use `load <path>`)")
    }

    fn load(&mut self, path: &Path) -> Result<()> {
        writeln!(self.out, "Loading file: {}", path.display())?;
        let loaded = load_file(path)?;
        let info = &loaded.info;
        writeln!(
            self.out,
            "Loaded {} rows and {} columns in {}",
            info.rows,
            info.columns,
            format::duration(info.load_time)
        )?;
        writeln!(self.out, "  Size: {}", format::file_size(info.file_size_bytes))?;
        let shown: Vec<&str> = info.column_names.iter().take(5).map(String::as_str).collect();
        write!(self.out, "  Columns: {}", shown.join(", "))?;
        if info.column_names.len() > 5 {
            write!(self.out, " ... and {} more", info.column_names.len() - 5)?;
        }
        writeln!(self.out)?;
        self.loaded = Some(loaded);
        self.last_results = None;
        Ok(())
    }

    /// Build a request, defaulting to the first columns of the file.
    fn request(
        &self,
        term: String,
        columns: Vec<String>,
        options: MatchOptions,
        max_results: Option<usize>,
    ) -> Result<SearchRequest> {
        let loaded = self.loaded()?;
        let columns = if columns.is_empty() {
            loaded
                .info
                .column_names
                .iter()
                .take(self.settings.default_column_count)
                .cloned()
                .collect()
        } else {
            columns
        };
        Ok(SearchRequest::new(term, columns)
            .with_options(options)
            .with_max_results(max_results))
    }

    fn search(&mut self, request: &SearchRequest) -> Result<SearchOutcome> {
        let loaded = self
            .loaded
            .as_ref()
            .context("no file loaded (use `load <path>`)")?;
        writeln!(self.out, "Searching for: '{}'", request.term)?;
        writeln!(self.out, "In columns: {}", request.columns.join(", "))?;

        let outcome = match search(&loaded.table, request) {
            Ok(outcome) => outcome,
            Err(e) => {
                if matches!(e, sheet_search::data::SearchError::InvalidColumns(_)) {
                    writeln!(
                        self.out,
                        "Available columns: {}",
                        loaded.info.column_names.join(", ")
                    )?;
                }
                return Err(e.into());
            }
        };
        self.print_results(&outcome)?;
        self.last_results = Some(outcome.table.clone());
        Ok(outcome)
    }

    fn print_results(&mut self, outcome: &SearchOutcome) -> io::Result<()> {
        let stats = &outcome.stats;
        writeln!(
            self.out,
            "Found {} results in {} ({:.1}% of rows)",
            stats.total_results,
            format::duration(stats.elapsed),
            stats.match_percentage()
        )?;
        if stats.is_truncated() {
            writeln!(self.out, "Returning the first {}", stats.returned_results)?;
        }
        if outcome.table.is_empty() {
            writeln!(self.out, "No matches found")?;
            return Ok(());
        }

        let limit = self.settings.cli_preview_rows;
        let shown = outcome.table.n_rows().min(limit);
        writeln!(self.out, "\nResults (showing first {shown}):")?;
        write_table(&mut self.out, &outcome.table.head(limit), self.settings.cli_column_width)?;
        if outcome.table.n_rows() > limit {
            writeln!(self.out, "... and {} more results", outcome.table.n_rows() - limit)?;
        }
        Ok(())
    }

    // -- Interactive prompt -------------------------------------------------

    fn repl(&mut self, input: impl BufRead) -> Result<()> {
        writeln!(self.out, "Sheet Search - interactive mode (type `help` for commands)")?;
        for line in input.lines() {
            let line = line.context("reading command")?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let (command, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
            let rest = rest.trim();

            let result = match command.to_ascii_lowercase().as_str() {
                "quit" | "exit" | "q" => break,
                "help" => self.help().map_err(Into::into),
                "load" => self.load(Path::new(rest.trim_matches('"'))),
                "columns" => self.show_columns(),
                "info" => self.show_info(),
                "patterns" => self.show_patterns().map_err(Into::into),
                "export" => self.export_last(rest),
                "search" => self.search_line(rest),
                _ => {
                    writeln!(self.out, "Unknown command. Type 'help' for available commands.")?;
                    Ok(())
                }
            };
            if let Err(e) = result {
                writeln!(self.out, "error: {e:#}")?;
            }
            writeln!(self.out)?;
        }
        writeln!(self.out, "Goodbye!")?;
        Ok(())
    }

    fn search_line(&mut self, args: &str) -> Result<()> {
        let parsed = SearchLine::try_parse_from(args.split_whitespace())
            .map_err(|e| anyhow::anyhow!(e.to_string().trim().to_string()))?;
        let (term, use_regex) = resolve_term(parsed.term.as_deref(), parsed.pattern.as_deref(), parsed.regex)?;
        let options = MatchOptions {
            case_sensitive: !parsed.ignore_case,
            exact_match: parsed.exact,
            use_regex,
        };
        let request = self.request(term, parsed.columns, options, parsed.max_results)?;
        self.search(&request)?;
        Ok(())
    }

    fn export_last(&mut self, filename: &str) -> Result<()> {
        let Some(results) = &self.last_results else {
            bail!("no results to export");
        };
        if filename.is_empty() {
            bail!("please provide a filename");
        }
        let mut path = PathBuf::from(filename.trim_matches('"'));
        if path.extension().is_none() {
            path.set_extension("xlsx");
        }
        let written = export_table(results, &path)?;
        writeln!(self.out, "Exported {written} rows to {}", path.display())?;
        Ok(())
    }

    fn show_columns(&mut self) -> Result<()> {
        let names = self.loaded()?.info.column_names.clone();
        writeln!(self.out, "Available columns:")?;
        for (i, name) in names.iter().enumerate() {
            writeln!(self.out, "  {:2}. {name}", i + 1)?;
        }
        Ok(())
    }

    fn show_info(&mut self) -> Result<()> {
        let loaded = self.loaded()?;
        let info = &loaded.info;
        let columns = loaded.table.column_info();
        let mut text = String::new();
        text.push_str(&format!("File: {}\n", info.path.display()));
        text.push_str(&format!("Size: {}\n", format::file_size(info.file_size_bytes)));
        text.push_str(&format!("Load time: {}\n", format::duration(info.load_time)));
        text.push_str(&format!("Dimensions: {} rows x {} columns\n", info.rows, info.columns));
        if let Some(encoding) = info.encoding {
            text.push_str(&format!("Encoding: {encoding}\n"));
        }
        text.push_str("\nColumn details:\n");
        for (i, col) in columns.iter().take(10).enumerate() {
            text.push_str(&format!("{:2}. {}\n", i + 1, col.name));
            text.push_str(&format!("    Type: {}\n", col.kind));
            text.push_str(&format!("    Non-null: {}\n", col.non_null));
            text.push_str(&format!("    Unique: {}\n", col.distinct));
            if !col.samples.is_empty() {
                let samples: Vec<&str> = col.samples.iter().take(2).map(String::as_str).collect();
                text.push_str(&format!("    Sample: {}\n", samples.join(", ")));
            }
        }
        if columns.len() > 10 {
            text.push_str(&format!("... and {} more columns\n", columns.len() - 10));
        }
        self.out.write_all(text.as_bytes())?;
        Ok(())
    }

    fn show_patterns(&mut self) -> io::Result<()> {
        writeln!(self.out, "Regex presets (use `search -p <name>`):")?;
        for (name, pattern) in patterns::PRESETS {
            writeln!(self.out, "  {name:<12} {pattern}")?;
        }
        Ok(())
    }

    fn help(&mut self) -> io::Result<()> {
        writeln!(
            self.out,
            "\
Commands:
  load <path>                      - Load a .csv, .xlsx or .xls file
  search <term>                    - Search in the first columns
  search <term> -c <col1> <col2>   - Search in specific columns
  search <term> -e                 - Exact match
  search <term> -i                 - Case insensitive
  search <term> -r                 - Regex search
  search -p <preset>               - Search with a named regex preset
  columns                          - Show all columns
  info                             - Show file information
  patterns                         - List regex presets
  export <filename>                - Export last results (.xlsx by default)
  help                             - Show this help
  quit                             - Exit"
        )
    }
}

/// Print `table` as fixed-width text, clipping cells to `max_width` chars.
fn write_table(out: &mut impl Write, table: &Table, max_width: usize) -> io::Result<()> {
    let widths: Vec<usize> = table
        .columns()
        .iter()
        .map(|c| {
            let longest = c
                .values
                .iter()
                .map(|v| v.as_text().chars().count())
                .max()
                .unwrap_or(0);
            longest.max(c.name.chars().count()).min(max_width)
        })
        .collect();

    let pad = |s: &str, w: usize| format!("{:<w$}", format::clip(s, w));

    let header: Vec<String> = table
        .columns()
        .iter()
        .zip(&widths)
        .map(|(c, &w)| pad(&c.name, w))
        .collect();
    let header = header.join(" | ");
    writeln!(out, "{}", header.trim_end())?;
    writeln!(out, "{}", "-".repeat(header.chars().count()))?;

    for r in 0..table.n_rows() {
        let cells: Vec<String> = table
            .row(r)
            .zip(&widths)
            .map(|(v, &w)| pad(&v.as_text(), w))
            .collect();
        writeln!(out, "{}", cells.join(" | ").trim_end())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheet_search::data::{CellValue, Column};

    #[test]
    fn table_cells_are_padded_and_clipped() {
        let table = Table::new(vec![
            Column::new("Name", vec![CellValue::Text("Alexandria Ocasio-Whatever".into())]),
            Column::new("N", vec![CellValue::Integer(7)]),
        ])
        .unwrap();
        let mut buf = Vec::new();
        write_table(&mut buf, &table, 10).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Name       | N");
        assert_eq!(lines[2], "Alexand... | 7");
    }

    #[test]
    fn pattern_overrides_term_and_forces_regex() {
        let (term, regex) = resolve_term(None, Some("ssn"), false).unwrap();
        assert_eq!(term, patterns::preset("ssn").unwrap());
        assert!(regex);
        assert!(resolve_term(None, Some("bogus"), false).is_err());
        assert_eq!(resolve_term(Some("x"), None, false).unwrap(), ("x".to_string(), false));
    }

    #[test]
    fn search_line_parses_flags() {
        let line = SearchLine::try_parse_from("john -c Name City -i -e".split_whitespace()).unwrap();
        assert_eq!(line.term.as_deref(), Some("john"));
        assert_eq!(line.columns, vec!["Name", "City"]);
        assert!(line.ignore_case && line.exact && !line.regex);
    }
}
