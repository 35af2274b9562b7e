use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::Instant;

use anyhow::{Context, Result};

use sheet_search::config::Settings;
use sheet_search::data::{
    export_table, load_file, search, LoadError, LoadedTable, MatchOptions, SearchOutcome,
    SearchRequest, Table,
};
use sheet_search::format;

use crate::debounce::Debouncer;

type LoadResult = Result<LoadedTable, LoadError>;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub settings: Settings,

    /// Loaded file (None until user loads a file).
    pub loaded: Option<LoadedTable>,

    /// One flag per column of the loaded table, in column order.
    pub selected_columns: Vec<bool>,

    /// Keep the first few columns selected by default.
    pub auto_select: bool,

    /// Text in the search box.
    pub query: String,

    pub options: MatchOptions,

    /// Outcome of the last search; `None` shows the whole table.
    pub results: Option<SearchOutcome>,

    /// Status line under the search box.
    pub status_message: Option<String>,

    /// Last error, shown in red until the next successful action.
    pub error_message: Option<String>,

    /// Whether a file loading operation is in progress.
    pub loading: bool,

    /// Whether the file-info window is open.
    pub show_info: bool,

    pub debouncer: Debouncer,

    pending_load: Option<Receiver<LoadResult>>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            debouncer: Debouncer::new(settings.debounce()),
            options: MatchOptions {
                case_sensitive: settings.case_sensitive,
                ..Default::default()
            },
            settings,
            loaded: None,
            selected_columns: Vec::new(),
            auto_select: true,
            query: String::new(),
            results: None,
            status_message: None,
            error_message: None,
            loading: false,
            show_info: false,
            pending_load: None,
        }
    }

    // -- Loading ------------------------------------------------------------

    /// Load `path` on a worker thread; `notify` runs once the result is sent
    /// so the UI can wake up and call [`poll_load`](Self::poll_load).
    pub fn start_load(&mut self, path: PathBuf, notify: impl FnOnce() + Send + 'static) {
        let (tx, rx) = mpsc::channel();
        self.loading = true;
        self.error_message = None;
        self.status_message = Some(format!("Loading {}…", path.display()));
        self.pending_load = Some(rx);

        std::thread::spawn(move || {
            let result = load_file(&path);
            // The receiver is gone only if a newer load replaced this one.
            let _ = tx.send(result);
            notify();
        });
    }

    /// Pick up a finished background load, if any. Returns `true` when the
    /// state changed.
    pub fn poll_load(&mut self) -> bool {
        let Some(rx) = &self.pending_load else {
            return false;
        };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => {
                self.pending_load = None;
                self.loading = false;
                self.error_message = Some("Loader thread stopped unexpectedly".to_string());
                return true;
            }
        };
        self.pending_load = None;
        match result {
            Ok(loaded) => self.set_loaded(loaded),
            Err(e) => {
                log::error!("Failed to load file: {e}");
                self.loading = false;
                self.error_message = Some(format!("Error: {e}"));
                self.status_message = Some("File loading failed".to_string());
            }
        }
        true
    }

    /// Ingest a newly loaded table, reset selection and results.
    pub fn set_loaded(&mut self, loaded: LoadedTable) {
        let info = &loaded.info;
        self.status_message = Some(format!(
            "Loaded {} rows and {} columns in {}",
            info.rows,
            info.columns,
            format::duration(info.load_time)
        ));
        self.selected_columns = vec![false; info.columns];
        self.loaded = Some(loaded);
        if self.auto_select {
            self.select_default_columns();
        }
        self.results = None;
        self.error_message = None;
        self.loading = false;
        if !self.query.trim().is_empty() {
            self.run_search();
        }
    }

    // -- Column selection ---------------------------------------------------

    /// Select exactly the first `default_column_count` columns.
    pub fn select_default_columns(&mut self) {
        let n = self.settings.default_column_count;
        for (i, flag) in self.selected_columns.iter_mut().enumerate() {
            *flag = i < n;
        }
    }

    pub fn set_auto_select(&mut self, on: bool) {
        self.auto_select = on;
        if on {
            self.select_default_columns();
        } else {
            self.selected_columns.iter_mut().for_each(|f| *f = false);
        }
    }

    /// Names of the selected columns; falls back to the default columns
    /// (and ticks them) when nothing is selected.
    pub fn selected_column_names(&mut self) -> Vec<String> {
        if !self.selected_columns.iter().any(|&f| f) {
            self.select_default_columns();
        }
        let Some(loaded) = &self.loaded else {
            return Vec::new();
        };
        loaded
            .table
            .columns()
            .iter()
            .zip(&self.selected_columns)
            .filter(|(_, on)| **on)
            .map(|(c, _)| c.name.clone())
            .collect()
    }

    // -- Searching ----------------------------------------------------------

    /// Search box or mode changed: wait for the quiet period.
    pub fn on_query_changed(&mut self, now: Instant) {
        self.debouncer.schedule(now);
    }

    /// Run a search when the debounce timer fires. Returns `true` if it did.
    pub fn poll_search(&mut self, now: Instant) -> bool {
        if self.debouncer.poll(now) {
            self.run_search();
            true
        } else {
            false
        }
    }

    /// Search the loaded table with the current query and options.
    pub fn run_search(&mut self) {
        self.debouncer.cancel();
        if self.loaded.is_none() {
            return;
        }
        let columns = self.selected_column_names();
        let Some(loaded) = &self.loaded else {
            return;
        };
        if columns.is_empty() {
            self.status_message = Some("Please select at least one column to search in".into());
            return;
        }

        let request = SearchRequest::new(self.query.trim(), columns.clone())
            .with_options(self.options)
            .with_max_results(Some(self.settings.gui_max_results));

        match search(&loaded.table, &request) {
            Ok(outcome) => {
                self.status_message = Some(if request.term.is_empty() {
                    format!(
                        "All data: {} rows, {} columns",
                        loaded.info.rows, loaded.info.columns
                    )
                } else {
                    format!(
                        "Search: '{}' | Found: {} results | Time: {} | Columns: {}",
                        request.term,
                        outcome.stats.total_results,
                        format::duration(outcome.stats.elapsed),
                        columns.join(", ")
                    )
                });
                self.error_message = None;
                self.results = if request.term.is_empty() {
                    None
                } else {
                    Some(outcome)
                };
            }
            Err(e) => {
                log::warn!("Search failed: {e}");
                self.error_message = Some(format!("Search error: {e}"));
            }
        }
    }

    /// Clear the query and go back to showing the whole table.
    pub fn clear_search(&mut self) {
        self.query.clear();
        self.debouncer.cancel();
        self.results = None;
        self.error_message = None;
        if let Some(loaded) = &self.loaded {
            self.status_message = Some(format!(
                "All data: {} rows, {} columns",
                loaded.info.rows, loaded.info.columns
            ));
        }
    }

    /// Table currently on screen: last results, or the whole file.
    pub fn visible_table(&self) -> Option<&Table> {
        match (&self.results, &self.loaded) {
            (Some(outcome), _) => Some(&outcome.table),
            (None, Some(loaded)) => Some(&loaded.table),
            (None, None) => None,
        }
    }

    /// Rows matching the current view before capping.
    pub fn visible_total(&self) -> usize {
        match (&self.results, &self.loaded) {
            (Some(outcome), _) => outcome.stats.total_results,
            (None, Some(loaded)) => loaded.table.n_rows(),
            (None, None) => 0,
        }
    }

    // -- Export -------------------------------------------------------------

    /// Write the visible table to `path`.
    pub fn export_to(&mut self, path: &Path) -> Result<usize> {
        let table = self.visible_table().context("no file loaded")?;
        let written = export_table(table, path)
            .with_context(|| format!("exporting to {}", path.display()))?;
        self.status_message = Some(format!(
            "Successfully exported {written} rows to {}",
            path.display()
        ));
        Ok(written)
    }
}
