use std::borrow::Cow;
use std::time::{Duration, Instant};

use regex::{Regex, RegexBuilder};

use super::error::SearchError;
use super::model::{Column, Table};

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Mode flags of a search. Regex wins over exact, exact over substring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchOptions {
    pub case_sensitive: bool,
    pub exact_match: bool,
    pub use_regex: bool,
}

/// Effective match semantics derived from [`MatchOptions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Substring,
    Exact,
    Regex,
}

impl MatchOptions {
    pub fn mode(&self) -> MatchMode {
        if self.use_regex {
            MatchMode::Regex
        } else if self.exact_match {
            MatchMode::Exact
        } else {
            MatchMode::Substring
        }
    }
}

/// What to look for, where, and how many rows to hand back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchRequest {
    pub term: String,
    pub columns: Vec<String>,
    pub options: MatchOptions,
    /// Row cap on the returned table; `None` or `Some(0)` means no cap.
    pub max_results: Option<usize>,
}

impl SearchRequest {
    pub fn new(term: impl Into<String>, columns: Vec<String>) -> Self {
        SearchRequest {
            term: term.into(),
            columns,
            ..Default::default()
        }
    }

    pub fn with_options(mut self, options: MatchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_max_results(mut self, max_results: Option<usize>) -> Self {
        self.max_results = max_results;
        self
    }
}

// ---------------------------------------------------------------------------
// Matcher: one compiled term, applied cell by cell
// ---------------------------------------------------------------------------

/// A search term compiled for one [`MatchMode`].
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Needle already lower-cased when the search is case-insensitive.
    Substring { needle: String, case_sensitive: bool },
    Exact { needle: String, case_sensitive: bool },
    Regex(Regex),
}

impl Matcher {
    /// Compile `term` under `options`.
    ///
    /// Case-insensitive regexes use the engine's `(?i)` flag so escapes such
    /// as `\D` or `\S` keep their meaning.
    pub fn new(term: &str, options: MatchOptions) -> Result<Self, SearchError> {
        let fold = |s: &str| {
            if options.case_sensitive {
                s.to_string()
            } else {
                s.to_lowercase()
            }
        };
        let case_sensitive = options.case_sensitive;
        Ok(match options.mode() {
            MatchMode::Regex => Matcher::Regex(
                RegexBuilder::new(term)
                    .case_insensitive(!options.case_sensitive)
                    .build()
                    .map_err(|e| SearchError::InvalidPattern(e.to_string()))?,
            ),
            MatchMode::Exact => Matcher::Exact {
                needle: fold(term),
                case_sensitive,
            },
            MatchMode::Substring => Matcher::Substring {
                needle: fold(term),
                case_sensitive,
            },
        })
    }

    /// Whether a cell's text form matches.
    pub fn is_match(&self, value: &str) -> bool {
        fn folded(value: &str, case_sensitive: bool) -> Cow<'_, str> {
            if case_sensitive {
                Cow::Borrowed(value)
            } else {
                Cow::Owned(value.to_lowercase())
            }
        }
        match self {
            Matcher::Regex(re) => re.is_match(value),
            Matcher::Exact {
                needle,
                case_sensitive,
            } => folded(value, *case_sensitive) == needle.as_str(),
            Matcher::Substring {
                needle,
                case_sensitive,
            } => folded(value, *case_sensitive).contains(needle.as_str()),
        }
    }
}

// ---------------------------------------------------------------------------
// Masks
// ---------------------------------------------------------------------------

/// One flag per row: `true` where the row qualifies.
pub type Mask = Vec<bool>;

/// Mask for a single column; missing values are matched as `""`.
pub fn column_mask(column: &Column, matcher: &Matcher) -> Mask {
    column
        .values
        .iter()
        .map(|v| matcher.is_match(&v.as_text()))
        .collect()
}

/// OR of the per-column masks: a row qualifies if any column matches.
pub fn combined_mask(n_rows: usize, columns: &[&Column], matcher: &Matcher) -> Mask {
    let mut mask = vec![false; n_rows];
    for column in columns {
        for (slot, hit) in mask.iter_mut().zip(column_mask(column, matcher)) {
            *slot |= hit;
        }
    }
    mask
}

/// Indices of the set flags in `mask`, in row order.
pub fn mask_indices(mask: &[bool]) -> Vec<usize> {
    mask.iter()
        .enumerate()
        .filter(|(_, hit)| **hit)
        .map(|(i, _)| i)
        .collect()
}

// ---------------------------------------------------------------------------
// Result shaping
// ---------------------------------------------------------------------------

/// Apply `mask` to `table`, keeping at most `max_results` rows.
///
/// Returns the shaped table and the match count before truncation.
pub fn apply_mask(table: &Table, mask: &[bool], max_results: Option<usize>) -> (Table, usize) {
    let mut indices = mask_indices(mask);
    let total = indices.len();
    if let Some(cap) = max_results.filter(|&cap| cap > 0) {
        indices.truncate(cap);
    }
    (table.take_rows(&indices), total)
}

// ---------------------------------------------------------------------------
// Search entry-point
// ---------------------------------------------------------------------------

/// Timing and counts reported alongside a result table.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchStats {
    pub elapsed: Duration,
    /// Matching rows before any cap was applied.
    pub total_results: usize,
    pub returned_results: usize,
    pub source_rows: usize,
    pub term: String,
    pub columns: Vec<String>,
    pub options: MatchOptions,
}

impl SearchStats {
    pub fn is_truncated(&self) -> bool {
        self.returned_results < self.total_results
    }

    /// Share of source rows that matched, in percent.
    pub fn match_percentage(&self) -> f64 {
        if self.source_rows == 0 {
            0.0
        } else {
            self.total_results as f64 / self.source_rows as f64 * 100.0
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub table: Table,
    pub stats: SearchStats,
}

/// Filter `table` by `request`.
///
/// Unknown columns are rejected before any matching. A blank term returns
/// the whole table untouched with zero elapsed time.
pub fn search(table: &Table, request: &SearchRequest) -> Result<SearchOutcome, SearchError> {
    let invalid: Vec<String> = request
        .columns
        .iter()
        .filter(|c| !table.has_column(c))
        .cloned()
        .collect();
    if !invalid.is_empty() {
        return Err(SearchError::InvalidColumns(invalid));
    }

    let mut stats = SearchStats {
        elapsed: Duration::ZERO,
        total_results: table.n_rows(),
        returned_results: table.n_rows(),
        source_rows: table.n_rows(),
        term: request.term.clone(),
        columns: request.columns.clone(),
        options: request.options,
    };

    if request.term.trim().is_empty() {
        return Ok(SearchOutcome {
            table: table.clone(),
            stats,
        });
    }
    if request.columns.is_empty() {
        return Err(SearchError::NoColumns);
    }

    let start = Instant::now();
    let matcher = Matcher::new(&request.term, request.options)?;
    let columns: Vec<&Column> = request
        .columns
        .iter()
        .filter_map(|name| table.column(name))
        .collect();

    let mask = combined_mask(table.n_rows(), &columns, &matcher);
    let (result, total) = apply_mask(table, &mask, request.max_results);

    stats.elapsed = start.elapsed();
    stats.total_results = total;
    stats.returned_results = result.n_rows();
    log::debug!(
        "search {:?} in {:?} ({:?}): {} matches, {} returned in {:?}",
        request.term,
        request.columns,
        request.options.mode(),
        stats.total_results,
        stats.returned_results,
        stats.elapsed
    );

    Ok(SearchOutcome {
        table: result,
        stats,
    })
}
