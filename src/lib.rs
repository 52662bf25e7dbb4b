//! # Residency Stats Builder
//!
//! Turns the monthly foreign-residency tables (one `.xls`/`.xlsx` file per
//! reporting snapshot) into a single time series keyed by country and period.
//!
//! ## Core Concepts
//!
//! - **Anchor row**: the first row containing the `STP` marker; data starts below it
//! - **Carry-forward country**: the country label appears once per block and applies
//!   to the following rows until the next label
//! - **Sentinel row**: a first-column value containing `CELKEM` ends the data block
//! - **Period**: a `MM.YYYY` snapshot taken from the file name
//! - **Total**: a derived category holding the field-wise sum of all other categories
//!
//! ## Example
//!
//! ```rust,ignore
//! use residency_stats_builder::*;
//!
//! let config = ParserConfig::default();
//! let summary = process_directory(&config)?;
//! println!("{} files parsed, {} skipped", summary.files_parsed, summary.files_skipped());
//! ```

pub mod aggregator;
pub mod error;
pub mod export;
pub mod grid;
pub mod parser;
pub mod period;
pub mod scanner;
pub mod schema;
pub mod source;

pub use aggregator::{calculate_totals, merge_dataset, verify_totals};
pub use error::{ResidencyStatsError, Result};
pub use export::{
    to_formatted_json, to_raw_json, write_outputs, AsciiEscapedFormatter, OutputPaths,
};
pub use grid::Grid;
pub use parser::{coerce_count, parse_records, parse_sheet};
pub use period::{extract_period_from_filename, Period};
pub use scanner::find_anchor_row;
pub use schema::*;
pub use source::{list_spreadsheets, read_first_sheet};

use log::{debug, error, info, warn};
use std::collections::BTreeSet;
use std::path::Path;

/// Why a spreadsheet was left out of the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    UnrecognizedFilename,
    AnchorNotFound,
    /// The workbook could not be opened or had no sheets.
    Unreadable(String),
}

impl SkipReason {
    fn from_error(err: &ResidencyStatsError) -> Self {
        match err {
            ResidencyStatsError::UnrecognizedFilename(_) => SkipReason::UnrecognizedFilename,
            ResidencyStatsError::AnchorNotFound(_) => SkipReason::AnchorNotFound,
            other => SkipReason::Unreadable(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Parsed(ParsedDataset),
    Skipped(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub file_name: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub files_found: usize,
    pub files_parsed: usize,
    /// In processing order.
    pub skipped: Vec<SkippedFile>,
    pub countries: usize,
    pub periods: usize,
    /// `None` when there was nothing to process and no output was written.
    pub outputs: Option<OutputPaths>,
}

impl RunSummary {
    pub fn files_skipped(&self) -> usize {
        self.skipped.len()
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub struct ResidencyStatsProcessor<'a> {
    config: &'a ParserConfig,
}

impl<'a> ResidencyStatsProcessor<'a> {
    pub fn new(config: &'a ParserConfig) -> Self {
        Self { config }
    }

    pub fn process_grid(&self, grid: &Grid, period: Period) -> Result<ParsedDataset> {
        parse_sheet(grid, period, self.config)
    }

    pub fn process_file(&self, path: &Path) -> Result<ParsedDataset> {
        let file_name = file_name_of(path);
        let period = extract_period_from_filename(&file_name)?;
        info!("Processing file: {} ({})", file_name, period);

        let grid = read_first_sheet(path)?;
        debug!(
            "{}: {} rows x {} columns",
            file_name,
            grid.height(),
            grid.width()
        );

        self.process_grid(&grid, period)
    }

    /// Like [`process_file`](Self::process_file), but a file that cannot be
    /// used is logged and reported as skipped instead of failing.
    pub fn process_file_outcome(&self, path: &Path) -> FileOutcome {
        match self.process_file(path) {
            Ok(dataset) => FileOutcome::Parsed(dataset),
            Err(e) => {
                log_skipped_file(path, &e);
                FileOutcome::Skipped(SkipReason::from_error(&e))
            }
        }
    }

    /// Parses every spreadsheet in the input directory and merges them, with
    /// totals filled in and checked. Files that cannot be used are logged and
    /// skipped.
    ///
    /// Returns `None` if the directory holds no spreadsheets.
    pub fn collect(&self) -> Result<Option<(ParsedDataset, RunSummary)>> {
        let files = list_spreadsheets(&self.config.input_dir)?;
        if files.is_empty() {
            info!(
                "No Excel files found in {}",
                self.config.input_dir.display()
            );
            return Ok(None);
        }

        let mut summary = RunSummary {
            files_found: files.len(),
            ..RunSummary::default()
        };
        let mut dataset = ParsedDataset::new();

        for path in &files {
            match self.process_file_outcome(path) {
                FileOutcome::Parsed(file_data) => {
                    merge_dataset(&mut dataset, file_data);
                    summary.files_parsed += 1;
                }
                FileOutcome::Skipped(reason) => summary.skipped.push(SkippedFile {
                    file_name: file_name_of(path),
                    reason,
                }),
            }
        }

        calculate_totals(&mut dataset);
        verify_totals(&dataset)?;

        summary.countries = dataset.len();
        summary.periods = dataset
            .values()
            .flat_map(|series| series.keys())
            .collect::<BTreeSet<_>>()
            .len();

        Ok(Some((dataset, summary)))
    }

    pub fn run(&self) -> Result<RunSummary> {
        let Some((dataset, mut summary)) = self.collect()? else {
            return Ok(RunSummary::default());
        };

        summary.outputs = Some(write_outputs(&dataset, self.config)?);

        info!(
            "Parsed {} of {} files ({} skipped): {} countries across {} periods",
            summary.files_parsed,
            summary.files_found,
            summary.files_skipped(),
            summary.countries,
            summary.periods
        );

        Ok(summary)
    }
}

fn log_skipped_file(path: &Path, err: &ResidencyStatsError) {
    let name = path.display();
    match err {
        ResidencyStatsError::UnrecognizedFilename(_) => {
            warn!("Could not extract date from filename {}", name)
        }
        ResidencyStatsError::AnchorNotFound(marker) => {
            warn!("No '{}' row found in {}", marker, name)
        }
        other => error!("Error reading file {}: {}", name, other),
    }
}

pub fn process_directory(config: &ParserConfig) -> Result<RunSummary> {
    ResidencyStatsProcessor::new(config).run()
}
