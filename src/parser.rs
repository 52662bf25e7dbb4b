use crate::error::{ResidencyStatsError, Result};
use crate::grid::{cell_text, Grid};
use crate::period::Period;
use crate::scanner::find_anchor_row;
use crate::schema::{CountRecord, CountrySeries, ParsedDataset, ParserConfig, TimeSeriesEntry};
use calamine::Data;
use log::{debug, error};
use std::collections::BTreeMap;

const COUNTRY_COLUMN: usize = 0;
const CATEGORY_COLUMN: usize = 1;

// Whole floats in [-2^63, 2^63) convert to i64 without saturating.
const I64_FLOAT_RANGE: std::ops::Range<f64> = i64::MIN as f64..i64::MAX as f64;

/// Converts a count cell to an integer. Blank cells count as zero; anything
/// that is not a number (or a numeric string) in `i64` range is rejected.
pub fn coerce_count(cell: &Data, column: usize) -> Result<i64> {
    let invalid = || ResidencyStatsError::CellCoercion {
        column,
        value: cell.to_string(),
    };

    match cell {
        Data::Empty => Ok(0),
        Data::Int(i) => Ok(*i),
        Data::Float(f) if f.is_finite() && I64_FLOAT_RANGE.contains(&f.trunc()) => {
            Ok(f.trunc() as i64)
        }
        Data::Bool(b) => Ok(i64::from(*b)),
        Data::String(s) if s.trim().is_empty() => Ok(0),
        Data::String(s) => s.trim().parse::<i64>().map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

/// Reads country / category / count rows starting at `start`.
///
/// The country label is only printed on the first row of each block, so the
/// last one seen is carried forward. Reading stops at the first row whose
/// uppercased country cell contains the sentinel.
pub fn parse_records(
    grid: &Grid,
    start: usize,
    config: &ParserConfig,
) -> BTreeMap<String, TimeSeriesEntry> {
    let width = grid.width();
    let count_columns: Vec<usize> = (width.saturating_sub(3)..width).collect();
    let sentinel = config.sentinel.to_uppercase();

    let mut records: BTreeMap<String, TimeSeriesEntry> = BTreeMap::new();
    let mut current_country: Option<String> = None;

    for (row_idx, row) in grid.rows().enumerate().skip(start) {
        let country_cell = row.get(COUNTRY_COLUMN).and_then(cell_text);

        if let Some(label) = &country_cell {
            if label.to_uppercase().contains(&sentinel) {
                debug!("Reached end marker at row {}", row_idx);
                break;
            }
            current_country = Some(config.canonical_country(label));
        }

        let Some(country) = current_country.as_ref() else {
            continue;
        };
        let Some(category) = row.get(CATEGORY_COLUMN).and_then(cell_text) else {
            continue;
        };

        match read_counts(row, &count_columns) {
            Ok(counts) => {
                records
                    .entry(country.clone())
                    .or_default()
                    .insert(category.to_lowercase(), counts);
            }
            Err(e) => {
                error!("Skipping row {} ({} / {}): {}", row_idx, country, category, e);
            }
        }
    }

    records
}

fn read_counts(row: &[Data], count_columns: &[usize]) -> Result<CountRecord> {
    let count_at = |position: usize| -> Result<i64> {
        let column = *count_columns
            .get(position)
            .ok_or(ResidencyStatsError::MissingCountColumn(position))?;
        let cell = row.get(column).unwrap_or(&Data::Empty);
        coerce_count(cell, column)
    };

    Ok(CountRecord {
        male: count_at(0)?,
        female: count_at(1)?,
        combined: count_at(2)?,
    })
}

/// Parses one sheet into a dataset covering a single period.
///
/// A sheet with nothing after the anchor yields an empty dataset.
pub fn parse_sheet(grid: &Grid, period: Period, config: &ParserConfig) -> Result<ParsedDataset> {
    let anchor = find_anchor_row(grid, &config.anchor_marker)?;
    let start = anchor + config.header_rows_after_anchor;

    if start >= grid.height() {
        return Ok(ParsedDataset::new());
    }

    let dataset = parse_records(grid, start, config)
        .into_iter()
        .map(|(country, entry)| {
            let mut series = CountrySeries::new();
            series.insert(period, entry);
            (country, series)
        })
        .collect();

    Ok(dataset)
}
