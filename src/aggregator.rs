use crate::error::{ResidencyStatsError, Result};
use crate::schema::{CountRecord, ParsedDataset, TimeSeriesEntry, TOTAL_CATEGORY};
use log::error;

/// Folds one file's dataset into the accumulated one.
///
/// Countries and periods are unioned. Categories are replaced, not summed: a
/// later file describing the same country, period and category wins.
pub fn merge_dataset(target: &mut ParsedDataset, source: ParsedDataset) {
    for (country, series) in source {
        let target_series = target.entry(country).or_default();
        for (period, entry) in series {
            target_series.entry(period).or_default().extend(entry);
        }
    }
}

fn non_total(entry: &TimeSeriesEntry) -> impl Iterator<Item = &CountRecord> {
    entry
        .iter()
        .filter(|(category, _)| category.as_str() != TOTAL_CATEGORY)
        .map(|(_, record)| record)
}

/// Sum of the non-total categories, `None` on overflow.
fn sum_categories(entry: &TimeSeriesEntry) -> Option<CountRecord> {
    non_total(entry).try_fold(CountRecord::default(), |acc, record| acc.checked_add(*record))
}

fn saturated_sum(entry: &TimeSeriesEntry) -> CountRecord {
    non_total(entry).fold(CountRecord::default(), |acc, record| acc.saturating_add(*record))
}

/// Adds a `total` category to every country/period that does not have one yet.
/// Existing totals are left as they are, so running this twice is a no-op.
pub fn calculate_totals(dataset: &mut ParsedDataset) {
    for (country, series) in dataset.iter_mut() {
        for (period, entry) in series.iter_mut() {
            if entry.contains_key(TOTAL_CATEGORY) {
                continue;
            }
            let total = sum_categories(entry).unwrap_or_else(|| {
                error!("Total for {} in {} overflows, saturating", country, period);
                saturated_sum(entry)
            });
            entry.insert(TOTAL_CATEGORY.to_string(), total);
        }
    }
}

/// Checks that every stored `total` equals the sum of the other categories.
pub fn verify_totals(dataset: &ParsedDataset) -> Result<()> {
    for (country, series) in dataset {
        for (period, entry) in series {
            let expected = sum_categories(entry).unwrap_or_else(|| saturated_sum(entry));
            let stored = entry.get(TOTAL_CATEGORY).copied().unwrap_or_default();

            if stored != expected {
                return Err(ResidencyStatsError::TotalsMismatch {
                    country: country.clone(),
                    period: period.to_string(),
                    stored,
                    expected,
                });
            }
        }
    }

    Ok(())
}
