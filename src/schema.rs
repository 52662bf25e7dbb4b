use crate::period::Period;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Reserved category key holding the derived sum of every other category.
pub const TOTAL_CATEGORY: &str = "total";

/// Head counts for one residence category, as published in the source tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CountRecord {
    #[serde(rename = "muži")]
    pub male: i64,
    #[serde(rename = "ženy")]
    pub female: i64,
    #[serde(rename = "celkem")]
    pub combined: i64,
}

impl CountRecord {
    pub fn new(male: i64, female: i64, combined: i64) -> Self {
        Self {
            male,
            female,
            combined,
        }
    }

    /// Field-wise sum, or `None` if any field overflows.
    pub fn checked_add(self, rhs: CountRecord) -> Option<CountRecord> {
        Some(CountRecord {
            male: self.male.checked_add(rhs.male)?,
            female: self.female.checked_add(rhs.female)?,
            combined: self.combined.checked_add(rhs.combined)?,
        })
    }

    pub fn saturating_add(self, rhs: CountRecord) -> CountRecord {
        CountRecord {
            male: self.male.saturating_add(rhs.male),
            female: self.female.saturating_add(rhs.female),
            combined: self.combined.saturating_add(rhs.combined),
        }
    }
}

/// Residence category (lowercased) to counts, for one country and period.
pub type TimeSeriesEntry = BTreeMap<String, CountRecord>;

/// Periods of one country in chronological order.
pub type CountrySeries = BTreeMap<Period, TimeSeriesEntry>;

/// Country to its time series. This is the shape written to the output files.
pub type ParsedDataset = BTreeMap<String, CountrySeries>;

fn default_country_synonyms() -> BTreeMap<String, String> {
    BTreeMap::from([("Ruská federace".to_string(), "Rusko".to_string())])
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ParserConfig {
    #[schemars(description = "Directory scanned for .xls/.xlsx source tables")]
    pub input_dir: PathBuf,

    #[schemars(description = "Directory receiving the formatted and raw JSON outputs")]
    pub output_dir: PathBuf,

    #[schemars(
        description = "Case-sensitive substring identifying the header row. Data starts on the row after it."
    )]
    pub anchor_marker: String,

    #[schemars(
        description = "Substring that, found in the uppercased first column, ends the data block of a sheet"
    )]
    pub sentinel: String,

    #[schemars(
        description = "Additional rows to skip after the anchor offset before reading data (e.g. a sub-header with column captions)"
    )]
    pub header_rows_after_anchor: usize,

    #[schemars(
        description = "Country spellings merged into a canonical name, applied whenever a new country label is read"
    )]
    pub country_synonyms: BTreeMap<String, String>,

    pub formatted_file_name: String,

    pub raw_file_name: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("./source"),
            output_dir: PathBuf::from("./output"),
            anchor_marker: "STP".to_string(),
            sentinel: "CELKEM".to_string(),
            header_rows_after_anchor: 0,
            country_synonyms: default_country_synonyms(),
            formatted_file_name: "parsed_data_formatted.json".to_string(),
            raw_file_name: "parsed_data_raw.json".to_string(),
        }
    }
}

impl ParserConfig {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Maps a country label through the synonym table.
    pub fn canonical_country(&self, country: &str) -> String {
        self.country_synonyms
            .get(country)
            .cloned()
            .unwrap_or_else(|| country.to_string())
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(ParserConfig)
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_record_addition() {
        let total = CountRecord::new(5, 3, 8).checked_add(CountRecord::new(2, 1, 3));
        assert_eq!(total, Some(CountRecord::new(7, 4, 11)));
    }

    #[test]
    fn test_count_record_overflow() {
        let big = CountRecord::new(i64::MAX, 1, 1);
        assert_eq!(big.checked_add(CountRecord::new(1, 0, 0)), None);
        assert_eq!(
            big.saturating_add(CountRecord::new(1, 2, 3)),
            CountRecord::new(i64::MAX, 3, 4)
        );
    }

    #[test]
    fn test_count_record_uses_source_field_names() {
        let json = serde_json::to_string(&CountRecord::new(1, 2, 3)).unwrap();
        assert_eq!(json, r#"{"muži":1,"ženy":2,"celkem":3}"#);
    }

    #[test]
    fn test_canonical_country() {
        let config = ParserConfig::default();
        assert_eq!(config.canonical_country("Ruská federace"), "Rusko");
        assert_eq!(config.canonical_country("Polsko"), "Polsko");
    }

    #[test]
    fn test_partial_config_falls_back_to_defaults() {
        let config = ParserConfig::from_json_str(r#"{"sentinel": "TOTAL"}"#).unwrap();
        assert_eq!(config.sentinel, "TOTAL");
        assert_eq!(config.anchor_marker, "STP");
        assert_eq!(config.country_synonyms.len(), 1);
    }

    #[test]
    fn test_schema_generation() {
        let schema_json = ParserConfig::schema_as_json().unwrap();
        assert!(schema_json.contains("anchor_marker"));
        assert!(schema_json.contains("country_synonyms"));
    }
}
