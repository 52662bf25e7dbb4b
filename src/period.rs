use crate::error::{ResidencyStatsError, Result};
use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// `MM-YYYY_TAB_internet_stav_k_<anything>.xlsx`, separator one of `-._`
static MONTHLY_TABLE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{2})[-._](\d{4})_TAB_internet_stav_k_.*\.(xls|xlsx)").unwrap()
});

/// `STAV_K_D-M-YYYY.xlsx`, day and month with one or two digits
static SNAPSHOT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"STAV_K_\d{1,2}[-._](\d{1,2})[-._](\d{4})\.(xls|xlsx)").unwrap()
});

/// A monthly reporting snapshot, rendered as `MM.YYYY`.
///
/// Stored as the first day of the month, so ordering is chronological by
/// (year, month) rather than by the label text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period(NaiveDate);

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(Period)
            .ok_or_else(|| ResidencyStatsError::InvalidPeriod(format!("{:02}.{}", month, year)))
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn sort_key(&self) -> (i32, u32) {
        (self.year(), self.month())
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}.{:04}", self.month(), self.year())
    }
}

impl FromStr for Period {
    type Err = ResidencyStatsError;

    fn from_str(label: &str) -> Result<Self> {
        let invalid = || ResidencyStatsError::InvalidPeriod(label.to_string());

        let (month, year) = label.trim().split_once('.').ok_or_else(invalid)?;
        if year.len() != 4 {
            return Err(invalid());
        }
        let month: u32 = month.parse().map_err(|_| invalid())?;
        let year: i32 = year.parse().map_err(|_| invalid())?;

        Period::new(year, month).map_err(|_| invalid())
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(serde::de::Error::custom)
    }
}

/// Derives the reporting period from a source file name.
///
/// Recognised conventions, first match wins:
/// - `MM-YYYY_TAB_internet_stav_k_*.xlsx` gives `MM.YYYY`
/// - `STAV_K_D-M-YYYY.xlsx` gives the zero-padded month and year; the day is dropped
pub fn extract_period_from_filename(filename: &str) -> Result<Period> {
    let unrecognized = || ResidencyStatsError::UnrecognizedFilename(filename.to_string());

    let captures = MONTHLY_TABLE_PATTERN
        .captures(filename)
        .or_else(|| SNAPSHOT_PATTERN.captures(filename))
        .ok_or_else(unrecognized)?;

    let month: u32 = captures[1].parse().map_err(|_| unrecognized())?;
    let year: i32 = captures[2].parse().map_err(|_| unrecognized())?;

    Period::new(year, month).map_err(|_| unrecognized())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monthly_table_names() {
        for (name, expected) in [
            ("01-2021_TAB_internet_stav_k_x.xlsx", "01.2021"),
            ("09.2020_TAB_internet_stav_k_30092020.xls", "09.2020"),
            ("12_2019_TAB_internet_stav_k_.xlsx", "12.2019"),
        ] {
            let period = extract_period_from_filename(name).unwrap();
            assert_eq!(period.to_string(), expected, "filename {}", name);
        }
    }

    #[test]
    fn test_snapshot_names_drop_day_and_pad_month() {
        let period = extract_period_from_filename("STAV_K_5-3-2021.xlsx").unwrap();
        assert_eq!(period.to_string(), "03.2021");

        let period = extract_period_from_filename("STAV_K_31.12.2022.xls").unwrap();
        assert_eq!(period.to_string(), "12.2022");
    }

    #[test]
    fn test_unrecognized_names() {
        for name in [
            "random_name.xlsx",
            "STAV_K_5-3-2021.csv",
            "00-2021_TAB_internet_stav_k_x.xlsx",
            "STAV_K_1-13-2021.xlsx",
        ] {
            assert!(
                matches!(
                    extract_period_from_filename(name),
                    Err(ResidencyStatsError::UnrecognizedFilename(_))
                ),
                "filename {} should not be recognized",
                name
            );
        }
    }

    #[test]
    fn test_periods_order_by_year_then_month() {
        let earlier: Period = "10.2019".parse().unwrap();
        let later: Period = "09.2020".parse().unwrap();
        assert!(earlier < later);
        assert!(earlier.to_string() > later.to_string());
        assert_eq!(later.sort_key(), (2020, 9));
    }

    #[test]
    fn test_period_label_parsing() {
        assert_eq!("3.2021".parse::<Period>().unwrap().to_string(), "03.2021");
        assert!("2021.03".parse::<Period>().is_err());
        assert!("13.2021".parse::<Period>().is_err());
        assert!("03-2021".parse::<Period>().is_err());
    }

    #[test]
    fn test_period_as_json_map_key() {
        let mut series = std::collections::BTreeMap::new();
        series.insert(Period::new(2021, 1).unwrap(), 1);
        let json = serde_json::to_string(&series).unwrap();
        assert_eq!(json, r#"{"01.2021":1}"#);

        let back: std::collections::BTreeMap<Period, i32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, series);
    }
}
