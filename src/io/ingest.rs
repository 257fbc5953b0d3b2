//! CSV ingest and normalization.
//!
//! This module turns a raw unemployment table into a `Series` of `Observation`s.
//!
//! Design goals:
//! - **Strict schema** for the date and rate columns (`ForecastError::Schema`)
//! - **No dropped rows**: bad cells become missing values plus a `RowIssue`
//! - **Deterministic behavior** (no hidden randomness)
//! - **Separation of concerns**: no forecasting logic here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::domain::{Observation, ObservationDate, RATE_COLUMN, Series};
use crate::error::ForecastError;

const DATE_COLUMN: &str = "Date";
const REGION_COLUMN: &str = "Region";

/// Header labels renamed to `RATE_COLUMN` before schema checks.
const RATE_ALIASES: [&str; 2] = ["Estimated Unemployment Rate (%)", RATE_COLUMN];

/// Raw table exactly as read: header labels plus one entry per data record.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub records: Vec<RawRecord>,
}

/// One data record. `fields` is `Err` when the CSV reader could not decode it.
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub line: usize,
    pub fields: Result<Vec<String>, String>,
}

/// Kind of soft, row-level problem found during normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowIssueKind {
    /// Date cell empty or not in a day-first format.
    DateParse { raw: String },
    /// Rate cell missing, non-numeric, non-finite or negative.
    InvalidRate { raw: String },
    /// The CSV record itself could not be decoded.
    MalformedRecord { message: String },
}

/// A row-level issue. The row is still part of the series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowIssue {
    pub line: usize,
    pub kind: RowIssueKind,
}

impl std::fmt::Display for RowIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            RowIssueKind::DateParse { raw } => write!(f, "line {}: unparseable date '{raw}'", self.line),
            RowIssueKind::InvalidRate { raw } => write!(f, "line {}: invalid rate '{raw}'", self.line),
            RowIssueKind::MalformedRecord { message } => write!(f, "line {}: malformed record: {message}", self.line),
        }
    }
}

/// Normalizer output: the canonical series plus row diagnostics.
#[derive(Debug, Clone)]
pub struct NormalizedData {
    pub series: Series,
    pub row_issues: Vec<RowIssue>,
    pub rows_read: usize,
}

impl NormalizedData {
    pub fn unparseable_dates(&self) -> usize {
        self.row_issues
            .iter()
            .filter(|i| matches!(i.kind, RowIssueKind::DateParse { .. } | RowIssueKind::MalformedRecord { .. }))
            .count()
    }
}

/// Read a CSV file into a `RawTable`.
pub fn read_raw_table(path: &Path) -> Result<RawTable, ForecastError> {
    let file = File::open(path)
        .map_err(|e| ForecastError::Input(format!("Failed to open CSV '{}': {e}", path.display())))?;
    read_raw_table_from(file)
}

/// Read CSV data from any reader into a `RawTable`.
pub fn read_raw_table_from<R: Read>(reader: R) -> Result<RawTable, ForecastError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| ForecastError::Input(format!("Failed to read CSV headers: {e}")))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2: records start after the header and lines are 1-based.
        let line = result
            .as_ref()
            .ok()
            .and_then(|r| r.position())
            .map(|p| p.line() as usize)
            .unwrap_or(idx + 2);
        let fields = result
            .map(|r| r.iter().map(str::to_string).collect())
            .map_err(|e| e.to_string());
        records.push(RawRecord { line, fields });
    }

    Ok(RawTable { headers, records })
}

/// Normalize a raw table into a sorted `Series`.
///
/// Every record yields exactly one observation; the raw table is left untouched.
pub fn normalize(raw: &RawTable) -> Result<NormalizedData, ForecastError> {
    let header_map = build_header_map(&raw.headers);

    let date_idx = *header_map.get(&canonical_key(DATE_COLUMN)).ok_or_else(|| ForecastError::Schema {
        column: DATE_COLUMN.to_string(),
    })?;
    let rate_idx = *header_map.get(&canonical_key(RATE_COLUMN)).ok_or_else(|| ForecastError::Schema {
        column: RATE_COLUMN.to_string(),
    })?;
    let region_idx = header_map.get(&canonical_key(REGION_COLUMN)).copied();
    if region_idx.is_none() {
        debug!("no `{REGION_COLUMN}` column; all rows share an empty region label");
    }

    let mut observations = Vec::with_capacity(raw.records.len());
    let mut row_issues = Vec::new();

    for record in &raw.records {
        let fields = match &record.fields {
            Ok(f) => f,
            Err(message) => {
                row_issues.push(RowIssue {
                    line: record.line,
                    kind: RowIssueKind::MalformedRecord {
                        message: message.clone(),
                    },
                });
                observations.push(Observation::new(
                    record.line,
                    ObservationDate::Unparseable(String::new()),
                    "",
                    None,
                ));
                continue;
            }
        };

        let raw_date = cell(fields, Some(date_idx));
        let date = match parse_date_dayfirst(raw_date) {
            Some(d) => ObservationDate::Parsed(d),
            None => {
                row_issues.push(RowIssue {
                    line: record.line,
                    kind: RowIssueKind::DateParse {
                        raw: raw_date.to_string(),
                    },
                });
                ObservationDate::Unparseable(raw_date.to_string())
            }
        };

        let raw_rate = cell(fields, Some(rate_idx));
        let rate = parse_rate(raw_rate);
        if rate.is_none() {
            row_issues.push(RowIssue {
                line: record.line,
                kind: RowIssueKind::InvalidRate {
                    raw: raw_rate.to_string(),
                },
            });
        }

        let region = cell(fields, region_idx).to_string();
        observations.push(Observation::new(record.line, date, region, rate));
    }

    if !row_issues.is_empty() {
        warn!(
            issues = row_issues.len(),
            rows = raw.records.len(),
            "rows with unparseable dates or invalid rates were kept as missing values"
        );
    }

    Ok(NormalizedData {
        series: Series::from_observations(observations),
        row_issues,
        rows_read: raw.records.len(),
    })
}

/// Read and normalize a CSV file in one step.
pub fn load_series(path: &Path) -> Result<NormalizedData, ForecastError> {
    let raw = read_raw_table(path)?;
    let data = normalize(&raw)?;
    debug!(
        path = %path.display(),
        rows = data.rows_read,
        issues = data.row_issues.len(),
        "normalized input table"
    );
    Ok(data)
}

fn build_header_map(headers: &[String]) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        let key = canonical_key(&rename_header(name));
        // First occurrence wins on duplicate labels.
        map.entry(key).or_insert(idx);
    }
    map
}

/// Trim a header label and apply the rate-column rename.
fn rename_header(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a BOM.
    let name = name.trim().trim_start_matches('\u{feff}').trim();
    if RATE_ALIASES.iter().any(|alias| alias.eq_ignore_ascii_case(name)) {
        return RATE_COLUMN.to_string();
    }
    name.to_string()
}

fn canonical_key(name: &str) -> String {
    name.to_ascii_lowercase()
}

fn cell(fields: &[String], idx: Option<usize>) -> &str {
    idx.and_then(|i| fields.get(i)).map(|s| s.trim()).unwrap_or("")
}

/// Parse a date cell day-first.
///
/// ISO `YYYY-MM-DD` is unambiguous and accepted as well.
pub fn parse_date_dayfirst(s: &str) -> Option<NaiveDate> {
    const FMTS: [&str; 6] = ["%d-%m-%Y", "%d/%m/%Y", "%d.%m.%Y", "%d-%b-%Y", "%d %b %Y", "%Y-%m-%d"];
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    FMTS.iter().find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

fn parse_rate(s: &str) -> Option<f64> {
    let v = s.trim().parse::<f64>().ok()?;
    if v.is_finite() && v >= 0.0 { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(csv: &str) -> RawTable {
        read_raw_table_from(csv.as_bytes()).unwrap()
    }

    #[test]
    fn trims_headers_and_renames_rate_column() {
        let raw = table(
            " Region , Date , Frequency, Estimated Unemployment Rate (%) \n\
             Assam, 31-05-2019, Monthly, 4.29\n\
             Bihar, 30-06-2019, Monthly, 10.19\n",
        );
        let data = normalize(&raw).unwrap();
        assert_eq!(data.series.len(), 2);
        assert!(data.row_issues.is_empty());

        let first = &data.series.observations()[0];
        assert_eq!(first.region, "Assam");
        assert_eq!(first.parsed_date(), NaiveDate::from_ymd_opt(2019, 5, 31));
        assert_eq!(first.rate, Some(4.29));
        assert_eq!(first.month(), Some(5));
        assert_eq!(first.year(), Some(2019));
    }

    #[test]
    fn dates_are_parsed_day_first() {
        assert_eq!(parse_date_dayfirst("03/04/2020"), NaiveDate::from_ymd_opt(2020, 4, 3));
        assert_eq!(parse_date_dayfirst(" 31-01-2020 "), NaiveDate::from_ymd_opt(2020, 1, 31));
        assert_eq!(parse_date_dayfirst("2020-04-03"), NaiveDate::from_ymd_opt(2020, 4, 3));
        assert_eq!(parse_date_dayfirst("31-Mar-2020"), NaiveDate::from_ymd_opt(2020, 3, 31));
        assert_eq!(parse_date_dayfirst("31/02/2020"), None);
        assert_eq!(parse_date_dayfirst(""), None);
    }

    #[test]
    fn missing_date_column_is_a_schema_error() {
        let raw = table("Region,When,Estimated Unemployment Rate (%)\nA,31-01-2020,3.0\n");
        let err = normalize(&raw).unwrap_err();
        assert_eq!(
            err,
            ForecastError::Schema {
                column: "Date".to_string()
            }
        );
    }

    #[test]
    fn missing_rate_column_is_a_schema_error() {
        let raw = table("Region,Date,Estimated Employed\nA,31-01-2020,1000\n");
        let err = normalize(&raw).unwrap_err();
        assert_eq!(
            err,
            ForecastError::Schema {
                column: RATE_COLUMN.to_string()
            }
        );
    }

    #[test]
    fn empty_date_keeps_row_with_missing_calendar_fields() {
        let raw = table(
            "Region,Date,Unemployment Rate\n\
             A,31-01-2020,3.0\n\
             A,,7.5\n\
             A,not a date,8.0\n\
             A,31-03-2020,4.0\n",
        );
        let data = normalize(&raw).unwrap();
        assert_eq!(data.rows_read, 4);
        assert_eq!(data.series.len(), 4);
        assert_eq!(data.unparseable_dates(), 2);

        let undated: Vec<&Observation> = data.series.iter().filter(|o| o.parsed_date().is_none()).collect();
        assert_eq!(undated.len(), 2);
        assert!(undated.iter().all(|o| o.month().is_none() && o.year().is_none()));
        // Undated rows keep input order at the end of the series.
        assert_eq!(undated[0].line, 3);
        assert_eq!(undated[1].line, 4);

        // Excluded from any date-bounded aggregate.
        let bounded = data
            .series
            .rates_between(NaiveDate::from_ymd_opt(2000, 1, 1), NaiveDate::from_ymd_opt(2100, 1, 1));
        assert_eq!(bounded, vec![3.0, 4.0]);
    }

    #[test]
    fn numeric_region_codes_stay_text() {
        let raw = table("Region,Date,Unemployment Rate\n01,31-01-2020,3.0\n007,29-02-2020,3.5\n");
        let data = normalize(&raw).unwrap();
        let regions: Vec<&str> = data.series.iter().map(|o| o.region.as_str()).collect();
        assert_eq!(regions, vec!["01", "007"]);
    }

    #[test]
    fn unsorted_input_is_sorted_by_date() {
        let raw = table(
            "Region,Date,Unemployment Rate\n\
             A,31-03-2020,3.0\n\
             A,31-01-2020,1.0\n\
             A,29-02-2020,2.0\n",
        );
        let data = normalize(&raw).unwrap();
        let rates: Vec<Option<f64>> = data.series.iter().map(|o| o.rate).collect();
        assert_eq!(rates, vec![Some(1.0), Some(2.0), Some(3.0)]);
    }

    #[test]
    fn invalid_rates_are_kept_as_missing() {
        let raw = table("Region,Date,Unemployment Rate\nA,31-01-2020,n/a\nA,29-02-2020,-1\nA,31-03-2020,\n");
        let data = normalize(&raw).unwrap();
        assert_eq!(data.series.len(), 3);
        assert!(data.series.iter().all(|o| o.rate.is_none()));
        assert_eq!(data.row_issues.len(), 3);
        assert_eq!(data.unparseable_dates(), 0);
    }

    #[test]
    fn short_records_and_missing_region_column_are_tolerated() {
        let raw = table("Date,Unemployment Rate\n31-01-2020\n29-02-2020,2.0\n");
        let data = normalize(&raw).unwrap();
        assert_eq!(data.series.len(), 2);
        assert!(data.series.iter().all(|o| o.region.is_empty()));
        assert_eq!(data.series.observations()[0].rate, None);
    }

    #[test]
    fn malformed_records_still_count() {
        let raw = RawTable {
            headers: vec!["Date".into(), "Unemployment Rate".into()],
            records: vec![
                RawRecord {
                    line: 2,
                    fields: Ok(vec!["31-01-2020".into(), "3.0".into()]),
                },
                RawRecord {
                    line: 3,
                    fields: Err("invalid utf-8".into()),
                },
            ],
        };
        let data = normalize(&raw).unwrap();
        assert_eq!(data.series.len(), 2);
        assert_eq!(data.unparseable_dates(), 1);
        // Raw input is left as-is.
        assert_eq!(raw.records.len(), 2);
    }

    #[test]
    fn load_series_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("unemployment.csv");
        std::fs::write(&path, "Region,Date,Unemployment Rate\nA,31-01-2020,3.0\n").unwrap();
        let data = load_series(&path).unwrap();
        assert_eq!(data.series.len(), 1);

        let err = load_series(&dir.path().join("missing.csv")).unwrap_err();
        assert!(matches!(err, ForecastError::Input(_)));
    }
}
