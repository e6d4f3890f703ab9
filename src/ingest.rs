//! CSV loading for the sales and mistake files.
//!
//! Both loads resolve the header row through `schema` first and then pull
//! cells by index, so header drift never reaches the aggregation. Dates are
//! parsed permissively: an unrecognised value becomes `None` and the row is
//! kept rather than dropped.

use std::path::Path;

use chrono::NaiveDate;
use tracing::info;

use crate::error::{KpiError, Result};
use crate::models::{MistakeRecord, SalesRecord};
use crate::schema;

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%m/%d/%Y",
];

/// Parse a date cell, trying each accepted format in order. Datetime cells
/// are handled by parsing only their leading date part. Returns `None` for
/// empty or unrecognised values.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    // "2024-01-05 13:45:00" -> "2024-01-05"
    let date_part = value.split_whitespace().next().unwrap_or(value);
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

/// Month bucket of a date, e.g. "2024-03". `None` propagates.
pub fn month_bucket(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format("%Y-%m").to_string())
}

fn read_headers(reader: &mut csv::Reader<std::fs::File>) -> Result<Vec<String>> {
    Ok(reader
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect())
}

fn open_reader(path: &Path) -> Result<csv::Reader<std::fs::File>> {
    csv::Reader::from_path(path).map_err(|source| KpiError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_sales(path: &Path) -> Result<Vec<SalesRecord>> {
    let mut reader = open_reader(path)?;
    let headers = read_headers(&mut reader)?;
    let cols = schema::resolve_sales(&headers)?;

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result?;
        records.push(SalesRecord {
            agent: row.get(cols.agent).unwrap_or_default().trim().to_string(),
            so_date: parse_date(row.get(cols.date).unwrap_or_default()),
        });
    }
    info!(count = records.len(), path = %path.display(), "loaded sales records");
    Ok(records)
}

pub fn load_mistakes(path: &Path) -> Result<Vec<MistakeRecord>> {
    let mut reader = open_reader(path)?;
    let headers = read_headers(&mut reader)?;
    let cols = schema::resolve_mistakes(&headers)?;

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result?;
        records.push(MistakeRecord {
            agent: row.get(cols.agent).unwrap_or_default().trim().to_string(),
            mistake_date: parse_date(row.get(cols.date).unwrap_or_default()),
            category: row.get(cols.category).unwrap_or_default().to_string(),
            // Blank or non-numeric weight cells count as zero, mirroring a
            // sum over missing values.
            weight: row
                .get(cols.weight)
                .unwrap_or_default()
                .trim()
                .parse()
                .unwrap_or(0.0),
        });
    }
    info!(count = records.len(), path = %path.display(), "loaded mistake records");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn parses_common_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(parse_date("2024-01-05"), Some(expected));
        assert_eq!(parse_date("2024/01/05"), Some(expected));
        assert_eq!(parse_date("05/01/2024"), Some(expected));
        assert_eq!(parse_date("05-01-2024"), Some(expected));
        assert_eq!(parse_date("2024-01-05 13:45:00"), Some(expected));
    }

    #[test]
    fn unparseable_dates_become_none() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date("2024-13-45"), None);
    }

    #[test]
    fn month_bucket_formats_year_month() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 17);
        assert_eq!(month_bucket(date), Some("2024-03".to_string()));
        assert_eq!(month_bucket(None), None);
    }

    #[test]
    fn loads_sales_with_header_variants() {
        let file = write_temp("Agent Name,Date\nAlice,2024-01-05\nBob,garbage\n");
        let records = load_sales(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].agent, "Alice");
        assert_eq!(
            records[0].so_date,
            NaiveDate::from_ymd_opt(2024, 1, 5)
        );
        // Bad date is kept with the missing-date sentinel, not dropped.
        assert_eq!(records[1].agent, "Bob");
        assert_eq!(records[1].so_date, None);
    }

    #[test]
    fn loads_mistakes_and_coerces_blank_weight() {
        let file = write_temp(
            "Person,Date,SO / Bill,No of Mistake\n\
             Alice,2024-01-05,SO,2\n\
             Alice,2024-01-05,BILL,\n",
        );
        let records = load_mistakes(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].weight, 2.0);
        assert_eq!(records[0].category, "SO");
        assert_eq!(records[1].weight, 0.0);
    }

    #[test]
    fn missing_category_column_aborts_load() {
        let file = write_temp("Person,Date,No of Mistake\nAlice,2024-01-05,1\n");
        let err = load_mistakes(file.path()).unwrap_err();
        assert!(err.to_string().contains("SO/BILL category"));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_sales(Path::new("/nonexistent/sales.csv")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/sales.csv"));
    }
}
