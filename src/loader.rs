//! Profit/loss export loading: schema check, cleaning, date filtering, ordering.

use std::io::Read;

use chrono::NaiveDateTime;
use csv::StringRecord;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::dates::parse_export_timestamp;

pub const MARKET_COLUMN: &str = "Mercado";
pub const START_TIME_COLUMN: &str = "Hora de inicio";
pub const SETTLED_DATE_COLUMN: &str = "Data da última resolução";
pub const PROFIT_LOSS_COLUMN: &str = "Lucro/Perda (R$)";

pub const REQUIRED_COLUMNS: [&str; 4] = [
    MARKET_COLUMN,
    START_TIME_COLUMN,
    SETTLED_DATE_COLUMN,
    PROFIT_LOSS_COLUMN,
];

/// One settled market outcome. Every loaded record has a valid settlement time.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub market_description: String,
    pub start_time: Option<NaiveDateTime>,
    pub settled_date: NaiveDateTime,
    pub profit_loss: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedRecords {
    /// Ascending by `settled_date`; ties keep file order.
    pub records: Vec<Record>,
    pub rows_read: usize,
    pub rows_dropped: usize,
}

impl LoadedRecords {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("required column '{column}' is missing from the file")]
    MissingColumn { column: &'static str },
    #[error("profit/loss value '{value}' on line {line} is not a number")]
    InvalidProfitLoss { line: u64, value: String },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "Mercado")]
    market_description: String,
    #[serde(rename = "Hora de inicio")]
    start_time: String,
    #[serde(rename = "Data da última resolução")]
    settled_date: String,
    #[serde(rename = "Lucro/Perda (R$)")]
    profit_loss: String,
}

/// Strips surrounding whitespace and parses a finite decimal.
pub fn clean_profit_loss(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

pub fn load_records_from_bytes(bytes: &[u8]) -> Result<LoadedRecords, LoadError> {
    load_records(bytes)
}

/// Reads an export, failing on a missing column or any malformed profit/loss
/// value. Rows whose settlement date does not parse are dropped.
pub fn load_records<R: Read>(input: R) -> Result<LoadedRecords, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(input);

    let headers: StringRecord = reader.headers()?.iter().map(clean_header).collect();
    if let Err(err) = check_required_columns(&headers) {
        warn!(
            component = "loader",
            event = "loader.error",
            error = %err
        );
        return Err(err);
    }

    let mut records = Vec::new();
    let mut rows_read = 0usize;
    let mut rows_dropped = 0usize;

    for result in reader.records() {
        let row = result?;
        rows_read += 1;
        let line = row.position().map(|pos| pos.line()).unwrap_or_default();
        let raw: RawRow = row.deserialize(Some(&headers))?;

        let Some(profit_loss) = clean_profit_loss(&raw.profit_loss) else {
            let err = LoadError::InvalidProfitLoss {
                line,
                value: raw.profit_loss,
            };
            warn!(
                component = "loader",
                event = "loader.error",
                error = %err
            );
            return Err(err);
        };

        let Some(settled_date) = parse_export_timestamp(&raw.settled_date) else {
            rows_dropped += 1;
            debug!(
                component = "loader",
                event = "loader.row.dropped",
                line,
                settled_date = %raw.settled_date
            );
            continue;
        };

        records.push(Record {
            market_description: raw.market_description,
            start_time: parse_export_timestamp(&raw.start_time),
            settled_date,
            profit_loss,
        });
    }

    records.sort_by_key(|record| record.settled_date);

    info!(
        component = "loader",
        event = "loader.finish",
        rows_read,
        rows_kept = records.len(),
        rows_dropped
    );

    Ok(LoadedRecords {
        records,
        rows_read,
        rows_dropped,
    })
}

fn clean_header(raw: &str) -> &str {
    raw.trim_start_matches('\u{feff}').trim()
}

fn check_required_columns(headers: &StringRecord) -> Result<(), LoadError> {
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|header| header == column) {
            return Err(LoadError::MissingColumn { column });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    const HEADER: &str = "Mercado,Hora de inicio,Data da última resolução,Lucro/Perda (R$)\n";

    fn csv_with(rows: &[&str]) -> String {
        let mut out = HEADER.to_string();
        for row in rows {
            out.push_str(row);
            out.push('\n');
        }
        out
    }

    #[test]
    fn numeric_cleaner_trims_and_rejects_non_finite() {
        assert_eq!(clean_profit_loss(" 12.50 "), Some(12.5));
        assert_eq!(clean_profit_loss("-3"), Some(-3.0));
        assert_eq!(clean_profit_loss(""), None);
        assert_eq!(clean_profit_loss("1,234.00"), None);
        assert_eq!(clean_profit_loss("NaN"), None);
        assert_eq!(clean_profit_loss("inf"), None);
    }

    #[test]
    fn loads_sorts_and_keeps_invalid_start_times() {
        let csv = csv_with(&[
            "Futebol / A x B: Resultado Final,05-mai-23 12:00,06-mai-23 10:00,5.00",
            "Futebol / C x D: Resultado Final,not a date,05-mai-23 14:30, -2.5 ",
        ]);

        let loaded = load_records_from_bytes(csv.as_bytes()).unwrap();
        assert_eq!(loaded.rows_read, 2);
        assert_eq!(loaded.rows_dropped, 0);
        assert_eq!(loaded.records.len(), 2);

        let first = &loaded.records[0];
        assert_eq!(first.market_description, "Futebol / C x D: Resultado Final");
        assert_eq!(first.start_time, None);
        assert_eq!(first.settled_date.day(), 5);
        assert_eq!(first.settled_date.hour(), 14);
        assert_eq!(first.profit_loss, -2.5);

        assert!(loaded.records[1].start_time.is_some());
    }

    #[test]
    fn rows_with_bad_settlement_dates_are_dropped() {
        let csv = csv_with(&[
            "m1,01-jan-24 10:00,01-jan-24 11:00,1",
            "m2,01-jan-24 10:00,,2",
            "m3,01-jan-24 10:00,yesterday,3",
        ]);

        let loaded = load_records_from_bytes(csv.as_bytes()).unwrap();
        assert_eq!(loaded.rows_read, 3);
        assert_eq!(loaded.rows_dropped, 2);
        assert_eq!(loaded.records.len(), 1);
        assert_eq!(loaded.records[0].market_description, "m1");
    }

    #[test]
    fn equal_settlement_dates_keep_file_order() {
        let csv = csv_with(&[
            "late,,02-fev-24 09:00,1",
            "first,,01-fev-24 09:00,2",
            "second,,01-fev-24 09:00,3",
            "third,,01-fev-24 09:00,4",
        ]);

        let loaded = load_records_from_bytes(csv.as_bytes()).unwrap();
        let order: Vec<&str> = loaded
            .records
            .iter()
            .map(|r| r.market_description.as_str())
            .collect();
        assert_eq!(order, vec!["first", "second", "third", "late"]);
    }

    #[test]
    fn missing_column_is_a_schema_error() {
        let csv = "Mercado,Hora de inicio,Lucro/Perda (R$)\nm,01-jan-24 10:00,1\n";
        let err = load_records_from_bytes(csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            LoadError::MissingColumn {
                column: SETTLED_DATE_COLUMN
            }
        ));
    }

    #[test]
    fn malformed_profit_loss_fails_the_whole_load() {
        let csv = csv_with(&[
            "m1,,01-jan-24 10:00,1",
            "m2,,01-jan-24 11:00,abc",
            "m3,,01-jan-24 12:00,3",
        ]);

        let err = load_records_from_bytes(csv.as_bytes()).unwrap_err();
        match err {
            LoadError::InvalidProfitLoss { line, value } => {
                assert_eq!(line, 3);
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_profit_loss_fails_even_when_date_is_invalid() {
        let csv = csv_with(&["m1,,not a date,oops"]);
        assert!(matches!(
            load_records_from_bytes(csv.as_bytes()).unwrap_err(),
            LoadError::InvalidProfitLoss { .. }
        ));
    }

    #[test]
    fn extra_columns_and_bom_are_tolerated() {
        let csv = "\u{feff}Id,Mercado,Hora de inicio,Data da última resolução,Lucro/Perda (R$),Extra\n\
                   7,m1,,01-jan-24 10:00,1.25,x\n";

        let loaded = load_records_from_bytes(csv.as_bytes()).unwrap();
        assert_eq!(loaded.records.len(), 1);
        assert_eq!(loaded.records[0].profit_loss, 1.25);
    }

    #[test]
    fn ragged_rows_surface_as_csv_errors() {
        let csv = csv_with(&["m1,,01-jan-24 10:00"]);
        assert!(matches!(
            load_records_from_bytes(csv.as_bytes()).unwrap_err(),
            LoadError::Csv(_)
        ));
    }

    #[test]
    fn header_only_file_loads_empty() {
        let loaded = load_records_from_bytes(HEADER.as_bytes()).unwrap();
        assert!(loaded.is_empty());
        assert_eq!(loaded.rows_read, 0);
    }
}
