use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::pipeline::ingestion::{fold, ColumnMap, Field};
use crate::types::{FieldIssue, Period, RawRow, RejectedRow, VisitRecord};

/// Result of normalizing one raw batch. Field-level parse problems never
/// abort the batch; they are absorbed here so partial data still aggregates.
#[derive(Debug, Default)]
pub struct NormalizeOutcome {
    pub records: Vec<VisitRecord>,
    pub rejected: Vec<RejectedRow>,
    pub issues: Vec<FieldIssue>,
}

/// Date formats accepted by the source exports, tried in priority order.
/// The first format that parses wins.
const DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%Y-%m-%d", "%d-%m-%Y"];

const TIME_FORMATS: &[&str] = &["%H:%M", "%H:%M:%S"];

/// Everything that is not a digit, comma or minus sign. Strips "R$",
/// whitespace and thousands dots in one pass before decimal parsing.
static CURRENCY_NOISE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9,\-]").unwrap());

/// Parses a locale-formatted currency string ("R$ 1.234,56") into a
/// fixed-point decimal. Unparseable or negative values yield `None` so they
/// are treated as missing rather than silently corrupting totals.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let cleaned = CURRENCY_NOISE.replace_all(raw, "");
    if cleaned.is_empty() {
        return None;
    }
    let normalized = cleaned.replace(',', ".");
    let amount: Decimal = normalized.parse().ok()?;
    if amount.is_sign_negative() {
        return None;
    }
    Some(amount)
}

/// Parses a visit date, trying each known literal format in order.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(raw, fmt).ok())
}

/// Maps a free-text period label onto the canonical bucket set. Accent,
/// case and whitespace insensitive; anything unrecognized becomes Unknown.
pub fn normalize_period(raw: &str) -> Period {
    match fold(raw).as_str() {
        "manha" => Period::Morning,
        "tarde" => Period::Afternoon,
        "noite" => Period::Evening,
        _ => Period::Unknown,
    }
}

/// Normalizes a raw batch into visit records. Per-row rules:
/// headers resolve through the synonym table; dates and amounts that fail
/// to parse become missing fields (tracked as issues), and only rows with
/// no usable field at all are rejected.
///
/// The column set of a source is not fixed, and sparse sources may omit
/// blank cells entirely, so columns resolve against the union of keys
/// across the whole batch rather than any single row.
pub fn normalize(rows: &[RawRow]) -> NormalizeOutcome {
    let headers: Vec<String> = rows
        .iter()
        .flat_map(|row| row.keys().cloned())
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect();
    let columns = ColumnMap::resolve(&headers);
    normalize_with_columns(rows, &columns)
}

pub fn normalize_with_columns(rows: &[RawRow], columns: &ColumnMap) -> NormalizeOutcome {
    let mut outcome = NormalizeOutcome::default();

    for (row_index, row) in rows.iter().enumerate() {
        let client = columns
            .get(row, Field::Client)
            .unwrap_or_default()
            .trim()
            .to_string();
        let employee = columns
            .get(row, Field::Employee)
            .unwrap_or_default()
            .trim()
            .to_string();
        let service = columns
            .get(row, Field::Service)
            .unwrap_or_default()
            .trim()
            .to_string();

        let raw_date = columns.get(row, Field::Date);
        let date = raw_date.and_then(parse_date);
        if let Some(raw) = raw_date {
            if date.is_none() {
                outcome.issues.push(FieldIssue {
                    row_index,
                    field: Field::Date.name(),
                    raw_value: raw.to_string(),
                    message: "date matched no known format".to_string(),
                });
            }
        }

        let raw_amount = columns.get(row, Field::Amount);
        let amount = raw_amount.and_then(parse_amount);
        if let Some(raw) = raw_amount {
            if amount.is_none() {
                outcome.issues.push(FieldIssue {
                    row_index,
                    field: Field::Amount.name(),
                    raw_value: raw.to_string(),
                    message: "amount is not a valid currency value".to_string(),
                });
            }
        }

        if client.is_empty() && date.is_none() && amount.is_none() {
            debug!(row_index, "rejecting row with no usable fields");
            outcome.rejected.push(RejectedRow {
                row_index,
                reason: "no client, date or amount".to_string(),
            });
            continue;
        }

        let start_time = columns.get(row, Field::StartTime).and_then(parse_time);
        let end_time = columns.get(row, Field::EndTime).and_then(parse_time);
        let period = columns
            .get(row, Field::Period)
            .map(normalize_period)
            .unwrap_or(Period::Unknown);
        let family = columns
            .get(row, Field::Family)
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty());

        outcome.records.push(VisitRecord {
            client,
            employee,
            service,
            amount,
            date,
            start_time,
            end_time,
            period,
            family,
        });
    }

    if !outcome.issues.is_empty() {
        warn!(
            issues = outcome.issues.len(),
            rejected = outcome.rejected.len(),
            rows = rows.len(),
            "normalization finished with parse problems"
        );
    }
    outcome
}
