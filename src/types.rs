use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Raw row as yielded by a row source: column header -> cell text.
/// Headers are kept verbatim; resolution to semantic fields happens later.
pub type RawRow = BTreeMap<String, String>;

/// One normalized service event, parsed from a single raw row.
/// Immutable after parse; the raw row is discarded once fields are extracted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitRecord {
    /// Client name, trimmed. Blank stays as an empty string, never dropped.
    pub client: String,
    pub employee: String,
    pub service: String,
    /// Parsed amount; `None` means the cell was missing or unparseable.
    /// A missing amount is excluded from sums, never treated as zero.
    pub amount: Option<Decimal>,
    /// Visit date; `None` excludes the row from date-dependent aggregations
    /// without discarding it.
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub period: Period,
    /// Family group tag, when the status store knows this client.
    pub family: Option<String>,
}

impl VisitRecord {
    /// Grouping key for per-client aggregation: case-folded, trimmed.
    pub fn client_key(&self) -> String {
        self.client.trim().to_lowercase()
    }
}

/// Coarse time-of-day bucket assigned to a visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Period {
    Morning,
    Afternoon,
    Evening,
    /// Label was blank or matched no known bucket.
    Unknown,
}

/// Aggregated result per client (or per family group).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientSummary {
    /// Client identifier (or family tag in family rankings).
    pub client: String,
    /// Sum of parseable amounts only.
    pub total: Decimal,
    /// Distinct visit-days, cutover-aware (not raw row count).
    pub visit_count: u32,
    /// 1-based position after sorting and truncation.
    pub rank: u32,
}

/// One overdue-client entry produced by `find_overdue`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverdueClient {
    pub client: String,
    pub last_visit: NaiveDate,
    pub days_since: i64,
}

/// A reporting period used as a filter predicate over `VisitRecord::date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeWindow {
    Year(i32),
    Month { year: i32, month: u32 },
    IsoWeek { year: i32, week: u32 },
    Range { start: NaiveDate, end: NaiveDate },
}

impl TimeWindow {
    /// Whether `date` falls inside this window. Range bounds are inclusive.
    pub fn contains(&self, date: NaiveDate) -> bool {
        use chrono::Datelike;
        match *self {
            TimeWindow::Year(y) => date.year() == y,
            TimeWindow::Month { year, month } => date.year() == year && date.month() == month,
            TimeWindow::IsoWeek { year, week } => {
                let iso = date.iso_week();
                iso.year() == year && iso.week() == week
            }
            TimeWindow::Range { start, end } => date >= start && date <= end,
        }
    }
}

/// A raw row that produced no usable fields at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectedRow {
    /// Zero-based position within the source batch.
    pub row_index: usize,
    pub reason: String,
}

/// A non-fatal per-field parse problem. The owning row survives with the
/// field marked missing; issues are reported alongside the records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldIssue {
    pub row_index: usize,
    pub field: &'static str,
    pub raw_value: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_contains_year_and_month() {
        let d = NaiveDate::from_ymd_opt(2025, 5, 10).unwrap();
        assert!(TimeWindow::Year(2025).contains(d));
        assert!(!TimeWindow::Year(2024).contains(d));
        assert!(TimeWindow::Month { year: 2025, month: 5 }.contains(d));
        assert!(!TimeWindow::Month { year: 2025, month: 6 }.contains(d));
    }

    #[test]
    fn window_contains_iso_week() {
        // 2025-05-10 is a Saturday in ISO week 19
        let d = NaiveDate::from_ymd_opt(2025, 5, 10).unwrap();
        assert!(TimeWindow::IsoWeek { year: 2025, week: 19 }.contains(d));
        assert!(!TimeWindow::IsoWeek { year: 2025, week: 20 }.contains(d));
    }

    #[test]
    fn window_range_bounds_are_inclusive() {
        let start = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 5, 31).unwrap();
        let w = TimeWindow::Range { start, end };
        assert!(w.contains(start));
        assert!(w.contains(end));
        assert!(!w.contains(start.pred_opt().unwrap()));
    }

    #[test]
    fn client_key_folds_case_and_whitespace() {
        let rec = VisitRecord {
            client: "  Ana Souza ".to_string(),
            employee: String::new(),
            service: String::new(),
            amount: None,
            date: None,
            start_time: None,
            end_time: None,
            period: Period::Unknown,
            family: None,
        };
        assert_eq!(rec.client_key(), "ana souza");
    }
}
