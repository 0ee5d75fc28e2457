use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use crate::types::VisitRecord;

/// Counts distinct visits per client key, honoring the business cutover:
/// rows dated before `cutover` were one-row-per-visit and each counts once;
/// rows dated on or after `cutover` are service line-items, so same-day rows
/// for the same client collapse into a single visit. Rows without a parsed
/// date are excluded from counts entirely (their amounts still sum
/// elsewhere; counts and totals are independent views).
pub fn count_distinct_visits(
    records: &[VisitRecord],
    cutover: NaiveDate,
) -> HashMap<String, u32> {
    let mut dates_by_client: HashMap<String, Vec<NaiveDate>> = HashMap::new();
    for record in records {
        if let Some(date) = record.date {
            dates_by_client
                .entry(record.client_key())
                .or_default()
                .push(date);
        }
    }

    dates_by_client
        .into_iter()
        .map(|(key, dates)| (key, count_visit_days(dates, cutover)))
        .collect()
}

/// Applies the cutover rule to one group's visit dates: every pre-cutover
/// date counts once per row, dates on or after the cutover count once per
/// distinct calendar day.
pub fn count_visit_days(dates: impl IntoIterator<Item = NaiveDate>, cutover: NaiveDate) -> u32 {
    let mut legacy_rows = 0u32;
    let mut combo_days: HashSet<NaiveDate> = HashSet::new();
    for date in dates {
        if date < cutover {
            legacy_rows += 1;
        } else {
            combo_days.insert(date);
        }
    }
    legacy_rows + combo_days.len() as u32
}
