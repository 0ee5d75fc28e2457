use std::collections::HashMap;

use chrono::NaiveDate;

use crate::types::{OverdueClient, VisitRecord};

/// Clients whose most recent valid visit is at least `threshold_days` old
/// as of `as_of`, sorted by days overdue descending (name ascending on
/// ties). Pure function of the record set; message formatting and dispatch
/// belong to the notification collaborator.
pub fn find_overdue(
    records: &[VisitRecord],
    threshold_days: i64,
    as_of: NaiveDate,
) -> Vec<OverdueClient> {
    let mut last_visit: HashMap<String, (String, NaiveDate)> = HashMap::new();

    for record in records {
        let date = match record.date {
            Some(d) => d,
            None => continue,
        };
        let name = record.client.trim();
        if name.is_empty() {
            continue;
        }
        last_visit
            .entry(record.client_key())
            .and_modify(|(_, latest)| {
                if date > *latest {
                    *latest = date;
                }
            })
            .or_insert_with(|| (name.to_string(), date));
    }

    let mut overdue: Vec<OverdueClient> = last_visit
        .into_values()
        .filter_map(|(client, last)| {
            let days_since = (as_of - last).num_days();
            (days_since >= threshold_days).then_some(OverdueClient {
                client,
                last_visit: last,
                days_since,
            })
        })
        .collect();

    overdue.sort_by(|a, b| {
        b.days_since
            .cmp(&a.days_since)
            .then_with(|| a.client.cmp(&b.client))
    });
    overdue
}
