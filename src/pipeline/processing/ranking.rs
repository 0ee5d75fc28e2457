use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use crate::config::ExclusionsConfig;
use crate::error::{ReportError, Result};
use crate::pipeline::ingestion::fold;
use crate::pipeline::processing::dedup::count_visit_days;
use crate::sources::status_store::FamilyMap;
use crate::types::{ClientSummary, TimeWindow, VisitRecord};

/// Placeholder client names dropped from ranking outputs. Matching is
/// case/accent-insensitive: exact against `exact`, substring against
/// `markers`. The rows stay in the raw data; only rankings filter them.
#[derive(Debug, Clone, Default)]
pub struct ExclusionList {
    exact: Vec<String>,
    markers: Vec<String>,
}

impl ExclusionList {
    pub fn new<I, J>(exact: I, markers: J) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        J: IntoIterator,
        J::Item: AsRef<str>,
    {
        Self {
            exact: exact.into_iter().map(|s| fold(s.as_ref())).collect(),
            markers: markers
                .into_iter()
                .map(|s| fold(s.as_ref()))
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    pub fn from_config(config: &ExclusionsConfig) -> Self {
        Self::new(&config.exact, &config.markers)
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        let folded = fold(name);
        self.exact.iter().any(|e| e == &folded)
            || self.markers.iter().any(|m| folded.contains(m.as_str()))
    }
}

struct Bucket {
    display: String,
    total: Decimal,
    dates: Vec<NaiveDate>,
}

/// Groups records by a caller-supplied key, sums parseable amounts, counts
/// cutover-aware visit-days, then sorts by total descending with name
/// ascending as the deterministic tie-break.
fn rank_by<K>(
    records: &[VisitRecord],
    key_of: K,
    window: Option<TimeWindow>,
    exclusions: &ExclusionList,
    top_n: usize,
    cutover: NaiveDate,
) -> Vec<ClientSummary>
where
    K: Fn(&VisitRecord) -> Option<String>,
{
    let mut buckets: HashMap<String, Bucket> = HashMap::new();

    for record in records {
        if let Some(window) = window {
            match record.date {
                Some(date) if window.contains(date) => {}
                _ => continue,
            }
        }
        if exclusions.is_excluded(&record.client) {
            continue;
        }
        let display = match key_of(record) {
            Some(k) => k,
            None => continue,
        };
        let key = fold(&display);

        let bucket = buckets.entry(key).or_insert_with(|| Bucket {
            display: display.clone(),
            total: Decimal::ZERO,
            dates: Vec::new(),
        });
        if let Some(amount) = record.amount {
            bucket.total += amount;
        }
        if let Some(date) = record.date {
            bucket.dates.push(date);
        }
    }

    let mut summaries: Vec<ClientSummary> = buckets
        .into_values()
        .map(|bucket| ClientSummary {
            visit_count: count_visit_days(bucket.dates.iter().copied(), cutover),
            client: bucket.display,
            total: bucket.total,
            rank: 0,
        })
        .collect();

    summaries.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.client.cmp(&b.client))
    });
    summaries.truncate(top_n);
    for (i, summary) in summaries.iter_mut().enumerate() {
        summary.rank = (i + 1) as u32;
    }

    debug!(clients = summaries.len(), "ranking computed");
    summaries
}

/// Top clients by total spend within an optional window. See §ranking rules
/// on the contract: exclusion list first, then group/sum/count, stable
/// descending order, 1-based ranks after truncation.
pub fn rank_clients(
    records: &[VisitRecord],
    window: Option<TimeWindow>,
    exclusions: &ExclusionList,
    top_n: usize,
    cutover: NaiveDate,
) -> Vec<ClientSummary> {
    rank_by(
        records,
        |record| Some(record.client.trim().to_string()),
        window,
        exclusions,
        top_n,
        cutover,
    )
}

/// Family-group variant: the grouping key is the family tag, taken from the
/// record itself or looked up in the status-store mapping. Clients with no
/// family tag are filtered out, not an error. Requesting a family ranking
/// with no mapping available at all is a configuration error.
pub fn rank_families(
    records: &[VisitRecord],
    families: Option<&FamilyMap>,
    window: Option<TimeWindow>,
    exclusions: &ExclusionList,
    top_n: usize,
    cutover: NaiveDate,
) -> Result<Vec<ClientSummary>> {
    let has_inline_tags = records.iter().any(|r| r.family.is_some());
    if families.is_none() && !has_inline_tags {
        return Err(ReportError::Config(
            "family ranking requested but no family mapping is available".to_string(),
        ));
    }

    Ok(rank_by(
        records,
        |record| {
            record
                .family
                .clone()
                .or_else(|| families.and_then(|f| f.family_of(&record.client)))
        },
        window,
        exclusions,
        top_n,
        cutover,
    ))
}
