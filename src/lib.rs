pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod sources;
pub mod types;

pub use config::Config;
pub use error::{ReportError, Result};
pub use pipeline::processing::dedup::count_distinct_visits;
pub use pipeline::processing::duration::compute_duration;
pub use pipeline::processing::normalize::{normalize, normalize_period, NormalizeOutcome};
pub use pipeline::processing::overdue::find_overdue;
pub use pipeline::processing::ranking::{rank_clients, rank_families, ExclusionList};
pub use types::{ClientSummary, OverdueClient, Period, RawRow, TimeWindow, VisitRecord};
