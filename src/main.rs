use chrono::{Datelike, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use barber_reports::config::Config;
use barber_reports::error::ReportError;
use barber_reports::pipeline::processing::duration::compute_duration;
use barber_reports::pipeline::processing::normalize::normalize;
use barber_reports::pipeline::processing::overdue::find_overdue;
use barber_reports::pipeline::processing::ranking::{rank_clients, rank_families, ExclusionList};
use barber_reports::sources::csv_file::CsvRowSource;
use barber_reports::sources::status_store::FamilyMap;
use barber_reports::sources::RowSource;
use barber_reports::types::{Period, TimeWindow, VisitRecord};

#[derive(Parser)]
#[command(name = "barber-reports")]
#[command(about = "Barbershop visit reporting pipeline")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the visits CSV export
    #[arg(long, global = true, default_value = "visits.csv")]
    input: String,

    /// Emit JSON instead of a human-readable table
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank clients (or families) by total spend
    Rank {
        /// Rank family groups instead of individual clients
        #[arg(long)]
        families: bool,
        /// Path to the client -> family/status mapping file
        #[arg(long)]
        families_file: Option<String>,
        /// Restrict to a calendar year
        #[arg(long)]
        year: Option<i32>,
        /// Restrict to a month (1-12) of --year
        #[arg(long)]
        month: Option<u32>,
        /// Restrict to an ISO week (1-53) of --year
        #[arg(long)]
        week: Option<u32>,
        /// Window start date (YYYY-MM-DD), used with --to
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Window end date (YYYY-MM-DD), inclusive
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Number of positions to show
        #[arg(long)]
        top: Option<usize>,
    },
    /// List clients overdue for a visit
    Overdue {
        /// Minimum days since the last visit
        #[arg(long)]
        threshold_days: Option<i64>,
        /// Reference date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
    /// Batch totals and data-quality counters
    Summary,
}

fn build_window(
    year: Option<i32>,
    month: Option<u32>,
    week: Option<u32>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<Option<TimeWindow>, ReportError> {
    match (from, to) {
        (Some(start), Some(end)) => {
            if end < start {
                return Err(ReportError::Config(
                    "--to must not precede --from".to_string(),
                ));
            }
            return Ok(Some(TimeWindow::Range { start, end }));
        }
        (Some(_), None) | (None, Some(_)) => {
            return Err(ReportError::Config(
                "--from and --to must be given together".to_string(),
            ));
        }
        (None, None) => {}
    }

    let default_year = || Utc::now().date_naive().year();
    if let Some(week) = week {
        return Ok(Some(TimeWindow::IsoWeek {
            year: year.unwrap_or_else(default_year),
            week,
        }));
    }
    if let Some(month) = month {
        return Ok(Some(TimeWindow::Month {
            year: year.unwrap_or_else(default_year),
            month,
        }));
    }
    Ok(year.map(TimeWindow::Year))
}

fn load_records(input: &str) -> Result<Vec<VisitRecord>, ReportError> {
    let source = CsvRowSource::new(input);
    let rows = source.fetch_rows()?;
    let outcome = normalize(&rows);
    info!(
        source = source.source_name(),
        rows = rows.len(),
        records = outcome.records.len(),
        rejected = outcome.rejected.len(),
        issues = outcome.issues.len(),
        "batch normalized"
    );
    Ok(outcome.records)
}

fn medal(rank: u32) -> &'static str {
    match rank {
        1 => "🥇",
        2 => "🥈",
        3 => "🥉",
        _ => "  ",
    }
}

fn main() -> anyhow::Result<()> {
    barber_reports::logging::init_logging();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Rank {
            families,
            families_file,
            year,
            month,
            week,
            from,
            to,
            top,
        } => {
            let records = load_records(&cli.input)?;
            let window = build_window(year, month, week, from, to)?;
            let exclusions = ExclusionList::from_config(&config.exclusions);
            let top_n = top.unwrap_or(config.reports.top_n);
            let cutover = config.reports.cutover_date;

            let ranked = if families {
                let map = families_file
                    .or(config.reports.families_file.clone())
                    .map(FamilyMap::load)
                    .transpose()?;
                rank_families(&records, map.as_ref(), window, &exclusions, top_n, cutover)?
            } else {
                rank_clients(&records, window, &exclusions, top_n, cutover)
            };

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&ranked)?);
            } else {
                println!(
                    "\n📊 Top {} {}:",
                    ranked.len(),
                    if families { "families" } else { "clients" }
                );
                for summary in &ranked {
                    println!(
                        "   {} #{:<2} {:<30} R$ {:>10}  ({} visits)",
                        medal(summary.rank),
                        summary.rank,
                        summary.client,
                        summary.total.round_dp(2),
                        summary.visit_count
                    );
                }
            }
        }
        Commands::Overdue {
            threshold_days,
            as_of,
        } => {
            let records = load_records(&cli.input)?;
            let threshold = threshold_days.unwrap_or(config.reports.overdue_threshold_days);
            let as_of = as_of.unwrap_or_else(|| Utc::now().date_naive());
            let overdue = find_overdue(&records, threshold, as_of);

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&overdue)?);
            } else {
                println!(
                    "\n⏰ {} clients overdue (>= {} days as of {}):",
                    overdue.len(),
                    threshold,
                    as_of
                );
                for entry in &overdue {
                    println!(
                        "   {:<30} last visit {}  ({} days)",
                        entry.client, entry.last_visit, entry.days_since
                    );
                }
            }
        }
        Commands::Summary => {
            let source = CsvRowSource::new(&cli.input);
            let rows = source.fetch_rows()?;
            let outcome = normalize(&rows);

            let total: rust_decimal::Decimal =
                outcome.records.iter().filter_map(|r| r.amount).sum();
            let durations: Vec<i64> = outcome
                .records
                .iter()
                .filter_map(|r| compute_duration(r.start_time, r.end_time))
                .collect();
            let per_period = |p: Period| {
                outcome
                    .records
                    .iter()
                    .filter(|r| r.period == p)
                    .count()
            };

            // Coverage against the status store, when one is configured.
            // The summary is not a family ranking, so an unreadable store
            // degrades to a warning instead of aborting.
            let known_clients = config.reports.families_file.as_ref().and_then(|path| {
                match FamilyMap::load(path) {
                    Ok(map) if !map.is_empty() => Some(
                        outcome
                            .records
                            .iter()
                            .filter(|r| {
                                map.family_of(&r.client).is_some()
                                    || map.status_of(&r.client).is_some()
                            })
                            .count(),
                    ),
                    Ok(_) => Some(0),
                    Err(e) => {
                        warn!("status store unavailable for summary: {}", e);
                        None
                    }
                }
            });

            if cli.json {
                let summary = serde_json::json!({
                    "rows": rows.len(),
                    "records": outcome.records.len(),
                    "rejected": outcome.rejected.len(),
                    "issues": outcome.issues.len(),
                    "total_amount": total,
                    "avg_duration_minutes": if durations.is_empty() { None } else {
                        Some(durations.iter().sum::<i64>() / durations.len() as i64)
                    },
                    "periods": {
                        "morning": per_period(Period::Morning),
                        "afternoon": per_period(Period::Afternoon),
                        "evening": per_period(Period::Evening),
                    },
                    "known_clients": known_clients,
                });
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("\n📋 Batch summary for {}:", cli.input);
                println!("   Rows read:      {}", rows.len());
                println!("   Records:        {}", outcome.records.len());
                println!("   Rejected rows:  {}", outcome.rejected.len());
                println!("   Field issues:   {}", outcome.issues.len());
                println!("   Total amount:   R$ {}", total.round_dp(2));
                if !durations.is_empty() {
                    println!(
                        "   Avg duration:   {} min",
                        durations.iter().sum::<i64>() / durations.len() as i64
                    );
                }
                println!(
                    "   Periods:        {} morning / {} afternoon / {} evening",
                    per_period(Period::Morning),
                    per_period(Period::Afternoon),
                    per_period(Period::Evening)
                );
                if let Some(known) = known_clients {
                    println!(
                        "   Known clients:  {} of {} records in the status store",
                        known,
                        outcome.records.len()
                    );
                }
                if !outcome.issues.is_empty() {
                    println!("\n⚠️  Parse problems:");
                    for issue in outcome.issues.iter().take(10) {
                        println!(
                            "   - row {}: {} '{}' ({})",
                            issue.row_index, issue.field, issue.raw_value, issue.message
                        );
                    }
                    if outcome.issues.len() > 10 {
                        println!("   ... and {} more", outcome.issues.len() - 10);
                    }
                }
            }
        }
    }

    Ok(())
}
