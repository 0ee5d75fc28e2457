use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tempfile::TempDir;

use barber_reports::pipeline::processing::normalize::normalize;
use barber_reports::pipeline::processing::overdue::find_overdue;
use barber_reports::pipeline::processing::ranking::{rank_clients, ExclusionList};
use barber_reports::sources::csv_file::CsvRowSource;
use barber_reports::sources::RowSource;
use barber_reports::types::TimeWindow;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn write_csv(content: &str) -> Result<(TempDir, PathBuf)> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("visits.csv");
    let mut f = fs::File::create(&path)?;
    f.write_all(content.as_bytes())?;
    Ok((dir, path))
}

#[test]
fn csv_export_flows_through_to_a_ranking() -> Result<()> {
    let (_dir, path) = write_csv(
        "Cliente,Data de pagame,Valor,Período\n\
         Ana,10/05/2025,\"R$ 50,00\",Manhã\n\
         Ana,10/05/2025,\"R$ 30,00\",Tarde\n\
         Beto,2025-05-12,\"R$ 120,00\",noite\n\
         Sem Nome,12/05/2025,\"R$ 999,00\",\n",
    )?;

    let rows = CsvRowSource::new(&path).fetch_rows()?;
    let outcome = normalize(&rows);
    assert_eq!(outcome.records.len(), 4);
    assert!(outcome.rejected.is_empty());

    let exclusions = ExclusionList::new(["sem nome"], ["teste"]);
    let cutover = day(2025, 5, 11);
    let ranked = rank_clients(&outcome.records, None, &exclusions, 10, cutover);

    // "Sem Nome" is a placeholder and must not appear despite topping spend
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0].client, "Beto");
    assert_eq!(ranked[0].total, "120.00".parse::<Decimal>()?);
    assert_eq!(ranked[1].client, "Ana");
    assert_eq!(ranked[1].total, "80.00".parse::<Decimal>()?);
    // Ana's rows predate the cutover: both count
    assert_eq!(ranked[1].visit_count, 2);
    // Beto's single post-cutover day counts once
    assert_eq!(ranked[0].visit_count, 1);
    Ok(())
}

#[test]
fn post_cutover_same_day_rows_count_as_one_visit() -> Result<()> {
    let (_dir, path) = write_csv(
        "Cliente,Data,Valor\n\
         Ana,12/05/2025,\"R$ 50,00\"\n\
         Ana,12/05/2025,\"R$ 30,00\"\n",
    )?;
    let rows = CsvRowSource::new(&path).fetch_rows()?;
    let outcome = normalize(&rows);
    let ranked = rank_clients(
        &outcome.records,
        None,
        &ExclusionList::default(),
        10,
        day(2025, 5, 11),
    );
    assert_eq!(ranked[0].visit_count, 1);
    assert_eq!(ranked[0].total, "80.00".parse::<Decimal>()?);
    Ok(())
}

#[test]
fn unparseable_cells_degrade_without_corrupting_totals() -> Result<()> {
    let (_dir, path) = write_csv(
        "Cliente,Data,Valor\n\
         Ana,10/05/2025,\"R$ 50,00\"\n\
         Ana,someday,\"R$ 30,00\"\n\
         Ana,11/05/2025,cortesia\n",
    )?;
    let rows = CsvRowSource::new(&path).fetch_rows()?;
    let outcome = normalize(&rows);
    assert_eq!(outcome.records.len(), 3);
    assert_eq!(outcome.issues.len(), 2);

    let ranked = rank_clients(
        &outcome.records,
        None,
        &ExclusionList::default(),
        10,
        day(2025, 5, 20),
    );
    // Undated row still contributes money; amount-less row still counts a day
    assert_eq!(ranked[0].total, "80.00".parse::<Decimal>()?);
    assert_eq!(ranked[0].visit_count, 2);
    Ok(())
}

#[test]
fn window_filter_limits_ranking_to_the_period() -> Result<()> {
    let (_dir, path) = write_csv(
        "Cliente,Data,Valor\n\
         Ana,10/05/2025,\"R$ 50,00\"\n\
         Ana,10/06/2025,\"R$ 70,00\"\n",
    )?;
    let rows = CsvRowSource::new(&path).fetch_rows()?;
    let outcome = normalize(&rows);
    let window = Some(TimeWindow::Month {
        year: 2025,
        month: 6,
    });
    let ranked = rank_clients(
        &outcome.records,
        window,
        &ExclusionList::default(),
        10,
        day(2025, 5, 11),
    );
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].total, "70.00".parse::<Decimal>()?);
    Ok(())
}

#[test]
fn overdue_detection_matches_reference_scenario() -> Result<()> {
    let (_dir, path) = write_csv(
        "Cliente,Data,Valor\n\
         Beto,01/05/2025,\"R$ 40,00\"\n\
         Carla,01/06/2025,\"R$ 40,00\"\n",
    )?;
    let rows = CsvRowSource::new(&path).fetch_rows()?;
    let outcome = normalize(&rows);

    let overdue = find_overdue(&outcome.records, 60, day(2025, 7, 10));
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].client, "Beto");
    assert_eq!(overdue[0].days_since, 70);
    Ok(())
}
