//! End-to-end tests: CSV text -> store -> every analysis.

use chrono::{NaiveDate, TimeDelta};
use indoor_climate::{
    Location, MemoryStore, Reading, ReadingStore, SortOrder,
    analytics::{self, DailyValue},
    db::Database,
    door::DoorThresholds,
    season,
    seed::seed_from_str,
};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2016, 10, d).unwrap()
}

/// Eight days of data. Day 1 carries a short door-open event in the
/// morning; every day has a noon reading at both locations.
fn sample_csv() -> String {
    let outdoor_noon = [12.0, 9.0, 8.0, 7.0, 6.0, 9.0, -1.0, -2.0];

    let mut csv = String::from("Datum,Plats,Temp,Luftfuktighet\n");
    csv.push_str("2016-10-01 10:00,Indoor,22.0,40\n");
    csv.push_str("2016-10-01 10:00,Outdoor,12.0,70\n");
    csv.push_str("2016-10-01 10:01,Indoor,21.5,40\n");
    csv.push_str("2016-10-01 10:01,Outdoor,12.5,70\n");
    csv.push_str("2016-10-01 10:02,Indoor,21.8,40\n");
    csv.push_str("2016-10-01 10:02,Outdoor,12.2,70\n");

    for (i, temp) in outdoor_noon.iter().enumerate() {
        let d = i + 1;
        let humidity = if d == 5 { 95 } else { 70 };
        csv.push_str(&format!("2016-10-{d:02} 12:00,Indoor,21.0,40\n"));
        csv.push_str(&format!("2016-10-{d:02} 12:00,Outdoor,{temp},{humidity}\n"));
    }

    // Rejected or ignored rows
    csv.push_str("2016-10-02 12:00,Outdoor,30.0,10\n");
    csv.push_str("2016-10-03 13:00,Garage,15.0,50\n");
    csv.push_str("2016-10-03 13:00,Outdoor,200,50\n");
    csv.push_str("not a date,Indoor,21.0,40\n");
    csv
}

async fn load() -> Vec<Reading> {
    let store = MemoryStore::new();
    seed_from_str(&store, &sample_csv()).await.unwrap();
    store.all_readings().await.unwrap()
}

fn dates(values: &[DailyValue]) -> Vec<NaiveDate> {
    values.iter().map(|v| v.date).collect()
}

#[tokio::test]
async fn test_ingestion_drops_bad_rows() {
    let readings = load().await;

    // 6 morning rows + 16 noon rows
    assert_eq!(readings.len(), 22);
    let summary = analytics::summarize(&readings);
    assert_eq!(summary.indoor, 11);
    assert_eq!(summary.outdoor, 11);
    assert_eq!(summary.days, 8);
    assert_eq!(summary.first_day, Some(day(1)));
    assert_eq!(summary.last_day, Some(day(8)));

    // The duplicate kept the first value
    let oct2_noon = readings
        .iter()
        .find(|r| r.date() == day(2) && r.location == Location::Outdoor)
        .unwrap();
    assert_eq!(oct2_noon.temperature_c, 9.0);
}

#[tokio::test]
async fn test_mean_temperature_for_a_day() {
    let readings = load().await;

    let mean = analytics::mean_temperature(&readings, day(1), Location::Indoor).unwrap();
    assert!((mean - 21.575).abs() < 1e-9);

    assert_eq!(
        analytics::mean_temperature(&readings, day(20), Location::Indoor),
        None
    );
}

#[tokio::test]
async fn test_temperature_ranking_directions() {
    let readings = load().await;

    let warmest =
        analytics::ranked_by_mean_temperature(&readings, Location::Outdoor, SortOrder::Descending);
    let coldest =
        analytics::ranked_by_mean_temperature(&readings, Location::Outdoor, SortOrder::Ascending);

    assert_eq!(warmest.len(), 8);
    assert_eq!(warmest[0].date, day(1));
    assert_eq!(coldest[0].date, day(8));
    assert_eq!(coldest[1].date, day(7));
    assert!(warmest.windows(2).all(|w| w[0].value >= w[1].value));
}

#[tokio::test]
async fn test_humidity_and_mold_rankings() {
    let readings = load().await;

    let wettest =
        analytics::ranked_by_mean_humidity(&readings, Location::Outdoor, SortOrder::Descending);
    assert_eq!(wettest[0], DailyValue::new(day(5), 95.0));

    let mold = analytics::ranked_by_mold_risk(&readings, Location::Outdoor, SortOrder::Descending);
    assert_eq!(mold[0], DailyValue::new(day(5), 100.0));
    assert!(mold[1..].iter().all(|d| d.value == 0.0));

    let indoor_mold =
        analytics::ranked_by_mold_risk(&readings, Location::Indoor, SortOrder::Descending);
    assert!(indoor_mold.iter().all(|d| d.value == 0.0));
    // Equal values keep date order
    assert_eq!(dates(&indoor_mold), (1..=8).map(day).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_divergence_ranking() {
    let readings = load().await;

    let ranked = analytics::ranked_by_divergence(&readings, SortOrder::Descending);
    assert_eq!(ranked.len(), 8);
    assert_eq!(ranked[0], DailyValue::new(day(8), 23.0));
    assert_eq!(ranked[1], DailyValue::new(day(7), 22.0));
}

#[tokio::test]
async fn test_door_open_ranking() {
    let readings = load().await;

    let days = analytics::ranked_by_door_open_duration(&readings, &DoorThresholds::default());
    assert_eq!(days.len(), 8);
    assert_eq!(days[0].date, day(1));
    assert_eq!(days[0].open_duration, TimeDelta::minutes(2));
    assert!(days[1..].iter().all(|d| d.open_duration == TimeDelta::zero()));
    assert_eq!(days[1].date, day(2));
}

#[tokio::test]
async fn test_season_onsets() {
    let readings = load().await;

    assert_eq!(season::autumn_onset(&readings), Some(day(2)));
    assert_eq!(season::winter_onset(&readings), None);
}

#[tokio::test]
async fn test_empty_snapshot_yields_empty_results() {
    let store = MemoryStore::new();
    let readings = store.all_readings().await.unwrap();

    assert!(
        analytics::ranked_by_mean_temperature(&readings, Location::Indoor, SortOrder::Ascending)
            .is_empty()
    );
    assert!(analytics::ranked_by_divergence(&readings, SortOrder::Ascending).is_empty());
    assert!(
        analytics::ranked_by_door_open_duration(&readings, &DoorThresholds::default()).is_empty()
    );
    assert_eq!(season::autumn_onset(&readings), None);
    assert_eq!(season::winter_onset(&readings), None);
}

#[tokio::test]
async fn test_sqlite_snapshot_matches_memory_snapshot() {
    let db = Database::in_memory().await.expect("DB creation failed");
    seed_from_str(&db, &sample_csv()).await.unwrap();

    let from_db = db.all_readings().await.unwrap();
    let from_memory = load().await;
    assert_eq!(from_db, from_memory);
}
