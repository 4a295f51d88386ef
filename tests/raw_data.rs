mod common;

use franchise_index::error::InputError;
use franchise_index::observation::MarketTier;
use franchise_index::raw_data::{
    ATTENDANCE_TABLE, CAPACITY_TABLE, RawTables, join_tables, load_raw_tables, read_attendance,
    read_capacity, read_market, read_teams,
};
use franchise_index::standings::NoStandings;

fn tables() -> RawTables {
    RawTables {
        teams: read_teams("entity_id,entity_name\nA,Alpha\nB,Beta\n".as_bytes()).expect("teams"),
        market: read_market("entity_id,market_tier\nA,Large\nB,Regional\n".as_bytes()).expect("market"),
        attendance: read_attendance(
            "entity_id,season,home_attendance,wins,playoff_flag\nA,2022,2000000,90,1\nB,2022,1500000,75,0\nA,2023,2100000,85,0\n"
                .as_bytes(),
        )
        .expect("attendance"),
        capacity: read_capacity("entity_id,stadium_capacity\nA,40000\nB,35000\n".as_bytes()).expect("capacity"),
    }
}

#[test]
fn team_aliases_are_accepted() {
    let teams = read_teams(" team_id , team_name \nBOS,Boston Red Sox\n".as_bytes()).expect("aliases should parse");
    assert_eq!(teams[0].entity_id, "BOS");
    assert_eq!(teams[0].entity_name, "Boston Red Sox");
}

#[test]
fn missing_column_names_table_and_column() {
    let err = read_attendance("entity_id,season,home_attendance,playoff_flag\nA,2023,1,0\n".as_bytes())
        .expect_err("wins is required");
    match err {
        InputError::MissingColumn { table, column } => {
            assert_eq!(table, ATTENDANCE_TABLE);
            assert_eq!(column, "wins");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn malformed_values_report_the_line() {
    let err = read_capacity("entity_id,stadium_capacity\nA,40000\nB,lots\n".as_bytes())
        .expect_err("capacity must be numeric");
    match err {
        InputError::MalformedRow { table, line, .. } => {
            assert_eq!(table, CAPACITY_TABLE);
            assert_eq!(line, 3);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn playoff_flag_must_be_binary() {
    let err = read_attendance(
        "entity_id,season,home_attendance,wins,playoff_flag\nA,2023,100,80,2\n".as_bytes(),
    )
    .expect_err("flag 2 is invalid");
    assert!(matches!(err, InputError::MalformedRow { line: 2, .. }));
}

#[test]
fn join_broadcasts_static_attributes() {
    let rows = join_tables(&tables()).expect("join should succeed");
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].entity_name, "Alpha");
    assert_eq!(rows[0].market_tier, MarketTier::Large);
    assert_eq!(rows[2].stadium_capacity, 40_000);
    assert_eq!(rows[2].season, 2023);
    assert_eq!(rows[1].market_tier, MarketTier::Other("Regional".to_string()));
}

#[test]
fn duplicate_entity_season_is_rejected() {
    let mut t = tables();
    let dup = t.attendance[0].clone();
    t.attendance.push(dup);
    let err = join_tables(&t).expect_err("duplicates are fatal");
    assert!(matches!(
        err,
        InputError::DuplicateObservation { ref entity_id, season: 2022 } if entity_id == "A"
    ));
}

#[test]
fn unknown_entity_is_rejected() {
    let mut t = tables();
    t.capacity.retain(|c| c.entity_id != "B");
    let err = join_tables(&t).expect_err("B has no capacity");
    assert!(matches!(
        err,
        InputError::UnknownEntity { table: CAPACITY_TABLE, ref entity_id } if entity_id == "B"
    ));
}

#[test]
fn empty_attendance_is_rejected() {
    let mut t = tables();
    t.attendance.clear();
    assert!(matches!(join_tables(&t), Err(InputError::Empty)));
}

#[test]
fn missing_table_file_is_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = load_raw_tables(dir.path(), &NoStandings).expect_err("no tables present");
    assert!(matches!(err, InputError::MissingTable { .. }));
}

#[test]
fn fixture_tables_load() {
    let tables = load_raw_tables(&common::fixture_dir("raw"), &NoStandings).expect("fixtures should load");
    assert_eq!(tables.teams.len(), 6);
    assert_eq!(tables.attendance.len(), 18);
    let rows = join_tables(&tables).expect("fixtures should join");
    assert_eq!(rows.len(), 18);
}
