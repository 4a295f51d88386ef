use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::InputError;
use crate::observation::{JoinedRow, MarketTier};
use crate::standings::{self, StandingsSource};

pub const TEAMS_TABLE: &str = "teams_master.csv";
pub const MARKET_TABLE: &str = "market_tiers.csv";
pub const ATTENDANCE_TABLE: &str = "attendance_by_team_year.csv";
pub const CAPACITY_TABLE: &str = "stadium_capacity.csv";

type ColumnSpec = (&'static str, &'static [&'static str]);

const ENTITY_ID: ColumnSpec = ("entity_id", &["entity_id", "team_id"]);

const TEAMS_COLUMNS: &[ColumnSpec] = &[ENTITY_ID, ("entity_name", &["entity_name", "team_name"])];
const MARKET_COLUMNS: &[ColumnSpec] = &[ENTITY_ID, ("market_tier", &["market_tier"])];
const ATTENDANCE_COLUMNS: &[ColumnSpec] = &[
    ENTITY_ID,
    ("season", &["season"]),
    ("home_attendance", &["home_attendance"]),
    ("wins", &["wins"]),
    ("playoff_flag", &["playoff_flag"]),
];
const CAPACITY_COLUMNS: &[ColumnSpec] = &[ENTITY_ID, ("stadium_capacity", &["stadium_capacity"])];

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct EntityRecord {
    pub entity_id: String,
    pub entity_name: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MarketRecord {
    pub entity_id: String,
    pub market_tier: MarketTier,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AttendanceRecord {
    pub entity_id: String,
    pub season: i32,
    pub home_attendance: u64,
    pub wins: u32,
    pub playoff_flag: u8,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CapacityRecord {
    pub entity_id: String,
    pub stadium_capacity: u64,
}

#[derive(Debug, Clone, Default)]
pub struct RawTables {
    pub teams: Vec<EntityRecord>,
    pub market: Vec<MarketRecord>,
    pub attendance: Vec<AttendanceRecord>,
    pub capacity: Vec<CapacityRecord>,
}

/// Read the four raw tables from `dir`, then let `source` try to refresh
/// wins and playoff flags. A failing source leaves the attendance table as
/// it was.
pub fn load_raw_tables(dir: &Path, source: &dyn StandingsSource) -> Result<RawTables, InputError> {
    let teams = read_table(&dir.join(TEAMS_TABLE), TEAMS_TABLE, TEAMS_COLUMNS)?;
    let market = read_table(&dir.join(MARKET_TABLE), MARKET_TABLE, MARKET_COLUMNS)?;
    let attendance: Vec<AttendanceRecord> =
        read_table(&dir.join(ATTENDANCE_TABLE), ATTENDANCE_TABLE, ATTENDANCE_COLUMNS)?;
    let capacity = read_table(&dir.join(CAPACITY_TABLE), CAPACITY_TABLE, CAPACITY_COLUMNS)?;
    validate_attendance(&attendance)?;

    let attendance = standings::enrich_attendance(attendance, &teams, source);
    log::info!(
        "loaded raw tables: {} entities, {} attendance rows",
        teams.len(),
        attendance.len()
    );

    Ok(RawTables {
        teams,
        market,
        attendance,
        capacity,
    })
}

pub fn read_teams<R: Read>(reader: R) -> Result<Vec<EntityRecord>, InputError> {
    read_records(reader, TEAMS_TABLE, TEAMS_COLUMNS)
}

pub fn read_market<R: Read>(reader: R) -> Result<Vec<MarketRecord>, InputError> {
    read_records(reader, MARKET_TABLE, MARKET_COLUMNS)
}

pub fn read_attendance<R: Read>(reader: R) -> Result<Vec<AttendanceRecord>, InputError> {
    let rows = read_records(reader, ATTENDANCE_TABLE, ATTENDANCE_COLUMNS)?;
    validate_attendance(&rows)?;
    Ok(rows)
}

pub fn read_capacity<R: Read>(reader: R) -> Result<Vec<CapacityRecord>, InputError> {
    read_records(reader, CAPACITY_TABLE, CAPACITY_COLUMNS)
}

fn read_table<T: DeserializeOwned>(
    path: &Path,
    table: &'static str,
    columns: &[ColumnSpec],
) -> Result<Vec<T>, InputError> {
    let file = File::open(path).map_err(|_| InputError::MissingTable {
        table,
        path: path.to_path_buf(),
    })?;
    read_records(file, table, columns)
}

fn read_records<R: Read, T: DeserializeOwned>(
    reader: R,
    table: &'static str,
    columns: &[ColumnSpec],
) -> Result<Vec<T>, InputError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let raw_headers = rdr
        .headers()
        .map_err(|source| InputError::Csv { table, source })?
        .clone();
    let headers = canonical_headers(&raw_headers, table, columns)?;

    let mut out = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|source| InputError::Csv { table, source })?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let row = record
            .deserialize(Some(&headers))
            .map_err(|err| InputError::MalformedRow {
                table,
                line,
                message: err.to_string(),
            })?;
        out.push(row);
    }
    Ok(out)
}

fn canonical_headers(
    raw: &StringRecord,
    table: &'static str,
    columns: &[ColumnSpec],
) -> Result<StringRecord, InputError> {
    let mut names: Vec<String> = raw.iter().map(|h| h.trim().to_string()).collect();
    for (canonical, aliases) in columns {
        let Some(pos) = names
            .iter()
            .position(|h| aliases.iter().any(|a| h.eq_ignore_ascii_case(a)))
        else {
            return Err(InputError::MissingColumn {
                table,
                column: *canonical,
            });
        };
        names[pos] = canonical.to_string();
    }
    Ok(StringRecord::from(names))
}

fn validate_attendance(rows: &[AttendanceRecord]) -> Result<(), InputError> {
    for (idx, row) in rows.iter().enumerate() {
        if row.playoff_flag > 1 {
            return Err(InputError::MalformedRow {
                table: ATTENDANCE_TABLE,
                // header is line 1
                line: idx as u64 + 2,
                message: format!("playoff_flag must be 0 or 1, got {}", row.playoff_flag),
            });
        }
    }
    Ok(())
}

/// Join attendance rows with the entity, market and capacity tables. Output
/// keeps the attendance table's row order.
pub fn join_tables(tables: &RawTables) -> Result<Vec<JoinedRow>, InputError> {
    if tables.attendance.is_empty() {
        return Err(InputError::Empty);
    }

    let names: HashMap<&str, &str> = tables
        .teams
        .iter()
        .map(|t| (t.entity_id.as_str(), t.entity_name.as_str()))
        .collect();
    let tiers: HashMap<&str, &MarketTier> = tables
        .market
        .iter()
        .map(|m| (m.entity_id.as_str(), &m.market_tier))
        .collect();
    let capacity: HashMap<&str, u64> = tables
        .capacity
        .iter()
        .map(|c| (c.entity_id.as_str(), c.stadium_capacity))
        .collect();

    let mut seen: HashSet<(&str, i32)> = HashSet::new();
    let mut out = Vec::with_capacity(tables.attendance.len());
    for row in &tables.attendance {
        let id = row.entity_id.as_str();
        if !seen.insert((id, row.season)) {
            return Err(InputError::DuplicateObservation {
                entity_id: row.entity_id.clone(),
                season: row.season,
            });
        }
        let entity_name = lookup(&names, id, TEAMS_TABLE)?;
        let market_tier = lookup(&tiers, id, MARKET_TABLE)?;
        let stadium_capacity = lookup(&capacity, id, CAPACITY_TABLE)?;

        out.push(JoinedRow {
            entity_id: row.entity_id.clone(),
            season: row.season,
            entity_name: entity_name.to_string(),
            market_tier: market_tier.clone(),
            home_attendance: row.home_attendance,
            stadium_capacity,
            wins: row.wins,
            playoff_flag: row.playoff_flag,
        });
    }
    Ok(out)
}

fn lookup<V: Copy>(map: &HashMap<&str, V>, id: &str, table: &'static str) -> Result<V, InputError> {
    map.get(id).copied().ok_or_else(|| InputError::UnknownEntity {
        table,
        entity_id: id.to_string(),
    })
}
