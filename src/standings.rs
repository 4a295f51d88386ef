use std::collections::{BTreeSet, HashMap};

use anyhow::{Context, Result, anyhow};
use serde_json::Value;

use crate::http_client::http_client;
use crate::raw_data::{AttendanceRecord, EntityRecord};

/// Season win total at or above which a club is flagged as a playoff team
/// once standings have been refreshed.
pub const PLAYOFF_WINS_THRESHOLD: u32 = 88;

#[derive(Debug, Clone, PartialEq)]
pub struct StandingsRow {
    pub team_name: String,
    pub wins: u32,
}

pub trait StandingsSource {
    fn name(&self) -> &str;

    fn enabled(&self) -> bool {
        true
    }

    fn fetch_season(&self, season: i32) -> Result<Vec<StandingsRow>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoStandings;

impl StandingsSource for NoStandings {
    fn name(&self) -> &str {
        "none"
    }

    fn enabled(&self) -> bool {
        false
    }

    fn fetch_season(&self, _season: i32) -> Result<Vec<StandingsRow>> {
        Ok(Vec::new())
    }
}

#[derive(Debug, Clone)]
pub struct HttpStandings {
    url_template: String,
}

impl HttpStandings {
    pub fn new(url_template: impl Into<String>) -> Self {
        Self {
            url_template: url_template.into(),
        }
    }

    fn url_for(&self, season: i32) -> String {
        self.url_template.replace("{season}", &season.to_string())
    }
}

impl StandingsSource for HttpStandings {
    fn name(&self) -> &str {
        "http"
    }

    fn fetch_season(&self, season: i32) -> Result<Vec<StandingsRow>> {
        let client = http_client()?;
        let url = self.url_for(season);
        let resp = client
            .get(&url)
            .send()
            .with_context(|| format!("standings request failed for {season}"))?;
        let status = resp.status();
        let body = resp.text().context("failed reading standings body")?;
        if !status.is_success() {
            return Err(anyhow!("http {status} from {url}"));
        }
        parse_standings_json(&body)
    }
}

/// Any object carrying a team-like key and a wins-like key counts, however
/// deeply the payload nests it.
pub fn parse_standings_json(raw: &str) -> Result<Vec<StandingsRow>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Err(anyhow!("empty standings response"));
    }
    let v: Value = serde_json::from_str(trimmed).context("invalid standings json")?;
    let mut out = Vec::new();
    collect_rows(&v, &mut out);
    if out.is_empty() {
        return Err(anyhow!("standings response had no usable team/wins rows"));
    }
    Ok(out)
}

fn collect_rows(v: &Value, out: &mut Vec<StandingsRow>) {
    match v {
        Value::Array(items) => {
            for item in items {
                collect_rows(item, out);
            }
        }
        Value::Object(map) => {
            let team = map
                .iter()
                .find(|(k, _)| matches!(k.to_ascii_lowercase().as_str(), "tm" | "team" | "club" | "team_name"))
                .and_then(|(_, v)| v.as_str());
            let wins = map
                .iter()
                .find(|(k, _)| matches!(k.to_ascii_lowercase().as_str(), "w" | "wins"))
                .and_then(|(_, v)| value_as_u32(v));
            if let (Some(team), Some(wins)) = (team, wins) {
                out.push(StandingsRow {
                    team_name: team.to_string(),
                    wins,
                });
                return;
            }
            for child in map.values() {
                if child.is_array() || child.is_object() {
                    collect_rows(child, out);
                }
            }
        }
        _ => {}
    }
}

fn value_as_u32(v: &Value) -> Option<u32> {
    match v {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}

fn normalize_team_name(raw: &str) -> String {
    raw.replace('*', "").trim().to_lowercase()
}

/// Overwrite wins from `source` where a club's name matches, then recompute
/// every playoff flag from the win threshold.
/// On any failure `attendance` comes back untouched.
pub fn enrich_attendance(
    attendance: Vec<AttendanceRecord>,
    teams: &[EntityRecord],
    source: &dyn StandingsSource,
) -> Vec<AttendanceRecord> {
    if !source.enabled() {
        return attendance;
    }

    let seasons: BTreeSet<i32> = attendance.iter().map(|r| r.season).collect();
    let mut fetched: Vec<(i32, StandingsRow)> = Vec::new();
    for season in seasons {
        match source.fetch_season(season) {
            Ok(rows) => fetched.extend(rows.into_iter().map(|row| (season, row))),
            Err(err) => {
                log::warn!(
                    "standings source '{}' failed for {season}: {err:#}; using raw data",
                    source.name()
                );
                return attendance;
            }
        }
    }
    if fetched.is_empty() {
        log::warn!(
            "standings source '{}' returned no usable standings; using raw data",
            source.name()
        );
        return attendance;
    }

    let ids_by_name: HashMap<String, &str> = teams
        .iter()
        .map(|t| (normalize_team_name(&t.entity_name), t.entity_id.as_str()))
        .collect();
    let mut wins_by_key: HashMap<(&str, i32), u32> = HashMap::new();
    for (season, row) in &fetched {
        if let Some(id) = ids_by_name.get(&normalize_team_name(&row.team_name)) {
            wins_by_key.entry((*id, *season)).or_insert(row.wins);
        }
    }

    let mut updated = 0usize;
    let out = attendance
        .into_iter()
        .map(|mut row| {
            if let Some(wins) = wins_by_key.get(&(row.entity_id.as_str(), row.season)) {
                row.wins = *wins;
                updated += 1;
            }
            row.playoff_flag = u8::from(row.wins >= PLAYOFF_WINS_THRESHOLD);
            row
        })
        .collect();
    log::info!(
        "standings source '{}' applied: {updated} rows updated",
        source.name()
    );
    out
}
