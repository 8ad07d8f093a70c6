// src/services/sessions.rs

//! Race session discovery.
//!
//! Narrows a season's session list to real Grand Prix races: sessions whose
//! type and name both read "race". Sprint races, shootouts, practice and
//! qualifying are filtered out.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::models::RaceSession;
use crate::services::OpenF1Client;

/// List a season's races in date order.
///
/// An empty result (no sessions, no race sessions, or all race sessions
/// missing required fields) is logged but is not an error.
pub async fn list_races(client: &OpenF1Client, year: i32) -> Vec<RaceSession> {
    let Some(rows) = client.fetch("sessions", &[("year", year.to_string())]).await else {
        log::warn!("No sessions found for {year}");
        return Vec::new();
    };

    let races = filter_race_sessions(&rows);
    if races.is_empty() {
        log::warn!("No real race sessions found for {year}");
    } else {
        log::info!("Found {} Grand Prix races for {year}", races.len());
    }
    races
}

/// Keep only real races with usable identity fields, sorted by start date.
pub fn filter_race_sessions(rows: &[Value]) -> Vec<RaceSession> {
    let mut races: Vec<RaceSession> = rows.iter().filter_map(session_from_row).collect();
    races.sort_by_key(|r| r.date_start);
    races
}

fn session_from_row(row: &Value) -> Option<RaceSession> {
    if !is_race(row) {
        return None;
    }

    // Rows missing session_key, circuit_short_name, or a parseable
    // date_start are dropped.
    let session_key = row.get("session_key").and_then(Value::as_i64)?;
    let circuit = row.get("circuit_short_name").and_then(Value::as_str)?;
    let date_start = row.get("date_start").and_then(Value::as_str)?;
    let date_start = DateTime::parse_from_rfc3339(date_start)
        .ok()?
        .with_timezone(&Utc);

    Some(RaceSession {
        session_key,
        circuit: circuit.to_string(),
        date_start,
    })
}

fn is_race(row: &Value) -> bool {
    let field = |key: &str| {
        row.get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_lowercase()
    };

    field("session_type") == "race" && field("session_name") == "race"
}
