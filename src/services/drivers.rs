// src/services/drivers.rs

//! Driver discovery and team filtering.

use serde_json::Value;

use crate::models::{TargetDriver, Team};
use crate::services::OpenF1Client;

/// List a session's drivers, sorted by driver number ascending.
///
/// Rows with a missing driver number sort last. Missing fields are tolerated
/// here; [`filter_by_team`] decides what is usable.
pub async fn list_drivers(client: &OpenF1Client, session_key: i64) -> Vec<Value> {
    let Some(mut rows) = client
        .fetch("drivers", &[("session_key", session_key.to_string())])
        .await
    else {
        log::warn!("No drivers found for session {session_key}");
        return Vec::new();
    };

    rows.sort_by_key(|row| {
        row.get("driver_number")
            .and_then(Value::as_i64)
            .unwrap_or(i64::MAX)
    });
    rows
}

/// Narrow raw driver rows to the configured target teams.
///
/// Drivers whose team name does not normalize to a tracked team, or whose
/// normalized team is not in `teams`, are dropped silently. A driver without
/// a usable driver number cannot name a cache file and is dropped too. A
/// missing or empty broadcast name falls back to `Driver_{number}`.
pub fn filter_by_team(rows: &[Value], teams: &[Team]) -> Vec<TargetDriver> {
    rows.iter()
        .filter_map(|row| {
            let raw_team = row.get("team_name").and_then(Value::as_str).unwrap_or("");
            let team = Team::normalize(raw_team)?;
            if !teams.contains(&team) {
                return None;
            }

            let number = row.get("driver_number").and_then(Value::as_i64)?;
            let name = row
                .get("broadcast_name")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| format!("Driver_{number}"));

            Some(TargetDriver { number, name, team })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn all_teams() -> Vec<Team> {
        vec![
            Team::RedBull,
            Team::Ferrari,
            Team::Mercedes,
            Team::McLaren,
            Team::AstonMartin,
        ]
    }

    #[test]
    fn untracked_teams_are_dropped() {
        let rows = vec![
            json!({"driver_number": 1, "broadcast_name": "M VERSTAPPEN", "team_name": "Red Bull Racing"}),
            json!({"driver_number": 23, "broadcast_name": "A ALBON", "team_name": "Williams"}),
        ];

        let drivers = filter_by_team(&rows, &all_teams());
        assert_eq!(drivers.len(), 1);
        assert_eq!(drivers[0].number, 1);
        assert_eq!(drivers[0].team, Team::RedBull);
    }

    #[test]
    fn sponsor_names_normalize() {
        let rows = vec![
            json!({"driver_number": 44, "broadcast_name": "L HAMILTON", "team_name": "Mercedes-AMG Petronas"}),
        ];

        let drivers = filter_by_team(&rows, &all_teams());
        assert_eq!(drivers[0].team, Team::Mercedes);
    }

    #[test]
    fn configured_subset_is_respected() {
        let rows = vec![
            json!({"driver_number": 16, "broadcast_name": "C LECLERC", "team_name": "Ferrari"}),
            json!({"driver_number": 4, "broadcast_name": "L NORRIS", "team_name": "McLaren"}),
        ];

        let drivers = filter_by_team(&rows, &[Team::Ferrari]);
        assert_eq!(drivers.len(), 1);
        assert_eq!(drivers[0].number, 16);
    }

    #[test]
    fn missing_driver_number_is_dropped() {
        let rows = vec![json!({"broadcast_name": "GHOST", "team_name": "Ferrari"})];
        assert!(filter_by_team(&rows, &all_teams()).is_empty());
    }

    #[test]
    fn missing_broadcast_name_falls_back() {
        let rows = vec![json!({"driver_number": 81, "team_name": "McLaren"})];
        let drivers = filter_by_team(&rows, &all_teams());
        assert_eq!(drivers[0].name, "Driver_81");
        assert_eq!(drivers[0].file_name(), "81_Driver_81_McLaren.json");
    }
}
