// src/pipeline/flatten.rs

//! Cache flattening.
//!
//! Walks the raw cache tree and reconstructs the relational joins the
//! collector never materialized: each driver file is joined against its
//! session's grid and classification maps to produce the four master tables.
//!
//! Missing metadata degrades to null fields, never to dropped rows; a driver
//! file that fails to parse is skipped without disturbing its siblings.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::Result;
use crate::models::{
    DriverDataFile, DriverFileName, LapRow, MasterTables, PitRow, StintRow, SummaryRow,
};
use crate::storage;

/// Classification entry for one driver, from `session_result.json`.
#[derive(Debug, Default, Clone)]
struct ResultEntry {
    position: Option<i64>,
    status: Option<String>,
    best_lap_time: Option<f64>,
}

/// Flatten the whole cache tree into the four master tables.
///
/// Directories are visited in sorted name order so output row order is
/// deterministic across runs.
pub async fn flatten(cache_root: &Path) -> Result<MasterTables> {
    let mut tables = MasterTables::default();

    if !cache_root.is_dir() {
        log::warn!("Cache root {} does not exist", cache_root.display());
        return Ok(tables);
    }

    for year_dir in sorted_dirs(cache_root).await? {
        for session_dir in sorted_dirs(&year_dir).await? {
            flatten_session(&session_dir, &mut tables).await?;
        }
    }

    log::info!(
        "Flattened {} laps, {} pit stops, {} stints, {} drivers",
        tables.laps.len(),
        tables.pits.len(),
        tables.stints.len(),
        tables.summary.len()
    );
    Ok(tables)
}

/// Split a session directory name into `(session_key, track)`.
///
/// `10022_Jeddah` → `(10022, "Jeddah")`. A name without an underscore or
/// with a non-numeric prefix is not a session directory.
fn parse_session_dir_name(name: &str) -> Option<(i64, String)> {
    let (key, track) = name.split_once('_')?;
    let key = key.parse().ok()?;
    Some((key, track.to_string()))
}

async fn flatten_session(session_dir: &Path, tables: &mut MasterTables) -> Result<()> {
    let dir_name = session_dir
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    let Some((session_key, track)) = parse_session_dir_name(dir_name) else {
        log::debug!("Skipping non-session directory {dir_name}");
        return Ok(());
    };

    let grid_map = load_grid_map(&session_dir.join(storage::GRID_FILE)).await;
    let result_map = load_result_map(&session_dir.join(storage::SESSION_RESULT_FILE)).await;

    for path in sorted_json_files(session_dir).await? {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        if storage::RESERVED_FILES.contains(&file_name.as_str()) {
            continue;
        }

        flatten_driver_file(
            &path,
            &file_name,
            session_key,
            &track,
            &grid_map,
            &result_map,
            tables,
        )
        .await;
    }

    Ok(())
}

/// Emit rows for one driver file, or skip it entirely if unreadable.
async fn flatten_driver_file(
    path: &Path,
    file_name: &str,
    session_key: i64,
    track: &str,
    grid_map: &HashMap<i64, Option<i64>>,
    result_map: &HashMap<i64, ResultEntry>,
    tables: &mut MasterTables,
) {
    let Some(data) = load_driver_data(path).await else {
        log::warn!("Skipping unreadable driver file {}", path.display());
        return;
    };

    let id = DriverFileName::parse(file_name);
    let result = id.number.and_then(|n| result_map.get(&n));
    let finish_position = result.and_then(|r| r.position);

    // DNF iff the classification has no position for this driver.
    let dnf = u8::from(finish_position.is_none());

    let grid = id
        .number
        .and_then(|n| grid_map.get(&n))
        .copied()
        .flatten();

    for lap in &data.laps {
        tables.laps.push(LapRow {
            session_key,
            track: track.to_string(),
            driver: id.driver.clone(),
            driver_number: id.number,
            lap: get_i64(lap, "lap_number"),
            s1: get_f64(lap, "duration_sector_1"),
            s2: get_f64(lap, "duration_sector_2"),
            s3: get_f64(lap, "duration_sector_3"),
            lap_time: get_f64(lap, "lap_duration"),
            pit: get_bool(lap, "is_pit_out_lap"),
            dnf,
            team: id.team.clone(),
        });
    }

    for pit in &data.pit {
        tables.pits.push(PitRow {
            session_key,
            track: track.to_string(),
            driver: id.driver.clone(),
            driver_number: id.number,
            lap: get_i64(pit, "lap_number"),
            pit_duration: get_f64(pit, "pit_duration"),
            team: id.team.clone(),
        });
    }

    for stint in &data.stints {
        tables.stints.push(StintRow {
            session_key,
            track: track.to_string(),
            driver: id.driver.clone(),
            driver_number: id.number,
            stint: get_i64(stint, "stint_number"),
            compound: get_str(stint, "compound"),
            lap_start: get_i64(stint, "lap_start"),
            lap_end: get_i64(stint, "lap_end"),
            team: id.team.clone(),
        });
    }

    tables.summary.push(SummaryRow {
        session_key,
        track: track.to_string(),
        driver: id.driver.clone(),
        driver_number: id.number,
        team: id.team.clone(),
        grid,
        finish_position,
        status: result.and_then(|r| r.status.clone()),
        best_lap_time: result.and_then(|r| r.best_lap_time),
        pit_count: data.pit.len(),
        dnf,
    });
}

/// driver_number → starting position. Entries without a numeric
/// driver_number cannot be addressed and are dropped.
async fn load_grid_map(path: &Path) -> HashMap<i64, Option<i64>> {
    let Some(rows) = load_json_list(path).await else {
        return HashMap::new();
    };

    rows.iter()
        .filter_map(|row| {
            let number = get_i64(row, "driver_number")?;
            Some((number, get_i64(row, "position")))
        })
        .collect()
}

/// driver_number → classification entry.
async fn load_result_map(path: &Path) -> HashMap<i64, ResultEntry> {
    let Some(rows) = load_json_list(path).await else {
        return HashMap::new();
    };

    rows.iter()
        .filter_map(|row| {
            let number = get_i64(row, "driver_number")?;
            Some((
                number,
                ResultEntry {
                    position: get_i64(row, "position"),
                    status: get_str(row, "status"),
                    best_lap_time: get_f64(row, "best_lap_time"),
                },
            ))
        })
        .collect()
}

/// Read a JSON file expected to hold an array. Absence or malformation
/// yields `None`, not an error.
async fn load_json_list(path: &Path) -> Option<Vec<Value>> {
    let bytes = tokio::fs::read(path).await.ok()?;
    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Array(rows)) => Some(rows),
        _ => None,
    }
}

/// Read a driver data file. Unparseable JSON or a non-object top level
/// yields `None` and the file is skipped.
async fn load_driver_data(path: &Path) -> Option<DriverDataFile> {
    let bytes = tokio::fs::read(path).await.ok()?;
    let value: Value = serde_json::from_slice(&bytes).ok()?;
    if !value.is_object() {
        return None;
    }
    serde_json::from_value(value).ok()
}

async fn sorted_dirs(path: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    let mut entries = tokio::fs::read_dir(path).await?;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

async fn sorted_json_files(path: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut entries = tokio::fs::read_dir(path).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if entry.file_type().await?.is_file()
            && path.extension().is_some_and(|ext| ext == "json")
        {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn get_i64(value: &Value, key: &str) -> Option<i64> {
    value.get(key).and_then(Value::as_i64)
}

fn get_f64(value: &Value, key: &str) -> Option<f64> {
    value.get(key).and_then(Value::as_f64)
}

fn get_str(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

fn get_bool(value: &Value, key: &str) -> Option<bool> {
    value.get(key).and_then(Value::as_bool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        std::fs::write(path, content).unwrap();
    }

    /// Build a session directory with one DNF driver (no classification
    /// entry), one classified driver, and one malformed file.
    async fn fixture() -> (TempDir, MasterTables) {
        let tmp = TempDir::new().unwrap();
        let session = tmp.path().join("2025").join("10022_Jeddah");
        std::fs::create_dir_all(&session).unwrap();

        write(
            &session.join("grid.json"),
            &json!([
                {"driver_number": 16, "position": 3},
            ])
            .to_string(),
        );
        write(
            &session.join("session_result.json"),
            &json!([
                {"driver_number": 16, "position": 2, "status": "Finished", "best_lap_time": 90.5},
            ])
            .to_string(),
        );

        // Driver 1 has laps but no classification entry: a DNF.
        write(
            &session.join("1_Max_Verstappen_RedBull.json"),
            &json!({
                "laps": [{"lap_number": 1, "lap_duration": 91.2}],
                "stints": [],
                "pit": [],
            })
            .to_string(),
        );

        write(
            &session.join("16_Charles_Leclerc_Ferrari.json"),
            &json!({
                "laps": [
                    {"lap_number": 1, "lap_duration": 92.0,
                     "duration_sector_1": 30.1, "duration_sector_2": 31.2,
                     "duration_sector_3": 30.7, "is_pit_out_lap": false},
                    {"lap_number": 2, "lap_duration": 91.8},
                ],
                "stints": [{"stint_number": 1, "compound": "MEDIUM", "lap_start": 1, "lap_end": 2}],
                "pit": [{"lap_number": 2, "pit_duration": 21.9}],
            })
            .to_string(),
        );

        write(&session.join("99_Broken_File_Haas.json"), "{not json");

        // A directory that is not a session.
        std::fs::create_dir_all(tmp.path().join("2025").join("notes")).unwrap();

        let tables = flatten(tmp.path()).await.unwrap();
        (tmp, tables)
    }

    #[tokio::test]
    async fn emits_rows_for_the_worked_example() {
        let (_tmp, tables) = fixture().await;

        let lap = tables
            .laps
            .iter()
            .find(|l| l.driver_number == Some(1))
            .unwrap();
        assert_eq!(lap.session_key, 10022);
        assert_eq!(lap.track, "Jeddah");
        assert_eq!(lap.driver, "Max Verstappen");
        assert_eq!(lap.lap, Some(1));
        assert_eq!(lap.lap_time, Some(91.2));
        assert_eq!(lap.dnf, 1);
        assert_eq!(lap.team, "RedBull");

        let summary = tables
            .summary
            .iter()
            .find(|s| s.driver_number == Some(1))
            .unwrap();
        assert_eq!(summary.finish_position, None);
        assert_eq!(summary.dnf, 1);
        assert_eq!(summary.pit_count, 0);
        assert_eq!(summary.grid, None);
    }

    #[tokio::test]
    async fn dnf_iff_finish_position_is_null() {
        let (_tmp, tables) = fixture().await;

        for summary in &tables.summary {
            assert_eq!(summary.dnf == 1, summary.finish_position.is_none());
        }

        let classified = tables
            .summary
            .iter()
            .find(|s| s.driver_number == Some(16))
            .unwrap();
        assert_eq!(classified.dnf, 0);
        assert_eq!(classified.finish_position, Some(2));
        assert_eq!(classified.grid, Some(3));
        assert_eq!(classified.status.as_deref(), Some("Finished"));
        assert_eq!(classified.best_lap_time, Some(90.5));
    }

    #[tokio::test]
    async fn pit_count_matches_emitted_pit_rows() {
        let (_tmp, tables) = fixture().await;

        for summary in &tables.summary {
            let pit_rows = tables
                .pits
                .iter()
                .filter(|p| {
                    p.session_key == summary.session_key
                        && p.driver_number == summary.driver_number
                })
                .count();
            assert_eq!(summary.pit_count, pit_rows);
        }
    }

    #[tokio::test]
    async fn malformed_file_skipped_without_losing_siblings() {
        let (_tmp, tables) = fixture().await;

        // Two parseable driver files, one summary row each.
        assert_eq!(tables.summary.len(), 2);
        assert!(
            tables
                .summary
                .iter()
                .all(|s| s.driver_number != Some(99))
        );
    }

    #[tokio::test]
    async fn stint_rows_carry_compound_and_bounds() {
        let (_tmp, tables) = fixture().await;

        assert_eq!(tables.stints.len(), 1);
        let stint = &tables.stints[0];
        assert_eq!(stint.compound.as_deref(), Some("MEDIUM"));
        assert_eq!(stint.lap_start, Some(1));
        assert_eq!(stint.lap_end, Some(2));
        assert_eq!(stint.driver, "Charles Leclerc");
    }

    #[tokio::test]
    async fn missing_metadata_degrades_to_null_fields() {
        let tmp = TempDir::new().unwrap();
        let session = tmp.path().join("2024").join("9001_Monza");
        std::fs::create_dir_all(&session).unwrap();

        write(
            &session.join("4_Lando_Norris_McLaren.json"),
            &json!({"laps": [{"lap_number": 1}], "stints": [], "pit": []}).to_string(),
        );

        let tables = flatten(tmp.path()).await.unwrap();
        assert_eq!(tables.summary.len(), 1);
        assert_eq!(tables.summary[0].grid, None);
        assert_eq!(tables.summary[0].finish_position, None);
        assert_eq!(tables.summary[0].dnf, 1);
        assert_eq!(tables.laps.len(), 1);
    }

    #[tokio::test]
    async fn non_numeric_session_dir_is_skipped() {
        let (_tmp, tables) = fixture().await;
        assert!(tables.summary.iter().all(|s| s.session_key == 10022));
    }

    #[tokio::test]
    async fn missing_cache_root_yields_empty_tables() {
        let tables = flatten(Path::new("does/not/exist")).await.unwrap();
        assert!(tables.is_empty());
    }

    #[test]
    fn session_dir_name_grammar() {
        assert_eq!(
            parse_session_dir_name("10022_Jeddah"),
            Some((10022, "Jeddah".to_string()))
        );
        assert_eq!(
            parse_session_dir_name("10030_Mexico_City"),
            Some((10030, "Mexico_City".to_string()))
        );
        assert_eq!(parse_session_dir_name("notes"), None);
        assert_eq!(parse_session_dir_name("abc_Jeddah"), None);
    }
}
