//! Flattened master table rows.
//!
//! Denormalized records produced by the flattener. Column order is fixed and
//! mirrored by each row type's `HEADERS`/`record` pair; missing numeric fields
//! render as empty cells.

/// One row per recorded lap.
#[derive(Debug, Clone, PartialEq)]
pub struct LapRow {
    pub session_key: i64,
    pub track: String,
    pub driver: String,
    pub driver_number: Option<i64>,
    pub lap: Option<i64>,
    pub s1: Option<f64>,
    pub s2: Option<f64>,
    pub s3: Option<f64>,
    pub lap_time: Option<f64>,
    pub pit: Option<bool>,
    pub dnf: u8,
    pub team: String,
}

impl LapRow {
    pub const HEADERS: [&'static str; 12] = [
        "session_key",
        "track",
        "driver",
        "driver_number",
        "lap",
        "s1",
        "s2",
        "s3",
        "lap_time",
        "pit",
        "dnf",
        "team",
    ];

    pub fn record(&self) -> Vec<String> {
        vec![
            self.session_key.to_string(),
            self.track.clone(),
            self.driver.clone(),
            opt(&self.driver_number),
            opt(&self.lap),
            opt(&self.s1),
            opt(&self.s2),
            opt(&self.s3),
            opt(&self.lap_time),
            opt(&self.pit),
            self.dnf.to_string(),
            self.team.clone(),
        ]
    }
}

/// One row per pit stop.
#[derive(Debug, Clone, PartialEq)]
pub struct PitRow {
    pub session_key: i64,
    pub track: String,
    pub driver: String,
    pub driver_number: Option<i64>,
    pub lap: Option<i64>,
    pub pit_duration: Option<f64>,
    pub team: String,
}

impl PitRow {
    pub const HEADERS: [&'static str; 7] = [
        "session_key",
        "track",
        "driver",
        "driver_number",
        "lap",
        "pit_duration",
        "team",
    ];

    pub fn record(&self) -> Vec<String> {
        vec![
            self.session_key.to_string(),
            self.track.clone(),
            self.driver.clone(),
            opt(&self.driver_number),
            opt(&self.lap),
            opt(&self.pit_duration),
            self.team.clone(),
        ]
    }
}

/// One row per tire stint.
#[derive(Debug, Clone, PartialEq)]
pub struct StintRow {
    pub session_key: i64,
    pub track: String,
    pub driver: String,
    pub driver_number: Option<i64>,
    pub stint: Option<i64>,
    pub compound: Option<String>,
    pub lap_start: Option<i64>,
    pub lap_end: Option<i64>,
    pub team: String,
}

impl StintRow {
    pub const HEADERS: [&'static str; 9] = [
        "session_key",
        "track",
        "driver",
        "driver_number",
        "stint",
        "compound",
        "lap_start",
        "lap_end",
        "team",
    ];

    pub fn record(&self) -> Vec<String> {
        vec![
            self.session_key.to_string(),
            self.track.clone(),
            self.driver.clone(),
            opt(&self.driver_number),
            opt(&self.stint),
            opt(&self.compound),
            opt(&self.lap_start),
            opt(&self.lap_end),
            self.team.clone(),
        ]
    }
}

/// Exactly one row per collected driver file.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub session_key: i64,
    pub track: String,
    pub driver: String,
    pub driver_number: Option<i64>,
    pub team: String,
    pub grid: Option<i64>,
    pub finish_position: Option<i64>,
    pub status: Option<String>,
    pub best_lap_time: Option<f64>,
    pub pit_count: usize,
    pub dnf: u8,
}

impl SummaryRow {
    pub const HEADERS: [&'static str; 11] = [
        "session_key",
        "track",
        "driver",
        "driver_number",
        "team",
        "grid",
        "finish_position",
        "status",
        "best_lap_time",
        "pit_count",
        "dnf",
    ];

    pub fn record(&self) -> Vec<String> {
        vec![
            self.session_key.to_string(),
            self.track.clone(),
            self.driver.clone(),
            opt(&self.driver_number),
            self.team.clone(),
            opt(&self.grid),
            opt(&self.finish_position),
            opt(&self.status),
            opt(&self.best_lap_time),
            self.pit_count.to_string(),
            self.dnf.to_string(),
        ]
    }
}

/// The four flattened datasets for a cache tree.
#[derive(Debug, Default)]
pub struct MasterTables {
    pub laps: Vec<LapRow>,
    pub pits: Vec<PitRow>,
    pub stints: Vec<StintRow>,
    pub summary: Vec<SummaryRow>,
}

impl MasterTables {
    pub fn is_empty(&self) -> bool {
        self.laps.is_empty()
            && self.pits.is_empty()
            && self.stints.is_empty()
            && self.summary.is_empty()
    }
}

fn opt<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(|v| v.to_string()).unwrap_or_default()
}
