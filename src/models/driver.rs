//! Driver identity, team normalization, and the driver cache filename grammar.
//!
//! A collected driver is identified on disk by its filename alone:
//! `{driver_number}_{driver_name}_{team_tag}.json`. [`TargetDriver::file_name`]
//! and [`DriverFileName::parse`] are the formatter/parser pair for that grammar.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Teams whose drivers are tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    RedBull,
    Ferrari,
    Mercedes,
    McLaren,
    AstonMartin,
}

impl Team {
    /// Normalize a raw team name to a tracked team.
    ///
    /// Upper-cases, strips spaces, then substring-matches, so sponsor-laden
    /// names like "Mercedes-AMG Petronas" resolve to [`Team::Mercedes`].
    /// Unrecognized teams yield `None`.
    pub fn normalize(raw: &str) -> Option<Team> {
        let t = raw.to_uppercase().replace(' ', "");

        if t.contains("REDBULL") {
            Some(Team::RedBull)
        } else if t.contains("FERRARI") {
            Some(Team::Ferrari)
        } else if t.contains("MERCEDES") {
            Some(Team::Mercedes)
        } else if t.contains("MCLAREN") {
            Some(Team::McLaren)
        } else if t.contains("ASTON") {
            Some(Team::AstonMartin)
        } else {
            None
        }
    }

    /// Canonical tag used in cache filenames.
    pub fn tag(&self) -> &'static str {
        match self {
            Team::RedBull => "RedBull",
            Team::Ferrari => "Ferrari",
            Team::Mercedes => "Mercedes",
            Team::McLaren => "McLaren",
            Team::AstonMartin => "AstonMartin",
        }
    }
}

/// Normalize a display name for use as a filename component.
///
/// Trims, replaces spaces with underscores, and drops every character that is
/// not alphanumeric or an underscore.
pub fn normalize_name(raw: &str) -> String {
    raw.trim()
        .replace(' ', "_")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect()
}

/// A driver that survived team filtering and is scheduled for collection.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetDriver {
    /// Driver number, unique within a session
    pub number: i64,

    /// Display name as broadcast by the API
    pub name: String,

    /// Normalized team
    pub team: Team,
}

impl TargetDriver {
    /// Cache filename for this driver's session data.
    ///
    /// The filename is the cache key: if it exists on disk the driver is
    /// considered fully collected.
    pub fn file_name(&self) -> String {
        format!(
            "{}_{}_{}.json",
            self.number,
            normalize_name(&self.name),
            self.team.tag()
        )
    }
}

/// Identity recovered from a driver cache filename.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverFileName {
    /// Driver number, or `None` when the numeric prefix is malformed
    pub number: Option<i64>,

    /// Driver display name with underscores restored to spaces
    pub driver: String,

    /// Team tag (last underscore-delimited token)
    pub team: String,
}

impl DriverFileName {
    /// Parse `{number}_{name...}_{team}.json`.
    ///
    /// A malformed numeric prefix degrades `number` to `None` rather than
    /// rejecting the filename.
    pub fn parse(file_name: &str) -> Self {
        let parts: Vec<&str> = file_name.split('_').collect();

        let number = parts.first().and_then(|p| p.parse::<i64>().ok());

        let team = parts
            .last()
            .map(|p| strip_json_suffix(p).to_string())
            .unwrap_or_default();

        let driver = if parts.len() > 2 {
            let joined = parts[1..parts.len() - 1].join(" ");
            strip_json_suffix(&joined).to_string()
        } else {
            String::new()
        };

        Self {
            number,
            driver,
            team,
        }
    }
}

fn strip_json_suffix(s: &str) -> &str {
    s.strip_suffix(".json").unwrap_or(s)
}

/// Cached per-driver document: three independent endpoint payloads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DriverDataFile {
    /// Lap timing entries
    #[serde(default)]
    pub laps: Vec<Value>,

    /// Tire stint entries
    #[serde(default)]
    pub stints: Vec<Value>,

    /// Pit stop entries
    #[serde(default)]
    pub pit: Vec<Value>,
}
