//! Race session model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A real Grand Prix race session discovered for a season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceSession {
    /// Unique session key assigned by the API
    pub session_key: i64,

    /// Circuit short name (e.g. "Jeddah")
    pub circuit: String,

    /// Scheduled session start
    pub date_start: DateTime<Utc>,
}
