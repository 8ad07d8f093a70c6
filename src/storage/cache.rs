//! Raw JSON cache store.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! └── {year}/
//!     └── {session_key}_{circuit_slug}/
//!         ├── drivers.json          # Session metadata (overwritten each run)
//!         ├── grid.json
//!         ├── race_control.json
//!         ├── session_result.json
//!         └── {n}_{name}_{team}.json   # One per collected driver (skip-if-exists)
//! ```
//!
//! Concurrent writers to different files are safe; the skip-if-exists
//! discipline keeps two writers off the same driver file.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::io::AsyncWriteExt;

use crate::error::Result;

/// Session metadata filenames, reserved within a session directory.
pub const DRIVERS_FILE: &str = "drivers.json";
pub const GRID_FILE: &str = "grid.json";
pub const RACE_CONTROL_FILE: &str = "race_control.json";
pub const SESSION_RESULT_FILE: &str = "session_result.json";

/// All reserved metadata filenames; everything else in a session directory
/// is a driver data file.
pub const RESERVED_FILES: [&str; 4] = [
    DRIVERS_FILE,
    GRID_FILE,
    RACE_CONTROL_FILE,
    SESSION_RESULT_FILE,
];

/// Slug used when a session has no usable circuit name.
const UNKNOWN_CIRCUIT: &str = "unknown";

/// On-disk cache of raw session JSON, rooted at a single directory.
#[derive(Debug, Clone)]
pub struct SessionCache {
    root: PathBuf,
}

impl SessionCache {
    /// Create a cache rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the cache tree.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory for one session: `{root}/{year}/{session_key}_{slug}`.
    pub fn session_dir(&self, year: i32, session_key: i64, circuit: &str) -> PathBuf {
        self.root
            .join(year.to_string())
            .join(format!("{}_{}", session_key, safe_slug(circuit)))
    }

    /// Create the session directory (and parents) if missing.
    pub async fn ensure_session_dir(
        &self,
        year: i32,
        session_key: i64,
        circuit: &str,
    ) -> Result<PathBuf> {
        let dir = self.session_dir(year, session_key, circuit);
        tokio::fs::create_dir_all(&dir).await?;
        Ok(dir)
    }

    /// Write a value as pretty-printed JSON, overwriting any existing file.
    ///
    /// Writes to a temp file then renames, so readers never observe a
    /// partially written document.
    pub async fn write_json<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }

    /// Whether a cache file already exists.
    pub fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// Filesystem-safe slug for a circuit name: whitespace becomes underscores,
/// other characters pass through unchanged. Blank names map to a fixed
/// placeholder.
pub fn safe_slug(text: &str) -> String {
    let s = text.trim().replace(' ', "_");
    if s.is_empty() {
        UNKNOWN_CIRCUIT.to_string()
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn slug_replaces_spaces() {
        assert_eq!(safe_slug("Mexico City"), "Mexico_City");
        assert_eq!(safe_slug("  Jeddah "), "Jeddah");
        assert_eq!(safe_slug("Spa-Francorchamps"), "Spa-Francorchamps");
    }

    #[test]
    fn slug_placeholder_for_blank_names() {
        assert_eq!(safe_slug(""), "unknown");
        assert_eq!(safe_slug("   "), "unknown");
    }

    #[test]
    fn session_dir_layout() {
        let cache = SessionCache::new("raw_data");
        let dir = cache.session_dir(2025, 10022, "Jeddah");
        assert_eq!(dir, PathBuf::from("raw_data/2025/10022_Jeddah"));
    }

    #[tokio::test]
    async fn write_json_and_exists() {
        let tmp = TempDir::new().unwrap();
        let cache = SessionCache::new(tmp.path());

        let dir = cache.ensure_session_dir(2025, 1, "Jeddah").await.unwrap();
        let path = dir.join("grid.json");
        assert!(!cache.exists(&path));

        cache
            .write_json(&path, &serde_json::json!([{"driver_number": 1, "position": 1}]))
            .await
            .unwrap();
        assert!(cache.exists(&path));

        // No temp file left behind.
        assert!(!dir.join("grid.tmp").exists());
    }

    #[tokio::test]
    async fn write_json_preserves_non_ascii() {
        let tmp = TempDir::new().unwrap();
        let cache = SessionCache::new(tmp.path());
        let path = tmp.path().join("data.json");

        cache
            .write_json(&path, &serde_json::json!({"track": "São Paulo"}))
            .await
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("São Paulo"));
    }

    #[tokio::test]
    async fn write_json_overwrites() {
        let tmp = TempDir::new().unwrap();
        let cache = SessionCache::new(tmp.path());
        let path = tmp.path().join("data.json");

        cache.write_json(&path, &serde_json::json!([1])).await.unwrap();
        cache.write_json(&path, &serde_json::json!([1, 2])).await.unwrap();

        let rows: Vec<i64> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(rows, vec![1, 2]);
    }
}
