// src/pipeline/collect.rs

//! Per-session data collection.
//!
//! Session metadata is fetched sequentially and always overwritten (race
//! control and classification can change between runs). Driver data is
//! immutable once a session is over, so driver files are skip-if-exists:
//! an existing file is the resume marker and is never re-fetched.

use std::path::Path;

use futures::stream::{self, StreamExt};

use crate::error::Result;
use crate::models::{DriverDataFile, RaceSession, TargetDriver};
use crate::services::OpenF1Client;
use crate::storage::{self, SessionCache};

/// Summary of one session's collection run.
#[derive(Debug, Default)]
pub struct CollectOutcome {
    /// Driver files fetched and written this run
    pub downloaded: usize,
    /// Driver files already cached and skipped
    pub skipped: usize,
    /// Driver files that fetched but failed to write
    pub write_failures: usize,
}

/// Endpoint/filename pairs for session-level metadata.
const METADATA: [(&str, &str); 4] = [
    ("drivers", storage::DRIVERS_FILE),
    ("starting_grid", storage::GRID_FILE),
    ("race_control", storage::RACE_CONTROL_FILE),
    ("session_result", storage::SESSION_RESULT_FILE),
];

enum DriverFetch {
    Downloaded,
    Skipped,
    WriteFailed,
}

/// Collect one session: metadata first, then per-driver data with bounded
/// concurrency. Driver results arrive in completion order.
pub async fn collect_session(
    client: &OpenF1Client,
    cache: &SessionCache,
    year: i32,
    session: &RaceSession,
    drivers: &[TargetDriver],
    max_concurrent: usize,
) -> Result<CollectOutcome> {
    let dir = cache
        .ensure_session_dir(year, session.session_key, &session.circuit)
        .await?;

    log::info!(
        "Starting driver download ({} drivers) for session {}",
        drivers.len(),
        session.session_key
    );

    download_metadata(client, cache, session.session_key, &dir).await?;

    let mut outcome = CollectOutcome::default();
    let mut results = stream::iter(drivers)
        .map(|driver| {
            let dir = dir.clone();
            async move { download_driver(client, cache, session.session_key, &dir, driver).await }
        })
        .buffer_unordered(max_concurrent.max(1));

    while let Some(result) = results.next().await {
        match result {
            DriverFetch::Downloaded => outcome.downloaded += 1,
            DriverFetch::Skipped => outcome.skipped += 1,
            DriverFetch::WriteFailed => outcome.write_failures += 1,
        }
    }

    log::info!(
        "Completed driver download for session {} ({} new, {} cached)",
        session.session_key,
        outcome.downloaded,
        outcome.skipped
    );
    Ok(outcome)
}

/// Fetch and overwrite the four session metadata files.
///
/// A failed fetch skips its file silently; no placeholder is written.
async fn download_metadata(
    client: &OpenF1Client,
    cache: &SessionCache,
    session_key: i64,
    dir: &Path,
) -> Result<()> {
    log::info!("Downloading metadata for session {session_key}");

    let params = [("session_key", session_key.to_string())];
    for (endpoint, file_name) in METADATA {
        if let Some(rows) = client.fetch(endpoint, &params).await {
            cache.write_json(&dir.join(file_name), &rows).await?;
        }
    }
    Ok(())
}

/// Fetch one driver's laps, stints, and pit stops and write the combined
/// document. Each endpoint degrades to an empty list on fetch failure; a
/// write failure is logged and does not abort sibling drivers.
async fn download_driver(
    client: &OpenF1Client,
    cache: &SessionCache,
    session_key: i64,
    dir: &Path,
    driver: &TargetDriver,
) -> DriverFetch {
    let path = dir.join(driver.file_name());

    // RESUME: an existing file is complete by definition.
    if cache.exists(&path) {
        log::info!("{} already cached, skipping", driver.name);
        return DriverFetch::Skipped;
    }

    log::info!("Downloading {}", driver.name);

    let params = [
        ("session_key", session_key.to_string()),
        ("driver_number", driver.number.to_string()),
    ];

    let data = DriverDataFile {
        laps: client.fetch("laps", &params).await.unwrap_or_default(),
        stints: client.fetch("stints", &params).await.unwrap_or_default(),
        pit: client.fetch("pit", &params).await.unwrap_or_default(),
    };

    if let Err(e) = cache.write_json(&path, &data).await {
        log::error!("Failed to save {}: {}", path.display(), e);
        return DriverFetch::WriteFailed;
    }

    log::info!("Finished {}", driver.name);
    DriverFetch::Downloaded
}
