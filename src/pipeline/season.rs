// src/pipeline/season.rs

//! Season orchestration.
//!
//! Sessions are processed strictly sequentially: one session's bounded
//! driver pool drains completely before the next session starts.

use crate::error::Result;
use crate::models::CollectorConfig;
use crate::pipeline::collect::collect_session;
use crate::services::{OpenF1Client, drivers, sessions};
use crate::storage::SessionCache;

/// Summary of a season collection run.
#[derive(Debug, Default)]
pub struct SeasonOutcome {
    /// Race sessions discovered for the season
    pub total: usize,
    /// Sessions with at least one target driver, collected
    pub collected: usize,
    /// Sessions skipped for lack of target drivers
    pub skipped: usize,
}

/// Collect every race of the configured season in date order.
///
/// A session with zero matching drivers still counts toward progress and
/// fetches nothing, metadata included.
pub async fn collect_season(
    client: &OpenF1Client,
    cache: &SessionCache,
    config: &CollectorConfig,
) -> Result<SeasonOutcome> {
    let year = config.year;
    log::info!("Starting raw data download for the {year} season");

    let races = sessions::list_races(client, year).await;
    let mut outcome = SeasonOutcome {
        total: races.len(),
        ..SeasonOutcome::default()
    };

    for (index, race) in races.iter().enumerate() {
        log::info!("Processing session {} - {}", race.session_key, race.circuit);

        let rows = drivers::list_drivers(client, race.session_key).await;
        let targets = drivers::filter_by_team(&rows, &config.teams);

        if targets.is_empty() {
            log::info!("No target drivers found, skipping");
            outcome.skipped += 1;
        } else {
            collect_session(
                client,
                cache,
                year,
                race,
                &targets,
                config.max_concurrent,
            )
            .await?;
            outcome.collected += 1;
        }

        let done = index + 1;
        let percent = done * 100 / outcome.total;
        log::info!("Season progress: {}/{} ({}%)", done, outcome.total, percent);
    }

    log::info!("All races completed");
    Ok(outcome)
}
