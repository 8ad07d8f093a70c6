//! Pipeline entry points for collector operations.
//!
//! - `collect_season`: Collect a whole season's race data into the cache
//! - `collect_session`: Collect one session (metadata + drivers)
//! - `flatten`: Flatten the cache tree into the four master tables

pub mod collect;
pub mod flatten;
pub mod season;

pub use collect::{CollectOutcome, collect_session};
pub use flatten::flatten;
pub use season::{SeasonOutcome, collect_season};
