//! On-disk persistence: the raw JSON cache and the master CSV export.

pub mod cache;
pub mod export;

// Re-export for convenience
pub use cache::{
    DRIVERS_FILE, GRID_FILE, RACE_CONTROL_FILE, RESERVED_FILES, SESSION_RESULT_FILE, SessionCache,
    safe_slug,
};
