// src/lib.rs

//! paddock — OpenF1 telemetry collector and flattener library.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
