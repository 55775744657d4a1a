//! MoodRelay firmware library.
//!
//! Drives two relay outputs from per-frame facial-expression verdicts,
//! holding the last verdict for a fixed time and adapting how many frames
//! are skipped between classifications to the measured processing cost.
//!
//! All ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`
//! within each module; the rest builds and tests on the host.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod classify;
pub mod config;
pub mod control;
pub mod drivers;
pub mod error;
pub mod pins;
pub mod time;
