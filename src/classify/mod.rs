//! Verdict derivation from vision-pipeline measurements.
//!
//! The vision pipeline itself runs elsewhere; these helpers turn its raw
//! numbers into a [`ClassificationEvent`](crate::control::relay::ClassificationEvent)
//! (or no verdict) using the thresholds in
//! [`DetectionConfig`](crate::config::DetectionConfig).

pub mod mouth;
pub mod score;
