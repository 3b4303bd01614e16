//! Shopcheck load testing
//!
//! Scripts describe what one virtual user does per iteration and how many
//! VUs run over time. [`LoadRunner`] drives them and produces a
//! [`LoadReport`] with latency percentiles, check counts and any crossed
//! thresholds.

pub mod executor;
pub mod metrics;
pub mod profile;
pub mod script;
pub mod scripts;
pub mod thresholds;

pub use executor::{LoadReport, LoadRunner};
pub use metrics::{CheckSummary, Metrics, Summary};
pub use profile::{parse_duration, LoadProfile, Stage};
pub use script::{Check, CheckKind, LoadScript, Payload, Step, Target};
pub use thresholds::{ThresholdViolation, Thresholds};
