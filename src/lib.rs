//! Riskcore scores customer risk and prices insurance premiums.
//!
//! The [`underwriting`] module carries the domain: risk profiles, rule-based
//! scoring, premium pricing and the assessment lifecycle. [`config`] and
//! [`telemetry`] wire the process environment and structured logging for the
//! bundled CLI.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod underwriting;
