//! Gambling session risk assessment.
//!
//! The [`assessment`] module holds the rule-based core (sub-score derivation, composite
//! scoring, tiering, explanations) together with the intake guard, the advisory classifier
//! seam, and CSV batch import used by the service binary.

pub mod assessment;
pub mod config;
pub mod error;
pub mod telemetry;
