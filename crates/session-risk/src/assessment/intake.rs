use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

use super::domain::{BehaviorIndicators, SessionInputs, SessionMetrics};

/// Raw indicator answer as a form, CSV cell, or JSON client supplies it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum IndicatorAnswer {
    Flag(bool),
    Number(i64),
    Text(String),
}

impl IndicatorAnswer {
    pub fn yes() -> Self {
        Self::Text("Yes".to_string())
    }

    pub fn no() -> Self {
        Self::Text("No".to_string())
    }

    fn as_flag(&self) -> Option<bool> {
        match self {
            IndicatorAnswer::Flag(value) => Some(*value),
            IndicatorAnswer::Number(1) => Some(true),
            IndicatorAnswer::Number(0) => Some(false),
            IndicatorAnswer::Number(_) => None,
            IndicatorAnswer::Text(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "yes" | "y" | "true" | "1" => Some(true),
                "no" | "n" | "false" | "0" => Some(false),
                _ => None,
            },
        }
    }

    fn describe(&self) -> String {
        match self {
            IndicatorAnswer::Flag(value) => value.to_string(),
            IndicatorAnswer::Number(value) => value.to_string(),
            IndicatorAnswer::Text(raw) => raw.clone(),
        }
    }
}

impl Default for IndicatorAnswer {
    fn default() -> Self {
        Self::Flag(false)
    }
}

impl From<bool> for IndicatorAnswer {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl<'de> Deserialize<'de> for IndicatorAnswer {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct AnswerVisitor;

        impl<'de> Visitor<'de> for AnswerVisitor {
            type Value = IndicatorAnswer;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a boolean, 0/1, or a yes/no string")
            }

            fn visit_bool<E: de::Error>(self, value: bool) -> Result<Self::Value, E> {
                Ok(IndicatorAnswer::Flag(value))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
                Ok(IndicatorAnswer::Number(value))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
                Ok(IndicatorAnswer::Number(i64::try_from(value).unwrap_or(i64::MAX)))
            }

            fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
                Ok(IndicatorAnswer::Text(value.to_string()))
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
                Ok(IndicatorAnswer::Text(value.to_string()))
            }

            fn visit_string<E: de::Error>(self, value: String) -> Result<Self::Value, E> {
                Ok(IndicatorAnswer::Text(value))
            }
        }

        deserializer.deserialize_any(AnswerVisitor)
    }
}

/// Unvalidated session as submitted by a presentation layer.
///
/// Exports built from the training dataset carry derived-score columns
/// (`loss_chasing_score` and friends) instead of, or next to, the raw answers. A raw answer
/// wins when both are present; the pair must agree.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionSubmission {
    pub session_length: f64,
    pub bets_placed: f64,
    pub avg_bet_amount: f64,
    pub total_loss: f64,
    pub deposit_frequency: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chasing_losses: Option<IndicatorAnswer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rapid_bet_increase: Option<IndicatorAnswer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_session: Option<IndicatorAnswer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequent_deposits: Option<IndicatorAnswer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotional_tilt: Option<IndicatorAnswer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loss_chasing_score: Option<IndicatorAnswer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bet_escalation_risk: Option<IndicatorAnswer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_intensity: Option<IndicatorAnswer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deposit_stress: Option<IndicatorAnswer>,
}

/// Inclusive bound for one numeric input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// Accepted ranges for the numeric session attributes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntakeLimits {
    pub session_length: Range,
    pub bets_placed: Range,
    pub avg_bet_amount: Range,
    pub total_loss: Range,
    pub deposit_frequency: Range,
}

impl Default for IntakeLimits {
    fn default() -> Self {
        Self {
            session_length: Range::new(0.0, 360.0),
            bets_placed: Range::new(0.0, 100.0),
            avg_bet_amount: Range::new(0.0, 1000.0),
            total_loss: Range::new(0.0, 5000.0),
            deposit_frequency: Range::new(0.0, 20.0),
        }
    }
}

/// Validation errors raised while turning a submission into [`SessionInputs`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IntakeViolation {
    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },
    #[error("{field} must be between {min} and {max} (found {found})")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        found: f64,
    },
    #[error("{field} must be yes or no (found '{value}')")]
    UnrecognizedAnswer { field: &'static str, value: String },
    #[error("{field} and {derived} disagree")]
    ConflictingAnswers {
        field: &'static str,
        derived: &'static str,
    },
}

/// Normalizes presentation-level submissions before they reach the rule-based core.
#[derive(Debug, Clone, Default)]
pub struct IntakeGuard {
    limits: IntakeLimits,
}

impl IntakeGuard {
    pub fn new(limits: IntakeLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &IntakeLimits {
        &self.limits
    }

    pub fn session_from_submission(
        &self,
        submission: &SessionSubmission,
    ) -> Result<SessionInputs, IntakeViolation> {
        let limits = &self.limits;
        let metrics = SessionMetrics {
            session_length_minutes: check_range(
                "session_length",
                submission.session_length,
                limits.session_length,
            )?,
            bets_placed: check_range("bets_placed", submission.bets_placed, limits.bets_placed)?,
            avg_bet_amount: check_range(
                "avg_bet_amount",
                submission.avg_bet_amount,
                limits.avg_bet_amount,
            )?,
            total_loss: check_range("total_loss", submission.total_loss, limits.total_loss)?,
            deposit_frequency: check_range(
                "deposit_frequency",
                submission.deposit_frequency,
                limits.deposit_frequency,
            )?,
        };

        let indicators = BehaviorIndicators {
            chasing_losses: resolve_answer(
                ("chasing_losses", submission.chasing_losses.as_ref()),
                ("loss_chasing_score", submission.loss_chasing_score.as_ref()),
            )?,
            rapid_bet_increase: resolve_answer(
                ("rapid_bet_increase", submission.rapid_bet_increase.as_ref()),
                ("bet_escalation_risk", submission.bet_escalation_risk.as_ref()),
            )?,
            long_session: resolve_answer(
                ("long_session", submission.long_session.as_ref()),
                ("session_intensity", submission.session_intensity.as_ref()),
            )?,
            frequent_deposits: resolve_answer(
                ("frequent_deposits", submission.frequent_deposits.as_ref()),
                ("deposit_stress", submission.deposit_stress.as_ref()),
            )?,
            emotional_tilt: submission
                .emotional_tilt
                .as_ref()
                .map(|answer| normalize_answer("emotional_tilt", answer))
                .transpose()?
                .unwrap_or(false),
        };

        Ok(SessionInputs {
            metrics,
            indicators,
        })
    }
}

fn check_range(field: &'static str, value: f64, range: Range) -> Result<f64, IntakeViolation> {
    if !value.is_finite() {
        return Err(IntakeViolation::NonFinite { field });
    }
    if value < range.min || value > range.max {
        return Err(IntakeViolation::OutOfRange {
            field,
            min: range.min,
            max: range.max,
            found: value,
        });
    }
    Ok(value)
}

/// Raw answer first, derived score as fallback; an absent pair means no.
fn resolve_answer(
    raw: (&'static str, Option<&IndicatorAnswer>),
    derived: (&'static str, Option<&IndicatorAnswer>),
) -> Result<bool, IntakeViolation> {
    let raw_flag = raw
        .1
        .map(|answer| normalize_answer(raw.0, answer))
        .transpose()?;
    let derived_flag = derived
        .1
        .map(|answer| normalize_answer(derived.0, answer))
        .transpose()?;

    match (raw_flag, derived_flag) {
        (Some(flag), Some(other)) if flag != other => Err(IntakeViolation::ConflictingAnswers {
            field: raw.0,
            derived: derived.0,
        }),
        (Some(flag), _) | (None, Some(flag)) => Ok(flag),
        (None, None) => Ok(false),
    }
}

fn normalize_answer(
    field: &'static str,
    answer: &IndicatorAnswer,
) -> Result<bool, IntakeViolation> {
    answer
        .as_flag()
        .ok_or_else(|| IntakeViolation::UnrecognizedAnswer {
            field,
            value: answer.describe(),
        })
}
