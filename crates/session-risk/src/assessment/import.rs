use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use super::domain::SessionInputs;
use super::intake::{IndicatorAnswer, IntakeGuard, IntakeViolation, SessionSubmission};

/// Failure raised while importing a CSV of sessions.
#[derive(Debug, thiserror::Error)]
pub enum SessionImportError {
    #[error("failed to read session export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid session CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row} rejected: {source}")]
    Intake {
        row: usize,
        #[source]
        source: IntakeViolation,
    },
}

/// One validated CSV row.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedSession {
    pub session_id: Option<String>,
    pub inputs: SessionInputs,
}

#[derive(Debug, Deserialize)]
struct SessionRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    session_id: Option<String>,
    session_length: f64,
    bets_placed: f64,
    avg_bet_amount: f64,
    total_loss: f64,
    deposit_frequency: f64,
    #[serde(default)]
    chasing_losses: Option<IndicatorAnswer>,
    #[serde(default)]
    rapid_bet_increase: Option<IndicatorAnswer>,
    #[serde(default)]
    long_session: Option<IndicatorAnswer>,
    #[serde(default)]
    frequent_deposits: Option<IndicatorAnswer>,
    #[serde(default)]
    emotional_tilt: Option<IndicatorAnswer>,
    #[serde(default)]
    loss_chasing_score: Option<IndicatorAnswer>,
    #[serde(default)]
    bet_escalation_risk: Option<IndicatorAnswer>,
    #[serde(default)]
    session_intensity: Option<IndicatorAnswer>,
    #[serde(default)]
    deposit_stress: Option<IndicatorAnswer>,
}

impl SessionRow {
    fn into_parts(self) -> (Option<String>, SessionSubmission) {
        let submission = SessionSubmission {
            session_length: self.session_length,
            bets_placed: self.bets_placed,
            avg_bet_amount: self.avg_bet_amount,
            total_loss: self.total_loss,
            deposit_frequency: self.deposit_frequency,
            chasing_losses: self.chasing_losses,
            rapid_bet_increase: self.rapid_bet_increase,
            long_session: self.long_session,
            frequent_deposits: self.frequent_deposits,
            emotional_tilt: self.emotional_tilt,
            loss_chasing_score: self.loss_chasing_score,
            bet_escalation_risk: self.bet_escalation_risk,
            session_intensity: self.session_intensity,
            deposit_stress: self.deposit_stress,
        };
        (self.session_id, submission)
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

/// Reads session exports, validating every row through an [`IntakeGuard`].
pub struct SessionCsvImporter {
    guard: IntakeGuard,
}

impl Default for SessionCsvImporter {
    fn default() -> Self {
        Self::new(IntakeGuard::default())
    }
}

impl SessionCsvImporter {
    pub fn new(guard: IntakeGuard) -> Self {
        Self { guard }
    }

    pub fn import_path<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<Vec<ImportedSession>, SessionImportError> {
        let file = std::fs::File::open(path)?;
        self.import_reader(file)
    }

    pub fn import_reader<R: Read>(
        &self,
        reader: R,
    ) -> Result<Vec<ImportedSession>, SessionImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut sessions = Vec::new();

        for (index, record) in csv_reader.deserialize::<SessionRow>().enumerate() {
            let (session_id, submission) = record?.into_parts();
            // Rows are numbered from 1, after the header.
            let inputs = self
                .guard
                .session_from_submission(&submission)
                .map_err(|source| SessionImportError::Intake {
                    row: index + 1,
                    source,
                })?;

            sessions.push(ImportedSession { session_id, inputs });
        }

        Ok(sessions)
    }
}
