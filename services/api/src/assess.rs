use crate::infra::resolve_assessor;
use clap::Args;
use session_risk::assessment::{
    IndicatorAnswer, IntakeGuard, SessionAssessment, SessionCsvImporter, SessionSubmission,
};
use session_risk::error::AppError;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    /// Session length in minutes
    #[arg(long)]
    pub(crate) session_length: f64,
    #[arg(long)]
    pub(crate) bets_placed: f64,
    #[arg(long)]
    pub(crate) avg_bet_amount: f64,
    #[arg(long)]
    pub(crate) total_loss: f64,
    /// Deposits made during the session
    #[arg(long)]
    pub(crate) deposit_frequency: f64,
    #[arg(long)]
    pub(crate) chasing_losses: bool,
    #[arg(long)]
    pub(crate) rapid_bet_increase: bool,
    #[arg(long)]
    pub(crate) long_session: bool,
    #[arg(long)]
    pub(crate) frequent_deposits: bool,
    #[arg(long)]
    pub(crate) emotional_tilt: bool,
    /// Advisory model to consult; overrides RISK_MODEL_PATH
    #[arg(long)]
    pub(crate) model: Option<PathBuf>,
}

impl AssessArgs {
    fn submission(&self) -> SessionSubmission {
        SessionSubmission {
            session_length: self.session_length,
            bets_placed: self.bets_placed,
            avg_bet_amount: self.avg_bet_amount,
            total_loss: self.total_loss,
            deposit_frequency: self.deposit_frequency,
            chasing_losses: Some(IndicatorAnswer::Flag(self.chasing_losses)),
            rapid_bet_increase: Some(IndicatorAnswer::Flag(self.rapid_bet_increase)),
            long_session: Some(IndicatorAnswer::Flag(self.long_session)),
            frequent_deposits: Some(IndicatorAnswer::Flag(self.frequent_deposits)),
            emotional_tilt: Some(IndicatorAnswer::Flag(self.emotional_tilt)),
            ..SessionSubmission::default()
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// CSV export with one session per row
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Advisory model to consult; overrides RISK_MODEL_PATH
    #[arg(long)]
    pub(crate) model: Option<PathBuf>,
}

pub(crate) fn run_assess(args: AssessArgs) -> Result<(), AppError> {
    let inputs = IntakeGuard::default().session_from_submission(&args.submission())?;
    let assessor = resolve_assessor(args.model)?;

    for line in report_lines(&assessor.assess(&inputs)) {
        println!("{line}");
    }
    Ok(())
}

pub(crate) fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let sessions = SessionCsvImporter::default().import_path(&args.csv)?;
    let assessor = resolve_assessor(args.model)?;

    println!("Assessed {} sessions from {}", sessions.len(), args.csv.display());
    for (index, session) in sessions.iter().enumerate() {
        let outcome = assessor.assess(&session.inputs);
        let id = session
            .session_id
            .clone()
            .unwrap_or_else(|| format!("row {}", index + 1));
        println!(
            "{id}: {} (score {}) - {}",
            outcome.assessment.tier.label(),
            outcome.assessment.composite_score,
            outcome.assessment.explanation.render()
        );
    }
    Ok(())
}

fn report_lines(outcome: &SessionAssessment) -> Vec<String> {
    vec![
        format!(
            "Risk tier: {} (score {})",
            outcome.assessment.tier.label(),
            outcome.assessment.composite_score
        ),
        format!("Recommended action: {}", outcome.assessment.recommended_action),
        format!("Explanation: {}", outcome.assessment.explanation.render()),
        format!("Advisory: {}", outcome.advisory.summary()),
    ]
}
