use std::io::Cursor;

use crate::assessment::import::{SessionCsvImporter, SessionImportError};
use crate::assessment::intake::IntakeViolation;
use crate::assessment::RiskAssessor;
use crate::assessment::RiskTier;

const HEADER: &str = "session_id,session_length,bets_placed,avg_bet_amount,total_loss,deposit_frequency,chasing_losses,rapid_bet_increase,long_session,frequent_deposits,emotional_tilt";

#[test]
fn importer_reads_rows_in_order() {
    let csv = format!(
        "{HEADER}\n\
s-1,60,10,50,0,1,No,No,No,No,No\n\
s-2,240,80,400,3500,9,Yes,Yes,Yes,Yes,No\n\
,30,5,20,40,0,true,false,0,1,yes\n"
    );

    let sessions = SessionCsvImporter::default()
        .import_reader(Cursor::new(csv))
        .expect("import succeeds");

    assert_eq!(sessions.len(), 3);
    assert_eq!(sessions[0].session_id.as_deref(), Some("s-1"));
    assert_eq!(sessions[2].session_id, None);

    let assessor = RiskAssessor::new();
    let tiers: Vec<RiskTier> = sessions
        .iter()
        .map(|session| assessor.assess(&session.inputs).assessment.tier)
        .collect();
    assert_eq!(tiers, vec![RiskTier::Low, RiskTier::High, RiskTier::Low]);

    let third = &sessions[2].inputs.indicators;
    assert!(third.chasing_losses && !third.rapid_bet_increase && !third.long_session);
    assert!(third.frequent_deposits && third.emotional_tilt);
}

#[test]
fn importer_accepts_training_dataset_columns() {
    let csv = "session_length,bets_placed,avg_bet_amount,total_loss,deposit_frequency,loss_chasing_score,bet_escalation_risk,session_intensity,deposit_stress,emotional_tilt,responsible_gambling_risk_score\n\
120,40,75,900,4,1,1,0,1,1,4\n";

    let sessions = SessionCsvImporter::default()
        .import_reader(Cursor::new(csv))
        .expect("import succeeds");

    let outcome = RiskAssessor::new().assess(&sessions[0].inputs);
    assert_eq!(outcome.assessment.composite_score, 4);
    assert_eq!(outcome.assessment.tier, RiskTier::High);
}

#[test]
fn importer_accepts_raw_and_derived_columns_together() {
    let csv = "session_id,session_length,bets_placed,avg_bet_amount,total_loss,deposit_frequency,chasing_losses,loss_chasing_score,rapid_bet_increase,bet_escalation_risk,long_session,frequent_deposits,deposit_stress,emotional_tilt\n\
d-1,200,60,120,1500,8,Yes,1,No,0,Yes,Yes,1,No\n\
d-2,90,20,40,100,1,No,,No,0,No,,0,No\n";

    let sessions = SessionCsvImporter::default()
        .import_reader(Cursor::new(csv))
        .expect("import succeeds");

    assert_eq!(sessions.len(), 2);
    let first = &sessions[0].inputs.indicators;
    assert!(first.chasing_losses && !first.rapid_bet_increase);
    assert!(first.long_session && first.frequent_deposits && !first.emotional_tilt);
    let second = RiskAssessor::new().assess(&sessions[1].inputs);
    assert_eq!(second.assessment.composite_score, 0);
}

#[test]
fn importer_rejects_disagreeing_raw_and_derived_columns() {
    let csv = "session_length,bets_placed,avg_bet_amount,total_loss,deposit_frequency,chasing_losses,loss_chasing_score,rapid_bet_increase,long_session,frequent_deposits,emotional_tilt\n\
200,60,120,1500,8,Yes,1,No,Yes,Yes,No\n\
200,60,120,1500,8,No,1,No,Yes,Yes,No\n";

    let error = SessionCsvImporter::default()
        .import_reader(Cursor::new(csv))
        .expect_err("second row disagrees with itself");

    match error {
        SessionImportError::Intake { row, source } => {
            assert_eq!(row, 2);
            assert_eq!(
                source,
                IntakeViolation::ConflictingAnswers {
                    field: "chasing_losses",
                    derived: "loss_chasing_score",
                }
            );
        }
        other => panic!("expected intake error, got {other:?}"),
    }
}

#[test]
fn importer_reports_offending_row() {
    let csv = format!(
        "{HEADER}\n\
s-1,60,10,50,0,1,No,No,No,No,No\n\
s-2,60,10,50,9000,1,No,No,No,No,No\n"
    );

    let error = SessionCsvImporter::default()
        .import_reader(Cursor::new(csv))
        .expect_err("second row is rejected");

    match error {
        SessionImportError::Intake { row, source } => {
            assert_eq!(row, 2);
            assert!(matches!(
                source,
                IntakeViolation::OutOfRange {
                    field: "total_loss",
                    ..
                }
            ));
        }
        other => panic!("expected intake error, got {other:?}"),
    }
}

#[test]
fn importer_surfaces_malformed_csv() {
    let csv = format!("{HEADER}\ns-1,sixty,10,50,0,1,No,No,No,No,No\n");

    let error = SessionCsvImporter::default()
        .import_reader(Cursor::new(csv))
        .expect_err("non-numeric length fails");

    assert!(matches!(error, SessionImportError::Csv(_)));
}

#[test]
fn importer_from_path_propagates_io_errors() {
    let error = SessionCsvImporter::default()
        .import_path("./does-not-exist.csv")
        .expect_err("expected io error");

    match error {
        SessionImportError::Io(_) => {}
        other => panic!("expected io error, got {other:?}"),
    }
}
