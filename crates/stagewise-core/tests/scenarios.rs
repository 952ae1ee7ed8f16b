//! End-to-end scenarios through the public API.

#![allow(clippy::unwrap_used, clippy::panic)]

use stagewise_core::{
    AssessmentDefinition, AssessmentSession, GapReport, MemoryStore, PositionStore, Question,
    QuestionBank, RedbStore, SessionConfig, SessionError, SessionState, Severity, Stage,
    StageDistribution, WeightTable, classify_severity, gap, total_gap_magnitude,
};

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Four questions whose options map 1:1 onto the four stages.
fn four_questions() -> AssessmentDefinition {
    let questions = ["culture", "feedback", "purpose", "process"]
        .iter()
        .map(|id| {
            Question::new(
                *id,
                format!("How would you describe {id} today?"),
                ["Exciting and new", "Under review", "In question", "Settled"],
            )
        })
        .collect();
    AssessmentDefinition::new(QuestionBank::new(questions).unwrap(), WeightTable::positional())
        .unwrap()
}

fn dist(values: [u8; 4]) -> StageDistribution {
    StageDistribution::new(values).unwrap()
}

// =============================================================================
// SCENARIOS
// =============================================================================

#[test]
fn scenario_a_one_to_one_mapping() {
    let mut session = AssessmentSession::new(four_questions(), MemoryStore::new());
    session.start().unwrap();

    // honeymoon, honeymoon, self-reflection, steady-state
    for (id, option) in [("culture", 0), ("feedback", 0), ("purpose", 1), ("process", 3)] {
        session.answer(id, option).unwrap();
    }
    let result = session.submit().unwrap();

    assert_eq!(result.distribution, dist([50, 25, 0, 25]));
    assert_eq!(result.dominant_stage, Stage::Honeymoon);
}

#[test]
fn scenario_b_gap_against_target() {
    let current = dist([40, 20, 20, 20]);
    let target = dist([25, 30, 25, 20]);

    let delta = gap(&current, &target);
    assert_eq!(delta.as_array(), [-15, 10, 5, 0]);

    let magnitude = total_gap_magnitude(&delta);
    assert_eq!(magnitude, 30);
    assert_eq!(classify_severity(magnitude), Severity::Moderate);

    let report = GapReport::new(current, target);
    assert_eq!(report.severity, Severity::Moderate);
    assert_eq!(report.recommendations.len(), 3);
    assert_eq!(report.recommendations[0].stage, Stage::Honeymoon);
}

#[test]
fn scenario_c_previous_at_first_question() {
    let mut session = AssessmentSession::new(four_questions(), MemoryStore::new());
    session.start().unwrap();

    let err = session.go_to_previous().unwrap_err();
    assert!(matches!(err, SessionError::NavigationBounds { requested: -1, total: 4 }));
    assert_eq!(session.current_index(), 0);
    assert_eq!(session.state(), SessionState::InProgress);
}

#[test]
fn scenario_d_incomplete_submission() {
    let mut session = AssessmentSession::new(four_questions(), MemoryStore::new());
    session.start().unwrap();
    for (id, option) in [("culture", 0), ("feedback", 2), ("purpose", 1)] {
        session.answer(id, option).unwrap();
    }

    let err = session.submit().unwrap_err();
    assert!(matches!(
        err,
        SessionError::IncompleteSubmission { answered: 3, total: 4 }
    ));
    assert_eq!(session.state(), SessionState::InProgress);
    assert_eq!(session.answers().len(), 3);
    assert_eq!(session.answers().get("feedback"), Some(2));
    assert!(!session.can_submit());

    // Answering the last one unlocks submission
    session.answer("process", 3).unwrap();
    assert!(session.can_submit());
    assert!(session.submit().is_ok());
}

// =============================================================================
// PERSISTENCE ACROSS RELOADS
// =============================================================================

#[test]
fn reload_resumes_at_same_question_with_redb() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("positions.redb");
    let config = SessionConfig::default().with_namespace("org_health");

    {
        let store = RedbStore::open(&path).unwrap();
        let mut session = AssessmentSession::new(four_questions(), store)
            .with_config(config.clone())
            .with_user("u-17");
        session.start().unwrap();
        session.answer("culture", 1).unwrap();
        session.go_to_question(2).unwrap();
    }

    let store = RedbStore::open(&path).unwrap();
    assert_eq!(
        store.get("org_health_u-17").unwrap(),
        Some("2".to_string())
    );

    let mut session = AssessmentSession::new(four_questions(), store)
        .with_config(config)
        .with_user("u-17");
    assert_eq!(session.resume().unwrap(), 2);
    assert_eq!(
        session.current_question().map(|q| q.id.as_str()),
        Some("purpose")
    );
    assert!(session.answers().is_empty());
}

#[test]
fn submit_and_reset_clear_the_persisted_position() {
    let mut store = MemoryStore::new();

    {
        let mut session = AssessmentSession::new(four_questions(), &mut store).with_user("kim");
        session.start().unwrap();
        for id in ["culture", "feedback", "purpose", "process"] {
            session.answer(id, 3).unwrap();
        }
        assert_eq!(store_value(&session), Some("4".to_string()));
        let result = session.submit().unwrap();
        assert_eq!(result.dominant_stage, Stage::SteadyState);
        assert_eq!(store_value(&session), None);

        session.reset().unwrap();
        session.start().unwrap();
        session.answer("culture", 0).unwrap();
    }
    assert_eq!(store.len(), 1);

    let mut session = AssessmentSession::new(four_questions(), &mut store).with_user("kim");
    assert_eq!(session.resume().unwrap(), 1);
    session.reset().unwrap();
    assert!(store.is_empty());
}

fn store_value<S: PositionStore>(session: &AssessmentSession<S>) -> Option<String> {
    session.store().get(session.key()).unwrap()
}
