//! Property tests for scoring, gap analysis and the session controller.

#![allow(clippy::unwrap_used, clippy::panic)]

use proptest::prelude::*;
use stagewise_core::{
    AnswerRecord, AssessmentDefinition, AssessmentSession, MemoryStore, OptionWeight, Question,
    QuestionBank, ScoringModel, SessionError, SessionState, Stage, StageDistribution, WeightTable,
    classify_severity, gap, total_gap_magnitude,
};

// =============================================================================
// STRATEGIES
// =============================================================================

fn stage() -> impl Strategy<Value = Stage> {
    prop::sample::select(Stage::ALL.to_vec())
}

/// Any valid distribution, built from three cut points on 0..=100.
fn distribution() -> impl Strategy<Value = StageDistribution> {
    (0u8..=100, 0u8..=100, 0u8..=100).prop_map(|(a, b, c)| {
        let mut cuts = [a, b, c];
        cuts.sort_unstable();
        let [a, b, c] = cuts;
        StageDistribution::new([a, b - a, c - b, 100 - c]).unwrap()
    })
}

/// Per question: a list of `(stage, weight)` options.
fn weighted_questions() -> impl Strategy<Value = Vec<Vec<(Stage, u32)>>> {
    prop::collection::vec(
        prop::collection::vec((stage(), 1u32..=5), 1..6),
        1..12,
    )
}

fn build(spec: &[Vec<(Stage, u32)>]) -> AssessmentDefinition {
    let mut questions = Vec::new();
    let mut weights = WeightTable::positional();
    for (n, options) in spec.iter().enumerate() {
        let id = format!("q{n}");
        let labels: Vec<String> = (0..options.len()).map(|i| format!("option {i}")).collect();
        questions.push(Question::new(id.clone(), format!("Prompt {n}"), labels));
        let mapped = options
            .iter()
            .map(|(stage, weight)| OptionWeight::new(*stage, *weight))
            .collect();
        weights = weights.with_question(id, mapped).unwrap();
    }
    AssessmentDefinition::new(QuestionBank::new(questions).unwrap(), weights).unwrap()
}

fn positional(count: usize) -> AssessmentDefinition {
    let questions = (0..count)
        .map(|n| Question::new(format!("q{n}"), "prompt", ["h", "sr", "ss", "st"]))
        .collect();
    AssessmentDefinition::new(QuestionBank::new(questions).unwrap(), WeightTable::positional())
        .unwrap()
}

#[derive(Debug, Clone)]
enum Op {
    Answer { question: usize, option: usize },
    Previous,
    Jump(usize),
}

fn op(total: usize) -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..total, 0usize..4).prop_map(|(question, option)| Op::Answer { question, option }),
        Just(Op::Previous),
        (0..total + 3).prop_map(Op::Jump),
    ]
}

// =============================================================================
// SCORING PROPERTIES
// =============================================================================

proptest! {
    #[test]
    fn score_always_sums_to_100(spec in weighted_questions(), picks in prop::collection::vec(any::<prop::sample::Index>(), 12)) {
        let definition = build(&spec);
        let answers: AnswerRecord = spec
            .iter()
            .enumerate()
            .map(|(n, options)| (format!("q{n}"), picks[n].index(options.len())))
            .collect();

        let model = ScoringModel::new(definition.weights().clone());
        let result = model.score(definition.bank(), &answers).unwrap();

        let sum: u16 = result.distribution.as_array().iter().map(|p| u16::from(*p)).sum();
        prop_assert_eq!(sum, 100);
    }

    #[test]
    fn dominant_is_first_maximum_in_priority(dist in distribution()) {
        let max = dist.as_array().into_iter().max().unwrap();
        let expected = Stage::ALL.into_iter().find(|s| dist.get(*s) == max).unwrap();
        prop_assert_eq!(dist.dominant(), expected);
    }

    #[test]
    fn gap_is_antisymmetric(a in distribution(), b in distribution()) {
        prop_assert_eq!(gap(&a, &b), -gap(&b, &a));
        prop_assert_eq!(total_gap_magnitude(&gap(&a, &a)), 0);
        prop_assert_eq!(total_gap_magnitude(&gap(&a, &b)), total_gap_magnitude(&gap(&b, &a)));
    }

    #[test]
    fn gap_magnitude_is_even_and_bounded(a in distribution(), b in distribution()) {
        let magnitude = total_gap_magnitude(&gap(&a, &b));
        prop_assert!(magnitude <= 200);
        prop_assert_eq!(magnitude % 2, 0);
    }

    #[test]
    fn severity_is_monotonic(x in 0u16..=250, y in 0u16..=250) {
        let (lo, hi) = if x <= y { (x, y) } else { (y, x) };
        prop_assert!(classify_severity(lo) <= classify_severity(hi));
    }
}

// =============================================================================
// SESSION PROPERTIES
// =============================================================================

proptest! {
    #[test]
    fn pointer_stays_in_bounds(
        (total, ops) in (1usize..8).prop_flat_map(|total| {
            (Just(total), prop::collection::vec(op(total), 0..40))
        })
    ) {
        let mut session = AssessmentSession::new(positional(total), MemoryStore::new());
        session.start().unwrap();

        for op in ops {
            let before = session.current_index();
            let outcome = match op {
                Op::Answer { question, option } => {
                    session.answer(&format!("q{question}"), option).map(|_| ())
                }
                Op::Previous => session.go_to_previous().map(|_| ()),
                Op::Jump(index) => session.go_to_question(index).map(|_| ()),
            };

            prop_assert!(session.current_index() <= total);
            if let Err(err) = outcome {
                let out_of_bounds = matches!(err, SessionError::NavigationBounds { .. });
                prop_assert!(out_of_bounds);
                prop_assert_eq!(session.current_index(), before);
            }
        }
    }

    #[test]
    fn submit_succeeds_iff_all_answered(
        (total, answered) in (1usize..8).prop_flat_map(|total| {
            (Just(total), prop::collection::vec(any::<bool>(), total))
        })
    ) {
        let mut session = AssessmentSession::new(positional(total), MemoryStore::new());
        session.start().unwrap();
        for (n, _) in answered.iter().enumerate().filter(|(_, yes)| **yes) {
            session.answer(&format!("q{n}"), n % 4).unwrap();
        }

        let count = session.answers().len();
        let pointer = session.current_index();
        let outcome = session.submit();

        if count == total {
            prop_assert!(outcome.is_ok());
            prop_assert_eq!(session.state(), SessionState::Completed);
        } else {
            let is_incomplete = matches!(outcome, Err(SessionError::IncompleteSubmission { .. }));
            prop_assert!(is_incomplete);
            prop_assert_eq!(session.state(), SessionState::InProgress);
            prop_assert_eq!(session.answers().len(), count);
            prop_assert_eq!(session.current_index(), pointer);
            prop_assert!(session.result().is_none());
        }
    }
}
