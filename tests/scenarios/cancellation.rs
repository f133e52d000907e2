//! Test: cancellation mid-pipeline

use crate::helpers::*;
use kubeforge::core::{CancelToken, MemorySink};
use kubeforge::execution::{run_pipeline, ExecutionError};

/// Cancelling between step 2 and step 3 of a 4-step pipeline prevents steps
/// 3 and 4 from running and rolls back steps 1 and 2.
#[tokio::test]
async fn test_cancellation_between_steps() {
    let journal = Journal::new();
    let token = CancelToken::new();
    let registry = registry_of(vec![
        FixtureStep::new("one", journal.clone()),
        FixtureStep::new("two", journal.clone()).cancelling_after_run(token.clone()),
        FixtureStep::new("three", journal.clone()),
        FixtureStep::new("four", journal.clone()),
    ]);
    let pipeline = pipeline_of("preProvision", &["one", "two", "three", "four"], &registry);

    let mut cfg = test_config();
    let mut sink = MemorySink::new();
    let err = run_pipeline(&token, &mut sink, &mut cfg, &pipeline)
        .await
        .unwrap_err();

    assert_eq!(
        journal.entries(),
        vec!["run:one", "run:two", "rollback:two", "rollback:one"]
    );

    match err {
        ExecutionError::Cancelled { stage, step, .. } => {
            assert_eq!(stage, "preProvision");
            assert_eq!(step, "three");
        }
        other => panic!("expected Cancelled, got {:?}", other),
    }
}

/// A step that observes the token itself and returns `Cancelled` is tagged
/// as a cancellation, not a cloud failure, and is not treated as completed.
#[tokio::test]
async fn test_cancellation_inside_a_step() {
    let journal = Journal::new();
    let registry = registry_of(vec![
        FixtureStep::new("one", journal.clone()),
        FixtureStep::new("two", journal.clone()).cancelled_in_run(),
    ]);
    let pipeline = pipeline_of("preProvision", &["one", "two"], &registry);

    let mut cfg = test_config();
    let mut sink = MemorySink::new();
    let err = run_pipeline(&CancelToken::new(), &mut sink, &mut cfg, &pipeline)
        .await
        .unwrap_err();

    assert_eq!(
        journal.entries(),
        vec!["run:one", "run:two", "rollback:one"]
    );
    assert!(matches!(err, ExecutionError::Cancelled { .. }));
}

/// A token cancelled before the run starts stops the first step from
/// executing; with nothing completed there is nothing to unwind.
#[tokio::test]
async fn test_cancellation_before_first_step() {
    let journal = Journal::new();
    let token = CancelToken::new();
    token.cancel();

    let registry = registry_of(vec![FixtureStep::new("one", journal.clone())]);
    let pipeline = pipeline_of("preProvision", &["one"], &registry);

    let mut cfg = test_config();
    let mut sink = MemorySink::new();
    let err = run_pipeline(&token, &mut sink, &mut cfg, &pipeline)
        .await
        .unwrap_err();

    assert!(journal.entries().is_empty());
    assert!(matches!(err, ExecutionError::Cancelled { .. }));
    assert!(err.rollback_failures().is_empty());
}
