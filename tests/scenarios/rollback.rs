//! Test: compensation of the completed prefix

use crate::helpers::*;
use kubeforge::core::{CancelToken, MemorySink};
use kubeforge::execution::{run_pipeline, ExecutionError};

/// When step k fails, exactly the steps before it roll back, most recent
/// first, and the steps after it never run.
#[tokio::test]
async fn test_failure_unwinds_completed_prefix_in_reverse() {
    let journal = Journal::new();
    let registry = registry_of(vec![
        FixtureStep::new("one", journal.clone()),
        FixtureStep::new("two", journal.clone()),
        FixtureStep::new("three", journal.clone()),
        FixtureStep::new("four", journal.clone()).failing("quota exceeded"),
        FixtureStep::new("five", journal.clone()),
    ]);
    let pipeline = pipeline_of(
        "preProvision",
        &["one", "two", "three", "four", "five"],
        &registry,
    );

    let mut cfg = test_config();
    let mut sink = MemorySink::new();
    let err = run_pipeline(&CancelToken::new(), &mut sink, &mut cfg, &pipeline)
        .await
        .unwrap_err();

    assert_eq!(
        journal.entries(),
        vec![
            "run:one",
            "run:two",
            "run:three",
            "run:four",
            "rollback:three",
            "rollback:two",
            "rollback:one",
        ]
    );

    match err {
        ExecutionError::StepFailed { step, rollback, .. } => {
            assert_eq!(step, "four");
            assert!(rollback.is_empty());
        }
        other => panic!("expected StepFailed, got {:?}", other),
    }
}

/// A rollback error is collected, reported, and does not stop the unwind of
/// the remaining steps.
#[tokio::test]
async fn test_rollback_errors_do_not_abort_the_unwind() {
    let journal = Journal::new();
    let registry = registry_of(vec![
        FixtureStep::new("one", journal.clone()).failing_rollback(),
        FixtureStep::new("two", journal.clone()).failing_rollback(),
        FixtureStep::new("three", journal.clone()).failing("boom"),
    ]);
    let pipeline = pipeline_of("preProvision", &["one", "two", "three"], &registry);

    let mut cfg = test_config();
    let mut sink = MemorySink::new();
    let err = run_pipeline(&CancelToken::new(), &mut sink, &mut cfg, &pipeline)
        .await
        .unwrap_err();

    // Both rollbacks were still attempted...
    assert_eq!(
        journal.entries(),
        vec!["run:one", "run:two", "run:three", "rollback:two", "rollback:one"]
    );

    // ...and both failures are present in the final report.
    let failures = err.rollback_failures();
    assert_eq!(failures.len(), 2);
    assert_eq!(failures[0].step, "two");
    assert_eq!(failures[1].step, "one");
    assert!(failures[0].error.to_string().contains("teardown"));
}

/// Steps that never ran are never rolled back; rolling one back directly is
/// a mutation-free no-op.
#[tokio::test]
async fn test_rollback_of_a_never_run_step_is_a_noop() {
    use kubeforge::core::Step;

    let journal = Journal::new();
    let step = FixtureStep::new("lonely", journal.clone());

    let mut cfg = test_config();
    let before = cfg.clone();
    let mut sink = MemorySink::new();

    step.rollback(&CancelToken::new(), &mut sink, &mut cfg)
        .await
        .unwrap();

    assert_eq!(cfg, before);
}
