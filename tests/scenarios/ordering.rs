//! Test: forward ordering and the empty pipeline

use crate::helpers::*;
use kubeforge::core::{CancelToken, MemorySink};
use kubeforge::execution::run_pipeline;

/// A successful run invokes every step in pipeline order, each only after
/// the previous one returned success.
#[tokio::test]
async fn test_steps_run_in_declared_order() {
    let journal = Journal::new();
    let registry = registry_of(vec![
        FixtureStep::new("first", journal.clone()),
        FixtureStep::new("second", journal.clone()),
        FixtureStep::new("third", journal.clone()),
    ]);
    let pipeline = pipeline_of("preProvision", &["first", "second", "third"], &registry);

    let mut cfg = test_config();
    let mut sink = MemorySink::new();
    run_pipeline(&CancelToken::new(), &mut sink, &mut cfg, &pipeline)
        .await
        .unwrap();

    assert_eq!(journal.entries(), vec!["run:first", "run:second", "run:third"]);
}

/// An empty pipeline succeeds with zero invocations and an unmodified config.
#[tokio::test]
async fn test_empty_pipeline_is_a_noop_success() {
    let registry = registry_of(vec![]);
    let pipeline = pipeline_of("preProvision", &[], &registry);

    let mut cfg = test_config();
    let before = cfg.clone();
    let mut sink = MemorySink::new();

    run_pipeline(&CancelToken::new(), &mut sink, &mut cfg, &pipeline)
        .await
        .unwrap();

    assert_eq!(cfg, before);
    assert!(sink.lines().is_empty());
}

/// The registry hands the same instance to every run; the narration stream
/// still reflects each step once per run.
#[tokio::test]
async fn test_narration_is_appended_per_step() {
    let journal = Journal::new();
    let registry = registry_of(vec![
        FixtureStep::new("first", journal.clone()),
        FixtureStep::new("second", journal.clone()),
    ]);
    let pipeline = pipeline_of("preProvision", &["first", "second"], &registry);

    let mut cfg = test_config();
    let mut sink = MemorySink::new();
    run_pipeline(&CancelToken::new(), &mut sink, &mut cfg, &pipeline)
        .await
        .unwrap();

    let narration = sink.lines().join("\n");
    assert!(narration.contains("first"));
    assert!(narration.contains("second"));
}
