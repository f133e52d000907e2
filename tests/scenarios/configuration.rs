//! Test: configuration errors and error attribution

use crate::helpers::*;
use kubeforge::core::{CancelToken, MemorySink, Provider};
use kubeforge::execution::{run_pipeline, Engine, ExecutionError, Pipeline};
use std::error::Error as _;
use std::sync::Arc;

/// An identifier outside the closed provider set fails at the string
/// boundary before any step could run.
#[test]
fn test_unknown_provider_identifier_is_fatal() {
    let err = "alibaba".parse::<Provider>().unwrap_err();
    assert!(err.to_string().contains("unknown provider"));
}

/// A catalog-listed step name missing from the registry is fatal for the
/// run and invokes nothing.
#[tokio::test]
async fn test_unregistered_step_is_fatal() {
    let journal = Journal::new();
    let registry = registry_of(vec![FixtureStep::new("present", journal.clone())]);

    let err = Pipeline::resolve("preProvision", &["present", "ghost"], &registry).unwrap_err();
    match err {
        ExecutionError::StepNotRegistered { stage, name } => {
            assert_eq!(stage, "preProvision");
            assert_eq!(name, "ghost");
        }
        other => panic!("expected StepNotRegistered, got {:?}", other),
    }
    assert!(journal.entries().is_empty());
}

/// A semantically invalid config is rejected by the engine before any step
/// runs.
#[tokio::test]
async fn test_invalid_config_is_rejected_up_front() {
    let journal = Journal::new();
    let registry = registry_of(vec![FixtureStep::new("one", journal.clone())]);
    let engine = Engine::new(Arc::new(registry));

    let mut cfg = test_config();
    cfg.cluster_name = String::new();
    let mut sink = MemorySink::new();

    let err = engine
        .pre_provision(&CancelToken::new(), &mut sink, &mut cfg)
        .await
        .unwrap_err();

    assert!(matches!(err, ExecutionError::InvalidConfig(_)));
    assert!(journal.entries().is_empty());
}

/// The returned error chain names the pipeline stage, the failing step, and
/// the root cause.
#[tokio::test]
async fn test_error_chain_names_stage_step_and_cause() {
    let journal = Journal::new();
    let registry = registry_of(vec![
        FixtureStep::new("one", journal.clone()),
        FixtureStep::new("two", journal.clone()).failing("subnet quota exceeded"),
        FixtureStep::new("three", journal.clone()),
    ]);
    let pipeline = pipeline_of("preProvision", &["one", "two", "three"], &registry);

    let mut cfg = test_config();
    let mut sink = MemorySink::new();
    let err = run_pipeline(&CancelToken::new(), &mut sink, &mut cfg, &pipeline)
        .await
        .unwrap_err();

    // Outermost message carries the stage and step names.
    let outer = err.to_string();
    assert!(outer.contains("preProvision"));
    assert!(outer.contains("two"));

    // The source chain bottoms out at the step's own error.
    let mut chain = Vec::new();
    let mut source: Option<&dyn std::error::Error> = err.source();
    while let Some(current) = source {
        chain.push(current.to_string());
        source = current.source();
    }
    assert!(
        chain.iter().any(|msg| msg.contains("subnet quota exceeded")),
        "chain {:?} should contain the root cause",
        chain
    );
}
