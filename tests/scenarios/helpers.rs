//! Test fixtures for executor scenarios

use async_trait::async_trait;
use kubeforge::core::{CancelToken, ProgressSink, Provider, ProvisionConfig, Step, StepError};
use kubeforge::execution::{Pipeline, StepRegistry};
use std::sync::{Arc, Mutex};

/// Shared journal recording every `run`/`rollback` invocation in order.
#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// How a fixture step's forward action behaves.
#[derive(Debug, Clone, Default)]
pub enum RunOutcome {
    #[default]
    Succeed,
    Fail(&'static str),
    /// Return `StepError::Cancelled`, as a step observing the token would.
    Cancelled,
}

/// Configurable fixture step that records its invocations.
pub struct FixtureStep {
    name: &'static str,
    journal: Journal,
    run_outcome: RunOutcome,
    fail_rollback: bool,
    /// Cancel this token at the end of a successful run, simulating a caller
    /// that gives up mid-pipeline.
    cancel_after_run: Option<CancelToken>,
}

impl FixtureStep {
    pub fn new(name: &'static str, journal: Journal) -> Self {
        Self {
            name,
            journal,
            run_outcome: RunOutcome::Succeed,
            fail_rollback: false,
            cancel_after_run: None,
        }
    }

    pub fn failing(mut self, message: &'static str) -> Self {
        self.run_outcome = RunOutcome::Fail(message);
        self
    }

    pub fn cancelled_in_run(mut self) -> Self {
        self.run_outcome = RunOutcome::Cancelled;
        self
    }

    pub fn failing_rollback(mut self) -> Self {
        self.fail_rollback = true;
        self
    }

    pub fn cancelling_after_run(mut self, token: CancelToken) -> Self {
        self.cancel_after_run = Some(token);
        self
    }
}

#[async_trait]
impl Step for FixtureStep {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        self.name
    }

    async fn run(
        &self,
        _token: &CancelToken,
        _out: &mut dyn ProgressSink,
        _cfg: &mut ProvisionConfig,
    ) -> Result<(), StepError> {
        self.journal.push(format!("run:{}", self.name));

        match self.run_outcome {
            RunOutcome::Succeed => {
                if let Some(token) = &self.cancel_after_run {
                    token.cancel();
                }
                Ok(())
            }
            RunOutcome::Fail(message) => Err(anyhow::anyhow!(message).into()),
            RunOutcome::Cancelled => Err(StepError::Cancelled),
        }
    }

    async fn rollback(
        &self,
        _token: &CancelToken,
        _out: &mut dyn ProgressSink,
        _cfg: &mut ProvisionConfig,
    ) -> Result<(), StepError> {
        self.journal.push(format!("rollback:{}", self.name));

        if self.fail_rollback {
            return Err(anyhow::anyhow!("cloud refused the teardown").into());
        }
        Ok(())
    }
}

/// Registry holding the given fixture steps.
pub fn registry_of(steps: Vec<FixtureStep>) -> StepRegistry {
    let mut registry = StepRegistry::new();
    for step in steps {
        registry.register(Arc::new(step));
    }
    registry
}

/// Resolve a pipeline over fixture steps registered under `names`.
pub fn pipeline_of(stage: &str, names: &[&str], registry: &StepRegistry) -> Pipeline {
    Pipeline::resolve(stage, names, registry).expect("fixture steps should resolve")
}

/// A populated, valid config for fixture runs.
pub fn test_config() -> ProvisionConfig {
    ProvisionConfig::new(Provider::Aws, "abc12345", "fixture", "us-east-1")
}
