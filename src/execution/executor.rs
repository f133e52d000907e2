//! Sequential pipeline executor with compensation

use crate::core::{CancelToken, ProgressSink, ProvisionConfig, Step, StepError};
use crate::execution::{catalog, Pipeline, StepRegistry};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// A rollback invocation that itself failed during compensation.
///
/// Collected and reported alongside the triggering forward error, never
/// suppressed; a rollback failure never aborts the rest of the unwind.
#[derive(Debug)]
pub struct RollbackFailure {
    pub step: String,
    pub error: StepError,
}

impl fmt::Display for RollbackFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rollback of {} failed: {}", self.step, self.error)
    }
}

/// Error returned by a pipeline run.
///
/// Every variant names the stage that was active, so failure reports are
/// attributable without a stack trace.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// Semantically invalid input configuration. A deployment defect, not a
    /// transient condition.
    #[error("invalid provisioning config: {0}")]
    InvalidConfig(String),

    /// A catalog-listed step name was never registered.
    #[error("{stage}: step {name:?} is not registered")]
    StepNotRegistered { stage: String, name: String },

    /// A step's forward action failed; completed steps were compensated.
    #[error("{stage}: step {step:?} failed")]
    StepFailed {
        stage: String,
        step: String,
        #[source]
        source: StepError,
        rollback: Vec<RollbackFailure>,
    },

    /// The caller gave up mid-run; completed steps were compensated.
    #[error("{stage}: cancelled at step {step:?}")]
    Cancelled {
        stage: String,
        step: String,
        rollback: Vec<RollbackFailure>,
    },
}

impl ExecutionError {
    /// Rollback errors collected while compensating, if any.
    pub fn rollback_failures(&self) -> &[RollbackFailure] {
        match self {
            ExecutionError::StepFailed { rollback, .. }
            | ExecutionError::Cancelled { rollback, .. } => rollback,
            _ => &[],
        }
    }
}

/// Run a resolved pipeline sequentially against one configuration and one
/// output sink.
///
/// Stops at the first failure, then invokes `rollback` on every
/// already-completed step in strict reverse order. Cancellation is observed
/// between steps and treated like a forward failure with respect to
/// compensation. An empty pipeline is a successful no-op.
pub async fn run_pipeline(
    token: &CancelToken,
    out: &mut dyn ProgressSink,
    cfg: &mut ProvisionConfig,
    pipeline: &Pipeline,
) -> Result<(), ExecutionError> {
    let stage = pipeline.stage();
    let mut completed: Vec<Arc<dyn Step>> = Vec::with_capacity(pipeline.len());

    for step in pipeline.steps() {
        if token.is_cancelled() {
            info!(stage, step = step.name(), "run cancelled before step");
            out.append(&format!("[{}] cancelled before {}", stage, step.name()))
                .await;
            let rollback = unwind(token, out, cfg, stage, &completed).await;
            return Err(ExecutionError::Cancelled {
                stage: stage.to_string(),
                step: step.name().to_string(),
                rollback,
            });
        }

        info!(stage, step = step.name(), "running step");
        out.append(&format!("[{}] {}", stage, step.description())).await;

        match step.run(token, out, cfg).await {
            Ok(()) => completed.push(step.clone()),
            Err(err) => {
                warn!(stage, step = step.name(), error = %err, "step failed");
                out.append(&format!("[{}] {} failed: {}", stage, step.name(), err))
                    .await;
                let rollback = unwind(token, out, cfg, stage, &completed).await;
                return Err(match err {
                    StepError::Cancelled => ExecutionError::Cancelled {
                        stage: stage.to_string(),
                        step: step.name().to_string(),
                        rollback,
                    },
                    err => ExecutionError::StepFailed {
                        stage: stage.to_string(),
                        step: step.name().to_string(),
                        source: err,
                        rollback,
                    },
                });
            }
        }
    }

    Ok(())
}

/// Compensate completed steps, most recent first.
///
/// Runs even on a cancelled token: leaving half-created cloud resources is
/// worse than a slow teardown.
async fn unwind(
    token: &CancelToken,
    out: &mut dyn ProgressSink,
    cfg: &mut ProvisionConfig,
    stage: &str,
    completed: &[Arc<dyn Step>],
) -> Vec<RollbackFailure> {
    let mut failures = Vec::new();

    for step in completed.iter().rev() {
        info!(stage, step = step.name(), "rolling back step");
        out.append(&format!("[{}] rolling back {}", stage, step.name()))
            .await;

        if let Err(error) = step.rollback(token, out, cfg).await {
            warn!(stage, step = step.name(), error = %error, "rollback failed");
            out.append(&format!(
                "[{}] rollback of {} failed: {}",
                stage,
                step.name(),
                error
            ))
            .await;
            failures.push(RollbackFailure {
                step: step.name().to_string(),
                error,
            });
        }
    }

    failures
}

/// The engine surface exposed to the surrounding orchestration layer.
///
/// Holds the step registry and turns a populated [`ProvisionConfig`] into a
/// pipeline run for its provider.
#[derive(Clone)]
pub struct Engine {
    registry: Arc<StepRegistry>,
}

impl Engine {
    pub fn new(registry: Arc<StepRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &StepRegistry {
        &self.registry
    }

    /// Run the pre-provision pipeline for the config's provider.
    pub async fn pre_provision(
        &self,
        token: &CancelToken,
        out: &mut dyn ProgressSink,
        cfg: &mut ProvisionConfig,
    ) -> Result<(), ExecutionError> {
        cfg.validate().map_err(ExecutionError::InvalidConfig)?;

        let names = catalog::pre_provision_steps(cfg.provider);
        let pipeline = Pipeline::resolve(catalog::PRE_PROVISION, names, &self.registry)?;

        info!(
            provider = %cfg.provider,
            cluster = %cfg.cluster_name,
            steps = pipeline.len(),
            "starting pre-provision"
        );
        run_pipeline(token, out, cfg, &pipeline).await
    }
}
