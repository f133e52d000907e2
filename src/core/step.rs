//! The provisioning step contract

use crate::cloud::CloudError;
use crate::core::{CancelToken, ProgressSink, ProvisionConfig};
use async_trait::async_trait;
use thiserror::Error;

/// Error produced by a step's forward or compensating action.
#[derive(Debug, Error)]
pub enum StepError {
    /// The run's cancellation token fired while the step was in flight.
    #[error("step cancelled")]
    Cancelled,

    /// A downstream cloud API call failed.
    #[error(transparent)]
    Cloud(#[from] CloudError),

    /// Anything else a step can fail with.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// A single named, reversible provisioning action.
///
/// Step instances are created once at startup, hold nothing but immutable
/// cloud-client handles, and are shared across every pipeline run - all
/// per-run state lives in the [`ProvisionConfig`] threaded through `run`.
#[async_trait]
pub trait Step: Send + Sync {
    /// Unique, stable identifier. Used as the registry/catalog key and in
    /// error context.
    fn name(&self) -> &str;

    /// Human-readable summary. No semantic role.
    fn description(&self) -> &str;

    /// Names of steps that must have succeeded earlier in the same pipeline.
    ///
    /// Pipelines are pre-ordered, so this is declarative today; it documents
    /// the contract for rollback ordering and future schedulers.
    fn depends(&self) -> &[&str] {
        &[]
    }

    /// Perform the provisioning action, narrating progress to `out` and
    /// recording outputs (created resource ids) into `cfg` for later steps.
    ///
    /// Long-running polling loops must watch `token` and return
    /// [`StepError::Cancelled`] promptly instead of running to completion.
    async fn run(
        &self,
        token: &CancelToken,
        out: &mut dyn ProgressSink,
        cfg: &mut ProvisionConfig,
    ) -> Result<(), StepError>;

    /// Best-effort inverse of `run`.
    ///
    /// Must be idempotent and safe to call even if `run` failed partway or
    /// never executed; in that case it must be a no-op that leaves `cfg`
    /// untouched. Errors here are reported by the engine but never abort the
    /// rollback of earlier steps.
    async fn rollback(
        &self,
        _token: &CancelToken,
        _out: &mut dyn ProgressSink,
        _cfg: &mut ProvisionConfig,
    ) -> Result<(), StepError> {
        Ok(())
    }
}
