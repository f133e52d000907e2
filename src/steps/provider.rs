//! The pre-provision composite step

use crate::core::{CancelToken, ProgressSink, ProvisionConfig, Step, StepError};
use crate::execution::{catalog, run_pipeline, ExecutionError, Pipeline, StepRegistry};
use async_trait::async_trait;
use std::sync::Arc;

pub const STEP_PRE_PROVISION: &str = catalog::PRE_PROVISION;

/// A step that is itself the provider's pre-provision pipeline.
///
/// Resolves the catalog order for the config's provider and runs it through
/// the same executor that serves top-level runs, so an inner failure rolls
/// back the inner completed prefix before the error propagates. That makes
/// nesting this step inside larger pipelines safe regardless of which level
/// failed.
pub struct PreProvision {
    registry: Arc<StepRegistry>,
}

impl PreProvision {
    pub fn new(registry: Arc<StepRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl Step for PreProvision {
    fn name(&self) -> &str {
        STEP_PRE_PROVISION
    }

    fn description(&self) -> &str {
        "Provision the cloud prerequisites for a cluster"
    }

    async fn run(
        &self,
        token: &CancelToken,
        out: &mut dyn ProgressSink,
        cfg: &mut ProvisionConfig,
    ) -> Result<(), StepError> {
        let names = catalog::pre_provision_steps(cfg.provider);
        let pipeline = Pipeline::resolve(STEP_PRE_PROVISION, names, &self.registry)
            .map_err(anyhow::Error::new)?;

        run_pipeline(token, out, cfg, &pipeline)
            .await
            .map_err(|err| match err {
                ExecutionError::Cancelled { .. } => StepError::Cancelled,
                other => StepError::Other(anyhow::Error::new(other)),
            })
    }

    // No rollback of its own: the inner executor already compensated the
    // completed prefix before the error left `run`.
}
