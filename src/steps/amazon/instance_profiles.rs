//! IAM instance profile step

use crate::cloud::AwsApi;
use crate::core::{CancelToken, ProgressSink, ProvisionConfig, Step, StepError};
use crate::steps::amazon::{
    masters_profile_name, nodes_profile_name, STEP_CREATE_INSTANCE_PROFILES,
};
use anyhow::anyhow;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

/// Creates the IAM instance profiles master and worker instances launch with.
pub struct CreateInstanceProfiles {
    aws: Arc<dyn AwsApi>,
}

impl CreateInstanceProfiles {
    pub fn new(aws: Arc<dyn AwsApi>) -> Self {
        Self { aws }
    }
}

#[async_trait]
impl Step for CreateInstanceProfiles {
    fn name(&self) -> &str {
        STEP_CREATE_INSTANCE_PROFILES
    }

    fn description(&self) -> &str {
        "Create master and node instance profiles"
    }

    async fn run(
        &self,
        token: &CancelToken,
        out: &mut dyn ProgressSink,
        cfg: &mut ProvisionConfig,
    ) -> Result<(), StepError> {
        token.ensure_active()?;

        let masters = masters_profile_name(&cfg.cluster_name);
        out.append(&format!("creating instance profile {}", masters)).await;
        self.aws.create_instance_profile(&masters).await?;
        cfg.aws.masters_instance_profile = Some(masters);

        let nodes = nodes_profile_name(&cfg.cluster_name);
        out.append(&format!("creating instance profile {}", nodes)).await;
        self.aws.create_instance_profile(&nodes).await?;
        cfg.aws.nodes_instance_profile = Some(nodes);

        Ok(())
    }

    async fn rollback(
        &self,
        _token: &CancelToken,
        out: &mut dyn ProgressSink,
        cfg: &mut ProvisionConfig,
    ) -> Result<(), StepError> {
        let mut failed = false;

        for profile in [
            cfg.aws.nodes_instance_profile.take(),
            cfg.aws.masters_instance_profile.take(),
        ]
        .into_iter()
        .flatten()
        {
            out.append(&format!("deleting instance profile {}", profile)).await;
            if let Err(err) = self.aws.delete_instance_profile(&profile).await {
                warn!(profile = %profile, error = %err, "failed to delete instance profile");
                failed = true;
            }
        }

        if failed {
            return Err(anyhow!("some instance profiles could not be deleted").into());
        }
        Ok(())
    }
}
