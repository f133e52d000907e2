//! Security group creation step

use crate::cloud::AwsApi;
use crate::core::{CancelToken, ProgressSink, ProvisionConfig, Step, StepError};
use crate::steps::amazon::{
    masters_group_name, nodes_group_name, STEP_CREATE_SECURITY_GROUPS, STEP_CREATE_VPC,
};
use async_trait::async_trait;
use anyhow::anyhow;
use std::sync::Arc;
use tracing::warn;

/// Creates one security group for master nodes and one for workers.
pub struct CreateSecurityGroups {
    aws: Arc<dyn AwsApi>,
}

impl CreateSecurityGroups {
    pub fn new(aws: Arc<dyn AwsApi>) -> Self {
        Self { aws }
    }
}

#[async_trait]
impl Step for CreateSecurityGroups {
    fn name(&self) -> &str {
        STEP_CREATE_SECURITY_GROUPS
    }

    fn description(&self) -> &str {
        "Create master and node security groups"
    }

    fn depends(&self) -> &[&str] {
        &[STEP_CREATE_VPC]
    }

    async fn run(
        &self,
        token: &CancelToken,
        out: &mut dyn ProgressSink,
        cfg: &mut ProvisionConfig,
    ) -> Result<(), StepError> {
        token.ensure_active()?;

        let vpc_id = cfg
            .aws
            .vpc_id
            .clone()
            .ok_or_else(|| anyhow!("vpc id is not set; did {} run?", STEP_CREATE_VPC))?;

        let masters = masters_group_name(&cfg.cluster_name);
        out.append(&format!("creating security group {}", masters)).await;
        let masters_id = self
            .aws
            .create_security_group(&cfg.region, &vpc_id, &masters, "cluster master nodes")
            .await?;
        cfg.aws.masters_security_group_id = Some(masters_id);

        let nodes = nodes_group_name(&cfg.cluster_name);
        out.append(&format!("creating security group {}", nodes)).await;
        let nodes_id = self
            .aws
            .create_security_group(&cfg.region, &vpc_id, &nodes, "cluster worker nodes")
            .await?;
        cfg.aws.nodes_security_group_id = Some(nodes_id);

        Ok(())
    }

    async fn rollback(
        &self,
        _token: &CancelToken,
        out: &mut dyn ProgressSink,
        cfg: &mut ProvisionConfig,
    ) -> Result<(), StepError> {
        let mut failed = false;

        // Delete in reverse creation order, and keep going if one fails.
        for group_id in [
            cfg.aws.nodes_security_group_id.take(),
            cfg.aws.masters_security_group_id.take(),
        ]
        .into_iter()
        .flatten()
        {
            out.append(&format!("deleting security group {}", group_id)).await;
            if let Err(err) = self.aws.delete_security_group(&cfg.region, &group_id).await {
                warn!(group_id = %group_id, error = %err, "failed to delete security group");
                failed = true;
            }
        }

        if failed {
            return Err(anyhow!("some security groups could not be deleted").into());
        }
        Ok(())
    }
}
