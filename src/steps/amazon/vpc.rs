//! VPC creation step

use crate::cloud::AwsApi;
use crate::core::{CancelToken, ProgressSink, ProvisionConfig, Step, StepError};
use crate::steps::amazon::STEP_CREATE_VPC;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Creates the VPC every other network resource lives in.
pub struct CreateVpc {
    aws: Arc<dyn AwsApi>,
}

impl CreateVpc {
    pub fn new(aws: Arc<dyn AwsApi>) -> Self {
        Self { aws }
    }
}

#[async_trait]
impl Step for CreateVpc {
    fn name(&self) -> &str {
        STEP_CREATE_VPC
    }

    fn description(&self) -> &str {
        "Create the cluster VPC"
    }

    async fn run(
        &self,
        token: &CancelToken,
        out: &mut dyn ProgressSink,
        cfg: &mut ProvisionConfig,
    ) -> Result<(), StepError> {
        token.ensure_active()?;

        out.append(&format!(
            "creating VPC {} in {}",
            cfg.aws.vpc_cidr, cfg.region
        ))
        .await;
        let vpc_id = self
            .aws
            .create_vpc(&cfg.region, &cfg.aws.vpc_cidr, &cfg.cluster_name)
            .await?;

        info!(vpc_id = %vpc_id, "created VPC");
        out.append(&format!("created VPC {}", vpc_id)).await;
        cfg.aws.vpc_id = Some(vpc_id);
        Ok(())
    }

    async fn rollback(
        &self,
        _token: &CancelToken,
        out: &mut dyn ProgressSink,
        cfg: &mut ProvisionConfig,
    ) -> Result<(), StepError> {
        let Some(vpc_id) = cfg.aws.vpc_id.take() else {
            return Ok(());
        };

        out.append(&format!("deleting VPC {}", vpc_id)).await;
        self.aws.delete_vpc(&cfg.region, &vpc_id).await?;
        Ok(())
    }
}
