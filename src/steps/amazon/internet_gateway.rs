//! Internet gateway step

use crate::cloud::AwsApi;
use crate::core::{CancelToken, ProgressSink, ProvisionConfig, Step, StepError};
use crate::steps::amazon::{STEP_CREATE_INTERNET_GATEWAY, STEP_CREATE_VPC};
use anyhow::anyhow;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

/// Creates an internet gateway and attaches it to the cluster VPC.
pub struct CreateInternetGateway {
    aws: Arc<dyn AwsApi>,
}

impl CreateInternetGateway {
    pub fn new(aws: Arc<dyn AwsApi>) -> Self {
        Self { aws }
    }
}

#[async_trait]
impl Step for CreateInternetGateway {
    fn name(&self) -> &str {
        STEP_CREATE_INTERNET_GATEWAY
    }

    fn description(&self) -> &str {
        "Create and attach the internet gateway"
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

        out.append("creating internet gateway").await;
        let gateway_id = self.aws.create_internet_gateway(&cfg.region).await?;
        // Record before attaching so a failed attach still deletes the
        // gateway on rollback.
        cfg.aws.internet_gateway_id = Some(gateway_id.clone());

        out.append(&format!("attaching {} to {}", gateway_id, vpc_id)).await;
        self.aws
            .attach_internet_gateway(&cfg.region, &gateway_id, &vpc_id)
            .await?;
        Ok(())
    }

    async fn rollback(
        &self,
        _token: &CancelToken,
        out: &mut dyn ProgressSink,
        cfg: &mut ProvisionConfig,
    ) -> Result<(), StepError> {
        let Some(gateway_id) = cfg.aws.internet_gateway_id.take() else {
            return Ok(());
        };

        if let Some(vpc_id) = cfg.aws.vpc_id.clone() {
            out.append(&format!("detaching internet gateway {}", gateway_id)).await;
            if let Err(err) = self
                .aws
                .detach_internet_gateway(&cfg.region, &gateway_id, &vpc_id)
                .await
            {
                // The attach itself may have been the failing call.
                warn!(gateway_id = %gateway_id, error = %err, "failed to detach internet gateway");
            }
        }

        out.append(&format!("deleting internet gateway {}", gateway_id)).await;
        self.aws
            .delete_internet_gateway(&cfg.region, &gateway_id)
            .await?;
        Ok(())
    }
}
