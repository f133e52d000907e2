//! AMI lookup step

use crate::cloud::AwsApi;
use crate::core::{CancelToken, ProgressSink, ProvisionConfig, Step, StepError};
use crate::steps::amazon::STEP_FIND_AMI;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Canonical's AWS account, owner of the official Ubuntu images.
const UBUNTU_OWNER: &str = "099720109477";
const UBUNTU_NAME_FILTER: &str = "ubuntu/images/hvm-ssd/ubuntu-jammy-22.04-amd64-server-*";

/// Resolves the machine image cluster nodes boot from.
///
/// Creates nothing, so rollback is the default no-op.
pub struct FindAmi {
    aws: Arc<dyn AwsApi>,
}

impl FindAmi {
    pub fn new(aws: Arc<dyn AwsApi>) -> Self {
        Self { aws }
    }
}

#[async_trait]
impl Step for FindAmi {
    fn name(&self) -> &str {
        STEP_FIND_AMI
    }

    fn description(&self) -> &str {
        "Find the base machine image for cluster nodes"
    }

    async fn run(
        &self,
        token: &CancelToken,
        out: &mut dyn ProgressSink,
        cfg: &mut ProvisionConfig,
    ) -> Result<(), StepError> {
        token.ensure_active()?;

        out.append(&format!("looking up Ubuntu AMI in {}", cfg.region))
            .await;
        let image_id = self
            .aws
            .find_image(&cfg.region, UBUNTU_OWNER, UBUNTU_NAME_FILTER)
            .await?;

        info!(image_id = %image_id, region = %cfg.region, "resolved AMI");
        out.append(&format!("using image {}", image_id)).await;
        cfg.aws.image_id = Some(image_id);
        Ok(())
    }
}
