//! Per-zone subnet creation step

use crate::cloud::AwsApi;
use crate::core::{CancelToken, ProgressSink, ProvisionConfig, Step, StepError};
use crate::steps::amazon::{STEP_CREATE_SUBNETS, STEP_CREATE_VPC};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

/// Creates one subnet per available zone, carving a /24 out of the VPC CIDR
/// for each.
pub struct CreateSubnets {
    aws: Arc<dyn AwsApi>,
}

impl CreateSubnets {
    pub fn new(aws: Arc<dyn AwsApi>) -> Self {
        Self { aws }
    }
}

/// Derive the `index`-th /24 subnet block from the VPC CIDR.
fn subnet_cidr(vpc_cidr: &str, index: usize) -> Result<String> {
    let base = vpc_cidr
        .split('/')
        .next()
        .ok_or_else(|| anyhow!("malformed CIDR {:?}", vpc_cidr))?;
    let octets: Vec<&str> = base.split('.').collect();
    if octets.len() != 4 {
        return Err(anyhow!("malformed CIDR {:?}", vpc_cidr));
    }
    if index > 255 {
        return Err(anyhow!("subnet index {} out of range", index));
    }
    Ok(format!("{}.{}.{}.0/24", octets[0], octets[1], index))
}

#[async_trait]
impl Step for CreateSubnets {
    fn name(&self) -> &str {
        STEP_CREATE_SUBNETS
    }

    fn description(&self) -> &str {
        "Create a subnet in every availability zone"
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

        let zones = self.aws.availability_zones(&cfg.region).await?;
        info!(zones = zones.len(), "creating subnets");

        for (index, zone) in zones.iter().enumerate() {
            // One CLI call per zone; honor cancellation between them.
            token.ensure_active()?;

            let cidr = subnet_cidr(&cfg.aws.vpc_cidr, index)?;
            out.append(&format!("creating subnet {} in {}", cidr, zone)).await;
            let subnet_id = self
                .aws
                .create_subnet(&cfg.region, &vpc_id, zone, &cidr)
                .await?;
            cfg.aws.subnets.insert(zone.clone(), subnet_id);
        }

        Ok(())
    }

    async fn rollback(
        &self,
        _token: &CancelToken,
        out: &mut dyn ProgressSink,
        cfg: &mut ProvisionConfig,
    ) -> Result<(), StepError> {
        let subnets = std::mem::take(&mut cfg.aws.subnets);
        let mut failed = 0;

        for (zone, subnet_id) in subnets {
            out.append(&format!("deleting subnet {} in {}", subnet_id, zone)).await;
            if let Err(err) = self.aws.delete_subnet(&cfg.region, &subnet_id).await {
                warn!(subnet_id = %subnet_id, error = %err, "failed to delete subnet");
                failed += 1;
            }
        }

        if failed > 0 {
            return Err(anyhow!("{} subnets could not be deleted", failed).into());
        }
        Ok(())
    }
}
