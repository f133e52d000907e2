//! Route table creation and association steps

use crate::cloud::AwsApi;
use crate::core::{CancelToken, ProgressSink, ProvisionConfig, Step, StepError};
use crate::steps::amazon::{
    STEP_ASSOCIATE_ROUTE_TABLE, STEP_CREATE_INTERNET_GATEWAY, STEP_CREATE_ROUTE_TABLE,
    STEP_CREATE_SUBNETS, STEP_CREATE_VPC,
};
use anyhow::anyhow;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

/// Creates the cluster route table with a default route through the internet
/// gateway.
pub struct CreateRouteTable {
    aws: Arc<dyn AwsApi>,
}

impl CreateRouteTable {
    pub fn new(aws: Arc<dyn AwsApi>) -> Self {
        Self { aws }
    }
}

#[async_trait]
impl Step for CreateRouteTable {
    fn name(&self) -> &str {
        STEP_CREATE_ROUTE_TABLE
    }

    fn description(&self) -> &str {
        "Create the cluster route table"
    }

    fn depends(&self) -> &[&str] {
        &[STEP_CREATE_VPC, STEP_CREATE_INTERNET_GATEWAY]
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
        let gateway_id = cfg.aws.internet_gateway_id.clone().ok_or_else(|| {
            anyhow!(
                "internet gateway id is not set; did {} run?",
                STEP_CREATE_INTERNET_GATEWAY
            )
        })?;

        out.append("creating route table").await;
        let route_table_id = self.aws.create_route_table(&cfg.region, &vpc_id).await?;
        cfg.aws.route_table_id = Some(route_table_id.clone());

        out.append(&format!(
            "routing 0.0.0.0/0 through {} via {}",
            gateway_id, route_table_id
        ))
        .await;
        self.aws
            .create_route(&cfg.region, &route_table_id, "0.0.0.0/0", &gateway_id)
            .await?;
        Ok(())
    }

    async fn rollback(
        &self,
        _token: &CancelToken,
        out: &mut dyn ProgressSink,
        cfg: &mut ProvisionConfig,
    ) -> Result<(), StepError> {
        let Some(route_table_id) = cfg.aws.route_table_id.take() else {
            return Ok(());
        };

        out.append(&format!("deleting route table {}", route_table_id)).await;
        self.aws
            .delete_route_table(&cfg.region, &route_table_id)
            .await?;
        Ok(())
    }
}

/// Associates the cluster route table with every subnet.
pub struct AssociateRouteTable {
    aws: Arc<dyn AwsApi>,
}

impl AssociateRouteTable {
    pub fn new(aws: Arc<dyn AwsApi>) -> Self {
        Self { aws }
    }
}

#[async_trait]
impl Step for AssociateRouteTable {
    fn name(&self) -> &str {
        STEP_ASSOCIATE_ROUTE_TABLE
    }

    fn description(&self) -> &str {
        "Associate the route table with cluster subnets"
    }

    fn depends(&self) -> &[&str] {
        &[STEP_CREATE_ROUTE_TABLE, STEP_CREATE_SUBNETS]
    }

    async fn run(
        &self,
        token: &CancelToken,
        out: &mut dyn ProgressSink,
        cfg: &mut ProvisionConfig,
    ) -> Result<(), StepError> {
        token.ensure_active()?;

        let route_table_id = cfg.aws.route_table_id.clone().ok_or_else(|| {
            anyhow!(
                "route table id is not set; did {} run?",
                STEP_CREATE_ROUTE_TABLE
            )
        })?;

        let subnets: Vec<String> = cfg.aws.subnets.values().cloned().collect();
        for subnet_id in subnets {
            token.ensure_active()?;

            out.append(&format!("associating {} with {}", route_table_id, subnet_id))
                .await;
            let association_id = self
                .aws
                .associate_route_table(&cfg.region, &route_table_id, &subnet_id)
                .await?;
            cfg.aws.route_table_associations.push(association_id);
        }

        Ok(())
    }

    async fn rollback(
        &self,
        _token: &CancelToken,
        out: &mut dyn ProgressSink,
        cfg: &mut ProvisionConfig,
    ) -> Result<(), StepError> {
        let associations = std::mem::take(&mut cfg.aws.route_table_associations);
        let mut failed = 0;

        for association_id in associations.into_iter().rev() {
            out.append(&format!("removing association {}", association_id)).await;
            if let Err(err) = self
                .aws
                .disassociate_route_table(&cfg.region, &association_id)
                .await
            {
                warn!(association_id = %association_id, error = %err, "failed to disassociate route table");
                failed += 1;
            }
        }

        if failed > 0 {
            return Err(anyhow!("{} route table associations could not be removed", failed).into());
        }
        Ok(())
    }
}
