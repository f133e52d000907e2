//! Azure pre-provision steps

use crate::cloud::AzureApi;
use crate::core::{CancelToken, ProgressSink, ProvisionConfig, Step, StepError};
use crate::execution::StepRegistry;
use anyhow::anyhow;
use async_trait::async_trait;
use std::sync::Arc;

pub const STEP_CREATE_RESOURCE_GROUP: &str = "azureCreateResourceGroup";
pub const STEP_CREATE_VIRTUAL_NETWORK: &str = "azureCreateVirtualNetwork";

/// Register every Azure step against the shared client handle.
pub fn register(registry: &mut StepRegistry, azure: &Arc<dyn AzureApi>) {
    registry.register(Arc::new(CreateResourceGroup::new(azure.clone())));
    registry.register(Arc::new(CreateVirtualNetwork::new(azure.clone())));
}

fn resource_group_name(cluster: &str) -> String {
    format!("{}-group", cluster)
}

fn vnet_name(cluster: &str) -> String {
    format!("{}-vnet", cluster)
}

/// Creates the resource group everything else for the cluster lives in.
pub struct CreateResourceGroup {
    azure: Arc<dyn AzureApi>,
}

impl CreateResourceGroup {
    pub fn new(azure: Arc<dyn AzureApi>) -> Self {
        Self { azure }
    }
}

#[async_trait]
impl Step for CreateResourceGroup {
    fn name(&self) -> &str {
        STEP_CREATE_RESOURCE_GROUP
    }

    fn description(&self) -> &str {
        "Create the cluster resource group"
    }

    async fn run(
        &self,
        token: &CancelToken,
        out: &mut dyn ProgressSink,
        cfg: &mut ProvisionConfig,
    ) -> Result<(), StepError> {
        token.ensure_active()?;

        let name = resource_group_name(&cfg.cluster_name);
        out.append(&format!("creating resource group {} in {}", name, cfg.region))
            .await;
        self.azure.create_resource_group(&name, &cfg.region).await?;
        cfg.azure.resource_group = Some(name);
        Ok(())
    }

    async fn rollback(
        &self,
        _token: &CancelToken,
        out: &mut dyn ProgressSink,
        cfg: &mut ProvisionConfig,
    ) -> Result<(), StepError> {
        let Some(name) = cfg.azure.resource_group.take() else {
            return Ok(());
        };

        out.append(&format!("deleting resource group {}", name)).await;
        self.azure.delete_resource_group(&name).await?;
        Ok(())
    }
}

/// Creates the cluster virtual network inside the resource group.
pub struct CreateVirtualNetwork {
    azure: Arc<dyn AzureApi>,
}

impl CreateVirtualNetwork {
    pub fn new(azure: Arc<dyn AzureApi>) -> Self {
        Self { azure }
    }
}

#[async_trait]
impl Step for CreateVirtualNetwork {
    fn name(&self) -> &str {
        STEP_CREATE_VIRTUAL_NETWORK
    }

    fn description(&self) -> &str {
        "Create the cluster virtual network"
    }

    fn depends(&self) -> &[&str] {
        &[STEP_CREATE_RESOURCE_GROUP]
    }

    async fn run(
        &self,
        token: &CancelToken,
        out: &mut dyn ProgressSink,
        cfg: &mut ProvisionConfig,
    ) -> Result<(), StepError> {
        token.ensure_active()?;

        let group = cfg.azure.resource_group.clone().ok_or_else(|| {
            anyhow!(
                "resource group is not set; did {} run?",
                STEP_CREATE_RESOURCE_GROUP
            )
        })?;

        let name = vnet_name(&cfg.cluster_name);
        out.append(&format!(
            "creating virtual network {} ({})",
            name, cfg.azure.vnet_cidr
        ))
        .await;
        self.azure
            .create_virtual_network(&group, &name, &cfg.azure.vnet_cidr)
            .await?;
        cfg.azure.virtual_network = Some(name);
        Ok(())
    }

    async fn rollback(
        &self,
        _token: &CancelToken,
        out: &mut dyn ProgressSink,
        cfg: &mut ProvisionConfig,
    ) -> Result<(), StepError> {
        let Some(name) = cfg.azure.virtual_network.take() else {
            return Ok(());
        };
        let Some(group) = cfg.azure.resource_group.clone() else {
            return Ok(());
        };

        out.append(&format!("deleting virtual network {}", name)).await;
        self.azure.delete_virtual_network(&group, &name).await?;
        Ok(())
    }
}
