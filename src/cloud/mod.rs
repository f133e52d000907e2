//! Cloud provider API seams
//!
//! Steps talk to the clouds through the traits in this module; production
//! implementations shell out to the official provider CLIs, tests substitute
//! mocks. The individual calls are plumbing - the provisioning order and
//! rollback logic live in the steps and the executor.

pub mod aws;
pub mod azure;

#[cfg(test)]
pub(crate) mod mock;

pub use aws::AwsCli;
pub use azure::AzureCli;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Error raised by a cloud API call.
#[derive(Debug, Error)]
pub enum CloudError {
    #[error("failed to spawn {0}")]
    Spawn(String),

    #[error("{program} exited with code {code}: {stderr}")]
    Command {
        program: String,
        code: i32,
        stderr: String,
    },

    #[error("cloud cli timed out after {0}s")]
    Timeout(u64),

    #[error("unexpected response: missing {0}")]
    MissingField(&'static str),

    #[error("failed to decode response")]
    Json(#[from] serde_json::Error),
}

/// AWS operations the pre-provision steps rely on.
#[async_trait]
pub trait AwsApi: Send + Sync {
    /// Resolve the newest AMI matching `name_filter` for `owner`.
    async fn find_image(
        &self,
        region: &str,
        owner: &str,
        name_filter: &str,
    ) -> Result<String, CloudError>;

    async fn create_vpc(&self, region: &str, cidr: &str, name: &str)
        -> Result<String, CloudError>;
    async fn delete_vpc(&self, region: &str, vpc_id: &str) -> Result<(), CloudError>;

    async fn create_security_group(
        &self,
        region: &str,
        vpc_id: &str,
        name: &str,
        description: &str,
    ) -> Result<String, CloudError>;
    async fn delete_security_group(&self, region: &str, group_id: &str) -> Result<(), CloudError>;

    async fn create_instance_profile(&self, name: &str) -> Result<(), CloudError>;
    async fn delete_instance_profile(&self, name: &str) -> Result<(), CloudError>;

    /// Import a public key; returns the key fingerprint.
    async fn import_key_pair(
        &self,
        region: &str,
        name: &str,
        public_key: &str,
    ) -> Result<String, CloudError>;
    async fn delete_key_pair(&self, region: &str, name: &str) -> Result<(), CloudError>;

    async fn create_internet_gateway(&self, region: &str) -> Result<String, CloudError>;
    async fn attach_internet_gateway(
        &self,
        region: &str,
        gateway_id: &str,
        vpc_id: &str,
    ) -> Result<(), CloudError>;
    async fn detach_internet_gateway(
        &self,
        region: &str,
        gateway_id: &str,
        vpc_id: &str,
    ) -> Result<(), CloudError>;
    async fn delete_internet_gateway(
        &self,
        region: &str,
        gateway_id: &str,
    ) -> Result<(), CloudError>;

    async fn availability_zones(&self, region: &str) -> Result<Vec<String>, CloudError>;
    async fn create_subnet(
        &self,
        region: &str,
        vpc_id: &str,
        zone: &str,
        cidr: &str,
    ) -> Result<String, CloudError>;
    async fn delete_subnet(&self, region: &str, subnet_id: &str) -> Result<(), CloudError>;

    async fn create_route_table(&self, region: &str, vpc_id: &str) -> Result<String, CloudError>;
    async fn create_route(
        &self,
        region: &str,
        route_table_id: &str,
        destination_cidr: &str,
        gateway_id: &str,
    ) -> Result<(), CloudError>;
    async fn delete_route_table(&self, region: &str, route_table_id: &str)
        -> Result<(), CloudError>;

    /// Associate a route table with a subnet; returns the association id.
    async fn associate_route_table(
        &self,
        region: &str,
        route_table_id: &str,
        subnet_id: &str,
    ) -> Result<String, CloudError>;
    async fn disassociate_route_table(
        &self,
        region: &str,
        association_id: &str,
    ) -> Result<(), CloudError>;
}

/// Azure operations the pre-provision steps rely on.
#[async_trait]
pub trait AzureApi: Send + Sync {
    async fn create_resource_group(&self, name: &str, location: &str) -> Result<(), CloudError>;
    async fn delete_resource_group(&self, name: &str) -> Result<(), CloudError>;

    async fn create_virtual_network(
        &self,
        resource_group: &str,
        name: &str,
        address_prefix: &str,
    ) -> Result<(), CloudError>;
    async fn delete_virtual_network(
        &self,
        resource_group: &str,
        name: &str,
    ) -> Result<(), CloudError>;
}

/// Shared handles to every provider's API client.
#[derive(Clone)]
pub struct CloudClients {
    pub aws: Arc<dyn AwsApi>,
    pub azure: Arc<dyn AzureApi>,
}

impl CloudClients {
    /// Clients backed by the official `aws` and `az` CLIs on PATH.
    pub fn from_cli(timeout_secs: u64) -> Self {
        Self {
            aws: Arc::new(AwsCli::new("aws", timeout_secs)),
            azure: Arc::new(AzureCli::new("az", timeout_secs)),
        }
    }
}

/// Walk a dot-separated path into a JSON value and return the string leaf.
pub(crate) fn json_str(
    value: &serde_json::Value,
    path: &'static str,
) -> Result<String, CloudError> {
    let mut current = value;
    for part in path.split('.') {
        current = match part.parse::<usize>() {
            Ok(index) => current.get(index),
            Err(_) => current.get(part),
        }
        .ok_or(CloudError::MissingField(path))?;
    }
    current
        .as_str()
        .map(str::to_string)
        .ok_or(CloudError::MissingField(path))
}
