//! Mock cloud clients for deterministic, fast unit tests

use crate::cloud::{AwsApi, AzureApi, CloudError};
use async_trait::async_trait;
use std::sync::Mutex;

fn command_error(op: &str) -> CloudError {
    CloudError::Command {
        program: "mock".to_string(),
        code: 255,
        stderr: format!("injected failure in {}", op),
    }
}

/// Records every call and returns canned resource ids.
#[derive(Debug, Default)]
pub struct MockAws {
    calls: Mutex<Vec<String>>,
    fail_on: Option<&'static str>,
    zones: Vec<String>,
}

impl MockAws {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_on: None,
            zones: vec!["us-east-1a".to_string(), "us-east-1b".to_string()],
        }
    }

    /// Fail any call whose record starts with `op`.
    pub fn failing_on(op: &'static str) -> Self {
        Self {
            fail_on: Some(op),
            ..Self::new()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<(), CloudError> {
        self.calls.lock().unwrap().push(call.clone());
        match self.fail_on {
            Some(op) if call.starts_with(op) => Err(command_error(op)),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl AwsApi for MockAws {
    async fn find_image(
        &self,
        region: &str,
        owner: &str,
        name_filter: &str,
    ) -> Result<String, CloudError> {
        self.record(format!("find_image:{}:{}:{}", region, owner, name_filter))?;
        Ok("ami-0f00f00".to_string())
    }

    async fn create_vpc(
        &self,
        region: &str,
        cidr: &str,
        name: &str,
    ) -> Result<String, CloudError> {
        self.record(format!("create_vpc:{}:{}:{}", region, cidr, name))?;
        Ok("vpc-01234".to_string())
    }

    async fn delete_vpc(&self, region: &str, vpc_id: &str) -> Result<(), CloudError> {
        self.record(format!("delete_vpc:{}:{}", region, vpc_id))
    }

    async fn create_security_group(
        &self,
        region: &str,
        vpc_id: &str,
        name: &str,
        _description: &str,
    ) -> Result<String, CloudError> {
        self.record(format!("create_security_group:{}:{}:{}", region, vpc_id, name))?;
        Ok(format!("sg-{}", name))
    }

    async fn delete_security_group(&self, region: &str, group_id: &str) -> Result<(), CloudError> {
        self.record(format!("delete_security_group:{}:{}", region, group_id))
    }

    async fn create_instance_profile(&self, name: &str) -> Result<(), CloudError> {
        self.record(format!("create_instance_profile:{}", name))
    }

    async fn delete_instance_profile(&self, name: &str) -> Result<(), CloudError> {
        self.record(format!("delete_instance_profile:{}", name))
    }

    async fn import_key_pair(
        &self,
        region: &str,
        name: &str,
        _public_key: &str,
    ) -> Result<String, CloudError> {
        self.record(format!("import_key_pair:{}:{}", region, name))?;
        Ok("aa:bb:cc:dd".to_string())
    }

    async fn delete_key_pair(&self, region: &str, name: &str) -> Result<(), CloudError> {
        self.record(format!("delete_key_pair:{}:{}", region, name))
    }

    async fn create_internet_gateway(&self, region: &str) -> Result<String, CloudError> {
        self.record(format!("create_internet_gateway:{}", region))?;
        Ok("igw-01234".to_string())
    }

    async fn attach_internet_gateway(
        &self,
        region: &str,
        gateway_id: &str,
        vpc_id: &str,
    ) -> Result<(), CloudError> {
        self.record(format!(
            "attach_internet_gateway:{}:{}:{}",
            region, gateway_id, vpc_id
        ))
    }

    async fn detach_internet_gateway(
        &self,
        region: &str,
        gateway_id: &str,
        vpc_id: &str,
    ) -> Result<(), CloudError> {
        self.record(format!(
            "detach_internet_gateway:{}:{}:{}",
            region, gateway_id, vpc_id
        ))
    }

    async fn delete_internet_gateway(
        &self,
        region: &str,
        gateway_id: &str,
    ) -> Result<(), CloudError> {
        self.record(format!("delete_internet_gateway:{}:{}", region, gateway_id))
    }

    async fn availability_zones(&self, region: &str) -> Result<Vec<String>, CloudError> {
        self.record(format!("availability_zones:{}", region))?;
        Ok(self.zones.clone())
    }

    async fn create_subnet(
        &self,
        region: &str,
        vpc_id: &str,
        zone: &str,
        cidr: &str,
    ) -> Result<String, CloudError> {
        self.record(format!("create_subnet:{}:{}:{}:{}", region, vpc_id, zone, cidr))?;
        Ok(format!("subnet-{}", zone))
    }

    async fn delete_subnet(&self, region: &str, subnet_id: &str) -> Result<(), CloudError> {
        self.record(format!("delete_subnet:{}:{}", region, subnet_id))
    }

    async fn create_route_table(&self, region: &str, vpc_id: &str) -> Result<String, CloudError> {
        self.record(format!("create_route_table:{}:{}", region, vpc_id))?;
        Ok("rtb-01234".to_string())
    }

    async fn create_route(
        &self,
        region: &str,
        route_table_id: &str,
        destination_cidr: &str,
        gateway_id: &str,
    ) -> Result<(), CloudError> {
        self.record(format!(
            "create_route:{}:{}:{}:{}",
            region, route_table_id, destination_cidr, gateway_id
        ))
    }

    async fn delete_route_table(
        &self,
        region: &str,
        route_table_id: &str,
    ) -> Result<(), CloudError> {
        self.record(format!("delete_route_table:{}:{}", region, route_table_id))
    }

    async fn associate_route_table(
        &self,
        region: &str,
        route_table_id: &str,
        subnet_id: &str,
    ) -> Result<String, CloudError> {
        self.record(format!(
            "associate_route_table:{}:{}:{}",
            region, route_table_id, subnet_id
        ))?;
        Ok(format!("rtbassoc-{}", subnet_id))
    }

    async fn disassociate_route_table(
        &self,
        region: &str,
        association_id: &str,
    ) -> Result<(), CloudError> {
        self.record(format!(
            "disassociate_route_table:{}:{}",
            region, association_id
        ))
    }
}

/// Azure counterpart of [`MockAws`].
#[derive(Debug, Default)]
pub struct MockAzure {
    calls: Mutex<Vec<String>>,
    fail_on: Option<&'static str>,
}

impl MockAzure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(op: &'static str) -> Self {
        Self {
            fail_on: Some(op),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<(), CloudError> {
        self.calls.lock().unwrap().push(call.clone());
        match self.fail_on {
            Some(op) if call.starts_with(op) => Err(command_error(op)),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl AzureApi for MockAzure {
    async fn create_resource_group(&self, name: &str, location: &str) -> Result<(), CloudError> {
        self.record(format!("create_resource_group:{}:{}", name, location))
    }

    async fn delete_resource_group(&self, name: &str) -> Result<(), CloudError> {
        self.record(format!("delete_resource_group:{}", name))
    }

    async fn create_virtual_network(
        &self,
        resource_group: &str,
        name: &str,
        address_prefix: &str,
    ) -> Result<(), CloudError> {
        self.record(format!(
            "create_virtual_network:{}:{}:{}",
            resource_group, name, address_prefix
        ))
    }

    async fn delete_virtual_network(
        &self,
        resource_group: &str,
        name: &str,
    ) -> Result<(), CloudError> {
        self.record(format!("delete_virtual_network:{}:{}", resource_group, name))
    }
}
