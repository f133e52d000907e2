//! AWS client backed by the `aws` CLI

use crate::cloud::{json_str, AwsApi, CloudError};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Client that shells out to the official `aws` CLI with `--output json`.
#[derive(Debug, Clone)]
pub struct AwsCli {
    /// Path to the aws executable
    bin: String,

    /// Timeout for a single CLI invocation in seconds
    timeout_secs: u64,
}

impl AwsCli {
    pub fn new(bin: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            bin: bin.into(),
            timeout_secs,
        }
    }

    /// Invoke the CLI and parse stdout as JSON.
    ///
    /// # Errors
    /// Returns `CloudError` if:
    /// - the executable cannot be spawned
    /// - the CLI exits with a non-zero status
    /// - the output is not valid JSON
    /// - the invocation times out
    async fn run(&self, args: &[&str]) -> Result<Value, CloudError> {
        debug!(args = ?args, "invoking aws cli");

        let result = timeout(
            Duration::from_secs(self.timeout_secs),
            Command::new(&self.bin)
                .args(args)
                .args(["--output", "json"])
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| CloudError::Timeout(self.timeout_secs))?;

        let output =
            result.map_err(|e| CloudError::Spawn(format!("{}: {}", self.bin, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let code = output.status.code().unwrap_or(-1);
            warn!("aws exited with code {}: {}", code, stderr.trim());
            return Err(CloudError::Command {
                program: self.bin.clone(),
                code,
                stderr: stderr.trim().to_string(),
            });
        }

        // Mutating calls like delete-vpc print nothing on success.
        if output.stdout.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_slice(&output.stdout)?)
    }
}

#[async_trait]
impl AwsApi for AwsCli {
    async fn find_image(
        &self,
        region: &str,
        owner: &str,
        name_filter: &str,
    ) -> Result<String, CloudError> {
        let filter = format!("Name=name,Values={}", name_filter);
        let value = self
            .run(&[
                "ec2",
                "describe-images",
                "--region",
                region,
                "--owners",
                owner,
                "--filters",
                &filter,
                "Name=state,Values=available",
                "--query",
                "sort_by(Images,&CreationDate)[-1]",
            ])
            .await?;
        json_str(&value, "ImageId")
    }

    async fn create_vpc(
        &self,
        region: &str,
        cidr: &str,
        name: &str,
    ) -> Result<String, CloudError> {
        let tags = format!("ResourceType=vpc,Tags=[{{Key=Name,Value={}}}]", name);
        let value = self
            .run(&[
                "ec2",
                "create-vpc",
                "--region",
                region,
                "--cidr-block",
                cidr,
                "--tag-specifications",
                &tags,
            ])
            .await?;
        json_str(&value, "Vpc.VpcId")
    }

    async fn delete_vpc(&self, region: &str, vpc_id: &str) -> Result<(), CloudError> {
        self.run(&["ec2", "delete-vpc", "--region", region, "--vpc-id", vpc_id])
            .await?;
        Ok(())
    }

    async fn create_security_group(
        &self,
        region: &str,
        vpc_id: &str,
        name: &str,
        description: &str,
    ) -> Result<String, CloudError> {
        let value = self
            .run(&[
                "ec2",
                "create-security-group",
                "--region",
                region,
                "--vpc-id",
                vpc_id,
                "--group-name",
                name,
                "--description",
                description,
            ])
            .await?;
        json_str(&value, "GroupId")
    }

    async fn delete_security_group(&self, region: &str, group_id: &str) -> Result<(), CloudError> {
        self.run(&[
            "ec2",
            "delete-security-group",
            "--region",
            region,
            "--group-id",
            group_id,
        ])
        .await?;
        Ok(())
    }

    async fn create_instance_profile(&self, name: &str) -> Result<(), CloudError> {
        self.run(&["iam", "create-instance-profile", "--instance-profile-name", name])
            .await?;
        Ok(())
    }

    async fn delete_instance_profile(&self, name: &str) -> Result<(), CloudError> {
        self.run(&["iam", "delete-instance-profile", "--instance-profile-name", name])
            .await?;
        Ok(())
    }

    async fn import_key_pair(
        &self,
        region: &str,
        name: &str,
        public_key: &str,
    ) -> Result<String, CloudError> {
        let value = self
            .run(&[
                "ec2",
                "import-key-pair",
                "--region",
                region,
                "--key-name",
                name,
                "--public-key-material",
                public_key,
            ])
            .await?;
        json_str(&value, "KeyFingerprint")
    }

    async fn delete_key_pair(&self, region: &str, name: &str) -> Result<(), CloudError> {
        self.run(&["ec2", "delete-key-pair", "--region", region, "--key-name", name])
            .await?;
        Ok(())
    }

    async fn create_internet_gateway(&self, region: &str) -> Result<String, CloudError> {
        let value = self
            .run(&["ec2", "create-internet-gateway", "--region", region])
            .await?;
        json_str(&value, "InternetGateway.InternetGatewayId")
    }

    async fn attach_internet_gateway(
        &self,
        region: &str,
        gateway_id: &str,
        vpc_id: &str,
    ) -> Result<(), CloudError> {
        self.run(&[
            "ec2",
            "attach-internet-gateway",
            "--region",
            region,
            "--internet-gateway-id",
            gateway_id,
            "--vpc-id",
            vpc_id,
        ])
        .await?;
        Ok(())
    }

    async fn detach_internet_gateway(
        &self,
        region: &str,
        gateway_id: &str,
        vpc_id: &str,
    ) -> Result<(), CloudError> {
        self.run(&[
            "ec2",
            "detach-internet-gateway",
            "--region",
            region,
            "--internet-gateway-id",
            gateway_id,
            "--vpc-id",
            vpc_id,
        ])
        .await?;
        Ok(())
    }

    async fn delete_internet_gateway(
        &self,
        region: &str,
        gateway_id: &str,
    ) -> Result<(), CloudError> {
        self.run(&[
            "ec2",
            "delete-internet-gateway",
            "--region",
            region,
            "--internet-gateway-id",
            gateway_id,
        ])
        .await?;
        Ok(())
    }

    async fn availability_zones(&self, region: &str) -> Result<Vec<String>, CloudError> {
        let value = self
            .run(&[
                "ec2",
                "describe-availability-zones",
                "--region",
                region,
                "--filters",
                "Name=state,Values=available",
            ])
            .await?;

        let zones = value
            .get("AvailabilityZones")
            .and_then(Value::as_array)
            .ok_or(CloudError::MissingField("AvailabilityZones"))?;

        zones
            .iter()
            .map(|zone| json_str(zone, "ZoneName"))
            .collect()
    }

    async fn create_subnet(
        &self,
        region: &str,
        vpc_id: &str,
        zone: &str,
        cidr: &str,
    ) -> Result<String, CloudError> {
        let value = self
            .run(&[
                "ec2",
                "create-subnet",
                "--region",
                region,
                "--vpc-id",
                vpc_id,
                "--availability-zone",
                zone,
                "--cidr-block",
                cidr,
            ])
            .await?;
        json_str(&value, "Subnet.SubnetId")
    }

    async fn delete_subnet(&self, region: &str, subnet_id: &str) -> Result<(), CloudError> {
        self.run(&[
            "ec2",
            "delete-subnet",
            "--region",
            region,
            "--subnet-id",
            subnet_id,
        ])
        .await?;
        Ok(())
    }

    async fn create_route_table(&self, region: &str, vpc_id: &str) -> Result<String, CloudError> {
        let value = self
            .run(&[
                "ec2",
                "create-route-table",
                "--region",
                region,
                "--vpc-id",
                vpc_id,
            ])
            .await?;
        json_str(&value, "RouteTable.RouteTableId")
    }

    async fn create_route(
        &self,
        region: &str,
        route_table_id: &str,
        destination_cidr: &str,
        gateway_id: &str,
    ) -> Result<(), CloudError> {
        self.run(&[
            "ec2",
            "create-route",
            "--region",
            region,
            "--route-table-id",
            route_table_id,
            "--destination-cidr-block",
            destination_cidr,
            "--gateway-id",
            gateway_id,
        ])
        .await?;
        Ok(())
    }

    async fn delete_route_table(
        &self,
        region: &str,
        route_table_id: &str,
    ) -> Result<(), CloudError> {
        self.run(&[
            "ec2",
            "delete-route-table",
            "--region",
            region,
            "--route-table-id",
            route_table_id,
        ])
        .await?;
        Ok(())
    }

    async fn associate_route_table(
        &self,
        region: &str,
        route_table_id: &str,
        subnet_id: &str,
    ) -> Result<String, CloudError> {
        let value = self
            .run(&[
                "ec2",
                "associate-route-table",
                "--region",
                region,
                "--route-table-id",
                route_table_id,
                "--subnet-id",
                subnet_id,
            ])
            .await?;
        json_str(&value, "AssociationId")
    }

    async fn disassociate_route_table(
        &self,
        region: &str,
        association_id: &str,
    ) -> Result<(), CloudError> {
        self.run(&[
            "ec2",
            "disassociate-route-table",
            "--region",
            region,
            "--association-id",
            association_id,
        ])
        .await?;
        Ok(())
    }
}
