//! kubeforge - provision Kubernetes clusters with reversible step pipelines

pub mod cli;
pub mod cloud;
pub mod core;
pub mod execution;
pub mod persistence;
pub mod steps;

// Re-export commonly used types
pub use crate::cloud::{AwsApi, AzureApi, CloudClients, CloudError};
pub use crate::core::{
    CancelToken, Cluster, ClusterState, MemorySink, ProgressSink, Provider, ProvisionConfig, Step,
    StepError,
};
pub use crate::execution::{Engine, ExecutionError, Pipeline, RollbackFailure, StepRegistry};
