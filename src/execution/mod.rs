//! Pipeline resolution and execution
//!
//! The registry maps step names to singleton step instances, the catalog
//! fixes the per-provider provisioning order, and the executor runs a
//! resolved pipeline sequentially, compensating completed steps in reverse
//! order when a later step fails.

pub mod catalog;
pub mod executor;
pub mod pipeline;
pub mod registry;

pub use executor::{run_pipeline, Engine, ExecutionError, RollbackFailure};
pub use pipeline::Pipeline;
pub use registry::StepRegistry;
