//! Resolved pipeline value

use crate::core::Step;
use crate::execution::{ExecutionError, StepRegistry};
use std::sync::Arc;

/// An ordered sequence of resolved steps for one stage.
///
/// Immutable once resolved; cheap to recompute from the catalog on every
/// run, so nothing caches it. The executor runs a `Pipeline` the same way at
/// the top level and inside composite steps.
#[derive(Clone)]
pub struct Pipeline {
    stage: String,
    steps: Vec<Arc<dyn Step>>,
}

impl Pipeline {
    /// Resolve an ordered list of step names against the registry.
    ///
    /// A name missing from the registry is a fatal configuration error for
    /// the whole run: no step executes.
    pub fn resolve(
        stage: impl Into<String>,
        names: &[&str],
        registry: &StepRegistry,
    ) -> Result<Self, ExecutionError> {
        let stage = stage.into();
        let mut steps = Vec::with_capacity(names.len());
        for name in names {
            let step = registry
                .get(name)
                .ok_or_else(|| ExecutionError::StepNotRegistered {
                    stage: stage.clone(),
                    name: name.to_string(),
                })?;
            steps.push(step);
        }
        Ok(Self { stage, steps })
    }

    pub fn stage(&self) -> &str {
        &self.stage
    }

    pub fn steps(&self) -> &[Arc<dyn Step>] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stage", &self.stage)
            .field(
                "steps",
                &self.steps.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
