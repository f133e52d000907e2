//! Step registry - name to singleton step instance

use crate::core::Step;
use std::collections::HashMap;
use std::sync::Arc;

/// Catalog of step instances keyed by their declared name.
///
/// Built once at startup, before any pipeline is resolved, and read-only
/// afterwards, so concurrent runs can look steps up without locking. This is
/// an explicit object rather than process-global state: tests construct a
/// fresh registry holding only fixture steps.
#[derive(Clone, Default)]
pub struct StepRegistry {
    steps: HashMap<String, Arc<dyn Step>>,
}

impl StepRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate `step.name()` with the instance.
    ///
    /// Re-registering a name overwrites silently - last write wins. This is
    /// the extension point provider packages use to install their steps.
    pub fn register(&mut self, step: Arc<dyn Step>) {
        self.steps.insert(step.name().to_string(), step);
    }

    /// Look a step up by name.
    ///
    /// `None` for a catalog-listed name signals a build defect (the step was
    /// never registered) and is fatal for the run, never retried.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Step>> {
        self.steps.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Registered step names, sorted for stable display.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.steps.keys().cloned().collect();
        names.sort();
        names
    }
}
