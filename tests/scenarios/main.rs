//! Scenario-based tests for the pipeline executor

mod helpers;

mod cancellation;
mod configuration;
mod ordering;
mod rollback;
