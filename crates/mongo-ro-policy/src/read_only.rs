//! The read-only pipeline guard.
//!
//! This is a deny-list, not an allow-list: any stage operator outside
//! [`WRITE_STAGES`] passes, including operators this crate has never heard of.

use crate::error::PolicyViolation;
use serde_json::{Map, Value};

/// One aggregation stage, keyed by its operator (e.g. `{"$match": {...}}`).
pub type Stage = Map<String, Value>;

/// An ordered sequence of stages.
pub type Pipeline = Vec<Stage>;

/// Stage operators that write to a collection.
pub const WRITE_STAGES: [&str; 2] = ["$out", "$merge"];

/// Guard that refuses pipelines containing write stages.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOnlyPolicy;

impl ReadOnlyPolicy {
    pub fn new() -> Self {
        Self
    }

    /// Check a pipeline before it is sent anywhere.
    ///
    /// Returns the first offending stage, scanning stages in order and keys
    /// within a stage in the order they were received.
    pub fn check(&self, pipeline: &[Stage]) -> Result<(), PolicyViolation> {
        for (index, stage) in pipeline.iter().enumerate() {
            if let Some(operator) = stage.keys().find(|key| self.is_denied(key)) {
                tracing::debug!(
                    operator = %operator,
                    stage_index = index,
                    "Pipeline refused by read-only policy"
                );
                return Err(PolicyViolation::write_stage(operator.as_str(), index));
            }
        }
        Ok(())
    }

    /// Check whether a single operator name is on the deny-list.
    pub fn is_denied(&self, operator: &str) -> bool {
        WRITE_STAGES.contains(&operator)
    }
}
