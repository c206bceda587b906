//! Policy violation type.

use thiserror::Error;

/// A pipeline stage was refused by the read-only policy.
///
/// This is a normal outcome of a tool call, not a fault: callers turn it
/// into a refusal response rather than propagating it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Write operation \"{operator}\" is not allowed. This server operates in read-only mode.")]
pub struct PolicyViolation {
    /// The disallowed stage operator, e.g. `$out`.
    pub operator: String,
    /// Position of the offending stage in the pipeline.
    pub stage_index: usize,
}

impl PolicyViolation {
    pub fn write_stage(operator: impl Into<String>, stage_index: usize) -> Self {
        Self {
            operator: operator.into(),
            stage_index,
        }
    }
}
