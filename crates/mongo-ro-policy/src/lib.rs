//! mongo-ro Policy Enforcement
//!
//! Static checks applied to a tool call before anything touches the
//! database. There is one policy today: aggregation pipelines must not
//! contain write-capable stages.
//!
//! The check is structural. It looks at the top-level operator key of each
//! stage and never executes or rewrites the pipeline.

pub mod error;
pub mod read_only;

pub use error::PolicyViolation;
pub use read_only::{Pipeline, ReadOnlyPolicy, Stage, WRITE_STAGES};
