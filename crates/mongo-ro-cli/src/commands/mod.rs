//! CLI command implementations for mongo-ro.

pub mod serve;
pub mod tools;
