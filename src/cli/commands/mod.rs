//! CLI command implementations

pub mod copy;
