//! Command implementations.

pub mod build;
pub mod fetch;
pub mod list;
