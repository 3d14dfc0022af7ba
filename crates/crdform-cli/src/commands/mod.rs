//! CLI commands

pub mod resources;
pub mod schema;
pub mod manifest;

// Commands that talk to the cluster
pub mod apply;
pub mod read;
pub mod delete;
pub mod import;
