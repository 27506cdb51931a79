//! CLI command implementations

pub mod commit;
pub mod example;
pub mod list;
pub mod show;
