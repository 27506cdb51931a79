//! Workflow integration tests

pub mod errors;
pub mod list_commit;
