//! CLI command implementations

pub mod analyze;
pub mod apply;
pub mod context;
pub mod insights;
pub mod mark;
pub mod prompt;
