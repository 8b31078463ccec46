//! Core analysis engine

pub mod analysis;
pub mod analyzer;
pub mod cache;
pub mod insights;
pub mod model;
