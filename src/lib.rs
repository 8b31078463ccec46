//! abap-assist - ABAP developer assistant
//!
//! Static pattern analysis of ABAP sources, document-backed prompt
//! assembly for an AI chat client, and SAP modification markers.

pub mod ai;
pub mod audit;
pub mod config;
pub mod core;
pub mod markers;
