//! Terminal UI helpers

pub mod theme;

pub use theme::AssistTheme;
