//! Terminal UI layer for the automobile sales dashboard.
//!
//! Provides themes, the header and share-bar components, chart and table
//! views, and the application event loop built on top of [`ratatui`].

pub mod app;
pub mod chart_view;
pub mod components;
pub mod table_view;
pub mod themes;

pub use autosales_core as core;
