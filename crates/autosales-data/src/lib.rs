//! Data layer for the automobile sales statistics workspace.
//!
//! Loads the sales CSV into an immutable dataset, provides the filtering and
//! grouping engine, and assembles the yearly and recession-period reports.

pub mod aggregator;
pub mod reader;
pub mod report;

pub use autosales_core as core;
