//! Runtime layer for the automobile sales statistics workspace.
//!
//! Owns the loaded dataset for the lifetime of a session, tracks the
//! selected report parameters and memoises the reports built for them.

pub mod report_session;

pub use autosales_core as core;
pub use autosales_data as data;
