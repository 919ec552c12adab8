//! Core domain types for the automobile sales statistics workspace.
//!
//! Holds the typed record and dataset model, the error taxonomy, CLI
//! settings and the display formatting helpers shared by the other crates.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;

pub use error::{Result, SalesError};
pub use models::{Dataset, Field, GroupKey, Month, Record, Schema};
