//! Reusable line-level widgets for the dashboard.

pub mod header;
pub mod share_bar;
