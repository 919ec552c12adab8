use clap::Parser;
use std::path::PathBuf;

use crate::error::{Result, SalesError};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Yearly and recession-period statistics for historical automobile sales
#[derive(Parser, Debug, Clone)]
#[command(
    name = "autosales",
    about = "Yearly and recession-period statistics for historical automobile sales",
    version
)]
pub struct Settings {
    /// Path to the historical automobile sales CSV
    #[arg(long, default_value = "historical_automobile_sales.csv")]
    pub data: PathBuf,

    /// Report type
    #[arg(long, default_value = "yearly", value_parser = ["yearly", "recession"])]
    pub mode: String,

    /// Year for the yearly report (defaults to the first year in the data)
    #[arg(long)]
    pub year: Option<i32>,

    /// Output format
    #[arg(long, default_value = "tui", value_parser = ["tui", "text", "json"])]
    pub output: String,

    /// Display theme
    #[arg(long, default_value = "auto", value_parser = ["light", "dark", "classic", "auto"])]
    pub theme: String,

    /// Start with the raw data panel visible
    #[arg(long)]
    pub show_raw: bool,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Settings {
    /// Parse the process arguments and apply [`Settings::resolve`].
    pub fn load() -> Result<Self> {
        Self::load_from_args(std::env::args_os())
    }

    /// Same as [`Settings::load`] over an explicit argument list.
    pub fn load_from_args<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Settings::parse_from(args).resolve()
    }

    /// Validate option combinations and apply the `--debug` override.
    pub fn resolve(mut self) -> Result<Self> {
        if self.mode == "recession" && self.year.is_some() {
            return Err(SalesError::Config(
                "--year only applies to --mode yearly".to_string(),
            ));
        }

        if self.debug {
            self.log_level = "DEBUG".to_string();
        }

        Ok(self)
    }

    /// `true` when the terminal dashboard should run.
    pub fn is_interactive(&self) -> bool {
        self.output == "tui"
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
