use std::path::PathBuf;
use thiserror::Error;

use crate::models::Field;

/// All errors produced by the automobile sales statistics crates.
#[derive(Error, Debug)]
pub enum SalesError {
    /// A key or measure referenced a field the dataset cannot provide.
    #[error("Schema mismatch: field '{field}' {reason}")]
    SchemaMismatch { field: Field, reason: &'static str },

    /// A grouping was requested without any key field.
    #[error("Aggregation requires at least one key field")]
    NoGroupingKey,

    /// The dataset file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV reader rejected the input.
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A cell could not be converted to the column's type.
    #[error("Invalid value {value:?} for column {column} on line {line}")]
    InvalidValue {
        line: u64,
        column: String,
        value: String,
    },

    /// A report could not be encoded as JSON.
    #[error("Failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SalesError {
    /// The field is not a column of the loaded dataset.
    pub fn missing_field(field: Field) -> Self {
        SalesError::SchemaMismatch {
            field,
            reason: "is not present in the dataset",
        }
    }

    /// The field exists but cannot be reduced numerically.
    pub fn not_a_measure(field: Field) -> Self {
        SalesError::SchemaMismatch {
            field,
            reason: "is not a numeric measure",
        }
    }
}

/// Convenience alias used throughout the autosales crates.
pub type Result<T> = std::result::Result<T, SalesError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_schema_mismatch() {
        let err = SalesError::missing_field(Field::UnemploymentRate);
        assert_eq!(
            err.to_string(),
            "Schema mismatch: field 'unemployment_rate' is not present in the dataset"
        );
    }

    #[test]
    fn test_error_display_not_a_measure() {
        let err = SalesError::not_a_measure(Field::VehicleType);
        assert_eq!(
            err.to_string(),
            "Schema mismatch: field 'Vehicle_Type' is not a numeric measure"
        );
    }

    #[test]
    fn test_error_display_no_grouping_key() {
        assert_eq!(
            SalesError::NoGroupingKey.to_string(),
            "Aggregation requires at least one key field"
        );
    }

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = SalesError::FileRead {
            path: PathBuf::from("/data/sales.csv"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/data/sales.csv"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_invalid_value() {
        let err = SalesError::InvalidValue {
            line: 7,
            column: "Year".to_string(),
            value: "19x0".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid value \"19x0\" for column Year on line 7"
        );
    }

    #[test]
    fn test_error_display_config() {
        let err = SalesError::Config("--year requires --mode yearly".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: --year requires --mode yearly"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: SalesError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }
}
