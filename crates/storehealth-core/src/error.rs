//! Error types for storehealth

use thiserror::Error;

/// Result type alias using HealthError
pub type Result<T> = std::result::Result<T, HealthError>;

/// Error type alias for convenience
pub type Error = HealthError;

/// Exit codes for CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const NOT_FOUND: i32 = 2;
    pub const INVALID_INPUT: i32 = 3;
}

/// Main error type for storehealth
#[derive(Debug, Error)]
pub enum HealthError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid cleanup type: {0}")]
    InvalidCategory(String),

    #[error("No scan data available")]
    ScanNotFound,

    #[error("Cleanup failed: {0}")]
    Cleanup(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl HealthError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ScanNotFound => exit_codes::NOT_FOUND,
            Self::InvalidCategory(_) | Self::InvalidInput(_) | Self::Config(_) => {
                exit_codes::INVALID_INPUT
            }
            _ => exit_codes::GENERAL_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(HealthError::ScanNotFound.exit_code(), exit_codes::NOT_FOUND);
        assert_eq!(
            HealthError::InvalidCategory("bogus".into()).exit_code(),
            exit_codes::INVALID_INPUT
        );
        assert_eq!(
            HealthError::Cleanup("boom".into()).exit_code(),
            exit_codes::GENERAL_ERROR
        );
    }

    #[test]
    fn test_database_error_conversion() {
        let err: HealthError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(err.to_string().starts_with("Database error"));
    }
}
