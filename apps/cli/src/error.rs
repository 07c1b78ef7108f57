//! # CLI Error Types
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        CLI Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │     Input       │  │       Output            │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │ ConfigLoadFailed│  │ InputLoadFailed │  │  Serialization          │ │
//! │  │ InvalidConfig   │  │ Core (validation│  │                         │ │
//! │  │                 │  │   / regime name)│  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  Usage - bad command line, exit code 2                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use precifica_core::{CoreError, ValidationError};
use thiserror::Error;

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Failed to read or parse the config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Config parsed but holds unusable values.
    #[error("Invalid pricing configuration: {0}")]
    InvalidConfig(String),

    // =========================================================================
    // Input / Output Errors
    // =========================================================================
    /// Failed to read or parse the line items file.
    #[error("Failed to load items: {0}")]
    InputLoadFailed(String),

    /// Failed to write the JSON report.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Domain error (validation, unknown regime).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Bad command line.
    #[error("{0}")]
    Usage(String),
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for CliError {
    fn from(err: toml::de::Error) -> Self {
        CliError::ConfigLoadFailed(err.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Serialization(err.to_string())
    }
}

impl From<ValidationError> for CliError {
    fn from(err: ValidationError) -> Self {
        CliError::Core(CoreError::Validation(err))
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl CliError {
    /// Returns true if the error is a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            CliError::ConfigLoadFailed(_) | CliError::InvalidConfig(_)
        )
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Usage(_) => 2,
            CliError::ConfigLoadFailed(_) | CliError::InvalidConfig(_) => 3,
            CliError::InputLoadFailed(_) | CliError::Core(_) => 4,
            CliError::Serialization(_) => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_wraps_into_core() {
        let err: CliError = ValidationError::Required {
            field: "code".to_string(),
        }
        .into();
        assert!(matches!(err, CliError::Core(CoreError::Validation(_))));
        assert_eq!(err.to_string(), "Validation error: code is required");
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_config_categorization() {
        assert!(CliError::InvalidConfig("x".into()).is_config_error());
        assert!(CliError::ConfigLoadFailed("x".into()).is_config_error());
        assert!(!CliError::Usage("x".into()).is_config_error());
        assert_eq!(CliError::Usage("x".into()).exit_code(), 2);
    }

    #[test]
    fn test_toml_error_is_config_load_failure() {
        let err: CliError = toml::from_str::<toml::Value>("[pricing").unwrap_err().into();
        assert!(err.is_config_error());
    }
}
