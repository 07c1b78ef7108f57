//! # Error Types
//!
//! Domain-specific error types for precifica-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  precifica-core errors (this file)                                     │
//! │  ├── CoreError        - Parsing of domain values (regime names)        │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  CLI errors (apps/cli)                                                 │
//! │  └── CliError         - Config, input file and report failures         │
//! │                                                                         │
//! │  NOT AN ERROR: an infeasible price. The pricing engine always returns  │
//! │  a value and reports infeasibility through `PriceStatus`.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
///
/// None of these can be raised by pricing, aggregation or comparison;
/// they come from the helpers collaborators use to build engine inputs.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A tax regime name could not be parsed.
    #[error("Unknown tax regime: '{0}'. Valid options: simples_nacional_standard, simples_nacional_hybrid, lucro_presumido, lucro_real")]
    UnknownRegime(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised by [`crate::validation`] before the engine runs, so that a
/// misconfigured form or config file is rejected with a precise message
/// instead of silently producing an infeasible scenario.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },

    /// Value must not be negative.
    #[error("{field} must not be negative, got {value}")]
    MustBeNonNegative { field: String, value: f64 },

    /// Invalid format (e.g., a CFOP that is not four digits).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Collection exceeds its allowed size.
    #[error("{field} cannot have more than {max} entries, got {count}")]
    TooMany {
        field: String,
        max: usize,
        count: usize,
    },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
