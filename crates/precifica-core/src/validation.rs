//! # Validation Module
//!
//! Input checks for the collaborators that build engine inputs.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Ingestion / config loader                                    │
//! │  ├── Deserialization (types, required fields)                          │
//! │  └── THIS MODULE: ranges, formats, collection sizes                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Pricing engine                                               │
//! │  ├── Division guards                                                   │
//! │  └── Infeasibility reported as PriceStatus, never as an error          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine accepts anything numerically; these checks exist so that a
//! typo in a form or config file is caught with a precise message instead
//! of silently producing an infeasible scenario.
//!
//! ## Usage
//! ```rust
//! use precifica_core::validation::{validate_cfop, validate_percentage};
//! use precifica_core::types::Percent;
//!
//! validate_cfop("5102").unwrap();
//! assert!(validate_percentage("loss_percentage", Percent::from_percentage(120.0)).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{GlobalParameters, LineItem, Percent};
use crate::MAX_LINE_ITEMS;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a rate in the 0-100 domain.
pub fn validate_percentage(field: &str, rate: Percent) -> ValidationResult<()> {
    let value = rate.percentage();
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0.0,
            max: 100.0,
            value,
        });
    }

    Ok(())
}

/// Validates a currency amount.
///
/// ## Rules
/// - Must be finite
/// - Must be non-negative (zero is allowed: free samples, no payroll)
pub fn validate_non_negative(field: &str, amount: Money) -> ValidationResult<()> {
    let value = amount.value();
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::MustBeNonNegative {
            field: field.to_string(),
            value,
        });
    }

    Ok(())
}

fn validate_count(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::MustBeNonNegative {
            field: field.to_string(),
            value,
        });
    }

    Ok(())
}

// =============================================================================
// Classification Codes
// =============================================================================

fn validate_digits(field: &str, code: &str, lengths: &[usize]) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if !code.chars().all(|c| c.is_ascii_digit()) || !lengths.contains(&code.len()) {
        let expected = lengths
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(" or ");
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: format!("must be {} digits", expected),
        });
    }

    Ok(())
}

/// Validates a CFOP (fiscal operation code): exactly four digits.
///
/// ## Example
/// ```rust
/// use precifica_core::validation::validate_cfop;
///
/// assert!(validate_cfop("5102").is_ok());
/// assert!(validate_cfop("510").is_err());
/// assert!(validate_cfop("51A2").is_err());
/// ```
pub fn validate_cfop(cfop: &str) -> ValidationResult<()> {
    validate_digits("cfop", cfop, &[4])
}

/// Validates a CST (two digits) or CSOSN (three digits).
pub fn validate_cst(cst: &str) -> ValidationResult<()> {
    validate_digits("cst", cst, &[2, 3])
}

// =============================================================================
// Record Validators
// =============================================================================

/// Validates one ingested line item.
pub fn validate_line_item(item: &LineItem) -> ValidationResult<()> {
    if item.code.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if item.name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    validate_non_negative("acquisition_cost", item.acquisition_cost)?;
    validate_count("commercial_quantity", item.commercial_quantity)?;
    validate_non_negative("pis_credit", item.pis_credit)?;
    validate_non_negative("cofins_credit", item.cofins_credit)?;
    validate_non_negative("icms_credit", item.icms_credit)?;
    validate_cfop(&item.cfop)?;
    validate_cst(&item.cst)?;

    Ok(())
}

/// Validates a parameter set.
///
/// The profit margin is only required to be finite and below 100%: a
/// negative margin is a legitimate "sell at a loss" what-if.
pub fn validate_parameters(params: &GlobalParameters) -> ValidationResult<()> {
    let margin = params.target_profit_margin.percentage();
    if !margin.is_finite() || margin >= 100.0 {
        return Err(ValidationError::OutOfRange {
            field: "target_profit_margin".to_string(),
            min: f64::NEG_INFINITY,
            max: 100.0,
            value: margin,
        });
    }

    for expense in &params.fixed_expenses {
        validate_non_negative(&format!("fixed_expenses.{}", expense.name), expense.amount)?;
    }
    for expense in &params.variable_expenses {
        validate_percentage(&format!("variable_expenses.{}", expense.name), expense.rate)?;
    }

    validate_non_negative("payroll", params.payroll)?;
    validate_count("total_stock_units", params.total_stock_units)?;
    validate_percentage("loss_percentage", params.loss_percentage)?;
    validate_percentage("simples_nacional_rate", params.simples_nacional_rate)?;
    validate_percentage(
        "simples_nacional_remanescente_rate",
        params.simples_nacional_remanescente_rate,
    )?;
    validate_percentage("irpj_rate", params.irpj_rate)?;
    validate_percentage("csll_rate", params.csll_rate)?;
    if let Some(rate) = params.lucro_real_irpj_rate {
        validate_percentage("lucro_real_irpj_rate", rate)?;
    }
    if let Some(rate) = params.lucro_real_csll_rate {
        validate_percentage("lucro_real_csll_rate", rate)?;
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the number of line items fed into one run.
///
/// ## Rules
/// - Must not exceed MAX_LINE_ITEMS (10 000)
pub fn validate_item_count(count: usize) -> ValidationResult<()> {
    if count > MAX_LINE_ITEMS {
        return Err(ValidationError::TooMany {
            field: "items".to_string(),
            max: MAX_LINE_ITEMS,
            count,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
