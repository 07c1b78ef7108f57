//! # precifica-core: Pricing and Tax Logic for Precifica
//!
//! This crate is the **heart** of Precifica. It turns invoice line items and
//! a parameter set into selling prices, tax breakdowns and portfolio
//! summaries, and ranks tax regimes by net profit. No I/O happens here.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Precifica Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │           Collaborators (apps/cli, presentation)                │   │
//! │  │    invoice ingestion, config loader, tables & cards             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ LineItem, GlobalParameters             │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ precifica-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌─────────────┐  ┌──────────┐  │   │
//! │  │   │  regime   │─►│  pricing  │─►│ aggregation │─►│comparison│  │   │
//! │  │   │  factors  │  │ per item  │  │  portfolio  │  │ per regime│ │   │
//! │  │   └───────────┘  └───────────┘  └─────────────┘  └──────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO GLOBAL STATE • INFEASIBILITY IS DATA              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │                                ▼                                        │
//! │            CalculatedItem, GlobalSummary, RegimeComparison              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (LineItem, GlobalParameters, TaxRegime, Percent)
//! - [`money`] - Money type for amounts in reais
//! - [`regime`] - Regime-specific markup terms
//! - [`pricing`] - Per-item selling price and tax breakdown
//! - [`aggregation`] - Portfolio summary and break-even revenue
//! - [`comparison`] - Regime ranking by net profit
//! - [`scenario`] - Caller-owned items + parameters context
//! - [`validation`] - Input checks for collaborators
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input, same output, safe to run in parallel
//! 2. **No I/O**: file system, network and environment access are FORBIDDEN here
//! 3. **Total Engine**: pricing never fails; an impossible price is a
//!    `PriceStatus::PriceInfeasible` result, not an error
//! 4. **Typed Rates**: user rates are `Percent` (0-100), the CBS/IBS
//!    constants are plain fractions
//!
//! ## Example Usage
//!
//! ```rust
//! use precifica_core::{price, GlobalParameters, LineItem, Money, Percent};
//!
//! let item = LineItem::new("7891", "Arroz 1kg", Money::from_reais(10.0), 100.0)
//!     .with_credits(Money::from_reais(0.5), Money::from_reais(0.3), Money::from_reais(1.0));
//! let params = GlobalParameters {
//!     target_profit_margin: Percent::from_percentage(9.5),
//!     ..GlobalParameters::default()
//! };
//!
//! // Lucro Presumido, CFU of R$ 2.00
//! let result = price(&item, &params, Money::from_reais(2.0));
//! assert_eq!(result.selling_price.round_cents().value(), 19.44);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod aggregation;
pub mod comparison;
pub mod error;
pub mod money;
pub mod pricing;
pub mod regime;
pub mod scenario;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use precifica_core::Money` instead of
// `use precifica_core::money::Money`

pub use aggregation::{summarize, summarize_items, GlobalSummary};
pub use comparison::{compare, compare_minimum_viable, RegimeComparison, RegimeScenario};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::{
    fixed_cost_per_unit, loss_adjusted_cost, price, price_all, CalculatedItem, InnerUnitFigures,
    PriceComposition, TaxLines,
};
pub use regime::{regime_factors, RegimeFactors};
pub use scenario::Scenario;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// CBS rate as a fraction (8.8%).
///
/// Not configurable: the rate is fixed by law and applies identically in
/// every regime that debits CBS.
pub const CBS_RATE: f64 = 0.088;

/// IBS rate as a fraction (17.7%).
pub const IBS_RATE: f64 = 0.177;

/// Smallest markup divisor treated as positive.
///
/// ## Why not zero?
/// Summing rates in floating point leaves residue: 100% of charges can
/// come out as a divisor of 1e-17 instead of 0, which would price an item
/// at quadrillions of reais. Anything at or below this bound is
/// infeasible; 99.9999% (divisor 1e-6) still prices normally.
pub const MIN_MARKUP_DIVISOR: f64 = 1e-9;

/// Maximum line items accepted in one run.
pub const MAX_LINE_ITEMS: usize = 10_000;

/// Maximum invoice documents the ingestion layer accepts per upload.
pub const MAX_SOURCE_DOCUMENTS: usize = 100;

/// CFOP assumed when an invoice line carries none (in-state resale).
pub const DEFAULT_CFOP: &str = "5102";

/// CST/CSOSN assumed when an invoice line carries none.
pub const DEFAULT_CST: &str = "101";

/// Commercial unit assumed when none is given.
pub const DEFAULT_UNIT: &str = "UN";
