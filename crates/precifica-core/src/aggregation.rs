//! # Aggregation Engine
//!
//! Rolls a set of calculated items into one portfolio summary.
//!
//! ## Summary Math
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  every total      = Σ (per-unit figure × commercial quantity)          │
//! │                                                                         │
//! │  total profit     = selling - fixed - acquisition - tax - variable     │
//! │                     (acquisition is loss-inflated once, here)          │
//! │                                                                         │
//! │  break-even       = fixed / (1 - (variable ratio + tax ratio))         │
//! │                     0 when the denominator is not positive             │
//! │                                                                         │
//! │  infeasible       → every total 0, status = PriceInfeasible            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::money::Money;
use crate::pricing::{loss_adjusted_cost, CalculatedItem, TaxLines};
use crate::regime::{break_even_tax_ratio, regime_factors};
use crate::types::{GlobalParameters, Percent, PriceStatus, TaxRegime};

// =============================================================================
// Global Summary
// =============================================================================

/// Portfolio totals for one (items, regime, profit margin) scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSummary {
    pub regime: TaxRegime,
    pub profit_margin: Percent,
    pub status: PriceStatus,
    pub item_count: usize,
    /// Σ commercial quantity.
    pub total_quantity: f64,
    pub total_selling: Money,
    /// Σ acquisition × quantity, loss-inflated.
    pub total_acquisition_cost: Money,
    pub total_tax: Money,
    /// Tax as a percentage of sales.
    pub total_tax_percent: f64,
    pub total_variable_expenses: Money,
    pub total_contribution_margin: Money,
    pub contribution_margin_percent: f64,
    pub fixed_expenses_total: Money,
    pub total_profit: Money,
    /// Net profit as a percentage of sales.
    pub profit_margin_percent: f64,
    /// Revenue at which fixed expenses are covered (0 if none exists).
    pub break_even_revenue: Money,
    /// Every credit and debit line, totalled.
    pub taxes: TaxLines,
}

impl GlobalSummary {
    /// Returns true if the scenario has a finite price for every item.
    #[inline]
    pub fn is_feasible(&self) -> bool {
        self.status.is_ok()
    }

    fn infeasible(
        regime: TaxRegime,
        profit_margin: Percent,
        item_count: usize,
        total_quantity: f64,
    ) -> Self {
        GlobalSummary {
            regime,
            profit_margin,
            status: PriceStatus::PriceInfeasible,
            item_count,
            total_quantity,
            total_selling: Money::zero(),
            total_acquisition_cost: Money::zero(),
            total_tax: Money::zero(),
            total_tax_percent: 0.0,
            total_variable_expenses: Money::zero(),
            total_contribution_margin: Money::zero(),
            contribution_margin_percent: 0.0,
            fixed_expenses_total: Money::zero(),
            total_profit: Money::zero(),
            profit_margin_percent: 0.0,
            break_even_revenue: Money::zero(),
            taxes: TaxLines::default(),
        }
    }
}

// =============================================================================
// Summarize
// =============================================================================

/// Summarizes `items` under `params.tax_regime`.
///
/// `fixed_expenses_total` is the fixed cost pool charged against the
/// portfolio. Every item must have been priced under `params.tax_regime`;
/// debug builds panic on a mixed set.
///
/// An empty item list is valid and yields an all-zero summary. Only
/// `fixed_expenses_total` and the break-even revenue are reported, since
/// neither depends on volume.
pub fn summarize(
    items: &[CalculatedItem],
    params: &GlobalParameters,
    fixed_expenses_total: Money,
) -> GlobalSummary {
    let regime = params.tax_regime;
    let profit_margin = params.target_profit_margin;
    let item_count = items.len();
    let total_quantity: f64 = items.iter().map(CalculatedItem::quantity).sum();

    debug_assert!(
        items.iter().all(|i| i.regime == regime),
        "items priced under a regime other than {}",
        regime
    );

    let factors = regime_factors(regime, params);
    let total_loss = params.loss_percentage.percentage() >= 100.0;
    if !factors.is_feasible() || total_loss || items.iter().any(|i| !i.is_feasible()) {
        debug!(
            regime = %regime,
            divisor = factors.markup_divisor(),
            items = item_count,
            "scenario infeasible"
        );
        return GlobalSummary::infeasible(regime, profit_margin, item_count, total_quantity);
    }

    if items.is_empty() {
        let variable_ratio = params.variable_expenses_percent().fraction();
        let denominator = 1.0 - (variable_ratio + break_even_tax_ratio(regime, params));
        return GlobalSummary {
            status: PriceStatus::Ok,
            fixed_expenses_total,
            break_even_revenue: break_even(fixed_expenses_total, denominator),
            ..GlobalSummary::infeasible(regime, profit_margin, 0, 0.0)
        };
    }

    let mut total_selling = Money::zero();
    let mut raw_acquisition = Money::zero();
    let mut total_variable_expenses = Money::zero();
    let mut total_contribution_margin = Money::zero();
    let mut taxes = TaxLines::default();

    for calc in items {
        let qty = calc.quantity();
        total_selling += calc.line_selling_total();
        raw_acquisition += calc.item.acquisition_cost.multiply_quantity(qty);
        total_variable_expenses += calc.composition.variable_expenses.multiply_quantity(qty);
        total_contribution_margin += calc.contribution_margin.multiply_quantity(qty);
        taxes += calc.taxes.scaled(qty);
    }

    let total_acquisition_cost = loss_adjusted_cost(raw_acquisition, params.loss_percentage);
    let total_tax = taxes.total_tax;
    let total_profit = total_selling
        - fixed_expenses_total
        - total_acquisition_cost
        - total_tax
        - total_variable_expenses;

    let share_of_sales = |amount: Money| {
        if total_selling.is_positive() {
            amount.value() / total_selling.value() * 100.0
        } else {
            0.0
        }
    };

    let acquisition_ratio = share_of_sales(total_acquisition_cost) / 100.0;
    let variable_cost_ratio = acquisition_ratio + params.variable_expenses_percent().fraction();
    let tax_ratio = break_even_tax_ratio(regime, params);
    let break_even_revenue =
        break_even(fixed_expenses_total, 1.0 - (variable_cost_ratio + tax_ratio));

    let summary = GlobalSummary {
        regime,
        profit_margin,
        status: PriceStatus::Ok,
        item_count,
        total_quantity,
        total_selling,
        total_acquisition_cost,
        total_tax,
        total_tax_percent: share_of_sales(total_tax),
        total_variable_expenses,
        total_contribution_margin,
        contribution_margin_percent: share_of_sales(total_contribution_margin),
        fixed_expenses_total,
        total_profit,
        profit_margin_percent: share_of_sales(total_profit),
        break_even_revenue,
        taxes,
    };

    debug!(
        regime = %regime,
        items = item_count,
        selling = summary.total_selling.value(),
        profit = summary.total_profit.value(),
        break_even = summary.break_even_revenue.value(),
        "scenario summarized"
    );

    summary
}

/// Fixed pool over the share of revenue left after variable costs and
/// taxes; zero when nothing is left.
fn break_even(fixed_expenses_total: Money, denominator: f64) -> Money {
    if denominator > 0.0 {
        fixed_expenses_total / denominator
    } else {
        Money::zero()
    }
}

/// Summarizes with the fixed pool CFU allocates: fixed expenses + payroll.
pub fn summarize_items(items: &[CalculatedItem], params: &GlobalParameters) -> GlobalSummary {
    summarize(items, params, params.fixed_costs_total())
}

// =============================================================================
// Unit Tests
// =============================================================================
