//! # Pricing Engine
//!
//! Prices one line item with the markup divisor method.
//!
//! ## Pricing Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  LineItem ──► credits ──► effective cost (acquisition - credits)       │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  acquisition + CFU ──► loss inflation ──► base cost                    │
//! │                              │                                          │
//! │                 loss >= 100% │ divisor <= 0                             │
//! │                      ┌───────┴────────┐                                 │
//! │                      ▼                ▼                                 │
//! │              PriceInfeasible    price = base / divisor                  │
//! │              (all zero)               │                                 │
//! │                                       ▼                                 │
//! │                     debits (from final price) - credits                 │
//! │                                       │                                 │
//! │                                       ▼                                 │
//! │               composition, margins, per-inner-unit mirror               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Totality
//! [`price`] never fails. Division by zero and the total-loss case
//! resolve to [`PriceStatus::PriceInfeasible`], and the infinite base
//! cost used to detect total loss never reaches a returned field.

use serde::{Deserialize, Serialize};
use std::ops::AddAssign;
use tracing::{debug, trace};
use ts_rs::TS;

use crate::money::Money;
use crate::regime::{regime_factors, RegimeFactors};
use crate::types::{GlobalParameters, LineItem, Percent, PriceStatus, TaxRegime};
use crate::{CBS_RATE, IBS_RATE, MIN_MARKUP_DIVISOR};

// =============================================================================
// Tax Lines
// =============================================================================

/// Credit, debit and net payable amounts for one unit (or one total).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TaxLines {
    /// PIS + COFINS credit.
    pub cbs_credit: Money,
    /// ICMS credit.
    pub ibs_credit: Money,
    pub cbs_debit: Money,
    pub ibs_debit: Money,
    /// CBS debit net of credit, floored at zero.
    pub cbs_to_pay: Money,
    /// IBS debit net of credit, floored at zero.
    pub ibs_to_pay: Money,
    pub irpj: Money,
    pub csll: Money,
    pub simples: Money,
    /// Net tax actually owed.
    pub total_tax: Money,
    /// CBS + IBS debit the buyer may take as credit.
    pub iva_credit_for_buyer: Money,
    /// Credit the debit could not absorb.
    pub unused_credit: Money,
}

impl TaxLines {
    /// Multiplies every line by `factor` (an invoice quantity).
    pub fn scaled(&self, factor: f64) -> Self {
        TaxLines {
            cbs_credit: self.cbs_credit * factor,
            ibs_credit: self.ibs_credit * factor,
            cbs_debit: self.cbs_debit * factor,
            ibs_debit: self.ibs_debit * factor,
            cbs_to_pay: self.cbs_to_pay * factor,
            ibs_to_pay: self.ibs_to_pay * factor,
            irpj: self.irpj * factor,
            csll: self.csll * factor,
            simples: self.simples * factor,
            total_tax: self.total_tax * factor,
            iva_credit_for_buyer: self.iva_credit_for_buyer * factor,
            unused_credit: self.unused_credit * factor,
        }
    }

    /// Divides every line across `units` inner units.
    pub fn per_unit(&self, units: f64) -> Self {
        TaxLines {
            cbs_credit: self.cbs_credit.per_unit(units),
            ibs_credit: self.ibs_credit.per_unit(units),
            cbs_debit: self.cbs_debit.per_unit(units),
            ibs_debit: self.ibs_debit.per_unit(units),
            cbs_to_pay: self.cbs_to_pay.per_unit(units),
            ibs_to_pay: self.ibs_to_pay.per_unit(units),
            irpj: self.irpj.per_unit(units),
            csll: self.csll.per_unit(units),
            simples: self.simples.per_unit(units),
            total_tax: self.total_tax.per_unit(units),
            iva_credit_for_buyer: self.iva_credit_for_buyer.per_unit(units),
            unused_credit: self.unused_credit.per_unit(units),
        }
    }
}

impl AddAssign for TaxLines {
    fn add_assign(&mut self, other: Self) {
        self.cbs_credit += other.cbs_credit;
        self.ibs_credit += other.ibs_credit;
        self.cbs_debit += other.cbs_debit;
        self.ibs_debit += other.ibs_debit;
        self.cbs_to_pay += other.cbs_to_pay;
        self.ibs_to_pay += other.ibs_to_pay;
        self.irpj += other.irpj;
        self.csll += other.csll;
        self.simples += other.simples;
        self.total_tax += other.total_tax;
        self.iva_credit_for_buyer += other.iva_credit_for_buyer;
        self.unused_credit += other.unused_credit;
    }
}

// =============================================================================
// Price Composition
// =============================================================================

/// Breakdown of the selling price.
///
/// The five parts add up to the selling price: by construction
/// `base = price × (1 - markup term)`, and the markup term is exactly the
/// variable, tax and profit shares.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PriceComposition {
    /// Loss-inflated base cost minus the fixed cost share.
    pub merchandise_cost: Money,
    /// Fixed cost per unit (CFU).
    pub fixed_cost: Money,
    pub variable_expenses: Money,
    /// Gross tax share (price × regime tax term), before credits. Differs
    /// from the net `TaxLines::total_tax` whenever the line carries credits.
    pub tax: Money,
    pub profit: Money,
}

impl PriceComposition {
    /// Sum of every component.
    pub fn total(&self) -> Money {
        self.merchandise_cost + self.fixed_cost + self.variable_expenses + self.tax + self.profit
    }

    pub fn per_unit(&self, units: f64) -> Self {
        PriceComposition {
            merchandise_cost: self.merchandise_cost.per_unit(units),
            fixed_cost: self.fixed_cost.per_unit(units),
            variable_expenses: self.variable_expenses.per_unit(units),
            tax: self.tax.per_unit(units),
            profit: self.profit.per_unit(units),
        }
    }
}

// =============================================================================
// Calculated Item
// =============================================================================

/// Monetary figures divided by the inner units of a commercial unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InnerUnitFigures {
    pub inner_units: f64,
    pub acquisition_cost: Money,
    pub effective_cost: Money,
    pub selling_price: Money,
    pub min_selling_price: Money,
    pub contribution_margin: Money,
    pub taxes: TaxLines,
    pub composition: PriceComposition,
}

/// A line item with every derived pricing figure, per commercial unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CalculatedItem {
    pub item: LineItem,
    /// Regime the price was computed under.
    pub regime: TaxRegime,
    pub status: PriceStatus,
    /// CFU used for this run.
    pub fixed_cost_per_unit: Money,
    /// Acquisition cost minus CBS/IBS credits. May be negative.
    pub effective_cost: Money,
    /// Acquisition + CFU after loss inflation (0 on total loss).
    pub base_cost_for_markup: Money,
    pub selling_price: Money,
    pub min_selling_price: Money,
    /// Realized markup over acquisition cost, in percent.
    pub markup_percent: f64,
    pub contribution_margin: Money,
    pub taxes: TaxLines,
    pub composition: PriceComposition,
    pub per_inner_unit: InnerUnitFigures,
}

impl CalculatedItem {
    /// Returns true if a finite price was found.
    #[inline]
    pub fn is_feasible(&self) -> bool {
        self.status.is_ok()
    }

    /// Commercial quantity of the underlying line.
    #[inline]
    pub fn quantity(&self) -> f64 {
        self.item.commercial_quantity
    }

    /// Selling price times quantity.
    #[inline]
    pub fn line_selling_total(&self) -> Money {
        self.selling_price.multiply_quantity(self.quantity())
    }
}

// =============================================================================
// Cost Helpers
// =============================================================================

/// Fixed cost per unit: (fixed expenses + payroll) / stock units.
///
/// Zero when there is no stock to allocate over.
///
/// ## Example
/// ```rust
/// use precifica_core::money::Money;
/// use precifica_core::pricing::fixed_cost_per_unit;
/// use precifica_core::types::{GlobalParameters, NamedAmount};
///
/// let params = GlobalParameters {
///     fixed_expenses: vec![NamedAmount::new("Aluguel", Money::from_reais(1500.0))],
///     payroll: Money::from_reais(500.0),
///     total_stock_units: 1000.0,
///     ..GlobalParameters::default()
/// };
/// assert_eq!(fixed_cost_per_unit(&params).value(), 2.0);
/// ```
pub fn fixed_cost_per_unit(params: &GlobalParameters) -> Money {
    let stock = params.total_stock_units;
    if stock.is_finite() && stock > 0.0 {
        params.fixed_costs_total() / stock
    } else {
        Money::zero()
    }
}

/// Inflates a cost for shrinkage.
///
/// ```text
///   loss <= 0        → cost
///   0 < loss < 100   → cost / (1 - loss/100)
///   loss >= 100      → +∞ (total loss, no price recovers it)
/// ```
pub fn loss_adjusted_cost(cost: Money, loss: Percent) -> Money {
    let pct = loss.percentage();
    if pct >= 100.0 {
        Money::from_reais(f64::INFINITY)
    } else if pct > 0.0 {
        cost / (1.0 - loss.fraction())
    } else {
        cost
    }
}

// =============================================================================
// Pricing
// =============================================================================

/// Prices one line item under `params.tax_regime`.
///
/// `cfu` is computed once per run by [`fixed_cost_per_unit`] and shared by
/// every item.
pub fn price(item: &LineItem, params: &GlobalParameters, cfu: Money) -> CalculatedItem {
    let regime = params.tax_regime;
    let factors = regime_factors(regime, params);

    let cbs_credit = item.cbs_credit();
    let ibs_credit = item.ibs_credit();
    let effective_cost = item.acquisition_cost - (cbs_credit + ibs_credit);

    let base = loss_adjusted_cost(item.acquisition_cost + cfu, params.loss_percentage);

    if !base.is_finite() || !factors.is_feasible() {
        debug!(
            code = %item.code,
            regime = %regime,
            divisor = factors.markup_divisor(),
            loss = params.loss_percentage.percentage(),
            "price infeasible"
        );
        return infeasible(item, regime, cfu, effective_cost, base);
    }

    let selling_price = base / factors.markup_divisor();

    let min_divisor = factors.min_price_divisor();
    let min_selling_price = if min_divisor > MIN_MARKUP_DIVISOR {
        base / min_divisor
    } else {
        base
    };

    let taxes = tax_lines(selling_price, cbs_credit, ibs_credit, params, &factors);

    let acquisition = item.acquisition_cost;
    let markup_percent = if acquisition.is_positive() {
        (selling_price - acquisition).value() / acquisition.value() * 100.0
    } else {
        0.0
    };

    let variable_expenses = selling_price.apply_rate(params.variable_expenses_percent());
    let contribution_margin = selling_price - (acquisition + variable_expenses);

    let composition = PriceComposition {
        merchandise_cost: base - cfu,
        fixed_cost: cfu,
        variable_expenses,
        tax: selling_price.apply_fraction(factors.tax_term),
        profit: selling_price.apply_rate(params.target_profit_margin),
    };

    let units = item.inner_units();
    let per_inner_unit = InnerUnitFigures {
        inner_units: units,
        acquisition_cost: acquisition.per_unit(units),
        effective_cost: effective_cost.per_unit(units),
        selling_price: selling_price.per_unit(units),
        min_selling_price: min_selling_price.per_unit(units),
        contribution_margin: contribution_margin.per_unit(units),
        taxes: taxes.per_unit(units),
        composition: composition.per_unit(units),
    };

    trace!(
        code = %item.code,
        regime = %regime,
        price = selling_price.value(),
        min_price = min_selling_price.value(),
        tax = taxes.total_tax.value(),
        "item priced"
    );

    CalculatedItem {
        item: item.clone(),
        regime,
        status: PriceStatus::Ok,
        fixed_cost_per_unit: cfu,
        effective_cost,
        base_cost_for_markup: base,
        selling_price,
        min_selling_price,
        markup_percent,
        contribution_margin,
        taxes,
        composition,
        per_inner_unit,
    }
}

/// Prices every item with one shared CFU.
pub fn price_all(items: &[LineItem], params: &GlobalParameters) -> Vec<CalculatedItem> {
    let cfu = fixed_cost_per_unit(params);
    items.iter().map(|item| price(item, params, cfu)).collect()
}

/// Debits are taken from the final selling price. Credits only offset
/// CBS/IBS; whatever they cannot absorb is reported as unused.
fn tax_lines(
    selling_price: Money,
    cbs_credit: Money,
    ibs_credit: Money,
    params: &GlobalParameters,
    factors: &RegimeFactors,
) -> TaxLines {
    let regime = params.tax_regime;

    let (cbs_debit, ibs_debit) = if factors.applies_cbs_ibs_debit {
        (
            selling_price.apply_fraction(CBS_RATE),
            selling_price.apply_fraction(IBS_RATE),
        )
    } else {
        (Money::zero(), Money::zero())
    };

    let (cbs_to_pay, ibs_to_pay, unused_credit) = if factors.applies_cbs_ibs_debit {
        let cbs_net = cbs_debit - cbs_credit;
        let ibs_net = ibs_debit - ibs_credit;
        (
            cbs_net.floor_zero(),
            ibs_net.floor_zero(),
            (-cbs_net).floor_zero() + (-ibs_net).floor_zero(),
        )
    } else {
        (Money::zero(), Money::zero(), cbs_credit + ibs_credit)
    };

    let (irpj, csll) = if factors.applies_irpj_csll {
        let (irpj_rate, csll_rate) = params.irpj_csll_for(regime);
        (
            selling_price.apply_rate(irpj_rate),
            selling_price.apply_rate(csll_rate),
        )
    } else {
        (Money::zero(), Money::zero())
    };

    let simples = if factors.applies_simples {
        selling_price.apply_rate(params.simples_rate_for(regime))
    } else {
        Money::zero()
    };

    TaxLines {
        cbs_credit,
        ibs_credit,
        cbs_debit,
        ibs_debit,
        cbs_to_pay,
        ibs_to_pay,
        irpj,
        csll,
        simples,
        total_tax: cbs_to_pay + ibs_to_pay + irpj + csll + simples,
        iva_credit_for_buyer: cbs_debit + ibs_debit,
        unused_credit,
    }
}

fn infeasible(
    item: &LineItem,
    regime: TaxRegime,
    cfu: Money,
    effective_cost: Money,
    base: Money,
) -> CalculatedItem {
    let base_cost_for_markup = if base.is_finite() { base } else { Money::zero() };
    CalculatedItem {
        item: item.clone(),
        regime,
        status: PriceStatus::PriceInfeasible,
        fixed_cost_per_unit: cfu,
        effective_cost,
        base_cost_for_markup,
        selling_price: Money::zero(),
        min_selling_price: Money::zero(),
        markup_percent: 0.0,
        contribution_margin: Money::zero(),
        taxes: TaxLines::default(),
        composition: PriceComposition::default(),
        per_inner_unit: InnerUnitFigures {
            inner_units: item.inner_units(),
            ..InnerUnitFigures::default()
        },
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
