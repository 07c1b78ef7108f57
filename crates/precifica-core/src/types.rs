//! # Domain Types
//!
//! Input types consumed by the pricing engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌──────────────────────┐        ┌──────────────────────────────┐      │
//! │  │      LineItem        │        │      GlobalParameters        │      │
//! │  │  ──────────────────  │        │  ──────────────────────────  │      │
//! │  │  code / name / unit  │        │  target profit margin        │      │
//! │  │  acquisition_cost    │        │  fixed / variable expenses   │      │
//! │  │  commercial_quantity │        │  payroll, stock units, loss  │      │
//! │  │  inner units         │        │  tax regime + regime rates   │      │
//! │  │  PIS/COFINS/ICMS cr. │        └──────────────────────────────┘      │
//! │  │  CFOP / CST          │                                              │
//! │  └──────────────────────┘                                              │
//! │                                                                         │
//! │  ┌──────────────────────┐   ┌─────────────────┐   ┌─────────────────┐  │
//! │  │     TaxRegime        │   │    Percent      │   │  PriceStatus    │  │
//! │  │  Simples (standard)  │   │  0-100 domain   │   │  Ok             │  │
//! │  │  Simples (hybrid)    │   │  8.8 = 8.8%     │   │  PriceInfeasible│  │
//! │  │  Lucro Presumido     │   └─────────────────┘   └─────────────────┘  │
//! │  │  Lucro Real          │                                              │
//! │  └──────────────────────┘                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All types are immutable values: a calculation run never mutates its
//! inputs, and a regime comparison clones the parameters per scenario.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::CoreError;
use crate::money::Money;
use crate::{DEFAULT_CFOP, DEFAULT_CST, DEFAULT_UNIT};

// =============================================================================
// Percent
// =============================================================================

/// A rate in the 0-100 domain.
///
/// ## Why a Newtype?
/// The engine mixes two rate domains: user rates (`9.5` = 9.5%) and the
/// fixed CBS/IBS constants, which are pre-divided (`0.088`). Wrapping the
/// user domain in `Percent` makes it impossible to add one to the other
/// without calling [`Percent::fraction`] first.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Percent(f64);

impl Percent {
    /// Creates a rate from a percentage (9.5 = 9.5%).
    #[inline]
    pub const fn from_percentage(pct: f64) -> Self {
        Percent(pct)
    }

    /// Returns the rate as a percentage (0-100).
    #[inline]
    pub const fn percentage(&self) -> f64 {
        self.0
    }

    /// Returns the rate as a fraction (0-1).
    #[inline]
    pub fn fraction(&self) -> f64 {
        self.0 / 100.0
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        Percent(0.0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }
}

impl Default for Percent {
    fn default() -> Self {
        Percent::zero()
    }
}

impl Add for Percent {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Percent(self.0 + other.0)
    }
}

impl Sum for Percent {
    fn sum<I: Iterator<Item = Percent>>(iter: I) -> Self {
        iter.fold(Percent::zero(), |acc, p| acc + p)
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

// =============================================================================
// Tax Regime
// =============================================================================

/// The mutually exclusive tax regimes a seller can operate under.
///
/// ## Regime Behavior
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                                                                         │
/// │  SIMPLES NACIONAL (standard)                                           │
/// │  • Single rate on revenue, no CBS/IBS debit                            │
/// │  • Buyer receives no IVA credit                                        │
/// │                                                                         │
/// │  SIMPLES NACIONAL (hybrid)                                             │
/// │  • Remaining Simples share + CBS + IBS                                 │
/// │  • Buyer receives full CBS/IBS credit                                  │
/// │                                                                         │
/// │  LUCRO PRESUMIDO / LUCRO REAL                                          │
/// │  • CBS + IBS on the selling price, net of upstream credits             │
/// │  • IRPJ + CSLL on revenue                                              │
/// │                                                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TaxRegime {
    /// Simples Nacional without IVA credit generation.
    SimplesNacionalStandard,
    /// Simples Nacional collecting CBS/IBS so buyers can take credit.
    SimplesNacionalHybrid,
    /// Presumed-profit regime.
    LucroPresumido,
    /// Actual-profit regime.
    LucroReal,
}

impl TaxRegime {
    /// Every regime, in declaration order.
    pub const ALL: [TaxRegime; 4] = [
        TaxRegime::SimplesNacionalStandard,
        TaxRegime::SimplesNacionalHybrid,
        TaxRegime::LucroPresumido,
        TaxRegime::LucroReal,
    ];

    /// Regimes compared by default, in tie-break order.
    pub const DEFAULT_CANDIDATES: [TaxRegime; 3] = [
        TaxRegime::SimplesNacionalStandard,
        TaxRegime::LucroPresumido,
        TaxRegime::LucroReal,
    ];

    /// Returns true for both Simples Nacional variants.
    pub fn is_simples(&self) -> bool {
        matches!(
            self,
            TaxRegime::SimplesNacionalStandard | TaxRegime::SimplesNacionalHybrid
        )
    }

    /// Returns true if the regime debits CBS/IBS on the selling price.
    pub fn charges_cbs_ibs(&self) -> bool {
        !matches!(self, TaxRegime::SimplesNacionalStandard)
    }

    /// Human-readable name for reports.
    pub fn label(&self) -> &'static str {
        match self {
            TaxRegime::SimplesNacionalStandard => "Simples Nacional",
            TaxRegime::SimplesNacionalHybrid => "Simples Nacional (híbrido)",
            TaxRegime::LucroPresumido => "Lucro Presumido",
            TaxRegime::LucroReal => "Lucro Real",
        }
    }
}

impl Default for TaxRegime {
    fn default() -> Self {
        TaxRegime::LucroPresumido
    }
}

impl fmt::Display for TaxRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaxRegime::SimplesNacionalStandard => write!(f, "simples_nacional_standard"),
            TaxRegime::SimplesNacionalHybrid => write!(f, "simples_nacional_hybrid"),
            TaxRegime::LucroPresumido => write!(f, "lucro_presumido"),
            TaxRegime::LucroReal => write!(f, "lucro_real"),
        }
    }
}

impl FromStr for TaxRegime {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "simples_nacional_standard" | "simples_nacional" | "simples" => {
                Ok(TaxRegime::SimplesNacionalStandard)
            }
            "simples_nacional_hybrid" | "simples_hibrido" | "hybrid" => {
                Ok(TaxRegime::SimplesNacionalHybrid)
            }
            "lucro_presumido" | "presumido" => Ok(TaxRegime::LucroPresumido),
            "lucro_real" | "real" => Ok(TaxRegime::LucroReal),
            _ => Err(CoreError::UnknownRegime(s.to_string())),
        }
    }
}

// =============================================================================
// Price Status
// =============================================================================

/// Feasibility of a computed price or scenario.
///
/// Carried explicitly on every result: a legitimately zero price and an
/// infeasible one must never be told apart by value alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PriceStatus {
    /// A finite, positive price covers every charge.
    Ok,
    /// No finite price can cover the charges (markup divisor <= 0 or
    /// total loss).
    PriceInfeasible,
}

impl PriceStatus {
    /// Returns true for [`PriceStatus::Ok`].
    #[inline]
    pub fn is_ok(&self) -> bool {
        matches!(self, PriceStatus::Ok)
    }
}

impl Default for PriceStatus {
    fn default() -> Self {
        PriceStatus::Ok
    }
}

// =============================================================================
// Line Item
// =============================================================================

fn default_unit() -> String {
    DEFAULT_UNIT.to_string()
}

fn default_inner_units() -> f64 {
    1.0
}

fn default_cfop() -> String {
    DEFAULT_CFOP.to_string()
}

fn default_cst() -> String {
    DEFAULT_CST.to_string()
}

/// One invoice line, as handed over by the ingestion collaborator.
///
/// Credits are per commercial unit and carried from the source document.
/// Created once at ingestion, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Product code from the invoice.
    pub code: String,

    /// Product description.
    pub name: String,

    /// Commercial unit ("UN", "CX", "KG"...).
    #[serde(default = "default_unit")]
    pub unit: String,

    /// Cost per commercial unit.
    pub acquisition_cost: Money,

    /// Commercial units on the invoice.
    pub commercial_quantity: f64,

    /// Inner units per commercial unit (12 for a box of 12).
    #[serde(default = "default_inner_units")]
    pub inner_units_per_commercial_unit: f64,

    /// PIS credit per commercial unit.
    #[serde(default)]
    pub pis_credit: Money,

    /// COFINS credit per commercial unit.
    #[serde(default)]
    pub cofins_credit: Money,

    /// ICMS credit per commercial unit.
    #[serde(default)]
    pub icms_credit: Money,

    /// Fiscal operation code.
    #[serde(default = "default_cfop")]
    pub cfop: String,

    /// Tax situation code (CSOSN for Simples issuers).
    #[serde(default = "default_cst")]
    pub cst: String,
}

impl LineItem {
    /// Creates a line item with no credits, one inner unit and the
    /// default classification codes.
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        acquisition_cost: Money,
        commercial_quantity: f64,
    ) -> Self {
        LineItem {
            code: code.into(),
            name: name.into(),
            unit: default_unit(),
            acquisition_cost,
            commercial_quantity,
            inner_units_per_commercial_unit: default_inner_units(),
            pis_credit: Money::zero(),
            cofins_credit: Money::zero(),
            icms_credit: Money::zero(),
            cfop: default_cfop(),
            cst: default_cst(),
        }
    }

    /// Sets the PIS, COFINS and ICMS credits.
    pub fn with_credits(mut self, pis: Money, cofins: Money, icms: Money) -> Self {
        self.pis_credit = pis;
        self.cofins_credit = cofins;
        self.icms_credit = icms;
        self
    }

    /// Sets the inner units per commercial unit.
    pub fn with_inner_units(mut self, units: f64) -> Self {
        self.inner_units_per_commercial_unit = units;
        self
    }

    /// Sets the commercial unit.
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    /// Sets the CFOP and CST codes.
    pub fn with_classification(mut self, cfop: impl Into<String>, cst: impl Into<String>) -> Self {
        self.cfop = cfop.into();
        self.cst = cst.into();
        self
    }

    /// Inner units used for per-unit figures; absent, zero, negative or
    /// non-finite values count as 1.
    #[inline]
    pub fn inner_units(&self) -> f64 {
        let units = self.inner_units_per_commercial_unit;
        if units.is_finite() && units > 0.0 {
            units
        } else {
            1.0
        }
    }

    /// CBS credit: PIS + COFINS.
    #[inline]
    pub fn cbs_credit(&self) -> Money {
        self.pis_credit + self.cofins_credit
    }

    /// IBS credit: ICMS.
    #[inline]
    pub fn ibs_credit(&self) -> Money {
        self.icms_credit
    }
}

// =============================================================================
// Expenses
// =============================================================================

/// A named fixed expense (rent, utilities...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NamedAmount {
    pub name: String,
    pub amount: Money,
}

impl NamedAmount {
    pub fn new(name: impl Into<String>, amount: Money) -> Self {
        NamedAmount {
            name: name.into(),
            amount,
        }
    }
}

/// A named variable expense, charged as a percentage of the selling price
/// (card fees, commissions...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NamedRate {
    pub name: String,
    pub rate: Percent,
}

impl NamedRate {
    pub fn new(name: impl Into<String>, rate: Percent) -> Self {
        NamedRate {
            name: name.into(),
            rate,
        }
    }
}

// =============================================================================
// Global Parameters
// =============================================================================

/// Parameters shared by every line item of one calculation run.
///
/// ## Rate Domains
/// Every `Percent` field is in the 0-100 domain. The CBS/IBS constants
/// ([`crate::CBS_RATE`], [`crate::IBS_RATE`]) are fractions and are not
/// configurable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct GlobalParameters {
    /// Profit margin the selling price must embed.
    pub target_profit_margin: Percent,

    /// Fixed expenses for the period.
    pub fixed_expenses: Vec<NamedAmount>,

    /// Variable expenses as a percentage of the selling price.
    pub variable_expenses: Vec<NamedRate>,

    /// Payroll for the period (allocated like a fixed expense).
    pub payroll: Money,

    /// Commercial units in stock, the base for fixed-cost allocation.
    pub total_stock_units: f64,

    /// Shrinkage/breakage (0-100).
    pub loss_percentage: Percent,

    /// Active regime.
    pub tax_regime: TaxRegime,

    /// Simples Nacional effective rate (standard variant).
    pub simples_nacional_rate: Percent,

    /// Simples Nacional share left after CBS/IBS (hybrid variant).
    pub simples_nacional_remanescente_rate: Percent,

    /// IRPJ rate on revenue.
    pub irpj_rate: Percent,

    /// CSLL rate on revenue.
    pub csll_rate: Percent,

    /// IRPJ rate for Lucro Real; falls back to `irpj_rate`.
    pub lucro_real_irpj_rate: Option<Percent>,

    /// CSLL rate for Lucro Real; falls back to `csll_rate`.
    pub lucro_real_csll_rate: Option<Percent>,
}

impl Default for GlobalParameters {
    /// Defaults for a presumed-profit retailer.
    ///
    /// ## Default Values
    /// - Regime: Lucro Presumido
    /// - IRPJ 1.2% / CSLL 1.08% (8% and 12% presumption bases)
    /// - Simples Nacional: 4% (first bracket of Annex I)
    /// - Everything else zero
    fn default() -> Self {
        GlobalParameters {
            target_profit_margin: Percent::zero(),
            fixed_expenses: Vec::new(),
            variable_expenses: Vec::new(),
            payroll: Money::zero(),
            total_stock_units: 0.0,
            loss_percentage: Percent::zero(),
            tax_regime: TaxRegime::LucroPresumido,
            simples_nacional_rate: Percent::from_percentage(4.0),
            simples_nacional_remanescente_rate: Percent::zero(),
            irpj_rate: Percent::from_percentage(1.2),
            csll_rate: Percent::from_percentage(1.08),
            lucro_real_irpj_rate: None,
            lucro_real_csll_rate: None,
        }
    }
}

impl GlobalParameters {
    /// Sum of the named fixed expenses (payroll excluded).
    pub fn fixed_expenses_sum(&self) -> Money {
        self.fixed_expenses.iter().map(|e| e.amount).sum()
    }

    /// Fixed cost pool: fixed expenses plus payroll.
    pub fn fixed_costs_total(&self) -> Money {
        self.fixed_expenses_sum() + self.payroll
    }

    /// Sum of the variable expense rates.
    pub fn variable_expenses_percent(&self) -> Percent {
        self.variable_expenses.iter().map(|e| e.rate).sum()
    }

    /// IRPJ and CSLL rates that apply under `regime`.
    ///
    /// Simples regimes collect IRPJ/CSLL inside the Simples rate, so
    /// both are zero there.
    pub fn irpj_csll_for(&self, regime: TaxRegime) -> (Percent, Percent) {
        match regime {
            TaxRegime::LucroPresumido => (self.irpj_rate, self.csll_rate),
            TaxRegime::LucroReal => (
                self.lucro_real_irpj_rate.unwrap_or(self.irpj_rate),
                self.lucro_real_csll_rate.unwrap_or(self.csll_rate),
            ),
            TaxRegime::SimplesNacionalStandard | TaxRegime::SimplesNacionalHybrid => {
                (Percent::zero(), Percent::zero())
            }
        }
    }

    /// Simples Nacional rate that applies under `regime`.
    pub fn simples_rate_for(&self, regime: TaxRegime) -> Percent {
        match regime {
            TaxRegime::SimplesNacionalStandard => self.simples_nacional_rate,
            TaxRegime::SimplesNacionalHybrid => self.simples_nacional_remanescente_rate,
            TaxRegime::LucroPresumido | TaxRegime::LucroReal => Percent::zero(),
        }
    }

    /// Returns a copy with the regime overridden.
    pub fn with_regime(&self, regime: TaxRegime) -> Self {
        GlobalParameters {
            tax_regime: regime,
            ..self.clone()
        }
    }

    /// Returns a copy with the target profit margin overridden.
    pub fn with_profit_margin(&self, margin: Percent) -> Self {
        GlobalParameters {
            target_profit_margin: margin,
            ..self.clone()
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_domains() {
        let rate = Percent::from_percentage(9.5);
        assert_eq!(rate.percentage(), 9.5);
        assert!((rate.fraction() - 0.095).abs() < 1e-12);
        assert_eq!(format!("{}", rate), "9.5%");
    }

    #[test]
    fn test_percent_sum() {
        let total: Percent = [Percent::from_percentage(2.0), Percent::from_percentage(3.5)]
            .into_iter()
            .sum();
        assert_eq!(total.percentage(), 5.5);
    }

    #[test]
    fn test_regime_parsing() {
        assert_eq!(
            "simples".parse::<TaxRegime>().unwrap(),
            TaxRegime::SimplesNacionalStandard
        );
        assert_eq!(
            "Simples-Hibrido".parse::<TaxRegime>().unwrap(),
            TaxRegime::SimplesNacionalHybrid
        );
        assert_eq!(
            "lucro_presumido".parse::<TaxRegime>().unwrap(),
            TaxRegime::LucroPresumido
        );
        assert_eq!("real".parse::<TaxRegime>().unwrap(), TaxRegime::LucroReal);
        assert!("mei".parse::<TaxRegime>().is_err());
    }

    #[test]
    fn test_regime_display_round_trips() {
        for regime in TaxRegime::ALL {
            assert_eq!(regime.to_string().parse::<TaxRegime>().unwrap(), regime);
        }
    }

    #[test]
    fn test_regime_flags() {
        assert!(TaxRegime::SimplesNacionalHybrid.is_simples());
        assert!(TaxRegime::SimplesNacionalHybrid.charges_cbs_ibs());
        assert!(!TaxRegime::SimplesNacionalStandard.charges_cbs_ibs());
        assert!(!TaxRegime::LucroReal.is_simples());
    }

    #[test]
    fn test_line_item_defaults_from_json() {
        let json = r#"{
            "code": "7891",
            "name": "Detergente 500ml",
            "acquisitionCost": 2.5,
            "commercialQuantity": 24
        }"#;
        let item: LineItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.unit, "UN");
        assert_eq!(item.inner_units(), 1.0);
        assert_eq!(item.cfop, "5102");
        assert_eq!(item.cst, "101");
        assert!(item.pis_credit.is_zero());
    }

    #[test]
    fn test_inner_units_normalised() {
        let item = LineItem::new("1", "Caixa", Money::from_reais(12.0), 1.0);
        assert_eq!(item.clone().with_inner_units(0.0).inner_units(), 1.0);
        assert_eq!(item.clone().with_inner_units(-2.0).inner_units(), 1.0);
        assert_eq!(item.with_inner_units(12.0).inner_units(), 12.0);
    }

    #[test]
    fn test_credit_mapping() {
        let item = LineItem::new("1", "Item", Money::from_reais(10.0), 1.0).with_credits(
            Money::from_reais(0.5),
            Money::from_reais(0.3),
            Money::from_reais(1.0),
        );
        assert!((item.cbs_credit().value() - 0.8).abs() < 1e-12);
        assert_eq!(item.ibs_credit().value(), 1.0);
    }

    #[test]
    fn test_parameter_totals() {
        let params = GlobalParameters {
            fixed_expenses: vec![
                NamedAmount::new("Aluguel", Money::from_reais(3000.0)),
                NamedAmount::new("Energia", Money::from_reais(500.0)),
            ],
            variable_expenses: vec![
                NamedRate::new("Cartão", Percent::from_percentage(3.0)),
                NamedRate::new("Comissão", Percent::from_percentage(2.0)),
            ],
            payroll: Money::from_reais(6500.0),
            ..GlobalParameters::default()
        };
        assert_eq!(params.fixed_expenses_sum().value(), 3500.0);
        assert_eq!(params.fixed_costs_total().value(), 10000.0);
        assert_eq!(params.variable_expenses_percent().percentage(), 5.0);
    }

    #[test]
    fn test_lucro_real_rates_fall_back() {
        let mut params = GlobalParameters::default();
        assert_eq!(
            params.irpj_csll_for(TaxRegime::LucroReal),
            (params.irpj_rate, params.csll_rate)
        );

        params.lucro_real_irpj_rate = Some(Percent::from_percentage(0.5));
        let (irpj, csll) = params.irpj_csll_for(TaxRegime::LucroReal);
        assert_eq!(irpj.percentage(), 0.5);
        assert_eq!(csll, params.csll_rate);

        let (irpj, csll) = params.irpj_csll_for(TaxRegime::SimplesNacionalStandard);
        assert!(irpj.is_zero() && csll.is_zero());
    }

    #[test]
    fn test_overrides_leave_original_untouched() {
        let base = GlobalParameters::default();
        let real = base.with_regime(TaxRegime::LucroReal);
        let no_margin = base.with_profit_margin(Percent::zero());
        assert_eq!(base.tax_regime, TaxRegime::LucroPresumido);
        assert_eq!(real.tax_regime, TaxRegime::LucroReal);
        assert!(no_margin.target_profit_margin.is_zero());
    }

    #[test]
    fn test_parameters_deserialize_with_defaults() {
        let json = r#"{ "taxRegime": "simples_nacional_hybrid", "targetProfitMargin": 12 }"#;
        let params: GlobalParameters = serde_json::from_str(json).unwrap();
        assert_eq!(params.tax_regime, TaxRegime::SimplesNacionalHybrid);
        assert_eq!(params.target_profit_margin.percentage(), 12.0);
        assert_eq!(params.irpj_rate.percentage(), 1.2);
    }
}
