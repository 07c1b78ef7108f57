//! # Regime Comparator
//!
//! Prices and summarizes the same items under several regimes and picks
//! the one with the largest net profit.
//!
//! ## Comparison Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  items + base params                                                   │
//! │        │                                                                │
//! │        ├──► Simples standard ──► price_all ──► summarize ──┐           │
//! │        ├──► Lucro Presumido  ──► price_all ──► summarize ──┼──► best   │
//! │        └──► Lucro Real       ──► price_all ──► summarize ──┘           │
//! │                                                                         │
//! │  best = strictly largest total profit among feasible scenarios,        │
//! │         first candidate wins ties                                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The "minimum viable sale" view runs the same machinery with the profit
//! margin forced to zero.

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::aggregation::{summarize_items, GlobalSummary};
use crate::money::Money;
use crate::pricing::{price_all, CalculatedItem};
use crate::types::{GlobalParameters, LineItem, Percent, TaxRegime};

// =============================================================================
// Result Types
// =============================================================================

/// One regime's priced items and summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RegimeScenario {
    pub regime: TaxRegime,
    pub summary: GlobalSummary,
    pub items: Vec<CalculatedItem>,
}

/// Outcome of a regime comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RegimeComparison {
    /// Margin every scenario was priced with.
    pub profit_margin: Percent,
    /// One entry per distinct candidate, in evaluation order.
    pub scenarios: Vec<RegimeScenario>,
    /// Most profitable feasible regime, if any.
    pub best: Option<TaxRegime>,
}

impl RegimeComparison {
    /// Scenario evaluated for `regime`, if it was a candidate.
    pub fn scenario(&self, regime: TaxRegime) -> Option<&RegimeScenario> {
        self.scenarios.iter().find(|s| s.regime == regime)
    }

    /// Scenario of the best regime.
    pub fn best_scenario(&self) -> Option<&RegimeScenario> {
        self.best.and_then(|regime| self.scenario(regime))
    }

    /// How much less profit `regime` makes than the best regime.
    ///
    /// `None` when there is no best regime or `regime` was not compared.
    pub fn profit_gap_to_best(&self, regime: TaxRegime) -> Option<Money> {
        let best = self.best_scenario()?;
        let other = self.scenario(regime)?;
        Some(best.summary.total_profit - other.summary.total_profit)
    }
}

// =============================================================================
// Compare
// =============================================================================

/// Compares `candidates` at the margin in `base`.
///
/// ## Example
/// ```rust
/// use precifica_core::comparison::compare;
/// use precifica_core::money::Money;
/// use precifica_core::types::{GlobalParameters, LineItem, TaxRegime};
///
/// let items = vec![LineItem::new("1", "Arroz", Money::from_reais(10.0), 50.0)];
/// let result = compare(&items, &GlobalParameters::default(), &TaxRegime::DEFAULT_CANDIDATES);
/// assert_eq!(result.scenarios.len(), 3);
/// assert!(result.best.is_some());
/// ```
pub fn compare(
    items: &[LineItem],
    base: &GlobalParameters,
    candidates: &[TaxRegime],
) -> RegimeComparison {
    run_comparison(items, base, candidates, None)
}

/// Compares `candidates` with the profit margin forced to zero.
pub fn compare_minimum_viable(
    items: &[LineItem],
    base: &GlobalParameters,
    candidates: &[TaxRegime],
) -> RegimeComparison {
    run_comparison(items, base, candidates, Some(Percent::zero()))
}

fn run_comparison(
    items: &[LineItem],
    base: &GlobalParameters,
    candidates: &[TaxRegime],
    margin_override: Option<Percent>,
) -> RegimeComparison {
    let base = match margin_override {
        Some(margin) => base.with_profit_margin(margin),
        None => base.clone(),
    };

    let mut scenarios: Vec<RegimeScenario> = Vec::with_capacity(candidates.len());
    for &regime in candidates {
        if scenarios.iter().any(|s| s.regime == regime) {
            continue;
        }

        let params = base.with_regime(regime);
        let priced = price_all(items, &params);
        let summary = summarize_items(&priced, &params);

        debug!(
            regime = %regime,
            feasible = summary.is_feasible(),
            profit = summary.total_profit.value(),
            "regime evaluated"
        );

        scenarios.push(RegimeScenario {
            regime,
            summary,
            items: priced,
        });
    }

    let mut best: Option<&RegimeScenario> = None;
    for scenario in scenarios.iter().filter(|s| s.summary.is_feasible()) {
        match best {
            Some(current) if scenario.summary.total_profit <= current.summary.total_profit => {}
            _ => best = Some(scenario),
        }
    }
    let best = best.map(|s| s.regime);

    debug!(
        best = ?best,
        margin = base.target_profit_margin.percentage(),
        candidates = scenarios.len(),
        "best regime selected"
    );

    RegimeComparison {
        profit_margin: base.target_profit_margin,
        scenarios,
        best,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NamedAmount, NamedRate};

    fn items() -> Vec<LineItem> {
        vec![
            LineItem::new("1", "Arroz 1kg", Money::from_reais(10.0), 100.0).with_credits(
                Money::from_reais(0.5),
                Money::from_reais(0.3),
                Money::from_reais(1.0),
            ),
            LineItem::new("2", "Café 500g", Money::from_reais(14.0), 30.0),
        ]
    }

    fn params() -> GlobalParameters {
        GlobalParameters {
            target_profit_margin: Percent::from_percentage(10.0),
            fixed_expenses: vec![NamedAmount::new("Aluguel", Money::from_reais(200.0))],
            variable_expenses: vec![NamedRate::new("Cartão", Percent::from_percentage(2.0))],
            total_stock_units: 130.0,
            simples_nacional_rate: Percent::from_percentage(6.0),
            ..GlobalParameters::default()
        }
    }

    #[test]
    fn test_best_has_largest_profit() {
        let result = compare(&items(), &params(), &TaxRegime::DEFAULT_CANDIDATES);
        let best = result.best_scenario().unwrap();

        for scenario in &result.scenarios {
            assert!(scenario.summary.total_profit <= best.summary.total_profit);
        }
        assert_eq!(
            result.profit_gap_to_best(best.regime),
            Some(Money::zero())
        );
    }

    #[test]
    fn test_scenarios_follow_candidate_order() {
        let result = compare(&items(), &params(), &TaxRegime::DEFAULT_CANDIDATES);
        let regimes: Vec<TaxRegime> = result.scenarios.iter().map(|s| s.regime).collect();
        assert_eq!(regimes, TaxRegime::DEFAULT_CANDIDATES.to_vec());
        assert!(result
            .scenarios
            .iter()
            .all(|s| s.items.iter().all(|i| i.is_feasible())));
    }

    #[test]
    fn test_tie_keeps_first_candidate() {
        // Without overrides Lucro Real prices exactly like Lucro Presumido.
        let candidates = [TaxRegime::LucroPresumido, TaxRegime::LucroReal];
        let result = compare(&items(), &params(), &candidates);
        assert_eq!(result.best, Some(TaxRegime::LucroPresumido));

        let reversed = [TaxRegime::LucroReal, TaxRegime::LucroPresumido];
        let result = compare(&items(), &params(), &reversed);
        assert_eq!(result.best, Some(TaxRegime::LucroReal));
    }

    #[test]
    fn test_duplicate_candidates_skipped() {
        let candidates = [
            TaxRegime::LucroReal,
            TaxRegime::LucroReal,
            TaxRegime::SimplesNacionalStandard,
        ];
        let result = compare(&items(), &params(), &candidates);
        assert_eq!(result.scenarios.len(), 2);
    }

    #[test]
    fn test_infeasible_scenario_never_wins() {
        // Simples at 90% is infeasible; both VAT regimes make a loss.
        let p = GlobalParameters {
            target_profit_margin: Percent::zero(),
            simples_nacional_rate: Percent::from_percentage(90.0),
            variable_expenses: vec![NamedRate::new("Taxas", Percent::from_percentage(10.0))],
            fixed_expenses: vec![NamedAmount::new("Aluguel", Money::from_reais(1_000_000.0))],
            total_stock_units: 0.0,
            ..params()
        };
        let result = compare(&items(), &p, &TaxRegime::DEFAULT_CANDIDATES);

        let simples = result.scenario(TaxRegime::SimplesNacionalStandard).unwrap();
        assert!(!simples.summary.is_feasible());
        assert!(simples.summary.total_profit.is_zero());
        assert_eq!(result.best, Some(TaxRegime::LucroPresumido));
        assert!(result.best_scenario().unwrap().summary.total_profit.is_negative());
    }

    #[test]
    fn test_no_feasible_candidate() {
        let p = GlobalParameters {
            loss_percentage: Percent::from_percentage(100.0),
            ..params()
        };
        let result = compare(&items(), &p, &TaxRegime::ALL);
        assert_eq!(result.scenarios.len(), 4);
        assert_eq!(result.best, None);
        assert!(result.best_scenario().is_none());
        assert!(result.profit_gap_to_best(TaxRegime::LucroReal).is_none());
    }

    #[test]
    fn test_no_candidates() {
        let result = compare(&items(), &params(), &[]);
        assert!(result.scenarios.is_empty());
        assert_eq!(result.best, None);
    }

    #[test]
    fn test_minimum_viable_forces_zero_margin() {
        let p = params();
        let normal = compare(&items(), &p, &TaxRegime::DEFAULT_CANDIDATES);
        let minimum = compare_minimum_viable(&items(), &p, &TaxRegime::DEFAULT_CANDIDATES);

        assert!(minimum.profit_margin.is_zero());
        assert_eq!(normal.profit_margin.percentage(), 10.0);
        for regime in TaxRegime::DEFAULT_CANDIDATES {
            let n = normal.scenario(regime).unwrap();
            let m = minimum.scenario(regime).unwrap();
            assert!(m.summary.total_selling < n.summary.total_selling);
            assert!(m.summary.profit_margin.is_zero());
        }
        // The caller's parameters are untouched.
        assert_eq!(p.target_profit_margin.percentage(), 10.0);
    }

    #[test]
    fn test_hybrid_can_be_compared() {
        let p = GlobalParameters {
            simples_nacional_remanescente_rate: Percent::from_percentage(3.0),
            ..params()
        };
        let result = compare(&items(), &p, &[TaxRegime::SimplesNacionalHybrid]);
        let hybrid = result.scenario(TaxRegime::SimplesNacionalHybrid).unwrap();
        assert!(hybrid.summary.taxes.iva_credit_for_buyer.is_positive());
        assert_eq!(result.best, Some(TaxRegime::SimplesNacionalHybrid));
    }
}
