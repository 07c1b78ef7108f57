//! # Regime Rules
//!
//! Turns a tax regime and its rate parameters into the percentage terms
//! used by the markup divisor formula.
//!
//! ## One Skeleton, Four Regimes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   price     = base / (1 - markup term)                                  │
//! │   min price = base / (1 - min price term)                               │
//! │                                                                         │
//! │   Regime              markup term                     min price term    │
//! │   ─────────────────   ─────────────────────────────   ───────────────── │
//! │   Lucro Presumido     (var+irpj+csll+m)/100+CBS+IBS   var/100+CBS+IBS   │
//! │   Lucro Real          (var+irpj+csll+m)/100+CBS+IBS   var/100+CBS+IBS   │
//! │   Simples standard    (var+simples+m)/100             (var+simples)/100 │
//! │   Simples hybrid      (var+rem+m)/100+CBS+IBS         (var+rem)/100     │
//! │                                                       +CBS+IBS          │
//! │                                                                         │
//! │   var = Σ variable expenses, m = target margin, rem = remanescente      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The pricing formulas live once in [`crate::pricing`]; everything that
//! differs between regimes is assembled here.

use serde::{Deserialize, Serialize};

use crate::types::{GlobalParameters, TaxRegime};
use crate::{CBS_RATE, IBS_RATE, MIN_MARKUP_DIVISOR};

// =============================================================================
// Regime Factors
// =============================================================================

/// Percentage terms and applicable tax lines for one regime.
///
/// All terms are fractions (0-1 domain): the user rates have already been
/// divided by 100 and the CBS/IBS constants added where they apply.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegimeFactors {
    /// Σ of every percentage-of-price charge, profit margin included.
    pub markup_percent_term: f64,

    /// Same as the markup term without the profit margin or, for the
    /// presumed/actual profit regimes, IRPJ/CSLL.
    pub min_price_divisor_term: f64,

    /// Tax share of the selling price (gross, before credits).
    pub tax_term: f64,

    /// CBS and IBS are debited on the selling price.
    pub applies_cbs_ibs_debit: bool,

    /// IRPJ and CSLL are charged on revenue.
    pub applies_irpj_csll: bool,

    /// A Simples Nacional share is charged on revenue.
    pub applies_simples: bool,
}

impl RegimeFactors {
    /// `1 - markup term`.
    #[inline]
    pub fn markup_divisor(&self) -> f64 {
        1.0 - self.markup_percent_term
    }

    /// `1 - min price term`.
    #[inline]
    pub fn min_price_divisor(&self) -> f64 {
        1.0 - self.min_price_divisor_term
    }

    /// True when a finite selling price exists.
    ///
    /// Divisors at or below [`MIN_MARKUP_DIVISOR`] count as zero so that
    /// rounding residue from summing rates never yields an absurd price.
    #[inline]
    pub fn is_feasible(&self) -> bool {
        self.markup_divisor() > MIN_MARKUP_DIVISOR
    }
}

/// Assembles the factors for `regime` from `params`.
///
/// `params.tax_regime` is ignored so that a comparison can evaluate any
/// regime against the same parameter set.
///
/// ## Example
/// ```rust
/// use precifica_core::regime::regime_factors;
/// use precifica_core::types::{GlobalParameters, Percent, TaxRegime};
///
/// let params = GlobalParameters {
///     target_profit_margin: Percent::from_percentage(9.5),
///     ..GlobalParameters::default()
/// };
/// let factors = regime_factors(TaxRegime::LucroPresumido, &params);
/// assert!((factors.markup_divisor() - 0.6172).abs() < 1e-9);
/// ```
pub fn regime_factors(regime: TaxRegime, params: &GlobalParameters) -> RegimeFactors {
    let variable = params.variable_expenses_percent().percentage();
    let margin = params.target_profit_margin.percentage();
    let cbs_ibs = CBS_RATE + IBS_RATE;

    match regime {
        TaxRegime::LucroPresumido | TaxRegime::LucroReal => {
            let (irpj, csll) = params.irpj_csll_for(regime);
            let (irpj, csll) = (irpj.percentage(), csll.percentage());
            RegimeFactors {
                markup_percent_term: (variable + irpj + csll + margin) / 100.0 + cbs_ibs,
                min_price_divisor_term: variable / 100.0 + cbs_ibs,
                tax_term: (irpj + csll) / 100.0 + cbs_ibs,
                applies_cbs_ibs_debit: true,
                applies_irpj_csll: true,
                applies_simples: false,
            }
        }
        TaxRegime::SimplesNacionalStandard => {
            let simples = params.simples_rate_for(regime).percentage();
            RegimeFactors {
                markup_percent_term: (variable + simples + margin) / 100.0,
                min_price_divisor_term: (variable + simples) / 100.0,
                tax_term: simples / 100.0,
                applies_cbs_ibs_debit: false,
                applies_irpj_csll: false,
                applies_simples: true,
            }
        }
        TaxRegime::SimplesNacionalHybrid => {
            let remanescente = params.simples_rate_for(regime).percentage();
            RegimeFactors {
                markup_percent_term: (variable + remanescente + margin) / 100.0 + cbs_ibs,
                min_price_divisor_term: (variable + remanescente) / 100.0 + cbs_ibs,
                tax_term: remanescente / 100.0 + cbs_ibs,
                applies_cbs_ibs_debit: true,
                applies_irpj_csll: false,
                applies_simples: true,
            }
        }
    }
}

/// Blended tax ratio used for the portfolio break-even point.
///
/// IRPJ/CSLL are left out: break-even is measured against the VAT and
/// Simples charges only.
pub fn break_even_tax_ratio(regime: TaxRegime, params: &GlobalParameters) -> f64 {
    match regime {
        TaxRegime::LucroPresumido | TaxRegime::LucroReal => CBS_RATE + IBS_RATE,
        TaxRegime::SimplesNacionalStandard => params.simples_rate_for(regime).fraction(),
        TaxRegime::SimplesNacionalHybrid => {
            params.simples_rate_for(regime).fraction() + CBS_RATE + IBS_RATE
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NamedRate, Percent};

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn params() -> GlobalParameters {
        GlobalParameters {
            target_profit_margin: Percent::from_percentage(10.0),
            variable_expenses: vec![NamedRate::new("Cartão", Percent::from_percentage(5.0))],
            simples_nacional_rate: Percent::from_percentage(6.0),
            simples_nacional_remanescente_rate: Percent::from_percentage(3.0),
            ..GlobalParameters::default()
        }
    }

    #[test]
    fn test_presumido_terms() {
        let f = regime_factors(TaxRegime::LucroPresumido, &params());
        assert!(approx_eq(f.markup_percent_term, 0.1728 + 0.265));
        assert!(approx_eq(f.min_price_divisor_term, 0.05 + 0.265));
        assert!(approx_eq(f.tax_term, 0.0228 + 0.265));
        assert!(f.applies_cbs_ibs_debit && f.applies_irpj_csll && !f.applies_simples);
    }

    #[test]
    fn test_real_uses_override_rates() {
        let mut p = params();
        p.lucro_real_irpj_rate = Some(Percent::from_percentage(3.0));
        p.lucro_real_csll_rate = Some(Percent::from_percentage(2.0));

        let real = regime_factors(TaxRegime::LucroReal, &p);
        let presumido = regime_factors(TaxRegime::LucroPresumido, &p);
        assert!(approx_eq(real.markup_percent_term, 0.20 + 0.265));
        assert!(approx_eq(presumido.markup_percent_term, 0.1728 + 0.265));
        assert!(approx_eq(real.min_price_divisor_term, presumido.min_price_divisor_term));
    }

    #[test]
    fn test_simples_standard_has_no_vat() {
        let f = regime_factors(TaxRegime::SimplesNacionalStandard, &params());
        assert!(approx_eq(f.markup_percent_term, 0.21));
        assert!(approx_eq(f.min_price_divisor_term, 0.11));
        assert!(approx_eq(f.tax_term, 0.06));
        assert!(!f.applies_cbs_ibs_debit && !f.applies_irpj_csll && f.applies_simples);
    }

    #[test]
    fn test_simples_hybrid_adds_vat() {
        let f = regime_factors(TaxRegime::SimplesNacionalHybrid, &params());
        assert!(approx_eq(f.markup_percent_term, 0.18 + 0.265));
        assert!(approx_eq(f.min_price_divisor_term, 0.08 + 0.265));
        assert!(f.applies_cbs_ibs_debit && f.applies_simples);
    }

    #[test]
    fn test_regime_argument_wins_over_params() {
        let p = params().with_regime(TaxRegime::LucroReal);
        let f = regime_factors(TaxRegime::SimplesNacionalStandard, &p);
        assert!(!f.applies_cbs_ibs_debit);
    }

    #[test]
    fn test_feasibility_boundary() {
        let mut p = GlobalParameters {
            simples_nacional_rate: Percent::from_percentage(10.0),
            variable_expenses: vec![NamedRate::new("Taxas", Percent::from_percentage(50.0))],
            target_profit_margin: Percent::from_percentage(40.0),
            ..GlobalParameters::default()
        };
        let f = regime_factors(TaxRegime::SimplesNacionalStandard, &p);
        assert_eq!(f.markup_divisor(), 0.0);
        assert!(!f.is_feasible());

        p.target_profit_margin = Percent::from_percentage(39.9999);
        assert!(regime_factors(TaxRegime::SimplesNacionalStandard, &p).is_feasible());
    }

    #[test]
    fn test_break_even_tax_ratio() {
        let p = params();
        assert!(approx_eq(break_even_tax_ratio(TaxRegime::LucroReal, &p), 0.265));
        assert!(approx_eq(
            break_even_tax_ratio(TaxRegime::SimplesNacionalStandard, &p),
            0.06
        ));
        assert!(approx_eq(
            break_even_tax_ratio(TaxRegime::SimplesNacionalHybrid, &p),
            0.295
        ));
    }
}
