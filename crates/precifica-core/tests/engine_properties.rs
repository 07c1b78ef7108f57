//! Property-based tests for the pricing engine invariants.
//!
//! Run with: `cargo test -p precifica-core --test engine_properties`

use precifica_core::*;
use proptest::prelude::*;

// ── Proptest Strategies ─────────────────────────────────────────────────────

fn arb_regime() -> impl Strategy<Value = TaxRegime> {
    prop::sample::select(TaxRegime::ALL.to_vec())
}

fn arb_item() -> impl Strategy<Value = LineItem> {
    (
        1u32..100_000u32,
        0u32..500u32,
        1u32..48u32,
        0.0f64..5.0,
        0.0f64..5.0,
        0.0f64..20.0,
    )
        .prop_map(|(cents, qty, inner, pis, cofins, icms)| {
            LineItem::new(
                format!("SKU-{}", cents),
                "Produto",
                Money::from_reais(cents as f64 / 100.0),
                qty as f64,
            )
            .with_inner_units(inner as f64)
            .with_credits(
                Money::from_reais(pis),
                Money::from_reais(cofins),
                Money::from_reais(icms),
            )
        })
}

/// Parameters that always leave the markup divisor positive.
fn arb_params() -> impl Strategy<Value = GlobalParameters> {
    (
        0.0f64..30.0,
        0.0f64..20.0,
        0.0f64..50.0,
        0.0f64..10_000.0,
        0.0f64..50_000.0,
        arb_regime(),
        0.0f64..15.0,
        0.0f64..10.0,
    )
        .prop_map(
            |(margin, variable, loss, stock, fixed, regime, simples, remanescente)| {
                GlobalParameters {
                    target_profit_margin: Percent::from_percentage(margin),
                    fixed_expenses: vec![NamedAmount::new("Fixas", Money::from_reais(fixed))],
                    variable_expenses: vec![NamedRate::new(
                        "Variáveis",
                        Percent::from_percentage(variable),
                    )],
                    total_stock_units: stock,
                    loss_percentage: Percent::from_percentage(loss),
                    tax_regime: regime,
                    simples_nacional_rate: Percent::from_percentage(simples),
                    simples_nacional_remanescente_rate: Percent::from_percentage(remanescente),
                    ..GlobalParameters::default()
                }
            },
        )
}

/// Margin that makes the markup term exactly 100% for `params`' regime.
fn boundary_margin(params: &GlobalParameters) -> f64 {
    let without_margin = params.with_profit_margin(Percent::zero());
    let term = regime_factors(params.tax_regime, &without_margin).markup_percent_term;
    100.0 - term * 100.0
}

// ── Properties ──────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn selling_price_strictly_increases_with_margin(
        item in arb_item(),
        params in arb_params(),
        delta in 0.1f64..10.0,
    ) {
        let cfu = fixed_cost_per_unit(&params);
        let lower = price(&item, &params, cfu);
        let raised = params.with_profit_margin(Percent::from_percentage(
            params.target_profit_margin.percentage() + delta,
        ));
        let higher = price(&item, &raised, cfu);

        prop_assert!(lower.is_feasible() && higher.is_feasible());
        prop_assert!(higher.selling_price > lower.selling_price);
    }

    #[test]
    fn hundred_percent_of_charges_is_infeasible(
        item in arb_item(),
        params in arb_params(),
    ) {
        let margin = boundary_margin(&params);
        let cfu = fixed_cost_per_unit(&params);

        let exact = params.with_profit_margin(Percent::from_percentage(margin));
        let over = params.with_profit_margin(Percent::from_percentage(margin + 0.0001));
        let under = params.with_profit_margin(Percent::from_percentage(margin - 0.0001));

        prop_assert_eq!(price(&item, &exact, cfu).status, PriceStatus::PriceInfeasible);
        prop_assert_eq!(price(&item, &over, cfu).status, PriceStatus::PriceInfeasible);

        let feasible = price(&item, &under, cfu);
        prop_assert_eq!(feasible.status, PriceStatus::Ok);
        prop_assert!(feasible.selling_price.is_finite());
        prop_assert!(feasible.selling_price.is_positive());
    }

    #[test]
    fn total_loss_is_always_infeasible(
        item in arb_item(),
        params in arb_params(),
        loss in 100.0f64..200.0,
    ) {
        let params = GlobalParameters {
            loss_percentage: Percent::from_percentage(loss),
            ..params
        };
        let result = price(&item, &params, fixed_cost_per_unit(&params));

        prop_assert_eq!(result.status, PriceStatus::PriceInfeasible);
        prop_assert!(result.selling_price.is_zero());
        prop_assert!(result.base_cost_for_markup.is_finite());
    }

    #[test]
    fn per_inner_unit_round_trips(item in arb_item(), params in arb_params()) {
        let result = price(&item, &params, fixed_cost_per_unit(&params));
        let units = item.inner_units();
        let rebuilt = result.per_inner_unit.selling_price.value() * units;
        let expected = result.selling_price.value();

        prop_assert!((rebuilt - expected).abs() <= 1e-9 * expected.abs().max(1.0));
    }

    #[test]
    fn net_tax_is_never_negative(item in arb_item(), params in arb_params()) {
        let result = price(&item, &params, fixed_cost_per_unit(&params));
        let t = &result.taxes;

        prop_assert!(!t.cbs_to_pay.is_negative());
        prop_assert!(!t.ibs_to_pay.is_negative());
        prop_assert!(!t.total_tax.is_negative());
        prop_assert!(!t.unused_credit.is_negative());
    }

    #[test]
    fn composition_adds_up_to_price(item in arb_item(), params in arb_params()) {
        let result = price(&item, &params, fixed_cost_per_unit(&params));
        let total = result.composition.total().value();
        let expected = result.selling_price.value();

        prop_assert!((total - expected).abs() <= 1e-9 * expected.abs().max(1.0));
    }

    #[test]
    fn summary_total_equals_item_sum(
        items in prop::collection::vec(arb_item(), 0..20),
        params in arb_params(),
    ) {
        let priced = price_all(&items, &params);
        let summary = summarize_items(&priced, &params);
        let expected: Money = priced.iter().map(|c| c.line_selling_total()).sum();

        prop_assert_eq!(summary.total_selling, expected);
        prop_assert_eq!(summary.item_count, items.len());
    }

    #[test]
    fn comparison_is_deterministic(
        items in prop::collection::vec(arb_item(), 0..10),
        params in arb_params(),
    ) {
        let first = compare(&items, &params, &TaxRegime::DEFAULT_CANDIDATES);
        let second = compare(&items, &params, &TaxRegime::DEFAULT_CANDIDATES);

        prop_assert_eq!(first.best, second.best);
        prop_assert_eq!(first, second);
    }
}
