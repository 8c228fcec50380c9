use approx::assert_abs_diff_eq;
use proptest::prelude::*;

use lease_roi::params::NumericInput;
use lease_roi::{
    BreakEven, OverrideField, OverrideMap, Party, ProjectParameters, ProjectionEngine, RawParameters, Split,
};

/// Reference NPV: plain loop, month t discounted by (1 + r)^(t+1)
fn reference_npv(params: &ProjectParameters, flows: &[f64]) -> f64 {
    let rate = params.discount_rate_annual / 100.0 / 12.0;
    let mut total = -params.actual_upfront_cost;
    for (t, flow) in flows.iter().enumerate() {
        total += flow / (1.0 + rate).powi(t as i32 + 1);
    }
    total
}

/// Reference IRR by bisection on a bracket with a sign change
fn reference_irr(flows: &[f64]) -> Option<f64> {
    let npv = |r: f64| {
        flows
            .iter()
            .enumerate()
            .map(|(t, cf)| cf / (1.0 + r).powi(t as i32))
            .sum::<f64>()
    };
    let (mut lo, mut hi) = (-0.5, 1.0);
    if npv(lo).signum() == npv(hi).signum() {
        return None;
    }
    for _ in 0..200 {
        let mid = (lo + hi) / 2.0;
        if npv(mid).signum() == npv(lo).signum() {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    Some((lo + hi) / 2.0)
}

#[test]
fn test_zero_horizon_sentinels() {
    let params = ProjectParameters {
        contract_months: 0,
        ..Default::default()
    };
    let result = ProjectionEngine::default().project(&params, &OverrideMap::new());

    assert!(result.monthly_data.is_empty());
    assert_eq!(result.monthly_amortization, 0.0);
    assert_eq!(result.average_monthly_total_cost, 0.0);
    assert_eq!(result.average_monthly_net_income, 0.0);
    assert_eq!(result.cost_ratio, 0.0);
    assert_eq!(result.investor.annualized_roi, 0.0);
    assert_eq!(result.operator.annualized_roi, 0.0);
    assert_eq!(result.break_even, BreakEven::NotAchieved);
    assert_eq!(result.irr_annual_pct, 0.0);
}

#[test]
fn test_reference_scenario_flows() {
    let params = ProjectParameters::default();
    assert_eq!(params.base_monthly_expense(), 5000.0);

    let records = ProjectionEngine::default().simulate(&params, &OverrideMap::new());
    assert_eq!(records.len(), 60);
    assert_eq!(records[0].net_cash_flow, 45_000.0);
    assert_eq!(records[11].net_cash_flow, 45_000.0);
    assert_eq!(records[12].net_cash_flow, 41_000.0);
    assert_eq!(records[24].net_cash_flow, 36_000.0);
    assert_eq!(records[59].date, "2030/11");

    // Income exceeds expense every month, so the running total rises strictly
    for pair in records.windows(2) {
        assert!(pair[1].cumulative_cash_flow > pair[0].cumulative_cash_flow);
    }
}

#[test]
fn test_reference_scenario_npv_and_irr() {
    let params = ProjectParameters::default();
    let result = ProjectionEngine::default().project(&params, &OverrideMap::new());

    let flows: Vec<f64> = result.monthly_data.iter().map(|r| r.net_cash_flow).collect();
    assert_abs_diff_eq!(result.npv, reference_npv(&params, &flows), epsilon = 1.0);

    let mut irr_flows = vec![-params.actual_upfront_cost];
    irr_flows.extend(&flows);
    match result.irr_monthly {
        Some(_) => {
            let reference = reference_irr(&irr_flows).unwrap();
            let reference_annual = ((1.0 + reference).powi(12) - 1.0) * 100.0;
            assert_abs_diff_eq!(result.irr_annual_pct, reference_annual, epsilon = 0.01);
        }
        None => assert_eq!(result.irr_annual_pct, 0.0),
    }
}

#[test]
fn test_break_even_is_first_crossing() {
    let params = ProjectParameters::default();
    let result = ProjectionEngine::default().project(&params, &OverrideMap::new());

    let month = result.break_even.month().unwrap() as usize;
    let data = &result.monthly_data;
    assert!(data[month - 1].cumulative_cash_flow >= params.actual_upfront_cost);
    if month > 1 {
        assert!(data[month - 2].cumulative_cash_flow < params.actual_upfront_cost);
    }
    assert_eq!(result.break_even.date(), Some(data[month - 1].date.as_str()));
}

#[test]
fn test_override_precedence() {
    let params = ProjectParameters::default();
    let engine = ProjectionEngine::default();
    let baseline = engine.simulate(&params, &OverrideMap::new());

    let mut overrides = OverrideMap::new();
    overrides.apply(30, OverrideField::Income, "12345.67");
    let records = engine.simulate(&params, &overrides);

    assert_eq!(records[30].income, 12345.67);
    assert_eq!(records[30].expense, baseline[30].expense);
    assert!(records[30].is_overridden);
    assert!(!records[29].is_overridden);
    assert_eq!(records[29], baseline[29]);
}

#[test]
fn test_losses_are_not_shared() {
    let params = ProjectParameters {
        monthly_income: 30_000.0,
        ..Default::default()
    };
    let result = ProjectionEngine::default().project(&params, &OverrideMap::new());

    assert!(result.real_net_profit <= 0.0);
    assert_eq!(result.investor.profit_share, 0.0);
    assert_eq!(result.operator.profit_share, 0.0);
    assert_eq!(result.break_even, BreakEven::NotAchieved);
}

#[test]
fn test_clearing_override_removes_month() {
    let mut overrides = OverrideMap::new();
    overrides.apply(4, OverrideField::Income, "100");
    overrides.apply(4, OverrideField::Expense, "50");
    overrides.apply(8, OverrideField::Income, "1");
    let before = overrides.len();

    overrides.apply(4, OverrideField::Income, "");
    overrides.apply(4, OverrideField::Expense, "");
    assert_eq!(overrides.len(), before - 1);
    assert!(overrides.get(4).is_none());
}

#[test]
fn test_raw_document_projects_like_typed_defaults() {
    let raw: RawParameters = serde_json::from_str(r#"{"projectName": "Raw", "contractMonths": "60"}"#).unwrap();
    let params = raw.sanitize();
    assert_eq!(params.project_name, "Raw");

    let engine = ProjectionEngine::default();
    let from_raw = engine.project(&params, &OverrideMap::new());
    let from_defaults = engine.project(&ProjectParameters::default(), &OverrideMap::new());
    assert_eq!(from_raw.monthly_data, from_defaults.monthly_data);
    assert_eq!(from_raw.npv, from_defaults.npv);
}

#[test]
fn test_numeric_text_coercion() {
    assert_eq!(NumericInput::from("36 months").as_whole(), 36.0);
    assert_eq!(NumericInput::from("2.5%").as_decimal(), 2.5);
    assert_eq!(NumericInput::from(-10.0).as_whole(), 0.0);
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(64))]

    #[test]
    fn prop_split_edits_sum_to_100(
        start in -50.0f64..150.0,
        edit in -50.0f64..150.0,
        operator_side in any::<bool>(),
    ) {
        let mut split = Split::new(start);
        prop_assert_eq!(split.investor() + split.operator(), 100.0);

        let party = if operator_side { Party::Operator } else { Party::Investor };
        split.set(party, edit);
        prop_assert_eq!(split.investor() + split.operator(), 100.0);
        prop_assert!(split.share(party) >= 0.0 && split.share(party) <= 100.0);
    }

    #[test]
    fn prop_simulate_is_idempotent(
        contract_months in 0u32..120,
        phase1_months in 0u32..120,
        income in 0u32..200_000,
        override_month in 0u32..120,
        override_value in 0u32..100_000,
    ) {
        let params = ProjectParameters {
            contract_months,
            phase1_months,
            monthly_income: income as f64,
            ..Default::default()
        };
        let mut overrides = OverrideMap::new();
        overrides.set(override_month, OverrideField::Expense, Some(override_value as f64));

        let engine = ProjectionEngine::default();
        let first = engine.simulate(&params, &overrides);
        let second = engine.simulate(&params, &overrides);
        prop_assert_eq!(first.len(), contract_months as usize);
        prop_assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
