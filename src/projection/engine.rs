//! Core projection engine for monthly lease cash flows

use log::debug;
use serde::{Deserialize, Serialize};

use super::cashflows::{BreakEven, MonthlyRecord, PartyReturn, ProjectionResult};
use super::discount::DiscountRate;
use super::irr::{annualized_irr_pct, calculate_irr, DEFAULT_IRR_GUESS};
use super::overrides::OverrideMap;
use super::rounding::{finite_or_zero, round_half_up, round_to};
use super::state::ProjectionState;
use crate::params::{Party, ProjectParameters};

/// Zero-based month index from which default income is stepped down
pub const INCOME_STEP_DOWN_MONTH: u32 = 12;

/// Income multiplier applied from [`INCOME_STEP_DOWN_MONTH`] onward (one-time)
pub const INCOME_STEP_DOWN_FACTOR: f64 = 0.95;

/// Which profit figure is divided between the two contributors
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfitBasis {
    /// Final cumulative cash flow minus upfront cost
    #[default]
    Cumulative,
    /// Average monthly net income times the horizon
    Blended,
}

/// Configuration for a projection run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionConfig {
    /// Starting monthly rate for the IRR solver
    pub initial_irr_guess: f64,

    /// Profit figure used for the profit-share split
    pub profit_basis: ProfitBasis,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            initial_irr_guess: DEFAULT_IRR_GUESS,
            profit_basis: ProfitBasis::Cumulative,
        }
    }
}

/// Main projection engine. Holds no state between calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectionEngine {
    config: ProjectionConfig,
}

impl ProjectionEngine {
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Full projection: monthly schedule plus aggregate metrics
    pub fn project(&self, params: &ProjectParameters, overrides: &OverrideMap) -> ProjectionResult {
        let records = self.simulate(params, overrides);
        let result = self.summarize(records, params);
        debug!(
            "projected '{}': {} months, {} adjusted, break-even {:?}, IRR {:.2}%",
            params.project_name,
            result.monthly_data.len(),
            result.adjusted_months,
            result.break_even.month(),
            result.irr_annual_pct
        );
        result
    }

    /// Month-by-month schedule for months `0..contract_months`
    pub fn simulate(&self, params: &ProjectParameters, overrides: &OverrideMap) -> Vec<MonthlyRecord> {
        let mut records = Vec::with_capacity(params.contract_months as usize);
        let mut state = ProjectionState::from_parameters(params);

        for _ in 0..params.contract_months {
            records.push(self.calculate_month(params, overrides, &mut state));
            state.advance_month();
        }

        records
    }

    /// Calculate cash flows for a single month
    fn calculate_month(
        &self,
        params: &ProjectParameters,
        overrides: &OverrideMap,
        state: &mut ProjectionState,
    ) -> MonthlyRecord {
        let i = state.month_index;

        let default_expense = params.phase_rent(i) + params.base_monthly_expense();
        let default_income = if i >= INCOME_STEP_DOWN_MONTH {
            round_half_up(params.monthly_income * INCOME_STEP_DOWN_FACTOR)
        } else {
            params.monthly_income
        };

        let manual = overrides.get(i);
        let income = manual.and_then(|o| o.income).unwrap_or(default_income);
        let expense = manual.and_then(|o| o.expense).unwrap_or(default_expense);

        let net_cash_flow = income - expense;
        let cumulative_cash_flow = state.accumulate(net_cash_flow);

        MonthlyRecord {
            month: i + 1,
            date: state.date().label(),
            income,
            expense,
            net_cash_flow,
            cumulative_cash_flow,
            is_overridden: manual.is_some_and(|o| !o.is_empty()),
        }
    }

    /// Aggregate metrics over a simulated schedule
    pub fn summarize(&self, records: Vec<MonthlyRecord>, params: &ProjectParameters) -> ProjectionResult {
        let months = params.contract_months as f64;
        let has_horizon = params.contract_months > 0;
        let upfront = params.actual_upfront_cost;

        let total_revenue: f64 = records.iter().map(|r| r.income).sum();
        let total_expense: f64 = records.iter().map(|r| r.expense).sum();
        let final_cumulative = records.last().map(|r| r.cumulative_cash_flow).unwrap_or(0.0);

        let break_even = records
            .iter()
            .find(|r| r.cumulative_cash_flow >= upfront)
            .map(|r| BreakEven::Achieved {
                month: r.month,
                date: r.date.clone(),
            })
            .unwrap_or(BreakEven::NotAchieved);

        // Discounting and IRR
        let net_flows: Vec<f64> = records.iter().map(|r| r.net_cash_flow).collect();
        let npv = DiscountRate::from_annual_pct(params.discount_rate_annual).npv(upfront, &net_flows);

        let mut irr_flows = Vec::with_capacity(net_flows.len() + 1);
        irr_flows.push(-upfront);
        irr_flows.extend_from_slice(&net_flows);
        let irr_monthly = calculate_irr(&irr_flows, self.config.initial_irr_guess);

        // Averages
        let (monthly_amortization, average_monthly_total_cost, average_monthly_net_income) =
            if has_horizon {
                let amortization = round_half_up(upfront / months);
                (
                    amortization,
                    round_half_up(total_expense / months + amortization),
                    round_half_up((total_revenue - total_expense - upfront) / months),
                )
            } else {
                (0.0, 0.0, 0.0)
            };

        let cost_ratio = if total_revenue > 0.0 {
            round_to((total_expense + upfront) / total_revenue * 100.0, 1)
        } else {
            0.0
        };

        // Profit sharing
        let real_net_profit = final_cumulative - upfront;
        let blended_net_profit = average_monthly_net_income * months;
        let distributable_profit = match self.config.profit_basis {
            ProfitBasis::Cumulative => real_net_profit,
            ProfitBasis::Blended => blended_net_profit,
        };

        let returns_for = |party: Party| {
            party_return(
                upfront,
                params.capital_injection_split.share(party),
                params.profit_share_split.share(party),
                distributable_profit,
                params.contract_months,
            )
        };

        ProjectionResult {
            break_even,
            total_revenue,
            total_expense,
            real_net_profit,
            blended_net_profit,
            distributable_profit,
            investor: returns_for(Party::Investor),
            operator: returns_for(Party::Operator),
            monthly_amortization,
            average_monthly_total_cost,
            average_monthly_net_income,
            cost_ratio,
            npv: finite_or_zero(round_half_up(npv)),
            irr_monthly,
            irr_annual_pct: annualized_irr_pct(irr_monthly),
            adjusted_months: records.iter().filter(|r| r.is_overridden).count(),
            monthly_data: records,
        }
    }
}

/// Principal, profit share (no loss distribution), and annualized ROI
fn party_return(
    upfront_cost: f64,
    injection_pct: f64,
    profit_pct: f64,
    distributable_profit: f64,
    contract_months: u32,
) -> PartyReturn {
    let principal = upfront_cost * injection_pct / 100.0;
    let profit_share = distributable_profit.max(0.0) * profit_pct / 100.0;
    let years = contract_months as f64 / 12.0;

    let annualized_roi = if principal > 0.0 && years > 0.0 {
        round_to((profit_share / principal) / years * 100.0, 1)
    } else {
        0.0
    };

    PartyReturn {
        principal,
        profit_share,
        annualized_roi,
    }
}
