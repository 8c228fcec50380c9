//! Running state of a monthly cash-flow simulation

use crate::params::{ProjectParameters, YearMonth};

/// Position and accumulators while walking the projection horizon
#[derive(Debug, Clone)]
pub struct ProjectionState {
    /// Zero-based index of the month being computed
    pub month_index: u32,

    /// Calendar anchor of month 0
    pub start_date: YearMonth,

    /// Undiscounted sum of net cash flow since month 0 (never reset)
    pub cumulative_cash_flow: f64,
}

impl ProjectionState {
    /// Initialize state at the first month of a projection
    pub fn from_parameters(params: &ProjectParameters) -> Self {
        Self {
            month_index: 0,
            start_date: params.start_date,
            cumulative_cash_flow: 0.0,
        }
    }

    /// Calendar month of the current index
    pub fn date(&self) -> YearMonth {
        self.start_date.add_months(self.month_index)
    }

    /// Add this month's net cash flow, returning the new running total
    pub fn accumulate(&mut self, net_cash_flow: f64) -> f64 {
        self.cumulative_cash_flow += net_cash_flow;
        self.cumulative_cash_flow
    }

    /// Advance to next month
    pub fn advance_month(&mut self) {
        self.month_index += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_walks_calendar() {
        let params = ProjectParameters::default();
        let mut state = ProjectionState::from_parameters(&params);
        assert_eq!(state.date().label(), "2025/12");

        state.advance_month();
        assert_eq!(state.month_index, 1);
        assert_eq!(state.date().label(), "2026/01");
    }

    #[test]
    fn test_accumulate_may_decrease() {
        let params = ProjectParameters::default();
        let mut state = ProjectionState::from_parameters(&params);
        assert_eq!(state.accumulate(500.0), 500.0);
        assert_eq!(state.accumulate(-800.0), -300.0);
    }
}
