//! Projection output structures

use std::io;

use serde::{Deserialize, Serialize};

use crate::params::Party;

/// A single row of projection output for one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRecord {
    /// 1-indexed month number
    pub month: u32,
    /// Calendar label, `YYYY/MM`
    pub date: String,

    pub income: f64,
    pub expense: f64,
    pub net_cash_flow: f64,

    /// Undiscounted running total since month 1, not netted against upfront cost
    pub cumulative_cash_flow: f64,

    /// Income or expense came from a manual override
    pub is_overridden: bool,
}

/// When cumulative cash flow first recovers the upfront cost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BreakEven {
    Achieved {
        /// 1-indexed months to break even
        month: u32,
        date: String,
    },
    NotAchieved,
}

impl BreakEven {
    pub fn is_achieved(&self) -> bool {
        matches!(self, BreakEven::Achieved { .. })
    }

    pub fn month(&self) -> Option<u32> {
        match self {
            BreakEven::Achieved { month, .. } => Some(*month),
            BreakEven::NotAchieved => None,
        }
    }

    pub fn date(&self) -> Option<&str> {
        match self {
            BreakEven::Achieved { date, .. } => Some(date),
            BreakEven::NotAchieved => None,
        }
    }
}

/// Capital returned to and profit earned by one contributor
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PartyReturn {
    /// Share of the upfront cost this party injected
    pub principal: f64,
    /// Share of distributable profit (never negative)
    pub profit_share: f64,
    /// Annualized ROI in percent, 1 decimal
    pub annualized_roi: f64,
}

/// Complete projection result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub break_even: BreakEven,

    pub total_revenue: f64,
    pub total_expense: f64,

    /// Final cumulative cash flow minus upfront cost
    pub real_net_profit: f64,
    /// `average_monthly_net_income * contract_months`
    pub blended_net_profit: f64,
    /// Profit figure the shares were computed from (depends on profit basis)
    pub distributable_profit: f64,

    pub investor: PartyReturn,
    pub operator: PartyReturn,

    pub monthly_amortization: f64,
    pub average_monthly_total_cost: f64,
    pub average_monthly_net_income: f64,
    /// (total expense + upfront cost) / total revenue, percent, 1 decimal
    pub cost_ratio: f64,

    /// Rounded to the nearest unit
    pub npv: f64,
    /// Monthly IRR, `None` when the solver did not converge
    pub irr_monthly: Option<f64>,
    /// Annualized IRR in percent, 2 decimals; 0 when undefined
    pub irr_annual_pct: f64,

    /// Months whose values came from a manual override
    pub adjusted_months: usize,

    /// Monthly schedule
    pub monthly_data: Vec<MonthlyRecord>,
}

impl ProjectionResult {
    pub fn party(&self, party: Party) -> &PartyReturn {
        match party {
            Party::Investor => &self.investor,
            Party::Operator => &self.operator,
        }
    }

    /// Headline figures stored alongside a saved project
    pub fn summary(&self) -> ProjectionSummary {
        ProjectionSummary {
            roi: self.investor.annualized_roi,
            net_profit: self.real_net_profit,
        }
    }
}

/// Headline figures for a project listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionSummary {
    /// Investor annualized ROI, percent
    pub roi: f64,
    pub net_profit: f64,
}

/// Write the monthly schedule as CSV with a header row
pub fn write_schedule_csv<W: io::Write>(records: &[MonthlyRecord], writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(month: u32, net: f64, cumulative: f64) -> MonthlyRecord {
        MonthlyRecord {
            month,
            date: format!("2026/{month:02}"),
            income: net + 100.0,
            expense: 100.0,
            net_cash_flow: net,
            cumulative_cash_flow: cumulative,
            is_overridden: month == 2,
        }
    }

    #[test]
    fn test_schedule_csv() {
        let records = vec![record(1, 50.0, 50.0), record(2, 25.5, 75.5)];
        let mut buffer = Vec::new();
        write_schedule_csv(&records, &mut buffer).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "month,date,income,expense,net_cash_flow,cumulative_cash_flow,is_overridden"
        );
        assert_eq!(lines[1], "1,2026/01,150.0,100.0,50.0,50.0,false");
        assert_eq!(lines[2], "2,2026/02,125.5,100.0,25.5,75.5,true");
    }

    #[test]
    fn test_break_even_accessors() {
        let hit = BreakEven::Achieved {
            month: 30,
            date: "2028/05".to_string(),
        };
        assert_eq!(hit.month(), Some(30));
        assert_eq!(hit.date(), Some("2028/05"));
        assert!(!BreakEven::NotAchieved.is_achieved());

        let json = serde_json::to_string(&BreakEven::NotAchieved).unwrap();
        assert_eq!(json, r#"{"status":"not_achieved"}"#);
    }
}
