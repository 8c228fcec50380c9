//! Project parameter structures consumed by the projection engine

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default calendar anchor for new projects (2025-12)
pub const DEFAULT_START_YEAR: i32 = 2025;
pub const DEFAULT_START_MONTH: u32 = 12;

/// A calendar month, used as the anchor for month labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Create a year-month, `None` if month is outside 1..=12
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The month containing today's local date
    pub fn current() -> Self {
        Self::from_date(Local::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Calendar month `months` after this one
    pub fn add_months(self, months: u32) -> Self {
        let total = self.year as i64 * 12 + (self.month as i64 - 1) + months as i64;
        Self {
            year: total.div_euclid(12) as i32,
            month: total.rem_euclid(12) as u32 + 1,
        }
    }

    /// Schedule label, `YYYY/MM`
    pub fn label(&self) -> String {
        format!("{:04}/{:02}", self.year, self.month)
    }
}

impl Default for YearMonth {
    fn default() -> Self {
        Self {
            year: DEFAULT_START_YEAR,
            month: DEFAULT_START_MONTH,
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = String;

    /// Accepts `YYYY-MM` (storage form) and `YYYY/MM` (label form)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('/', "-");
        NaiveDate::parse_from_str(&format!("{normalized}-01"), "%Y-%m-%d")
            .map(Self::from_date)
            .map_err(|e| format!("invalid year-month '{s}': {e}"))
    }
}

impl TryFrom<String> for YearMonth {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}

/// One of the two capital contributors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Party {
    /// Financier ("fund" side)
    Investor,
    /// Operator ("manpower" side)
    Operator,
}

/// Percentage split between investor and operator; always sums to 100
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "SplitRecord")]
pub struct Split {
    investor: f64,
    operator: f64,
}

#[derive(Deserialize)]
struct SplitRecord {
    investor: f64,
}

impl From<SplitRecord> for Split {
    fn from(record: SplitRecord) -> Self {
        Split::new(record.investor)
    }
}

impl Split {
    /// Split with the given investor percentage; operator receives the rest
    pub fn new(investor_pct: f64) -> Self {
        let investor = clamp_pct(investor_pct);
        Self {
            investor,
            operator: 100.0 - investor,
        }
    }

    pub fn investor(&self) -> f64 {
        self.investor
    }

    pub fn operator(&self) -> f64 {
        self.operator
    }

    pub fn share(&self, party: Party) -> f64 {
        match party {
            Party::Investor => self.investor,
            Party::Operator => self.operator,
        }
    }

    /// Set one side; the other side becomes `100 - pct`
    pub fn set(&mut self, party: Party, pct: f64) {
        let pct = clamp_pct(pct);
        match party {
            Party::Investor => {
                self.investor = pct;
                self.operator = 100.0 - pct;
            }
            Party::Operator => {
                self.operator = pct;
                self.investor = 100.0 - pct;
            }
        }
    }

    /// Apply a text edit to one side. Non-numeric text leaves the split unchanged.
    pub fn set_from_text(&mut self, party: Party, raw: &str) -> bool {
        match super::input::leading_float(raw) {
            Some(pct) => {
                self.set(party, pct);
                true
            }
            None => false,
        }
    }
}

fn clamp_pct(pct: f64) -> f64 {
    if pct.is_finite() {
        pct.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Fully-numeric, defaulted parameter set for one projection
///
/// Built from raw input by [`super::RawParameters::sanitize`]; every field is
/// finite and non-negative.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectParameters {
    /// Display only
    pub project_name: String,
    pub start_date: YearMonth,

    /// Projection horizon in months
    pub contract_months: u32,
    /// Months charged at `rent_phase1` before switching to `rent_phase2`
    pub phase1_months: u32,

    /// Informational only
    pub estimated_upfront_cost: f64,
    pub actual_upfront_cost: f64,

    // Flat recurring monthly charges
    pub expense_management: f64,
    pub expense_maintenance: f64,
    pub expense_tax: f64,
    pub expense_insurance: f64,
    pub expense_other: f64,

    pub rent_phase1: f64,
    pub rent_phase2: f64,

    /// Base monthly revenue before the second-year step-down
    pub monthly_income: f64,

    /// Annual discount rate in percent, used only for NPV
    pub discount_rate_annual: f64,

    /// Who funded the upfront cost
    pub capital_injection_split: Split,
    /// How post-payback profit is divided
    pub profit_share_split: Split,
}

impl ProjectParameters {
    /// Sum of the flat recurring charges
    pub fn base_monthly_expense(&self) -> f64 {
        self.expense_management
            + self.expense_maintenance
            + self.expense_tax
            + self.expense_insurance
            + self.expense_other
    }

    /// Phase-dependent rent for a zero-based month index
    pub fn phase_rent(&self, month_index: u32) -> f64 {
        if month_index < self.phase1_months {
            self.rent_phase1
        } else {
            self.rent_phase2
        }
    }
}

impl Default for ProjectParameters {
    fn default() -> Self {
        Self {
            project_name: "我的租賃專案".to_string(),
            start_date: YearMonth::default(),
            contract_months: 60,
            phase1_months: 24,
            estimated_upfront_cost: 2_000_000.0,
            actual_upfront_cost: 2_200_000.0,
            expense_management: 2000.0,
            expense_maintenance: 1000.0,
            expense_tax: 0.0,
            expense_insurance: 0.0,
            expense_other: 2000.0,
            rent_phase1: 30000.0,
            rent_phase2: 35000.0,
            monthly_income: 80000.0,
            discount_rate_annual: 3.0,
            capital_injection_split: Split::new(80.0),
            profit_share_split: Split::new(30.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_month_add_wraps_year() {
        let start = YearMonth::new(2025, 12).unwrap();
        assert_eq!(start.add_months(0).label(), "2025/12");
        assert_eq!(start.add_months(1).label(), "2026/01");
        assert_eq!(start.add_months(25).label(), "2028/01");
    }

    #[test]
    fn test_year_month_parse_forms() {
        let a: YearMonth = "2024-03".parse().unwrap();
        let b: YearMonth = "2024/03".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "2024-03");
        assert!("2024-13".parse::<YearMonth>().is_err());
        assert!("soon".parse::<YearMonth>().is_err());
    }

    #[test]
    fn test_year_month_serde_as_string() {
        let ym = YearMonth::new(2026, 7).unwrap();
        let json = serde_json::to_string(&ym).unwrap();
        assert_eq!(json, "\"2026-07\"");
        let back: YearMonth = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ym);
    }

    #[test]
    fn test_split_edits_keep_sum() {
        let mut split = Split::new(80.0);
        assert_eq!(split.operator(), 20.0);

        split.set(Party::Operator, 65.0);
        assert_eq!(split.investor(), 35.0);

        split.set(Party::Investor, 140.0);
        assert_eq!(split.investor() + split.operator(), 100.0);
        assert_eq!(split.operator(), 0.0);
    }

    #[test]
    fn test_split_ignores_non_numeric_text() {
        let mut split = Split::new(30.0);
        assert!(!split.set_from_text(Party::Investor, "abc"));
        assert_eq!(split.investor(), 30.0);

        assert!(split.set_from_text(Party::Operator, "45.5"));
        assert_eq!(split.investor(), 54.5);
    }

    #[test]
    fn test_split_deserialize_rederives_operator() {
        let split: Split = serde_json::from_str(r#"{"investor": 40, "operator": 10}"#).unwrap();
        assert_eq!(split.operator(), 60.0);
    }

    #[test]
    fn test_phase_rent_boundary() {
        let params = ProjectParameters::default();
        assert_eq!(params.phase_rent(23), 30000.0);
        assert_eq!(params.phase_rent(24), 35000.0);
        assert_eq!(params.base_monthly_expense(), 5000.0);
    }
}
