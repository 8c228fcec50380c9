//! Raw (partial, loosely-typed, possibly legacy) parameter input and the
//! sanitization step that turns it into [`ProjectParameters`].

use log::warn;
use serde::{Deserialize, Serialize};

use super::data::{ProjectParameters, Split, YearMonth};

/// A numeric field as it arrives from a form or a saved document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(f64),
    Text(String),
}

impl NumericInput {
    /// Integer reading: truncates numbers, takes the leading integer of text
    pub fn as_whole(&self) -> f64 {
        let value = match self {
            NumericInput::Number(n) => Some(n.trunc()),
            NumericInput::Text(s) => leading_int(s),
        };
        non_negative(value)
    }

    /// Decimal reading: takes the leading decimal number of text
    pub fn as_decimal(&self) -> f64 {
        let value = match self {
            NumericInput::Number(n) => Some(*n),
            NumericInput::Text(s) => leading_float(s),
        };
        non_negative(value)
    }
}

impl From<f64> for NumericInput {
    fn from(value: f64) -> Self {
        NumericInput::Number(value)
    }
}

impl From<&str> for NumericInput {
    fn from(value: &str) -> Self {
        NumericInput::Text(value.to_string())
    }
}

fn non_negative(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => 0.0,
    }
}

/// Parse the leading integer of `s` (`" 42abc"` -> 42, `"abc"` -> None)
pub fn leading_int(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return None;
    }
    s[..end].parse::<f64>().ok()
}

/// Parse the leading decimal number of `s` (`"3.5%"` -> 3.5, `".5"` -> 0.5)
pub fn leading_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let mut digits = 0;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        digits += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        let mut frac_end = end + 1;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
            digits += 1;
        }
        end = frac_end;
    }
    if digits == 0 {
        return None;
    }
    // Optional exponent, only consumed when well-formed
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }
    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parameter object as stored or submitted: every field optional, numbers
/// may arrive as text. Field names match the saved-document format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_months: Option<NumericInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase1_months: Option<NumericInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_upfront_cost: Option<NumericInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_upfront_cost: Option<NumericInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expense_management: Option<NumericInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expense_maintenance: Option<NumericInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expense_tax: Option<NumericInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expense_insurance: Option<NumericInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expense_other: Option<NumericInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rent_phase1: Option<NumericInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rent_phase2: Option<NumericInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_income: Option<NumericInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_rate: Option<NumericInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fund_injection_ratio: Option<NumericInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manpower_injection_ratio: Option<NumericInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fund_profit_ratio: Option<NumericInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manpower_profit_ratio: Option<NumericInput>,

    /// Legacy single "misc" charge that predates the itemized expenses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_misc: Option<NumericInput>,
}

/// Upper bound for the month-count fields (100 years)
pub const MAX_CONTRACT_MONTHS: u32 = 1200;

/// Whole month count, capped at [`MAX_CONTRACT_MONTHS`]
fn month_count(label: &str, field: &Option<NumericInput>, default: u32) -> u32 {
    let value = field.as_ref().map_or(default as f64, NumericInput::as_whole);
    if value > MAX_CONTRACT_MONTHS as f64 {
        warn!("{label} {value} exceeds {MAX_CONTRACT_MONTHS}; capping");
        return MAX_CONTRACT_MONTHS;
    }
    u32::try_from(value as u64).unwrap_or(MAX_CONTRACT_MONTHS)
}

impl RawParameters {
    /// Coerce every field to a finite, non-negative value, defaulting
    /// missing fields and migrating the legacy misc charge.
    pub fn sanitize(&self) -> ProjectParameters {
        let defaults = ProjectParameters::default();

        let whole = |field: &Option<NumericInput>, default: f64| {
            field.as_ref().map_or(default, NumericInput::as_whole)
        };

        let start_date = match self.start_date.as_deref() {
            None => defaults.start_date,
            Some(raw) => raw.parse::<YearMonth>().unwrap_or_else(|e| {
                warn!("{e}; using default start month {}", defaults.start_date);
                defaults.start_date
            }),
        };

        let mut params = ProjectParameters {
            project_name: self
                .project_name
                .clone()
                .unwrap_or_else(|| defaults.project_name.clone()),
            start_date,
            contract_months: month_count("contractMonths", &self.contract_months, defaults.contract_months),
            phase1_months: month_count("phase1Months", &self.phase1_months, defaults.phase1_months),
            estimated_upfront_cost: whole(&self.estimated_upfront_cost, defaults.estimated_upfront_cost),
            actual_upfront_cost: whole(&self.actual_upfront_cost, defaults.actual_upfront_cost),
            expense_management: whole(&self.expense_management, defaults.expense_management),
            expense_maintenance: whole(&self.expense_maintenance, defaults.expense_maintenance),
            expense_tax: whole(&self.expense_tax, defaults.expense_tax),
            expense_insurance: whole(&self.expense_insurance, defaults.expense_insurance),
            expense_other: whole(&self.expense_other, defaults.expense_other),
            rent_phase1: whole(&self.rent_phase1, defaults.rent_phase1),
            rent_phase2: whole(&self.rent_phase2, defaults.rent_phase2),
            monthly_income: whole(&self.monthly_income, defaults.monthly_income),
            discount_rate_annual: self
                .discount_rate
                .as_ref()
                .map_or(defaults.discount_rate_annual, NumericInput::as_decimal),
            capital_injection_split: split_from(
                "injection",
                &self.fund_injection_ratio,
                &self.manpower_injection_ratio,
                defaults.capital_injection_split,
            ),
            profit_share_split: split_from(
                "profit",
                &self.fund_profit_ratio,
                &self.manpower_profit_ratio,
                defaults.profit_share_split,
            ),
        };

        // A zero misc charge is treated as absent
        let legacy_misc = self.monthly_misc.as_ref().map(NumericInput::as_whole).filter(|&v| v > 0.0);
        if let (Some(misc), None) = (legacy_misc, &self.expense_other) {
            params.expense_other = misc;
            params.expense_management = 0.0;
            params.expense_maintenance = 0.0;
            params.expense_tax = 0.0;
            params.expense_insurance = 0.0;
        }

        params
    }
}

/// Investor side wins when present; otherwise derive from the operator side
fn split_from(
    label: &str,
    investor: &Option<NumericInput>,
    operator: &Option<NumericInput>,
    default: Split,
) -> Split {
    match (investor, operator) {
        (Some(inv), op) => {
            let split = Split::new(inv.as_decimal());
            if let Some(op) = op {
                let op = op.as_decimal();
                if (op - split.operator()).abs() > 1e-9 {
                    warn!(
                        "{label} split {}/{} does not sum to 100; using {}/{}",
                        split.investor(),
                        op,
                        split.investor(),
                        split.operator()
                    );
                }
            }
            split
        }
        (None, Some(op)) => Split::new(100.0 - op.as_decimal().min(100.0)),
        (None, None) => default,
    }
}

impl From<&ProjectParameters> for RawParameters {
    fn from(params: &ProjectParameters) -> Self {
        let num = |v: f64| Some(NumericInput::Number(v));
        Self {
            project_name: Some(params.project_name.clone()),
            start_date: Some(params.start_date.to_string()),
            contract_months: num(params.contract_months as f64),
            phase1_months: num(params.phase1_months as f64),
            estimated_upfront_cost: num(params.estimated_upfront_cost),
            actual_upfront_cost: num(params.actual_upfront_cost),
            expense_management: num(params.expense_management),
            expense_maintenance: num(params.expense_maintenance),
            expense_tax: num(params.expense_tax),
            expense_insurance: num(params.expense_insurance),
            expense_other: num(params.expense_other),
            rent_phase1: num(params.rent_phase1),
            rent_phase2: num(params.rent_phase2),
            monthly_income: num(params.monthly_income),
            discount_rate: num(params.discount_rate_annual),
            fund_injection_ratio: num(params.capital_injection_split.investor()),
            manpower_injection_ratio: num(params.capital_injection_split.operator()),
            fund_profit_ratio: num(params.profit_share_split.investor()),
            manpower_profit_ratio: num(params.profit_share_split.operator()),
            monthly_misc: None,
        }
    }
}
