//! Sparse per-month manual overrides of income and expense

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::params::leading_float;

/// Which value of a month an override replaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideField {
    Income,
    Expense,
}

impl FromStr for OverrideField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(OverrideField::Income),
            "expense" => Ok(OverrideField::Expense),
            other => Err(format!("unknown override field '{other}' (expected income or expense)")),
        }
    }
}

impl fmt::Display for OverrideField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverrideField::Income => f.write_str("income"),
            OverrideField::Expense => f.write_str("expense"),
        }
    }
}

/// Manually entered values for one month; `None` falls back to the default
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyOverride {
    #[serde(default)]
    pub income: Option<f64>,
    #[serde(default)]
    pub expense: Option<f64>,
}

impl MonthlyOverride {
    pub fn get(&self, field: OverrideField) -> Option<f64> {
        match field {
            OverrideField::Income => self.income,
            OverrideField::Expense => self.expense,
        }
    }

    fn set(&mut self, field: OverrideField, value: Option<f64>) {
        match field {
            OverrideField::Income => self.income = value,
            OverrideField::Expense => self.expense = value,
        }
    }

    /// No field set: equivalent to no override at all
    pub fn is_empty(&self) -> bool {
        self.income.is_none() && self.expense.is_none()
    }
}

/// Override entries keyed by zero-based month index.
///
/// Never holds an entry with both fields empty, so `len()` is the number of
/// genuinely customized months.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<u32, MonthlyOverride>",
    into = "BTreeMap<u32, MonthlyOverride>"
)]
pub struct OverrideMap {
    months: BTreeMap<u32, MonthlyOverride>,
}

impl OverrideMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, month_index: u32) -> Option<&MonthlyOverride> {
        self.months.get(&month_index)
    }

    /// Upsert one field of a month; removes the month once both fields are empty
    pub fn set(&mut self, month_index: u32, field: OverrideField, value: Option<f64>) {
        let value = value.filter(|v| v.is_finite());
        let mut entry = self.months.get(&month_index).copied().unwrap_or_default();
        entry.set(field, value);

        if entry.is_empty() {
            self.months.remove(&month_index);
        } else {
            self.months.insert(month_index, entry);
        }
    }

    /// Apply a cell edit: empty (or non-numeric) text clears the field,
    /// otherwise the leading decimal number is stored.
    pub fn apply(&mut self, month_index: u32, field: OverrideField, raw: &str) {
        let value = if raw.trim().is_empty() {
            None
        } else {
            let parsed = leading_float(raw);
            if parsed.is_none() {
                debug!("month {month_index} {field}: '{raw}' is not a number, clearing");
            }
            parsed
        };
        self.set(month_index, field, value);
    }

    /// Number of customized months
    pub fn len(&self) -> usize {
        self.months.len()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    /// Bulk reset
    pub fn clear(&mut self) {
        self.months.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &MonthlyOverride)> {
        self.months.iter().map(|(&k, v)| (k, v))
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl From<BTreeMap<u32, MonthlyOverride>> for OverrideMap {
    fn from(months: BTreeMap<u32, MonthlyOverride>) -> Self {
        let mut map = OverrideMap::new();
        for (month_index, entry) in months {
            map.set(month_index, OverrideField::Income, entry.income);
            map.set(month_index, OverrideField::Expense, entry.expense);
        }
        map
    }
}

impl From<OverrideMap> for BTreeMap<u32, MonthlyOverride> {
    fn from(map: OverrideMap) -> Self {
        map.months
    }
}
