//! Fund ledger: realized monthly income/expense against a starting capital,
//! with surplus allocated to savings buckets by percentage.

mod import;

pub use import::{import_entries_csv, import_entries_csv_path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::params::YearMonth;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("bucket name must not be empty")]
    EmptyBucketName,
    #[error("bucket percentage must be a positive number, got {0}")]
    InvalidPercentage(f64),
    #[error("allocations cannot exceed 100% (currently {current}%, requested {requested}%)")]
    AllocationExceeded { current: f64, requested: f64 },
    #[error("no ledger entry with id {0}")]
    UnknownEntry(u64),
    #[error("no savings bucket with id {0}")]
    UnknownBucket(u64),
    #[error("invalid month '{0}' (expected YYYY-MM)")]
    InvalidMonth(String),
    #[error("failed to read ledger csv: {0}")]
    Csv(#[from] csv::Error),
}

/// Realized income and expense for one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: u64,
    pub month: YearMonth,
    pub income: f64,
    pub expense: f64,
}

impl LedgerEntry {
    pub fn net(&self) -> f64 {
        self.income - self.expense
    }
}

/// Savings goal receiving a fixed percentage of the ledger surplus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsBucket {
    pub id: u64,
    pub name: String,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketAllocation {
    pub id: u64,
    pub name: String,
    pub percentage: f64,
    pub current_amount: f64,
}

/// Derived totals for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundStats {
    pub total_income: f64,
    pub total_expense: f64,
    /// Total income minus total expense
    pub net_ledger_profit: f64,
    /// Initial capital plus net ledger profit
    pub current_total_cash: f64,
    /// Surplus the buckets are allocated from; 0 while the ledger is in loss
    pub allocation_base: f64,
    pub buckets: Vec<BucketAllocation>,
    /// Current total cash not allocated to any bucket
    pub free_cash: f64,
}

/// Per-user fund ledger document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FundLedger {
    #[serde(default)]
    pub initial_capital: f64,
    #[serde(default)]
    entries: Vec<LedgerEntry>,
    #[serde(default)]
    buckets: Vec<SavingsBucket>,
    #[serde(default)]
    next_id: u64,
}

/// Amount text as typed: blank or malformed reads as 0
pub fn coerce_amount(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

impl FundLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids are shared by entries and buckets and never reused
    fn allocate_id(&mut self) -> u64 {
        let highest = self
            .entries
            .iter()
            .map(|e| e.id)
            .chain(self.buckets.iter().map(|b| b.id))
            .max()
            .unwrap_or(0);
        self.next_id = self.next_id.max(highest) + 1;
        self.next_id
    }

    pub fn set_initial_capital(&mut self, amount: f64) {
        self.initial_capital = if amount.is_finite() { amount } else { 0.0 };
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Entries sorted by month, latest first
    pub fn entries_newest_first(&self) -> Vec<&LedgerEntry> {
        let mut sorted: Vec<&LedgerEntry> = self.entries.iter().collect();
        sorted.sort_by(|a, b| b.month.cmp(&a.month));
        sorted
    }

    pub fn add_entry(&mut self, month: YearMonth, income: f64, expense: f64) -> &LedgerEntry {
        let id = self.allocate_id();
        let clean = |v: f64| if v.is_finite() { v } else { 0.0 };
        self.entries.push(LedgerEntry {
            id,
            month,
            income: clean(income),
            expense: clean(expense),
        });
        &self.entries[self.entries.len() - 1]
    }

    /// Add an entry from form text; blank or malformed amounts count as 0
    pub fn add_entry_text(&mut self, month: YearMonth, income: &str, expense: &str) -> &LedgerEntry {
        self.add_entry(month, coerce_amount(income), coerce_amount(expense))
    }

    pub fn remove_entry(&mut self, id: u64) -> Result<LedgerEntry, LedgerError> {
        let index = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or(LedgerError::UnknownEntry(id))?;
        Ok(self.entries.remove(index))
    }

    pub fn buckets(&self) -> &[SavingsBucket] {
        &self.buckets
    }

    /// Sum of all bucket percentages
    pub fn allocated_percentage(&self) -> f64 {
        self.buckets.iter().map(|b| b.percentage).sum()
    }

    pub fn add_bucket(&mut self, name: &str, percentage: f64) -> Result<&SavingsBucket, LedgerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::EmptyBucketName);
        }
        if !percentage.is_finite() || percentage <= 0.0 {
            return Err(LedgerError::InvalidPercentage(percentage));
        }
        let current = self.allocated_percentage();
        if current + percentage > 100.0 {
            return Err(LedgerError::AllocationExceeded {
                current,
                requested: percentage,
            });
        }

        let id = self.allocate_id();
        self.buckets.push(SavingsBucket {
            id,
            name: name.to_string(),
            percentage,
        });
        Ok(&self.buckets[self.buckets.len() - 1])
    }

    pub fn remove_bucket(&mut self, id: u64) -> Result<SavingsBucket, LedgerError> {
        let index = self
            .buckets
            .iter()
            .position(|b| b.id == id)
            .ok_or(LedgerError::UnknownBucket(id))?;
        Ok(self.buckets.remove(index))
    }

    pub fn stats(&self) -> FundStats {
        let total_income: f64 = self.entries.iter().map(|e| e.income).sum();
        let total_expense: f64 = self.entries.iter().map(|e| e.expense).sum();
        let net_ledger_profit = total_income - total_expense;
        let current_total_cash = self.initial_capital + net_ledger_profit;

        // Buckets share surplus only, never losses
        let allocation_base = net_ledger_profit.max(0.0);

        let buckets: Vec<BucketAllocation> = self
            .buckets
            .iter()
            .map(|b| BucketAllocation {
                id: b.id,
                name: b.name.clone(),
                percentage: b.percentage,
                current_amount: (allocation_base * (b.percentage / 100.0)).floor(),
            })
            .collect();
        let allocated_total: f64 = buckets.iter().map(|b| b.current_amount).sum();

        FundStats {
            total_income,
            total_expense,
            net_ledger_profit,
            current_total_cash,
            allocation_base,
            buckets,
            free_cash: current_total_cash - allocated_total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(s: &str) -> YearMonth {
        s.parse().unwrap()
    }

    #[test]
    fn test_stats_allocate_surplus() {
        let mut ledger = FundLedger::new();
        ledger.set_initial_capital(100_000.0);
        ledger.add_entry(month("2025-12"), 80_000.0, 35_000.0);
        ledger.add_entry(month("2026-01"), 80_000.0, 40_001.0);
        ledger.add_bucket("Renovation", 30.0).unwrap();
        ledger.add_bucket("Emergency", 15.5).unwrap();

        let stats = ledger.stats();
        assert_eq!(stats.net_ledger_profit, 84_999.0);
        assert_eq!(stats.current_total_cash, 184_999.0);
        assert_eq!(stats.allocation_base, 84_999.0);
        // floor(84999 * 0.3) and floor(84999 * 0.155)
        assert_eq!(stats.buckets[0].current_amount, 25_499.0);
        assert_eq!(stats.buckets[1].current_amount, 13_174.0);
        assert_eq!(stats.free_cash, 184_999.0 - 25_499.0 - 13_174.0);
    }

    #[test]
    fn test_loss_allocates_nothing() {
        let mut ledger = FundLedger::new();
        ledger.set_initial_capital(50_000.0);
        ledger.add_entry(month("2026-02"), 10_000.0, 30_000.0);
        ledger.add_bucket("Travel", 50.0).unwrap();

        let stats = ledger.stats();
        assert_eq!(stats.allocation_base, 0.0);
        assert_eq!(stats.buckets[0].current_amount, 0.0);
        assert_eq!(stats.free_cash, 30_000.0);
    }

    #[test]
    fn test_bucket_validation() {
        let mut ledger = FundLedger::new();
        ledger.add_bucket("A", 60.0).unwrap();

        assert!(matches!(ledger.add_bucket("  ", 10.0), Err(LedgerError::EmptyBucketName)));
        assert!(matches!(ledger.add_bucket("B", 0.0), Err(LedgerError::InvalidPercentage(_))));
        assert!(matches!(
            ledger.add_bucket("B", 40.5),
            Err(LedgerError::AllocationExceeded { current, requested }) if current == 60.0 && requested == 40.5
        ));
        ledger.add_bucket("B", 40.0).unwrap();
        assert_eq!(ledger.allocated_percentage(), 100.0);
    }

    #[test]
    fn test_text_amounts_coerce() {
        let mut ledger = FundLedger::new();
        let entry = ledger.add_entry_text(month("2026-03"), "", "12abc").clone();
        assert_eq!(entry.income, 0.0);
        assert_eq!(entry.expense, 0.0);

        let entry = ledger.add_entry_text(month("2026-03"), " 1500.5 ", "-20").clone();
        assert_eq!(entry.net(), 1520.5);
    }

    #[test]
    fn test_entries_newest_first_and_removal() {
        let mut ledger = FundLedger::new();
        let a = ledger.add_entry(month("2026-01"), 1.0, 0.0).id;
        ledger.add_entry(month("2026-03"), 2.0, 0.0);
        ledger.add_entry(month("2025-11"), 3.0, 0.0);

        let order: Vec<String> = ledger
            .entries_newest_first()
            .iter()
            .map(|e| e.month.to_string())
            .collect();
        assert_eq!(order, vec!["2026-03", "2026-01", "2025-11"]);

        ledger.remove_entry(a).unwrap();
        assert_eq!(ledger.entries().len(), 2);
        assert!(matches!(ledger.remove_entry(a), Err(LedgerError::UnknownEntry(_))));
    }

    #[test]
    fn test_ids_unique_across_kinds() {
        let mut ledger = FundLedger::new();
        let entry_id = ledger.add_entry(month("2026-01"), 1.0, 0.0).id;
        let bucket_id = ledger.add_bucket("X", 10.0).unwrap().id;
        assert_ne!(entry_id, bucket_id);

        ledger.remove_bucket(bucket_id).unwrap();
        assert!(ledger.buckets().is_empty());
    }
}
