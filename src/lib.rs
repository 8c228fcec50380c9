//! Lease ROI - Cash-flow projection for sublease investment projects
//!
//! This library provides:
//! - Month-by-month income/expense simulation with a two-phase rent schedule
//!   and sparse manual overrides
//! - Aggregate metrics: break-even, net profit, cost ratio, NPV, IRR
//! - Investor/operator capital and profit splits with annualized ROI
//! - Parallel batch evaluation of many projects
//! - User-scoped project persistence and a fund ledger with savings buckets

pub mod ledger;
pub mod params;
pub mod projection;
pub mod scenario;
pub mod store;

// Re-export commonly used types
pub use ledger::{FundLedger, FundStats, LedgerError};
pub use params::{Party, ProjectParameters, RawParameters, Split, YearMonth};
pub use projection::{
    BreakEven, MonthlyRecord, OverrideField, OverrideMap, PartyReturn, ProfitBasis, ProjectionConfig,
    ProjectionEngine, ProjectionResult, ProjectionSummary,
};
pub use scenario::{Scenario, ScenarioRunner};
pub use store::{JsonFileStore, LedgerStore, MemoryStore, ProjectDraft, ProjectStore, SavedProject, StoreConfig, StoreError};
