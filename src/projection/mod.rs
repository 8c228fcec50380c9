//! Projection engine: monthly cash-flow simulation and aggregate metrics

mod cashflows;
mod discount;
mod engine;
mod irr;
mod overrides;
mod rounding;
mod state;

pub use cashflows::{
    write_schedule_csv, BreakEven, MonthlyRecord, PartyReturn, ProjectionResult, ProjectionSummary,
};
pub use discount::{npv, DiscountRate};
pub use engine::{
    ProfitBasis, ProjectionConfig, ProjectionEngine, INCOME_STEP_DOWN_FACTOR, INCOME_STEP_DOWN_MONTH,
};
pub use irr::{annualized_irr_pct, calculate_irr, DEFAULT_IRR_GUESS, IRR_TOLERANCE, MAX_IRR_ITERATIONS};
pub use overrides::{MonthlyOverride, OverrideField, OverrideMap};
pub use rounding::{round_half_up, round_to};
pub use state::ProjectionState;
