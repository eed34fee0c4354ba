//! Repayment schedule computation

mod state;
mod engine;
mod periods;
pub mod calendar;
pub mod irr;

pub use state::BalanceState;
pub use engine::{compute_schedule, level_payment, AmortizationEngine};
pub use periods::{PaymentPeriod, Schedule, ScheduleSummary};
pub use irr::{calculate_irr, effective_annual_rate};
