//! Loan Amortization - repayment schedule engine for consumer and mortgage loans
//!
//! This library provides:
//! - Equal-payment (annuity) and equal-principal repayment schedules
//! - Exact final-period reconciliation of floating-point drift
//! - Schedule summaries and effective-rate checks
//! - Parallel loan-book processing and method comparison
//! - CSV, JSON and table output

pub mod error;
pub mod loan;
pub mod schedule;
pub mod batch;
pub mod output;

// Re-export commonly used types
pub use error::{AmortizationError, LoanField, Result};
pub use loan::{AmortizationMethod, LoanParameters, LoanRecord};
pub use schedule::{compute_schedule, AmortizationEngine, PaymentPeriod, Schedule, ScheduleSummary};
pub use batch::{BatchRunner, MethodComparison};
