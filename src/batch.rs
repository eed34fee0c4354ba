//! Batch runner for loan books and method comparisons
//!
//! Schedules for independent loans share nothing, so a loan book is computed
//! in parallel. Each schedule itself is a sequential fold over its periods.

use crate::error::Result;
use crate::loan::{AmortizationMethod, LoanParameters, LoanRecord};
use crate::schedule::{AmortizationEngine, Schedule};
use chrono::NaiveDate;
use rayon::prelude::*;
use std::time::Instant;

/// Result of computing one loan from a loan book
#[derive(Debug)]
pub struct LoanOutcome {
    pub loan_id: String,
    pub start_date: Option<NaiveDate>,
    pub result: Result<Schedule>,
}

impl LoanOutcome {
    pub fn schedule(&self) -> Option<&Schedule> {
        self.result.as_ref().ok()
    }
}

/// Both methods computed for the same loan
#[derive(Debug, Clone)]
pub struct MethodComparison {
    pub equal_payment: Schedule,
    pub equal_principal: Schedule,
}

impl MethodComparison {
    /// Interest saved by repaying with equal principal instead of equal payment
    pub fn interest_saving(&self) -> f64 {
        self.equal_payment.summary().total_interest - self.equal_principal.summary().total_interest
    }

    pub fn get(&self, method: AmortizationMethod) -> &Schedule {
        match method {
            AmortizationMethod::EqualPayment => &self.equal_payment,
            AmortizationMethod::EqualPrincipal => &self.equal_principal,
        }
    }
}

/// Runs the amortization engine over many loans
#[derive(Debug, Clone, Default)]
pub struct BatchRunner {
    engine: AmortizationEngine,
}

impl BatchRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute a single schedule
    pub fn run(&self, params: &LoanParameters) -> Result<Schedule> {
        self.engine.compute_schedule(params)
    }

    /// Compute schedules for a loan book in parallel, in input order.
    /// A loan that fails validation does not affect the others.
    pub fn run_batch(&self, loans: &[LoanRecord]) -> Vec<LoanOutcome> {
        let start = Instant::now();

        let outcomes: Vec<LoanOutcome> = loans
            .par_iter()
            .map(|loan| LoanOutcome {
                loan_id: loan.loan_id.clone(),
                start_date: loan.start_date,
                result: loan.parameters().and_then(|params| self.engine.compute_schedule(&params)),
            })
            .collect();

        let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
        for outcome in &outcomes {
            if let Err(e) = &outcome.result {
                log::warn!("loan {}: {}", outcome.loan_id, e);
            }
        }
        log::info!(
            "computed {} schedules ({} rejected) in {:?}",
            outcomes.len() - failed,
            failed,
            start.elapsed()
        );

        outcomes
    }

    /// Compute the same loan under both methods
    pub fn compare_methods(&self, params: &LoanParameters) -> Result<MethodComparison> {
        Ok(MethodComparison {
            equal_payment: self.run(&params.with_method(AmortizationMethod::EqualPayment))?,
            equal_principal: self.run(&params.with_method(AmortizationMethod::EqualPrincipal))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn mortgage() -> LoanParameters {
        LoanParameters {
            principal: 120_000.0,
            annual_rate: 0.06,
            term_months: 12,
            method: AmortizationMethod::EqualPayment,
        }
    }

    #[test]
    fn test_run_batch_preserves_order_and_isolates_failures() {
        let runner = BatchRunner::new();
        let mut bad = LoanRecord::new("bad", mortgage());
        bad.term_months = 6.5;

        let loans = vec![
            LoanRecord::new("a", mortgage()),
            bad,
            LoanRecord::new("c", mortgage().with_method(AmortizationMethod::EqualPrincipal)),
        ];

        let outcomes = runner.run_batch(&loans);
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].loan_id, "a");
        assert_eq!(outcomes[1].loan_id, "bad");
        assert_eq!(outcomes[2].loan_id, "c");

        assert!(outcomes[0].schedule().is_some());
        assert!(outcomes[1].result.as_ref().unwrap_err().is_invalid_argument());
        assert_eq!(
            outcomes[2].schedule().unwrap().params.method,
            AmortizationMethod::EqualPrincipal
        );
    }

    #[test]
    fn test_compare_methods() {
        let comparison = BatchRunner::new().compare_methods(&mortgage()).unwrap();

        assert_abs_diff_eq!(comparison.interest_saving(), 35.658778198616, epsilon = 1e-6);
        assert!(comparison.get(AmortizationMethod::EqualPrincipal).summary().first_period_payment
            > comparison.get(AmortizationMethod::EqualPayment).summary().first_period_payment);
    }

    #[test]
    fn test_compare_methods_zero_rate() {
        let params = LoanParameters { annual_rate: 0.0, ..mortgage() };
        let comparison = BatchRunner::new().compare_methods(&params).unwrap();
        assert_abs_diff_eq!(comparison.interest_saving(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_compare_methods_rejects_invalid() {
        let params = LoanParameters { principal: 0.0, ..mortgage() };
        assert!(BatchRunner::new().compare_methods(&params).is_err());
    }
}
