//! Schedule output structures

use super::calendar;
use super::irr;
use crate::loan::LoanParameters;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single row of the repayment schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaymentPeriod {
    /// 1-based period number
    pub period: u32,

    /// Total cash paid this period
    pub payment_amount: f64,
    pub principal_portion: f64,
    pub interest_portion: f64,

    /// Balance after this period's payment, never negative
    pub remaining_principal: f64,
}

/// Aggregates derived from a full schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub period_count: u32,
    pub total_payment: f64,
    /// `total_payment - principal`
    pub total_interest: f64,
    pub total_principal: f64,
    pub first_period_payment: f64,
    pub last_period_payment: f64,
}

impl ScheduleSummary {
    /// Summarize periods in order. Sums are left folds in period order.
    pub fn from_periods(principal: f64, periods: &[PaymentPeriod]) -> Self {
        let total_payment: f64 = periods.iter().map(|p| p.payment_amount).sum();
        let total_principal: f64 = periods.iter().map(|p| p.principal_portion).sum();

        Self {
            period_count: periods.len() as u32,
            total_payment,
            total_interest: total_payment - principal,
            total_principal,
            first_period_payment: periods.first().map(|p| p.payment_amount).unwrap_or(0.0),
            last_period_payment: periods.last().map(|p| p.payment_amount).unwrap_or(0.0),
        }
    }
}

/// Complete schedule for one loan.
///
/// Only built by the engine, so the summary always matches the periods.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schedule {
    pub params: LoanParameters,
    periods: Vec<PaymentPeriod>,
    summary: ScheduleSummary,
}

impl Schedule {
    pub(crate) fn new(params: LoanParameters, periods: Vec<PaymentPeriod>) -> Self {
        let summary = ScheduleSummary::from_periods(params.principal, &periods);
        Self {
            params,
            periods,
            summary,
        }
    }

    pub fn periods(&self) -> &[PaymentPeriod] {
        &self.periods
    }

    pub fn summary(&self) -> &ScheduleSummary {
        &self.summary
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Remaining principal after the last period (always exactly 0)
    pub fn final_balance(&self) -> f64 {
        self.periods.last().map(|p| p.remaining_principal).unwrap_or(self.params.principal)
    }

    /// Split into the period list and summary
    pub fn into_parts(self) -> (Vec<PaymentPeriod>, ScheduleSummary) {
        (self.periods, self.summary)
    }

    /// Borrower cash flows: the principal received at t=0, then each payment out
    pub fn cashflows(&self) -> Vec<f64> {
        std::iter::once(self.params.principal)
            .chain(self.periods.iter().map(|p| -p.payment_amount))
            .collect()
    }

    /// Annual effective rate implied by the schedule's cash flows
    pub fn effective_annual_rate(&self) -> Option<f64> {
        irr::effective_annual_rate(&self.cashflows())
    }

    /// Periods paired with their due date, if a start date is known
    pub fn dated_periods(
        &self,
        start_date: Option<NaiveDate>,
    ) -> impl Iterator<Item = (Option<NaiveDate>, &PaymentPeriod)> + '_ {
        self.periods.iter().map(move |p| {
            let due = start_date.and_then(|start| calendar::due_date(start, p.period));
            (due, p)
        })
    }
}
