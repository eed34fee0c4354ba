//! Amortization engine for equal-payment and equal-principal schedules

use super::periods::{PaymentPeriod, Schedule};
use super::state::BalanceState;
use crate::error::Result;
use crate::loan::{AmortizationMethod, LoanParameters};

/// Rates below this are treated as zero: `principal * rate` would underflow
const NEGLIGIBLE_RATE: f64 = f64::MIN_POSITIVE;

/// Per-period installment rule, fixed once per schedule
#[derive(Debug, Clone, Copy)]
enum Installment {
    /// Same total payment every period, balance walked forward.
    /// Only used when the rate is negligible, where nothing can compound.
    LevelPayment(f64),
    /// Same total payment every period, balances from the annuity closed form
    /// so rounding error is not compounded by `(1 + r)` each period
    Annuity {
        payment: f64,
        principal: f64,
        log_growth: f64,
        discount_complement: f64,
        term: u32,
    },
    /// Same principal every period
    LevelPrincipal(f64),
}

impl Installment {
    fn for_loan(params: &LoanParameters) -> Self {
        let rate = params.monthly_rate();
        let term = f64::from(params.term_months);
        match params.method {
            AmortizationMethod::EqualPayment if rate < NEGLIGIBLE_RATE => {
                Installment::LevelPayment(params.principal / term)
            }
            AmortizationMethod::EqualPayment => {
                let log_growth = rate.ln_1p();
                Installment::Annuity {
                    payment: level_payment(params.principal, rate, params.term_months),
                    principal: params.principal,
                    log_growth,
                    discount_complement: -(-term * log_growth).exp_m1(),
                    term: params.term_months,
                }
            }
            AmortizationMethod::EqualPrincipal => Installment::LevelPrincipal(params.principal / term),
        }
    }

    /// (principal portion, payment amount) for `period`, given the opening
    /// balance and the interest accrued on it
    fn split(&self, period: u32, opening_balance: f64, interest: f64) -> (f64, f64) {
        match *self {
            Installment::LevelPayment(payment) => (payment - interest, payment),
            Installment::Annuity { payment, .. } => {
                ((opening_balance - self.balance_after(period)).max(0.0), payment)
            }
            Installment::LevelPrincipal(principal) => (principal, principal + interest),
        }
    }

    /// Closed-form annuity balance after `period`:
    /// `P * ((1+r)^n - (1+r)^i) / ((1+r)^n - 1)`
    fn balance_after(&self, period: u32) -> f64 {
        match *self {
            Installment::Annuity {
                principal,
                log_growth,
                discount_complement,
                term,
                ..
            } => {
                let remaining = f64::from(period) - f64::from(term);
                principal * -(remaining * log_growth).exp_m1() / discount_complement
            }
            _ => 0.0,
        }
    }
}

/// Level annuity payment for `term` periods at periodic rate `rate`.
///
/// A zero or subnormal rate pays the principal off in equal parts. Otherwise
/// this is `P * r * (1+r)^n / ((1+r)^n - 1)`, evaluated as
/// `P / ((1 - (1+r)^-n) / r)` through `ln_1p`/`exp_m1` so tiny rates and long
/// terms neither lose precision nor overflow.
pub fn level_payment(principal: f64, rate: f64, term: u32) -> f64 {
    let n = f64::from(term);
    if rate < NEGLIGIBLE_RATE {
        return principal / n;
    }
    let discount_complement = -(-n * rate.ln_1p()).exp_m1();
    principal / (discount_complement / rate)
}

/// Stateless schedule engine
#[derive(Debug, Clone, Copy, Default)]
pub struct AmortizationEngine;

impl AmortizationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Compute the full repayment schedule for a loan.
    ///
    /// Fails with `InvalidArgument` before any computation if the parameters
    /// are invalid. The last period absorbs floating-point drift so that its
    /// remaining principal is exactly 0 and the principal portions sum to the
    /// principal exactly.
    pub fn compute_schedule(&self, params: &LoanParameters) -> Result<Schedule> {
        params.validate()?;

        let rate = params.monthly_rate();
        let term = params.term_months;
        let installment = Installment::for_loan(params);

        let (state, mut periods) = (1..term).fold(
            (BalanceState::opening(params.principal), Vec::with_capacity(term as usize)),
            |(state, mut periods), period| {
                let interest = state.interest_due(rate);
                let (principal_portion, payment) = installment.split(period, state.balance, interest);
                let (row, next) = state.advance(period, principal_portion, payment, interest);
                periods.push(row);
                (next, periods)
            },
        );

        let interest = state.interest_due(rate);
        let (scheduled_principal, _) = installment.split(term, state.balance, interest);
        let (last, residual) = state.settle(term, params.principal, scheduled_principal, interest);
        log::trace!("period {} absorbed reconciliation residual {:e}", term, residual);
        periods.push(last);

        let schedule = Schedule::new(*params, periods);
        log::debug!(
            "{} schedule: {} periods, total interest {:.2}",
            params.method,
            schedule.len(),
            schedule.summary().total_interest
        );
        Ok(schedule)
    }

    /// Compute the schedule and return its rows and summary separately
    pub fn compute_parts(
        &self,
        params: &LoanParameters,
    ) -> Result<(Vec<PaymentPeriod>, super::ScheduleSummary)> {
        self.compute_schedule(params).map(Schedule::into_parts)
    }
}

/// Convenience wrapper around [`AmortizationEngine::compute_schedule`]
pub fn compute_schedule(params: &LoanParameters) -> Result<Schedule> {
    AmortizationEngine::new().compute_schedule(params)
}
