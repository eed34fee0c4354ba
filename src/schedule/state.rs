//! Balance carried from one period to the next

use super::PaymentPeriod;

/// Balance state at the end of a period.
///
/// Each step consumes the state and returns the next one, so a schedule is a
/// left fold of `advance` over periods `1..term` followed by `settle`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalanceState {
    /// Principal still owed
    pub balance: f64,

    /// Principal repaid so far, summed in period order
    pub paid_principal: f64,
}

impl BalanceState {
    /// State at period 0
    pub fn opening(principal: f64) -> Self {
        Self {
            balance: principal,
            paid_principal: 0.0,
        }
    }

    /// Interest accrued on the opening balance of the next period
    pub fn interest_due(&self, monthly_rate: f64) -> f64 {
        self.balance * monthly_rate
    }

    /// Record a regular period's payment and return the next state
    pub fn advance(
        self,
        period: u32,
        principal_portion: f64,
        payment_amount: f64,
        interest_portion: f64,
    ) -> (PaymentPeriod, BalanceState) {
        let balance = (self.balance - principal_portion).max(0.0);
        let row = PaymentPeriod {
            period,
            payment_amount,
            principal_portion,
            interest_portion,
            remaining_principal: balance,
        };
        let next = BalanceState {
            balance,
            paid_principal: self.paid_principal + principal_portion,
        };
        (row, next)
    }

    /// Close the loan in the final period.
    ///
    /// The principal portion is the scheduled one when that already closes the
    /// loan, otherwise whatever has not been repaid yet, nudged by a few ulps
    /// so that the principal portions sum to `principal` exactly. Returns the row and the residual it absorbed relative to
    /// `scheduled_principal`.
    pub fn settle(
        self,
        period: u32,
        principal: f64,
        scheduled_principal: f64,
        interest_portion: f64,
    ) -> (PaymentPeriod, f64) {
        let principal_portion =
            closing_principal(self.paid_principal, principal, scheduled_principal);
        let row = PaymentPeriod {
            period,
            payment_amount: principal_portion + interest_portion,
            principal_portion,
            interest_portion,
            remaining_principal: 0.0,
        };
        (row, principal_portion - scheduled_principal)
    }
}

const MAX_NUDGES: usize = 64;

/// Final principal portion such that `paid + x == principal`.
///
/// `scheduled` is returned as is when it already closes the loan exactly.
/// Otherwise the exact values form a contiguous run of floats next to
/// `principal - paid`; the one nearest `scheduled` is returned. The result may
/// be below `scheduled` or negative if earlier periods overpaid.
fn closing_principal(paid: f64, principal: f64, scheduled: f64) -> f64 {
    if paid + scheduled == principal {
        return scheduled;
    }

    let unpaid = principal - paid;
    let mut x = unpaid;
    let mut closed = false;
    for _ in 0..MAX_NUDGES {
        let total = paid + x;
        if total == principal {
            closed = true;
            break;
        }
        x = if total < principal { next_up(x) } else { next_down(x) };
    }

    if !closed {
        log::warn!(
            "could not reconcile final principal exactly (paid {}, principal {})",
            paid,
            principal
        );
        return unpaid;
    }

    for _ in 0..MAX_NUDGES {
        let toward = if x > scheduled { next_down(x) } else { next_up(x) };
        if paid + toward != principal {
            break;
        }
        x = toward;
    }
    x
}

/// Next representable value above a finite `x`
fn next_up(x: f64) -> f64 {
    if x == 0.0 {
        f64::from_bits(1)
    } else if x > 0.0 {
        f64::from_bits(x.to_bits() + 1)
    } else {
        f64::from_bits(x.to_bits() - 1)
    }
}

fn next_down(x: f64) -> f64 {
    -next_up(-x)
}
