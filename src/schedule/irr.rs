//! Internal Rate of Return (IRR) of a schedule's cash flows
//!
//! Used to check the rate a schedule actually charges against its nominal rate

use crate::loan::MONTHS_PER_YEAR;

/// Calculate the Internal Rate of Return (IRR) for a series of cash flows
/// using the Newton-Raphson method.
///
/// # Arguments
/// * `cashflows` - Vector of cash flows (positive = inflow, negative = outflow)
/// * `periods_per_year` - Number of periods per year (12 for monthly)
///
/// # Returns
/// * `Option<f64>` - Annual effective IRR as a decimal, or None if no solution found
pub fn calculate_irr(cashflows: &[f64], periods_per_year: u32) -> Option<f64> {
    if cashflows.is_empty() {
        return None;
    }

    if cashflows.iter().all(|&cf| cf.abs() < 1e-10) {
        return Some(0.0);
    }

    // At least one sign change is required for an IRR to exist
    let has_positive = cashflows.iter().any(|&cf| cf > 1e-10);
    let has_negative = cashflows.iter().any(|&cf| cf < -1e-10);
    if !has_positive || !has_negative {
        return None;
    }

    let mut rate = 0.05 / periods_per_year as f64;
    let tolerance = 1e-12;
    let max_iterations = 1000;

    for _ in 0..max_iterations {
        let (npv, dnpv) = npv_and_derivative(cashflows, rate);

        if dnpv.abs() < 1e-20 {
            return calculate_irr_bisection(cashflows, periods_per_year);
        }

        let new_rate = (rate - npv / dnpv).clamp(-0.99, 10.0);

        if (new_rate - rate).abs() < tolerance {
            return Some(annualize(new_rate, periods_per_year));
        }

        rate = new_rate;
    }

    calculate_irr_bisection(cashflows, periods_per_year)
}

/// Annual effective rate of monthly borrower cash flows
pub fn effective_annual_rate(cashflows: &[f64]) -> Option<f64> {
    calculate_irr(cashflows, MONTHS_PER_YEAR as u32)
}

fn annualize(periodic_rate: f64, periods_per_year: u32) -> f64 {
    (1.0 + periodic_rate).powi(periods_per_year as i32) - 1.0
}

/// NPV and its derivative with respect to rate
fn npv_and_derivative(cashflows: &[f64], rate: f64) -> (f64, f64) {
    let mut npv = 0.0;
    let mut dnpv = 0.0;
    let mut discount = 1.0;

    for (t, &cf) in cashflows.iter().enumerate() {
        npv += cf * discount;
        if t > 0 {
            dnpv -= (t as f64) * cf * discount / (1.0 + rate);
        }
        discount /= 1.0 + rate;
    }

    (npv, dnpv)
}

/// Fallback IRR calculation using bisection
fn calculate_irr_bisection(cashflows: &[f64], periods_per_year: u32) -> Option<f64> {
    let mut low = -0.99_f64;
    let mut high = 10.0_f64;
    let tolerance = 1e-12;
    let max_iterations = 1000;

    let mut npv_low = npv_at_rate(cashflows, low);
    let npv_high = npv_at_rate(cashflows, high);

    if npv_low * npv_high > 0.0 {
        return None;
    }

    for _ in 0..max_iterations {
        let mid = (low + high) / 2.0;
        let npv_mid = npv_at_rate(cashflows, mid);

        if npv_mid.abs() < tolerance || (high - low) / 2.0 < tolerance {
            return Some(annualize(mid, periods_per_year));
        }

        if npv_mid * npv_low < 0.0 {
            high = mid;
        } else {
            low = mid;
            npv_low = npv_mid;
        }
    }

    None
}

fn npv_at_rate(cashflows: &[f64], rate: f64) -> f64 {
    npv_and_derivative(cashflows, rate).0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::{AmortizationMethod, LoanParameters};
    use crate::schedule::compute_schedule;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_simple_irr() {
        // Borrow 1000, repay 1100 a year later
        let mut cashflows = vec![1000.0];
        cashflows.extend(vec![0.0; 11]);
        cashflows.push(-1100.0);

        let irr = calculate_irr(&cashflows, 12).unwrap();
        assert_abs_diff_eq!(irr, 0.10, epsilon = 1e-9);
    }

    #[test]
    fn test_no_sign_change() {
        assert_eq!(calculate_irr(&[100.0, 50.0], 12), None);
        assert_eq!(calculate_irr(&[], 12), None);
    }

    #[test]
    fn test_schedule_effective_rate_matches_nominal() {
        for method in AmortizationMethod::ALL {
            let params = LoanParameters {
                principal: 250_000.0,
                annual_rate: 0.0465,
                term_months: 360,
                method,
            };
            let schedule = compute_schedule(&params).unwrap();
            let expected = (1.0 + 0.0465 / 12.0_f64).powi(12) - 1.0;

            let actual = schedule.effective_annual_rate().unwrap();
            assert_abs_diff_eq!(actual, expected, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_zero_rate_schedule_has_zero_irr() {
        let params = LoanParameters {
            principal: 1200.0,
            annual_rate: 0.0,
            term_months: 12,
            method: AmortizationMethod::EqualPayment,
        };
        let schedule = compute_schedule(&params).unwrap();
        assert_abs_diff_eq!(schedule.effective_annual_rate().unwrap(), 0.0, epsilon = 1e-8);
    }
}
