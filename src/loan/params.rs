//! Loan parameters matching the repayment calculator inputs

use crate::error::{AmortizationError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Repayment periods per year; the periodic rate is the annual rate over this
pub const MONTHS_PER_YEAR: f64 = 12.0;

/// Longest accepted term (1000 years)
pub const MAX_TERM_MONTHS: u32 = 12_000;

/// Amortization method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AmortizationMethod {
    /// Annuity: the same total payment every period (等额本息)
    #[serde(alias = "等额本息")]
    EqualPayment,
    /// The same principal every period, declining total payment (等额本金)
    #[serde(alias = "等额本金")]
    EqualPrincipal,
}

impl AmortizationMethod {
    pub const ALL: [AmortizationMethod; 2] =
        [AmortizationMethod::EqualPayment, AmortizationMethod::EqualPrincipal];

    pub fn label(&self) -> &'static str {
        match self {
            AmortizationMethod::EqualPayment => "EqualPayment",
            AmortizationMethod::EqualPrincipal => "EqualPrincipal",
        }
    }
}

impl fmt::Display for AmortizationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AmortizationMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "EqualPayment" | "equal-payment" | "等额本息" => Ok(AmortizationMethod::EqualPayment),
            "EqualPrincipal" | "equal-principal" | "等额本金" => Ok(AmortizationMethod::EqualPrincipal),
            other => Err(format!("Unknown amortization method: {}", other)),
        }
    }
}

/// Inputs to a schedule computation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanParameters {
    /// Amount owed at period 0
    pub principal: f64,

    /// Nominal annual rate as a fraction (0.0465 for 4.65%)
    pub annual_rate: f64,

    /// Number of monthly repayment periods
    pub term_months: u32,

    pub method: AmortizationMethod,
}

impl LoanParameters {
    /// Build validated parameters from raw numeric inputs.
    ///
    /// `term_months` is taken as a float so that form and CSV inputs such as
    /// `12.5` are rejected here rather than silently truncated.
    pub fn try_new(
        principal: f64,
        annual_rate: f64,
        term_months: f64,
        method: AmortizationMethod,
    ) -> Result<Self> {
        let term_months = term_from_f64(term_months)?;
        let params = Self {
            principal,
            annual_rate,
            term_months,
            method,
        };
        params.validate()?;
        Ok(params)
    }

    /// Check the preconditions in order: principal, rate, term
    pub fn validate(&self) -> Result<()> {
        if !(self.principal.is_finite() && self.principal > 0.0) {
            return Err(AmortizationError::principal());
        }
        if !(self.annual_rate.is_finite() && self.annual_rate >= 0.0) {
            return Err(AmortizationError::annual_rate());
        }
        if self.term_months < 1 {
            return Err(AmortizationError::term_months());
        }
        if self.term_months > MAX_TERM_MONTHS {
            return Err(AmortizationError::term_too_long());
        }
        Ok(())
    }

    /// Periodic (monthly) rate
    pub fn monthly_rate(&self) -> f64 {
        self.annual_rate / MONTHS_PER_YEAR
    }

    /// Same loan under the other method
    pub fn with_method(self, method: AmortizationMethod) -> Self {
        Self { method, ..self }
    }
}

fn term_from_f64(term: f64) -> Result<u32> {
    if !term.is_finite() || term < 1.0 || term.fract() != 0.0 || term > u32::MAX as f64 {
        return Err(AmortizationError::term_months());
    }
    Ok(term as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoanField;

    fn field_of(result: Result<LoanParameters>) -> Option<LoanField> {
        result.err().and_then(|e| e.field())
    }

    #[test]
    fn test_try_new_accepts_valid_loan() {
        let params =
            LoanParameters::try_new(120_000.0, 0.06, 12.0, AmortizationMethod::EqualPayment).unwrap();
        assert_eq!(params.term_months, 12);
        assert!((params.monthly_rate() - 0.005).abs() < 1e-15);
    }

    #[test]
    fn test_try_new_rejects_each_field() {
        let m = AmortizationMethod::EqualPrincipal;
        assert_eq!(field_of(LoanParameters::try_new(0.0, 0.05, 12.0, m)), Some(LoanField::Principal));
        assert_eq!(field_of(LoanParameters::try_new(-1.0, 0.05, 12.0, m)), Some(LoanField::Principal));
        assert_eq!(field_of(LoanParameters::try_new(f64::NAN, 0.05, 12.0, m)), Some(LoanField::Principal));
        assert_eq!(field_of(LoanParameters::try_new(1000.0, -0.01, 12.0, m)), Some(LoanField::AnnualRate));
        assert_eq!(field_of(LoanParameters::try_new(1000.0, f64::NAN, 12.0, m)), Some(LoanField::AnnualRate));
        assert_eq!(field_of(LoanParameters::try_new(1000.0, 0.05, 0.0, m)), Some(LoanField::TermMonths));
        assert_eq!(field_of(LoanParameters::try_new(1000.0, 0.05, 12.5, m)), Some(LoanField::TermMonths));
        assert_eq!(field_of(LoanParameters::try_new(1000.0, 0.05, -3.0, m)), Some(LoanField::TermMonths));
    }

    #[test]
    fn test_term_is_capped() {
        let m = AmortizationMethod::EqualPayment;
        assert!(LoanParameters::try_new(1000.0, 0.05, f64::from(MAX_TERM_MONTHS), m).is_ok());
        assert_eq!(
            field_of(LoanParameters::try_new(1000.0, 0.05, f64::from(MAX_TERM_MONTHS + 1), m)),
            Some(LoanField::TermMonths)
        );

        let literal = LoanParameters {
            principal: 1000.0,
            annual_rate: 0.05,
            term_months: u32::MAX,
            method: m,
        };
        let err = literal.validate().unwrap_err();
        assert_eq!(err.to_string(), "invalid argument: term must be at most 12000 months");
    }

    #[test]
    fn test_zero_rate_is_valid() {
        assert!(LoanParameters::try_new(1000.0, 0.0, 10.0, AmortizationMethod::EqualPayment).is_ok());
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!("等额本息".parse::<AmortizationMethod>(), Ok(AmortizationMethod::EqualPayment));
        assert_eq!("equal-principal".parse::<AmortizationMethod>(), Ok(AmortizationMethod::EqualPrincipal));
        assert!("Balloon".parse::<AmortizationMethod>().is_err());
    }
}
