//! Error types for schedule computation and loan-book I/O

use std::fmt;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, AmortizationError>;

/// Loan input that failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanField {
    Principal,
    AnnualRate,
    TermMonths,
}

impl fmt::Display for LoanField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoanField::Principal => "principal",
            LoanField::AnnualRate => "annual_rate",
            LoanField::TermMonths => "term_months",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum AmortizationError {
    /// A loan parameter violated a precondition. No schedule is produced.
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        field: LoanField,
        reason: &'static str,
    },

    /// A loan-book row could not be turned into loan parameters
    #[error("invalid record at line {line}: {reason}")]
    InvalidRecord { line: u64, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AmortizationError {
    pub(crate) fn principal() -> Self {
        Self::InvalidArgument {
            field: LoanField::Principal,
            reason: "principal must be positive",
        }
    }

    pub(crate) fn annual_rate() -> Self {
        Self::InvalidArgument {
            field: LoanField::AnnualRate,
            reason: "rate must be non-negative",
        }
    }

    pub(crate) fn term_months() -> Self {
        Self::InvalidArgument {
            field: LoanField::TermMonths,
            reason: "term must be a positive integer",
        }
    }

    pub(crate) fn term_too_long() -> Self {
        Self::InvalidArgument {
            field: LoanField::TermMonths,
            reason: "term must be at most 12000 months",
        }
    }

    /// Field that failed validation, if this is a validation error
    pub fn field(&self) -> Option<LoanField> {
        match self {
            Self::InvalidArgument { field, .. } => Some(*field),
            _ => None,
        }
    }

    /// True when the caller should treat this as a form error rather than a system error
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages() {
        assert_eq!(
            AmortizationError::principal().to_string(),
            "invalid argument: principal must be positive"
        );
        assert_eq!(
            AmortizationError::annual_rate().to_string(),
            "invalid argument: rate must be non-negative"
        );
        assert_eq!(
            AmortizationError::term_months().to_string(),
            "invalid argument: term must be a positive integer"
        );
    }

    #[test]
    fn test_field_only_for_validation_errors() {
        assert_eq!(AmortizationError::term_months().field(), Some(LoanField::TermMonths));

        let io = AmortizationError::from(std::io::Error::other("disk"));
        assert_eq!(io.field(), None);
        assert!(!io.is_invalid_argument());
    }
}
