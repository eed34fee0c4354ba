//! Loan inputs: parameters, amortization method, and loan-book loading

mod params;
pub mod loader;

pub use params::{AmortizationMethod, LoanParameters, MAX_TERM_MONTHS, MONTHS_PER_YEAR};
pub use loader::{load_loans, load_loans_from_reader, LoanRecord};
