//! Load loan books from CSV

use super::{AmortizationMethod, LoanParameters};
use crate::error::{AmortizationError, Result};
use chrono::NaiveDate;
use csv::{Reader, StringRecord};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Raw CSV row matching the loan-book columns
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "LoanID")]
    loan_id: String,
    #[serde(rename = "Principal")]
    principal: f64,
    #[serde(rename = "AnnualRate")]
    annual_rate: f64,
    #[serde(rename = "TermMonths")]
    term_months: f64,
    #[serde(rename = "Method")]
    method: String,
    #[serde(rename = "StartDate", default)]
    start_date: Option<NaiveDate>,
}

/// One loan from a loan book, with its inputs not yet validated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRecord {
    pub loan_id: String,
    pub principal: f64,
    pub annual_rate: f64,
    /// Kept as read so that fractional terms fail validation per loan
    pub term_months: f64,
    pub method: AmortizationMethod,
    pub start_date: Option<NaiveDate>,
}

impl LoanRecord {
    pub fn new(loan_id: impl Into<String>, params: LoanParameters) -> Self {
        Self {
            loan_id: loan_id.into(),
            principal: params.principal,
            annual_rate: params.annual_rate,
            term_months: f64::from(params.term_months),
            method: params.method,
            start_date: None,
        }
    }

    pub fn with_start_date(mut self, start_date: NaiveDate) -> Self {
        self.start_date = Some(start_date);
        self
    }

    /// Validated engine inputs for this loan
    pub fn parameters(&self) -> Result<LoanParameters> {
        LoanParameters::try_new(self.principal, self.annual_rate, self.term_months, self.method)
    }
}

impl CsvRow {
    fn into_record(self, line: u64) -> Result<LoanRecord> {
        let method = self
            .method
            .parse::<AmortizationMethod>()
            .map_err(|reason| AmortizationError::InvalidRecord { line, reason })?;

        Ok(LoanRecord {
            loan_id: self.loan_id,
            principal: self.principal,
            annual_rate: self.annual_rate,
            term_months: self.term_months,
            method,
            start_date: self.start_date,
        })
    }
}

/// Load all loans from a CSV file
pub fn load_loans<P: AsRef<Path>>(path: P) -> Result<Vec<LoanRecord>> {
    let reader = Reader::from_path(path)?;
    read_records(reader)
}

/// Load loans from any reader (e.g., string buffer, stdin)
pub fn load_loans_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<LoanRecord>> {
    read_records(Reader::from_reader(reader))
}

fn read_records<R: std::io::Read>(mut reader: Reader<R>) -> Result<Vec<LoanRecord>> {
    let headers = reader.headers()?.clone();
    let mut loans = Vec::new();
    let mut record = StringRecord::new();

    while reader.read_record(&mut record)? {
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let row: CsvRow = record.deserialize(Some(&headers))?;
        loans.push(row.into_record(line)?);
    }

    log::debug!("loaded {} loans", loans.len());
    Ok(loans)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOOK: &str = "\
LoanID,Principal,AnnualRate,TermMonths,Method,StartDate
mortgage,120000,0.06,12,EqualPayment,2024-01-31
car,30000,0.0465,36,等额本金,
broken-term,5000,0.05,12.5,EqualPrincipal,
";

    #[test]
    fn test_load_loans_from_reader() {
        let loans = load_loans_from_reader(BOOK.as_bytes()).unwrap();
        assert_eq!(loans.len(), 3);

        assert_eq!(loans[0].loan_id, "mortgage");
        assert_eq!(loans[0].method, AmortizationMethod::EqualPayment);
        assert_eq!(loans[0].start_date, NaiveDate::from_ymd_opt(2024, 1, 31));

        assert_eq!(loans[1].method, AmortizationMethod::EqualPrincipal);
        assert_eq!(loans[1].start_date, None);
        assert_eq!(loans[1].parameters().unwrap().term_months, 36);
    }

    #[test]
    fn test_fractional_term_fails_per_loan() {
        let loans = load_loans_from_reader(BOOK.as_bytes()).unwrap();
        let err = loans[2].parameters().unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_unknown_method_reports_line() {
        let book = "LoanID,Principal,AnnualRate,TermMonths,Method\na,100,0.01,2,EqualPayment\nb,100,0.01,2,Balloon\n";
        match load_loans_from_reader(book.as_bytes()) {
            Err(AmortizationError::InvalidRecord { line, reason }) => {
                assert_eq!(line, 3);
                assert!(reason.contains("Balloon"));
            }
            other => panic!("expected InvalidRecord, got {:?}", other),
        }
    }

    #[test]
    fn test_start_date_column_is_optional() {
        let book = "LoanID,Principal,AnnualRate,TermMonths,Method\na,100,0.01,2,EqualPayment\n";
        let loans = load_loans_from_reader(book.as_bytes()).unwrap();
        assert_eq!(loans[0].start_date, None);
    }
}
