//! Schedule renderers: CSV, JSON and fixed-width tables
//!
//! Amounts are rounded to cents only in CSV and table output. JSON carries
//! the unrounded values.

use crate::batch::{LoanOutcome, MethodComparison};
use crate::error::Result;
use crate::loan::AmortizationMethod;
use crate::schedule::{PaymentPeriod, Schedule, ScheduleSummary};
use chrono::NaiveDate;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct CsvPeriodRow<'a> {
    #[serde(rename = "LoanID")]
    loan_id: &'a str,
    #[serde(rename = "Period")]
    period: u32,
    #[serde(rename = "DueDate")]
    due_date: Option<NaiveDate>,
    #[serde(rename = "Payment")]
    payment: String,
    #[serde(rename = "Principal")]
    principal: String,
    #[serde(rename = "Interest")]
    interest: String,
    #[serde(rename = "RemainingPrincipal")]
    remaining_principal: String,
}

#[derive(Debug, Serialize)]
struct CsvSummaryRow<'a> {
    #[serde(rename = "LoanID")]
    loan_id: &'a str,
    #[serde(rename = "Method")]
    method: String,
    #[serde(rename = "Periods")]
    periods: Option<u32>,
    #[serde(rename = "TotalPayment")]
    total_payment: Option<String>,
    #[serde(rename = "TotalInterest")]
    total_interest: Option<String>,
    #[serde(rename = "FirstPayment")]
    first_payment: Option<String>,
    #[serde(rename = "LastPayment")]
    last_payment: Option<String>,
    #[serde(rename = "Error")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct ScheduleReport<'a> {
    method: String,
    principal: f64,
    annual_rate: f64,
    term_months: u32,
    schedule: &'a [PaymentPeriod],
    summary: &'a ScheduleSummary,
    effective_annual_rate: Option<f64>,
}

fn cents(amount: f64) -> String {
    format!("{:.2}", amount)
}

fn period_rows<'a>(
    loan_id: &'a str,
    schedule: &'a Schedule,
    start_date: Option<NaiveDate>,
) -> impl Iterator<Item = CsvPeriodRow<'a>> + 'a {
    schedule.dated_periods(start_date).map(move |(due_date, p)| CsvPeriodRow {
        loan_id,
        period: p.period,
        due_date,
        payment: cents(p.payment_amount),
        principal: cents(p.principal_portion),
        interest: cents(p.interest_portion),
        remaining_principal: cents(p.remaining_principal),
    })
}

/// Write one schedule as CSV rows
pub fn write_schedule_csv<W: Write>(
    writer: W,
    loan_id: &str,
    schedule: &Schedule,
    start_date: Option<NaiveDate>,
) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for row in period_rows(loan_id, schedule, start_date) {
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(())
}

/// Write both schedules of a comparison as CSV, keyed by method name
pub fn write_comparison_csv<W: Write>(writer: W, comparison: &MethodComparison) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for method in AmortizationMethod::ALL {
        for row in period_rows(method.label(), comparison.get(method), None) {
            csv.serialize(row)?;
        }
    }
    csv.flush()?;
    Ok(())
}

/// Write every successful schedule of a batch as CSV rows, in loan order
pub fn write_batch_csv<W: Write>(writer: W, outcomes: &[LoanOutcome]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for outcome in outcomes {
        if let Some(schedule) = outcome.schedule() {
            for row in period_rows(&outcome.loan_id, schedule, outcome.start_date) {
                csv.serialize(row)?;
            }
        }
    }
    csv.flush()?;
    Ok(())
}

/// Write one summary line per loan, including rejected loans with their error
pub fn write_batch_summary_csv<W: Write>(writer: W, outcomes: &[LoanOutcome]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for outcome in outcomes {
        let row = match &outcome.result {
            Ok(schedule) => {
                let summary = schedule.summary();
                CsvSummaryRow {
                    loan_id: &outcome.loan_id,
                    method: schedule.params.method.to_string(),
                    periods: Some(summary.period_count),
                    total_payment: Some(cents(summary.total_payment)),
                    total_interest: Some(cents(summary.total_interest)),
                    first_payment: Some(cents(summary.first_period_payment)),
                    last_payment: Some(cents(summary.last_period_payment)),
                    error: None,
                }
            }
            Err(e) => CsvSummaryRow {
                loan_id: &outcome.loan_id,
                method: String::new(),
                periods: None,
                total_payment: None,
                total_interest: None,
                first_payment: None,
                last_payment: None,
                error: Some(e.to_string()),
            },
        };
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(())
}

fn report(schedule: &Schedule) -> ScheduleReport<'_> {
    ScheduleReport {
        method: schedule.params.method.to_string(),
        principal: schedule.params.principal,
        annual_rate: schedule.params.annual_rate,
        term_months: schedule.params.term_months,
        schedule: schedule.periods(),
        summary: schedule.summary(),
        effective_annual_rate: schedule.effective_annual_rate(),
    }
}

/// Write a schedule and its summary as pretty JSON
pub fn write_schedule_json<W: Write>(mut writer: W, schedule: &Schedule) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, &report(schedule))?;
    writeln!(writer)?;
    Ok(())
}

/// Write both schedules of a comparison as pretty JSON
pub fn write_comparison_json<W: Write>(mut writer: W, comparison: &MethodComparison) -> Result<()> {
    let value = serde_json::json!({
        "equal_payment": report(&comparison.equal_payment),
        "equal_principal": report(&comparison.equal_principal),
        "interest_saving": comparison.interest_saving(),
    });
    serde_json::to_writer_pretty(&mut writer, &value)?;
    writeln!(writer)?;
    Ok(())
}

/// Write a schedule as a fixed-width table followed by its summary
pub fn write_schedule_table<W: Write>(
    mut writer: W,
    schedule: &Schedule,
    start_date: Option<NaiveDate>,
) -> Result<()> {
    writeln!(
        writer,
        "{:>6} {:>10} {:>14} {:>14} {:>14} {:>16}",
        "Period", "Due", "Payment", "Principal", "Interest", "Remaining"
    )?;
    writeln!(writer, "{}", "-".repeat(79))?;

    for (due, p) in schedule.dated_periods(start_date) {
        let due = due.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string());
        writeln!(
            writer,
            "{:>6} {:>10} {:>14.2} {:>14.2} {:>14.2} {:>16.2}",
            p.period, due, p.payment_amount, p.principal_portion, p.interest_portion, p.remaining_principal
        )?;
    }

    write_summary_table(&mut writer, schedule)
}

fn write_summary_table<W: Write>(writer: &mut W, schedule: &Schedule) -> Result<()> {
    let summary = schedule.summary();
    writeln!(writer)?;
    writeln!(writer, "Summary ({}):", schedule.params.method)?;
    writeln!(writer, "  Periods:          {}", summary.period_count)?;
    writeln!(writer, "  Total Payment:    {:.2}", summary.total_payment)?;
    writeln!(writer, "  Total Interest:   {:.2}", summary.total_interest)?;
    writeln!(writer, "  First Payment:    {:.2}", summary.first_period_payment)?;
    writeln!(writer, "  Last Payment:     {:.2}", summary.last_period_payment)?;
    if let Some(rate) = schedule.effective_annual_rate() {
        writeln!(writer, "  Effective Rate:   {:.4}%", rate * 100.0)?;
    }
    Ok(())
}

/// Write the headline figures of both methods side by side
pub fn write_comparison_table<W: Write>(mut writer: W, comparison: &MethodComparison) -> Result<()> {
    let ep = comparison.equal_payment.summary();
    let eq = comparison.equal_principal.summary();

    writeln!(writer, "{:<16} {:>16} {:>16}", "", "EqualPayment", "EqualPrincipal")?;
    writeln!(writer, "{}", "-".repeat(50))?;
    writeln!(writer, "{:<16} {:>16.2} {:>16.2}", "First Payment", ep.first_period_payment, eq.first_period_payment)?;
    writeln!(writer, "{:<16} {:>16.2} {:>16.2}", "Last Payment", ep.last_period_payment, eq.last_period_payment)?;
    writeln!(writer, "{:<16} {:>16.2} {:>16.2}", "Total Payment", ep.total_payment, eq.total_payment)?;
    writeln!(writer, "{:<16} {:>16.2} {:>16.2}", "Total Interest", ep.total_interest, eq.total_interest)?;
    writeln!(writer)?;
    writeln!(writer, "Interest saved with EqualPrincipal: {:.2}", comparison.interest_saving())?;
    Ok(())
}
