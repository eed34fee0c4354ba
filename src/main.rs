//! Loan Amortization CLI
//!
//! Command-line interface for computing repayment schedules

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use loan_amortization::{
    loan::load_loans,
    output, AmortizationMethod, BatchRunner, LoanParameters,
};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "loan-amortization")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the repayment schedule for one loan
    Schedule {
        #[command(flatten)]
        loan: LoanArgs,

        /// Amortization method
        #[arg(short, long, value_enum, default_value = "equal-payment")]
        method: MethodArg,

        /// First period is due one month after this date (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<NaiveDate>,

        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Compare equal-payment and equal-principal for one loan
    Compare {
        #[command(flatten)]
        loan: LoanArgs,

        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Compute schedules for every loan in a CSV loan book
    Batch {
        /// Loan book with columns LoanID,Principal,AnnualRate,TermMonths,Method[,StartDate]
        #[arg(short, long)]
        input: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write one summary line per loan instead of every period
        #[arg(long)]
        summary_only: bool,
    },
}

#[derive(Args)]
struct LoanArgs {
    /// Amount borrowed
    #[arg(short, long)]
    principal: f64,

    /// Nominal annual rate as a fraction (0.0465 for 4.65%)
    #[arg(short, long, allow_negative_numbers = true, conflicts_with = "rate_percent")]
    rate: Option<f64>,

    /// Nominal annual rate in percent (4.65 for 4.65%)
    #[arg(long, allow_negative_numbers = true)]
    rate_percent: Option<f64>,

    /// Number of monthly periods
    #[arg(short, long, allow_negative_numbers = true)]
    term: f64,
}

impl LoanArgs {
    fn annual_rate(&self) -> anyhow::Result<f64> {
        match (self.rate, self.rate_percent) {
            (Some(rate), None) => Ok(rate),
            (None, Some(pct)) => Ok(pct / 100.0),
            _ => bail!("one of --rate or --rate-percent is required"),
        }
    }

    fn parameters(&self, method: AmortizationMethod) -> anyhow::Result<LoanParameters> {
        let params = LoanParameters::try_new(self.principal, self.annual_rate()?, self.term, method)?;
        Ok(params)
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MethodArg {
    EqualPayment,
    EqualPrincipal,
}

impl From<MethodArg> for AmortizationMethod {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::EqualPayment => AmortizationMethod::EqualPayment,
            MethodArg::EqualPrincipal => AmortizationMethod::EqualPrincipal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Csv,
    Json,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let runner = BatchRunner::new();
    let stdout = io::stdout();

    match cli.command {
        Commands::Schedule { loan, method, start_date, format } => {
            let params = loan.parameters(method.into())?;
            let schedule = runner.run(&params)?;
            let out = stdout.lock();
            match format {
                OutputFormat::Table => output::write_schedule_table(out, &schedule, start_date)?,
                OutputFormat::Csv => output::write_schedule_csv(out, "loan", &schedule, start_date)?,
                OutputFormat::Json => output::write_schedule_json(out, &schedule)?,
            }
        }
        Commands::Compare { loan, format } => {
            let params = loan.parameters(AmortizationMethod::EqualPayment)?;
            let comparison = runner.compare_methods(&params)?;
            let out = stdout.lock();
            match format {
                OutputFormat::Table => output::write_comparison_table(out, &comparison)?,
                OutputFormat::Csv => output::write_comparison_csv(out, &comparison)?,
                OutputFormat::Json => output::write_comparison_json(out, &comparison)?,
            }
        }
        Commands::Batch { input, output: output_path, summary_only } => {
            let loans = load_loans(&input)
                .with_context(|| format!("failed to load loan book {}", input.display()))?;
            let outcomes = runner.run_batch(&loans);

            let writer: Box<dyn Write> = match &output_path {
                Some(path) => Box::new(BufWriter::new(
                    File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
                )),
                None => Box::new(stdout.lock()),
            };

            if summary_only {
                output::write_batch_summary_csv(writer, &outcomes)?;
            } else {
                output::write_batch_csv(writer, &outcomes)?;
            }

            let rejected = outcomes.iter().filter(|o| o.result.is_err()).count();
            if let Some(path) = output_path {
                eprintln!("Wrote {} schedules to {}", outcomes.len() - rejected, path.display());
            }
            if rejected > 0 {
                eprintln!("{} loans rejected (see log or --summary-only output)", rejected);
            }
        }
    }

    Ok(())
}
