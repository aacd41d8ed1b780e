use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use loanbook_core::amortization::schedule::{self, LoanRequest, PaymentPolicy, ScheduleInput};
use loanbook_core::PricingConfig;

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PolicyArg {
    /// Level installment on a declining balance
    Annuity,
    /// Interest on the original principal, spread evenly
    Flat,
}

/// Arguments for an amortization schedule
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Nominal annual rate in percent (e.g. 9.5)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Term in months
    #[arg(long, conflicts_with = "years")]
    pub months: Option<u32>,

    /// Term in whole years
    #[arg(long)]
    pub years: Option<u32>,

    /// Repayment policy
    #[arg(long, value_enum, default_value = "annuity")]
    pub policy: PolicyArg,

    /// Externally quoted monthly installment (annuity policy only)
    #[arg(long)]
    pub monthly_payment: Option<Decimal>,
}

pub fn run_schedule(
    args: ScheduleArgs,
    config: &PricingConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let schedule_input: ScheduleInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        let principal = args
            .principal
            .ok_or("--principal is required (or provide --input)")?;
        let rate = args.rate.ok_or("--rate is required (or provide --input)")?;
        let loan = match (args.months, args.years) {
            (Some(m), _) => LoanRequest::new(principal, rate, m),
            (None, Some(y)) => LoanRequest::from_tenor_years(principal, rate, y),
            (None, None) => return Err("--months or --years is required".into()),
        };
        let policy = match args.policy {
            PolicyArg::Annuity => PaymentPolicy::Annuity {
                monthly_payment: args.monthly_payment,
            },
            PolicyArg::Flat if args.monthly_payment.is_some() => {
                return Err("--monthly-payment only applies to the annuity policy".into())
            }
            PolicyArg::Flat => PaymentPolicy::FlatInterest,
        };
        ScheduleInput { loan, policy }
    };

    let result = schedule::compute_schedule(&schedule_input, config)?;
    Ok(serde_json::to_value(result)?)
}
