use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use loanbook_core::amortization::mortgage::{
    self, LocalQuoteSource, MortgageQuote, MortgageQuoteRequest, MortgageSimulationInput,
};
use loanbook_core::session::Session;
use loanbook_core::PricingConfig;

use crate::input;

/// Arguments for a mortgage simulation
#[derive(Args)]
pub struct MortgageArgs {
    /// Path to JSON quote request, or a {"request", "quote"} pair
    #[arg(long)]
    pub input: Option<String>,

    /// Path to a JSON quote from an external provider; priced locally when absent
    #[arg(long)]
    pub quote: Option<String>,

    /// Purchase price of the home
    #[arg(long)]
    pub home_value: Option<Decimal>,

    /// Down payment
    #[arg(long, default_value = "0")]
    pub downpayment: Decimal,

    /// Nominal annual rate in percent (e.g. 9.5)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Duration in years
    #[arg(long)]
    pub years: Option<u32>,

    /// Monthly HOA fee
    #[arg(long, default_value = "0")]
    pub monthly_hoa: Decimal,

    /// Annual property tax
    #[arg(long, default_value = "0")]
    pub property_tax: Decimal,

    /// Annual home insurance
    #[arg(long, default_value = "0")]
    pub insurance: Decimal,
}

pub fn run_mortgage(
    args: MortgageArgs,
    config: &PricingConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let data = if let Some(ref path) = args.input {
        Some(input::file::read_json_value(path)?)
    } else {
        input::stdin::read_stdin()?
    };

    // A full simulation input already carries its quote.
    if let Some(Value::Object(ref map)) = data {
        if map.contains_key("request") && map.contains_key("quote") {
            let sim: MortgageSimulationInput = serde_json::from_value(Value::Object(map.clone()))?;
            let result = mortgage::simulate_mortgage(&sim, config)?;
            return Ok(serde_json::to_value(result)?);
        }
    }

    let request: MortgageQuoteRequest = match data {
        Some(v) => serde_json::from_value(v)?,
        None => MortgageQuoteRequest {
            interest_rate: args.rate.ok_or("--rate is required (or provide --input)")?,
            home_value: args
                .home_value
                .ok_or("--home-value is required (or provide --input)")?,
            downpayment: args.downpayment,
            duration_years: args.years.ok_or("--years is required (or provide --input)")?,
            monthly_hoa: args.monthly_hoa,
            annual_property_tax: args.property_tax,
            annual_home_insurance: args.insurance,
        },
    };

    let result = if let Some(ref path) = args.quote {
        let quote: MortgageQuote = input::file::read_json(path)?;
        mortgage::simulate_mortgage(&MortgageSimulationInput { request, quote }, config)?
    } else {
        mortgage::price_mortgage(
            &LocalQuoteSource,
            &Session::anonymous(),
            &request,
            config,
            chrono::Utc::now(),
        )?
    };
    Ok(serde_json::to_value(result)?)
}
