use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::schedule::{
    self, AmortizationEntry, LoanRequest, PaymentPolicy, ScheduleInput,
};
use crate::config::PricingConfig;
use crate::error::LoanbookError;
use crate::session::Session;
use crate::time_value;
use crate::types::*;
use crate::LoanbookResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Loan amount after the down payment. The down payment is clamped into
/// `[0, home_value]`.
pub fn financed_principal(home_value: Money, down_payment: Money) -> LoanbookResult<Money> {
    if home_value < Decimal::ZERO {
        return Err(LoanbookError::invalid(
            "home_value",
            "Home value cannot be negative",
        ));
    }
    let down = down_payment.max(Decimal::ZERO).min(home_value);
    Ok(home_value - down)
}

/// Displayed effective annual rate: nominal rate plus the configured markup.
pub fn dae(annual_rate_percent: Percent, config: &PricingConfig) -> Percent {
    annual_rate_percent + config.dae_markup_percent
}

/// Request sent to a mortgage quote provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MortgageQuoteRequest {
    pub interest_rate: Percent,
    pub home_value: Money,
    pub downpayment: Money,
    pub duration_years: u32,
    #[serde(default)]
    pub monthly_hoa: Money,
    #[serde(default)]
    pub annual_property_tax: Money,
    #[serde(default)]
    pub annual_home_insurance: Money,
}

impl MortgageQuoteRequest {
    pub fn loan_request(&self) -> LoanbookResult<LoanRequest> {
        for (field, value) in [
            ("monthly_hoa", self.monthly_hoa),
            ("annual_property_tax", self.annual_property_tax),
            ("annual_home_insurance", self.annual_home_insurance),
        ] {
            if value < Decimal::ZERO {
                return Err(LoanbookError::invalid(field, "Cost cannot be negative"));
            }
        }
        let principal = financed_principal(self.home_value, self.downpayment)?;
        let loan = LoanRequest::from_tenor_years(principal, self.interest_rate, self.duration_years);
        loan.validate()?;
        Ok(loan)
    }

    /// HOA plus the monthly share of property tax and insurance.
    pub fn monthly_escrow(&self) -> LoanbookResult<Money> {
        self.monthly_hoa
            .checked_add(self.annual_property_tax / MONTHS_PER_YEAR)
            .and_then(|m| m.checked_add(self.annual_home_insurance / MONTHS_PER_YEAR))
            .ok_or_else(|| LoanbookError::overflow("monthly_hoa"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPayment {
    /// Mortgage installment plus escrowed costs
    pub total: Money,
    /// Principal and interest only
    pub mortgage: Money,
}

/// Quote returned by a mortgage quote provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MortgageQuote {
    pub monthly_payment: MonthlyPayment,
    pub total_interest_paid: Money,
}

/// Supplier of mortgage quotes.
///
/// Remote providers authenticate with the caller's session; the
/// in-process [`LocalQuoteSource`] does not.
pub trait QuoteSource {
    fn requires_session(&self) -> bool {
        true
    }

    fn quote(
        &self,
        session: &Session,
        request: &MortgageQuoteRequest,
    ) -> LoanbookResult<MortgageQuote>;
}

/// Prices a mortgage in-process with the annuity formula.
#[derive(Debug, Clone, Default)]
pub struct LocalQuoteSource;

impl QuoteSource for LocalQuoteSource {
    fn requires_session(&self) -> bool {
        false
    }

    fn quote(
        &self,
        session: &Session,
        request: &MortgageQuoteRequest,
    ) -> LoanbookResult<MortgageQuote> {
        let loan = request.loan_request()?;
        log::debug!(
            "local mortgage quote for {}: principal={} term={}",
            session.user_id().unwrap_or("anonymous"),
            loan.principal,
            loan.term_months
        );
        let mortgage = time_value::pmt(loan.monthly_rate(), loan.term_months, loan.principal)?;
        let total_interest_paid = mortgage
            .checked_mul(Decimal::from(loan.term_months))
            .ok_or_else(|| LoanbookError::overflow("total_interest_paid"))?
            - loan.principal;
        let total = mortgage
            .checked_add(request.monthly_escrow()?)
            .ok_or_else(|| LoanbookError::overflow("monthly_payment.total"))?;
        Ok(MortgageQuote {
            monthly_payment: MonthlyPayment { total, mortgage },
            total_interest_paid: total_interest_paid.max(Decimal::ZERO),
        })
    }
}

/// Input for building a mortgage simulation from an already obtained quote
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MortgageSimulationInput {
    pub request: MortgageQuoteRequest,
    pub quote: MortgageQuote,
}

/// Figures shown on the loan calculator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MortgageSimulation {
    pub approved_amount: Money,
    pub interest_rate: Percent,
    pub monthly_payment: Money,
    pub mortgage_payment: Money,
    pub dae: Percent,
    pub total_cost: Money,
    pub total_interest: Money,
    pub schedule: Vec<AmortizationEntry>,
}

/// Combine a provider quote with a locally generated annuity schedule that
/// uses the quoted mortgage installment.
pub fn simulate_mortgage(
    input: &MortgageSimulationInput,
    config: &PricingConfig,
) -> LoanbookResult<ComputationOutput<MortgageSimulation>> {
    let start = Instant::now();
    let request = &input.request;
    let quote = &input.quote;
    let loan = request.loan_request()?;

    if quote.monthly_payment.total < quote.monthly_payment.mortgage {
        return Err(LoanbookError::invalid(
            "monthly_payment.total",
            "Total monthly payment cannot be below the mortgage installment",
        ));
    }

    let mut warnings: Vec<String> = Vec::new();
    if request.downpayment > request.home_value {
        warnings.push(format!(
            "Down payment {} exceeds home value {}; clamped",
            request.downpayment, request.home_value
        ));
    }

    let sched = schedule::compute_schedule(
        &ScheduleInput {
            loan: loan.clone(),
            policy: PaymentPolicy::Annuity {
                monthly_payment: Some(quote.monthly_payment.mortgage),
            },
        },
        config,
    )?;
    warnings.extend(sched.warnings);

    let output = MortgageSimulation {
        approved_amount: loan.principal,
        interest_rate: request.interest_rate,
        monthly_payment: quote.monthly_payment.total,
        mortgage_payment: quote.monthly_payment.mortgage,
        dae: dae(request.interest_rate, config),
        total_cost: quote
            .monthly_payment
            .total
            .checked_mul(Decimal::from(loan.term_months))
            .ok_or_else(|| LoanbookError::overflow("total_cost"))?,
        total_interest: quote.total_interest_paid,
        schedule: sched.result.schedule,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Mortgage Simulation (quoted installment, local annuity schedule)",
        &serde_json::json!({
            "home_value": request.home_value.to_string(),
            "downpayment": request.downpayment.to_string(),
            "interest_rate": request.interest_rate.to_string(),
            "duration_years": request.duration_years,
            "dae_markup_percent": config.dae_markup_percent.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Obtain a quote from `source` and build the simulation.
///
/// Sources that require a session are only called while `session` is
/// authenticated at `now`.
pub fn price_mortgage(
    source: &dyn QuoteSource,
    session: &Session,
    request: &MortgageQuoteRequest,
    config: &PricingConfig,
    now: DateTime<Utc>,
) -> LoanbookResult<ComputationOutput<MortgageSimulation>> {
    if source.requires_session() {
        session.bearer_token(now)?;
    }
    let quote = source.quote(session, request)?;
    simulate_mortgage(
        &MortgageSimulationInput {
            request: request.clone(),
            quote,
        },
        config,
    )
}
