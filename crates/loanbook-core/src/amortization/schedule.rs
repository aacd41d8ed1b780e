use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::config::PricingConfig;
use crate::error::LoanbookError;
use crate::time_value;
use crate::types::*;
use crate::LoanbookResult;

const MONTHS_PER_YEAR: u32 = 12;
/// Longest schedule accepted: 100 years of monthly installments.
pub const MAX_TERM_MONTHS: u32 = 1200;

/// Loan terms as entered on the calculator form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRequest {
    pub principal: Money,
    /// Nominal annual rate in percent (9.5 = 9.5%)
    pub annual_rate_percent: Percent,
    pub term_months: u32,
}

impl LoanRequest {
    pub fn new(principal: Money, annual_rate_percent: Percent, term_months: u32) -> Self {
        LoanRequest {
            principal,
            annual_rate_percent,
            term_months,
        }
    }

    /// Build a request from a tenor in whole years.
    pub fn from_tenor_years(principal: Money, annual_rate_percent: Percent, years: u32) -> Self {
        Self::new(
            principal,
            annual_rate_percent,
            years.saturating_mul(MONTHS_PER_YEAR),
        )
    }

    pub fn monthly_rate(&self) -> Rate {
        time_value::monthly_rate(self.annual_rate_percent)
    }

    pub fn validate(&self) -> LoanbookResult<()> {
        if self.term_months == 0 {
            return Err(LoanbookError::invalid(
                "term_months",
                "Term must be at least 1 month",
            ));
        }
        if self.term_months > MAX_TERM_MONTHS {
            return Err(LoanbookError::invalid(
                "term_months",
                format!("Term cannot exceed {MAX_TERM_MONTHS} months"),
            ));
        }
        if self.principal < Decimal::ZERO {
            return Err(LoanbookError::invalid(
                "principal",
                "Principal cannot be negative",
            ));
        }
        if self.annual_rate_percent < Decimal::ZERO {
            return Err(LoanbookError::invalid(
                "annual_rate_percent",
                "Interest rate cannot be negative",
            ));
        }
        Ok(())
    }
}

/// How the monthly installment is determined. Exactly one policy applies
/// to a schedule; the two are never mixed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaymentPolicy {
    /// Level installment on a declining balance. The installment is either
    /// supplied (e.g. by a mortgage quote) or derived from the annuity formula.
    Annuity {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        monthly_payment: Option<Money>,
    },
    /// Interest charged on the original principal for the whole term and
    /// spread evenly across months.
    FlatInterest,
}

impl Default for PaymentPolicy {
    fn default() -> Self {
        PaymentPolicy::Annuity {
            monthly_payment: None,
        }
    }
}

/// Input for a schedule computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleInput {
    #[serde(flatten)]
    pub loan: LoanRequest,
    #[serde(default)]
    pub policy: PaymentPolicy,
}

/// One month of the repayment schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationEntry {
    pub month_index: u32,
    pub payment: Money,
    pub principal_portion: Money,
    pub interest_portion: Money,
    pub remaining_balance: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationResult {
    pub policy: PaymentPolicy,
    pub monthly_rate: Rate,
    pub monthly_payment: Money,
    pub total_interest: Money,
    pub total_cost: Money,
    pub schedule: Vec<AmortizationEntry>,
}

/// Closed-form level installment for a loan request.
pub fn annuity_payment(request: &LoanRequest) -> LoanbookResult<Money> {
    request.validate()?;
    time_value::pmt(request.monthly_rate(), request.term_months, request.principal)
}

/// Build the month-by-month schedule for a loan under the given policy.
pub fn compute_schedule(
    input: &ScheduleInput,
    config: &PricingConfig,
) -> LoanbookResult<ComputationOutput<AmortizationResult>> {
    let start = Instant::now();
    let loan = &input.loan;
    loan.validate()?;

    let mut warnings: Vec<String> = Vec::new();
    if loan.principal.is_zero() {
        warnings.push("Principal is zero; schedule contains no repayments".into());
    }

    let (methodology, result) = match &input.policy {
        PaymentPolicy::Annuity { monthly_payment } => (
            "Annuity Amortization Schedule",
            annuity_schedule(loan, *monthly_payment, config, &mut warnings)?,
        ),
        PaymentPolicy::FlatInterest => (
            "Flat-Interest Amortization Schedule",
            flat_schedule(loan)?,
        ),
    };

    log::debug!(
        "{methodology}: principal={} rate={}% term={} payment={}",
        loan.principal,
        loan.annual_rate_percent,
        loan.term_months,
        result.monthly_payment
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        methodology,
        &serde_json::json!({
            "principal": loan.principal.to_string(),
            "annual_rate_percent": loan.annual_rate_percent.to_string(),
            "term_months": loan.term_months,
            "policy": input.policy,
        }),
        warnings,
        elapsed,
        result,
    ))
}

fn annuity_schedule(
    loan: &LoanRequest,
    supplied_payment: Option<Money>,
    config: &PricingConfig,
    warnings: &mut Vec<String>,
) -> LoanbookResult<AmortizationResult> {
    let rate = loan.monthly_rate();
    let term = loan.term_months;

    let payment = match supplied_payment {
        Some(p) if p < Decimal::ZERO => {
            return Err(LoanbookError::invalid(
                "monthly_payment",
                "Monthly payment cannot be negative",
            ));
        }
        Some(p) => p,
        None => time_value::pmt(rate, term, loan.principal)?,
    };

    let first_interest = loan
        .principal
        .checked_mul(rate)
        .ok_or_else(|| LoanbookError::overflow("principal"))?;
    if loan.principal > Decimal::ZERO && payment <= first_interest {
        return Err(LoanbookError::invalid(
            "monthly_payment",
            format!("Payment {payment} does not cover the first month's interest of {first_interest}"),
        ));
    }

    if supplied_payment.is_some() {
        let residual = time_value::balance_after(rate, loan.principal, payment, term)?;
        if residual > config.settlement_tolerance {
            warnings.push(format!(
                "Payment {payment} leaves {residual} outstanding after month {term}; settled in the final installment"
            ));
        }
    }

    let mut schedule = Vec::with_capacity(term as usize);
    let mut balance = loan.principal;
    let mut total_interest = Decimal::ZERO;

    for month in 1..=term {
        let interest = balance
            .checked_mul(rate)
            .ok_or_else(|| LoanbookError::overflow("principal"))?;
        // Capped so an oversized payment cannot repay more than is owed.
        let principal_portion = if month == term {
            balance
        } else {
            (payment - interest).min(balance)
        };

        balance = (balance - principal_portion).max(Decimal::ZERO);
        total_interest = total_interest
            .checked_add(interest)
            .ok_or_else(|| LoanbookError::overflow("total_interest"))?;

        schedule.push(AmortizationEntry {
            month_index: month,
            payment: principal_portion
                .checked_add(interest)
                .ok_or_else(|| LoanbookError::overflow("payment"))?,
            principal_portion,
            interest_portion: interest,
            remaining_balance: balance,
        });
    }

    if loan.principal > Decimal::ZERO {
        if let Some(paid_off) = schedule.iter().find(|e| e.remaining_balance.is_zero()) {
            if paid_off.month_index < term {
                warnings.push(format!(
                    "Loan is fully repaid in month {}; the remaining {} installments carry no payment",
                    paid_off.month_index,
                    term - paid_off.month_index
                ));
            }
        }
    }

    Ok(AmortizationResult {
        policy: PaymentPolicy::Annuity {
            monthly_payment: supplied_payment,
        },
        monthly_rate: rate,
        monthly_payment: payment,
        total_interest,
        total_cost: loan
            .principal
            .checked_add(total_interest)
            .ok_or_else(|| LoanbookError::overflow("total_cost"))?,
        schedule,
    })
}

fn flat_schedule(loan: &LoanRequest) -> LoanbookResult<AmortizationResult> {
    let term = loan.term_months;
    let term_dec = Decimal::from(term);
    let principal_portion = loan.principal / term_dec;
    let interest_portion = loan
        .monthly_rate()
        .checked_mul(loan.principal)
        .ok_or_else(|| LoanbookError::overflow("principal"))?;
    let payment = principal_portion
        .checked_add(interest_portion)
        .ok_or_else(|| LoanbookError::overflow("payment"))?;

    let mut schedule = Vec::with_capacity(term as usize);
    let mut total_interest = Decimal::ZERO;

    for month in 1..=term {
        let remaining_balance = if month == term {
            Decimal::ZERO
        } else {
            let repaid = principal_portion
                .checked_mul(Decimal::from(month))
                .ok_or_else(|| LoanbookError::overflow("principal"))?;
            (loan.principal - repaid).max(Decimal::ZERO)
        };
        total_interest = total_interest
            .checked_add(interest_portion)
            .ok_or_else(|| LoanbookError::overflow("total_interest"))?;

        schedule.push(AmortizationEntry {
            month_index: month,
            payment,
            principal_portion,
            interest_portion,
            remaining_balance,
        });
    }

    let total_cost = loan
        .principal
        .checked_add(total_interest)
        .ok_or_else(|| LoanbookError::overflow("total_cost"))?;

    Ok(AmortizationResult {
        policy: PaymentPolicy::FlatInterest,
        monthly_rate: loan.monthly_rate(),
        monthly_payment: total_cost / term_dec,
        total_interest,
        total_cost,
        schedule,
    })
}
