use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::client_record::ClientRecord;
use crate::types::Money;

const ACTIVE_SERVICES_THRESHOLD: usize = 3;
const DIGITAL_SERVICE_COUNT: usize = 5;
/// Pre-approval is offered only below this many loan requests.
const PRE_APPROVAL_REQUEST_LIMIT: u32 = 3;
const PRE_APPROVED_AMOUNT: Money = dec!(15000);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetPosition {
    pub assets: Money,
    pub liabilities: Money,
    pub net: Money,
}

/// Positive current, deposit and savings balances less the magnitude of
/// negative loan, card and overdraft balances.
pub fn net_position(record: &ClientRecord) -> NetPosition {
    let assets = [
        record.current_accounts.total,
        record.deposits.total,
        record.savings.total,
    ]
    .iter()
    .map(|b| (*b).max(Decimal::ZERO))
    .sum::<Money>();

    let liabilities = [
        record.consumer_loans.total,
        record.credit_cards.total,
        record.overdraft.total,
    ]
    .iter()
    .map(|b| (*b).min(Decimal::ZERO).abs())
    .sum::<Money>();

    NetPosition {
        assets,
        liabilities,
        net: assets - liabilities,
    }
}

pub fn available_credit(record: &ClientRecord) -> Money {
    record.overdraft_remaining_limit + record.card_remaining_limit
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DigitalStatus {
    Active,
    Partial,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigitalServices {
    pub status: DigitalStatus,
    pub active_services: Vec<String>,
    pub active_count: usize,
    pub total_services: usize,
}

pub fn digital_services(record: &ClientRecord) -> DigitalServices {
    let d = &record.digital;
    let active_services: Vec<String> = [
        (d.internet_banking, "Internet Banking"),
        (d.george_pay, "George Pay"),
        (d.apple_pay, "Apple Pay"),
        (d.google_pay, "Google Pay"),
        (d.wallet, "Digital Wallet"),
    ]
    .iter()
    .filter(|(on, _)| *on)
    .map(|(_, name)| (*name).to_string())
    .collect();

    let active_count = active_services.len();
    DigitalServices {
        status: if active_count >= ACTIVE_SERVICES_THRESHOLD {
            DigitalStatus::Active
        } else {
            DigitalStatus::Partial
        },
        active_services,
        active_count,
        total_services: DIGITAL_SERVICE_COUNT,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanActivity {
    pub has_active_loans: bool,
    pub total_requests: u32,
    pub rejected_requests: u32,
    pub pre_approved: bool,
    /// Offered whenever no request was rejected, even past the request limit
    pub pre_approved_amount: Money,
}

/// Loan requests and the pre-approval offer.
///
/// A client with no rejected requests and fewer than three requests in
/// total is pre-approved.
pub fn loan_activity(record: &ClientRecord) -> LoanActivity {
    let clean_history = record.loan_requests_rejected == 0;
    LoanActivity {
        has_active_loans: record.active_loans > 0,
        total_requests: record.loan_requests_total,
        rejected_requests: record.loan_requests_rejected,
        pre_approved: clean_history && record.loan_requests_total < PRE_APPROVAL_REQUEST_LIMIT,
        pre_approved_amount: if clean_history {
            PRE_APPROVED_AMOUNT
        } else {
            Decimal::ZERO
        },
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardInfo {
    pub has_debit_card: bool,
    pub has_credit_card: bool,
    pub debit_card_count: u32,
    pub credit_card_count: u32,
    /// Current account balance the debit cards draw on
    pub debit_balance: Money,
    /// Outstanding card balance, as a positive amount
    pub credit_balance: Money,
    pub credit_limit: Money,
}

/// Debit cards follow active current accounts, credit cards active card
/// accounts. The limit is the approved limit, else the card max balance,
/// else zero.
pub fn card_info(record: &ClientRecord) -> CardInfo {
    let credit_limit = [record.card_approved_limit, record.credit_card_max_balance]
        .into_iter()
        .flatten()
        .find(|l| !l.is_zero())
        .unwrap_or(Decimal::ZERO);
    CardInfo {
        has_debit_card: record.current_accounts.active > 0,
        has_credit_card: record.credit_cards.active > 0,
        debit_card_count: record.current_accounts.active,
        credit_card_count: record.credit_cards.active,
        debit_balance: record.current_accounts.total,
        credit_balance: record.credit_cards.total.abs(),
        credit_limit,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastInflow {
    pub amount: Money,
    pub days_ago: u32,
}

pub fn last_inflow(record: &ClientRecord) -> LastInflow {
    LastInflow {
        amount: record.inflow_amount,
        days_ago: record.days_since_salary,
    }
}
