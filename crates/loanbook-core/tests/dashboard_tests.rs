#![cfg(feature = "dashboard")]

use loanbook_core::dashboard::metrics::DigitalStatus;
use loanbook_core::dashboard::utilization::RiskLevel;
use loanbook_core::dashboard::{self, ClientRecord};
use loanbook_core::LoanbookError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;

/// A backend row as served to the dashboard: most numbers arrive as strings.
fn backend_row() -> serde_json::Value {
    json!({
        "CUSTOMER_ID": "12345",
        "CEC_TOTAL_BALANCE_AMT": "2698.12",
        "CEC_AVG_BALANCE_AMT": "1349.06",
        "DEP_TOTAL_BALANCE_AMT": "5000.00",
        "SAV_TOTAL_BALANCE_AMT": "2761.40",
        "CLO_TOTAL_BALANCE_AMT": "-5000.00",
        "CRT_TOTAL_BALANCE_AMT": "-900.64",
        "OVD_TOTAL_BALANCE_AMT": "-350",
        "OVD_APPROVED_LIMIT_AMT": "1000",
        "OVD_REMAINING_LIMIT_AMT": "650",
        "ICC_REMAINING_LIMIT_AMT": "1599.36",
        "CRT_MAX_BALANCE_AMT": "2500",
        "LOA_ALL_ACTIVE_CNT": "1",
        "CEC_ALL_ACTIVE_CNT": "2",
        "CEC_ALL_PROD_CNT": "2",
        "DEP_ALL_ACTIVE_CNT": "1",
        "DEP_ALL_PROD_CNT": "1",
        "DEP_MAX_MAT_LEFT_ACT_ND": "120",
        "CLO_ALL_ACTIVE_CNT": "1",
        "CLO_ALL_PROD_CNT": "1",
        "OVD_ALL_ACTIVE_CNT": "1",
        "OVD_ALL_PROD_CNT": "1",
        "CRT_ALL_ACTIVE_CNT": "2",
        "CRT_ALL_PROD_CNT": "2",
        "PTS_TOTAL_LOANS_REQ_CNT": "2",
        "PTS_REJECTED_LOANS_REQ_CNT": "0",
        "TRX_IN_ALL_AMT": "4200.00",
        "GPI_LST_SALARY_ND": "4",
        "PTS_IB_FLAG": "Y",
        "GEORGE_PAY_FLAG": "1",
        "APPLE_PAY_FLAG": "1",
        "GOOGLE_PAY_FLAG": "0",
        "WALLET_FLAG": "1",
        "MCC_FOOD_AMT": "500",
        "MCC_CLOTHING_STORES_AMT": "250.50",
        "MCC_RETAIL_OUTLET_SERV_AMT": "149.50",
        "MCC_TRAVEL_AMT": "300",
        "MCC_UTILITY_SERV_AMT": null,
    })
}

#[test]
fn test_full_summary() {
    let out = dashboard::summarize_client(&backend_row()).unwrap();
    let s = out.result;

    assert_eq!(s.customer_id.as_deref(), Some("12345"));
    assert_eq!(s.net_position.assets, dec!(10459.52));
    assert_eq!(s.net_position.liabilities, dec!(6250.64));
    assert_eq!(s.net_position.net, dec!(4208.88));
    assert_eq!(s.available_credit, dec!(2249.36));
    assert_eq!(s.last_inflow.amount, dec!(4200));
    assert_eq!(s.last_inflow.days_ago, 4);

    assert_eq!(s.digital_services.active_count, 4);
    assert_eq!(s.digital_services.status, DigitalStatus::Active);
    assert!(s.loans.has_active_loans);
    assert!(s.loans.pre_approved);
    assert_eq!(s.loans.pre_approved_amount, dec!(15000));

    assert!(s.cards.has_debit_card);
    assert_eq!(s.cards.credit_card_count, 2);
    assert_eq!(s.cards.credit_balance, dec!(900.64));
    assert_eq!(s.cards.credit_limit, dec!(2500));

    let products: Vec<(&str, Decimal)> = s
        .accounts
        .products
        .iter()
        .map(|p| (p.product.as_str(), p.total_balance))
        .collect();
    assert_eq!(
        products,
        vec![
            ("Current Accounts", dec!(2698.12)),
            ("Deposits", dec!(5000.00)),
            ("Loans & Overdraft", dec!(-5350)),
            ("Credit Cards", dec!(-900.64)),
        ]
    );
    assert_eq!(s.accounts.maturities.len(), 1);
    assert_eq!(s.accounts.maturities[0].days_left, 120);

    assert_eq!(s.utilization.overdraft.utilization_pct, dec!(35));
    assert_eq!(s.utilization.overdraft.risk_level, RiskLevel::Medium);
    assert_eq!(s.utilization.credit_card.limit, dec!(2500));
    assert_eq!(s.utilization.credit_card.risk_level, RiskLevel::Medium);

    let names: Vec<&str> = s.spending.categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Food & Dining", "Shopping", "Leisure & Travel"]);
    assert_eq!(s.spending.total, dec!(1200));
    let shares: Decimal = s.spending.categories.iter().map(|c| c.share_pct).sum();
    assert!((shares - dec!(100)).abs() < dec!(0.000001));
    assert!(out.warnings.is_empty());
}

#[test]
fn test_sparse_row_uses_defaults() {
    let out = dashboard::summarize_client(&json!({ "CUSTOMER_ID": 987 })).unwrap();
    let s = out.result;
    assert_eq!(s.customer_id.as_deref(), Some("987"));
    assert_eq!(s.net_position.net, Decimal::ZERO);
    assert_eq!(s.utilization.overdraft.limit, dec!(1000));
    assert_eq!(s.utilization.credit_card.limit, dec!(2500));
    assert_eq!(s.digital_services.status, DigitalStatus::Partial);
    assert!(s.loans.pre_approved);
    assert!(!s.cards.has_credit_card);
    assert!(s.accounts.products.is_empty());
    assert!(s.accounts.maturities.is_empty());
    assert!(!s.spending.has_data);
    assert_eq!(out.warnings.len(), 1);
}

#[test]
fn test_malformed_field_is_reported_once_at_the_boundary() {
    let mut row = backend_row();
    row["OVD_REMAINING_LIMIT_AMT"] = json!("n/a");
    match dashboard::summarize_client(&row) {
        Err(LoanbookError::InvalidArgument { field, .. }) => {
            assert_eq!(field, "OVD_REMAINING_LIMIT_AMT")
        }
        other => panic!("expected InvalidArgument, got {other:?}"),
    }
}

#[test]
fn test_record_parse_is_stable() {
    let a = ClientRecord::from_json(&backend_row()).unwrap();
    let b = ClientRecord::from_json(&backend_row()).unwrap();
    assert_eq!(a, b);
}
