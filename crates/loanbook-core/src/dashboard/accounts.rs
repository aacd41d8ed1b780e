use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::client_record::{ClientRecord, ProductBalance};
use crate::types::*;
use crate::LoanbookResult;

/// One line of the accounts page product table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductOverview {
    pub product: String,
    pub active: u32,
    pub total: u32,
    pub average_balance: Money,
    pub total_balance: Money,
}

impl ProductOverview {
    fn from_families(product: &str, families: &[&ProductBalance]) -> Self {
        ProductOverview {
            product: product.to_string(),
            active: families.iter().map(|f| f.active).fold(0, u32::saturating_add),
            total: families.iter().map(|f| f.products).fold(0, u32::saturating_add),
            average_balance: families.iter().map(|f| f.average).sum(),
            total_balance: families.iter().map(|f| f.total).sum(),
        }
    }
}

/// Products the client holds, in display order. Consumer loans and the
/// overdraft share a line; families with no products are left out.
pub fn product_overview(record: &ClientRecord) -> Vec<ProductOverview> {
    [
        ProductOverview::from_families("Current Accounts", &[&record.current_accounts]),
        ProductOverview::from_families("Deposits", &[&record.deposits]),
        ProductOverview::from_families("Savings Plans", &[&record.savings]),
        ProductOverview::from_families(
            "Loans & Overdraft",
            &[&record.consumer_loans, &record.overdraft],
        ),
        ProductOverview::from_families("Credit Cards", &[&record.credit_cards]),
    ]
    .into_iter()
    .filter(|p| p.total > 0)
    .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositMaturity {
    pub principal: Money,
    pub days_left: u32,
}

impl DepositMaturity {
    /// Calendar date the deposit matures, counted from `today`.
    pub fn maturity_date(&self, today: NaiveDate) -> Option<NaiveDate> {
        today.checked_add_days(Days::new(u64::from(self.days_left)))
    }
}

/// The running term deposit, if one is still maturing and carries a
/// positive balance.
pub fn deposit_maturities(record: &ClientRecord) -> Vec<DepositMaturity> {
    let days_left = record.deposit_days_to_maturity;
    let principal = record.deposits.total;
    if days_left > 0 && principal > Decimal::ZERO {
        vec![DepositMaturity {
            principal,
            days_left,
        }]
    } else {
        Vec::new()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountsOverview {
    pub products: Vec<ProductOverview>,
    pub maturities: Vec<DepositMaturity>,
}

pub fn analyze_accounts(
    record: &ClientRecord,
) -> LoanbookResult<ComputationOutput<AccountsOverview>> {
    let start = Instant::now();
    let mut warnings = Vec::new();

    let output = AccountsOverview {
        products: product_overview(record),
        maturities: deposit_maturities(record),
    };
    for p in &output.products {
        if p.active > p.total {
            warnings.push(format!(
                "{}: {} active products reported but only {} held",
                p.product, p.active, p.total
            ));
        }
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Accounts Product Overview",
        &serde_json::json!({
            "customer_id": record.customer_id,
            "combined_lines": { "Loans & Overdraft": ["CLO", "OVD"] },
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn record() -> ClientRecord {
        ClientRecord::from_json(&json!({
            "CEC_ALL_ACTIVE_CNT": 2,
            "CEC_ALL_PROD_CNT": 2,
            "CEC_AVG_BALANCE_AMT": "1349.06",
            "CEC_TOTAL_BALANCE_AMT": "2698.12",
            "DEP_ALL_ACTIVE_CNT": 1,
            "DEP_ALL_PROD_CNT": 1,
            "DEP_TOTAL_BALANCE_AMT": "5000",
            "DEP_MAX_MAT_LEFT_ACT_ND": "30",
            "CLO_ALL_ACTIVE_CNT": 1,
            "CLO_ALL_PROD_CNT": 1,
            "CLO_AVG_BALANCE_AMT": "-5000",
            "CLO_TOTAL_BALANCE_AMT": "-5000",
            "OVD_ALL_ACTIVE_CNT": 1,
            "OVD_ALL_PROD_CNT": 1,
            "OVD_AVG_BALANCE_AMT": "-200",
            "OVD_TOTAL_BALANCE_AMT": "-350",
        }))
        .unwrap()
    }

    #[test]
    fn test_loans_and_overdraft_share_a_line() {
        let products = product_overview(&record());
        let names: Vec<&str> = products.iter().map(|p| p.product.as_str()).collect();
        assert_eq!(names, vec!["Current Accounts", "Deposits", "Loans & Overdraft"]);

        let loans = &products[2];
        assert_eq!(loans.active, 2);
        assert_eq!(loans.total, 2);
        assert_eq!(loans.average_balance, dec!(-5200));
        assert_eq!(loans.total_balance, dec!(-5350));

        assert_eq!(products[0].average_balance, dec!(1349.06));
    }

    #[test]
    fn test_maturity_needs_days_and_balance() {
        let m = deposit_maturities(&record());
        assert_eq!(m.len(), 1);
        assert_eq!(m[0].principal, dec!(5000));
        let today = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(
            m[0].maturity_date(today),
            NaiveDate::from_ymd_opt(2024, 2, 14)
        );

        let matured = ClientRecord::from_json(&json!({
            "DEP_TOTAL_BALANCE_AMT": "5000",
            "DEP_MAX_MAT_LEFT_ACT_ND": 0,
        }))
        .unwrap();
        assert!(deposit_maturities(&matured).is_empty());

        let empty = ClientRecord::from_json(&json!({
            "DEP_TOTAL_BALANCE_AMT": "0",
            "DEP_MAX_MAT_LEFT_ACT_ND": 90,
        }))
        .unwrap();
        assert!(deposit_maturities(&empty).is_empty());
    }

    #[test]
    fn test_inconsistent_counts_warn() {
        let rec = ClientRecord::from_json(&json!({
            "SAV_ALL_ACTIVE_CNT": 3,
            "SAV_ALL_PROD_CNT": 1,
        }))
        .unwrap();
        let out = analyze_accounts(&rec).unwrap();
        assert_eq!(out.result.products.len(), 1);
        assert_eq!(out.warnings.len(), 1);
    }
}
