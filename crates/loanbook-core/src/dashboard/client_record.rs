use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::LoanbookError;
use crate::types::Money;
use crate::LoanbookResult;

const DEFAULT_OVERDRAFT_LIMIT: Decimal = dec!(1000);
/// Largest magnitude accepted for any amount in a client row.
pub const MAX_AMOUNT: Decimal = dec!(1000000000000000);

/// Balances and product counts for one product family.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductBalance {
    pub total: Money,
    pub average: Money,
    /// `*_ALL_ACTIVE_CNT`
    pub active: u32,
    /// `*_ALL_PROD_CNT`, products held whether active or not
    pub products: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DigitalFlags {
    pub internet_banking: bool,
    pub george_pay: bool,
    pub apple_pay: bool,
    pub google_pay: bool,
    pub wallet: bool,
}

/// A client row from the backend, parsed once into typed fields.
///
/// Missing, null and empty values take the field default. Anything present
/// that does not parse is rejected with the offending field name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub customer_id: Option<String>,
    /// `CEC_*`
    pub current_accounts: ProductBalance,
    /// `DEP_*`
    pub deposits: ProductBalance,
    /// `SAV_*`
    pub savings: ProductBalance,
    /// `CRT_*`
    pub credit_cards: ProductBalance,
    /// `CLO_*`
    pub consumer_loans: ProductBalance,
    /// `OVD_*`
    pub overdraft: ProductBalance,
    /// Zero or missing means the default limit of 1000.
    pub overdraft_approved_limit: Money,
    pub overdraft_remaining_limit: Money,
    pub card_approved_limit: Option<Money>,
    pub card_remaining_limit: Money,
    pub credit_card_max_balance: Option<Money>,
    pub active_loans: u32,
    pub loan_requests_total: u32,
    pub loan_requests_rejected: u32,
    pub inflow_amount: Money,
    pub days_since_salary: u32,
    /// Days until the longest running active deposit matures
    pub deposit_days_to_maturity: u32,
    pub digital: DigitalFlags,
    /// Every `MCC_*_AMT` field, keyed by its backend name
    pub mcc_spending: BTreeMap<String, Money>,
}

impl ClientRecord {
    pub fn from_json(raw: &Value) -> LoanbookResult<Self> {
        let map = raw
            .as_object()
            .ok_or_else(|| LoanbookError::invalid("record", "Client record must be a JSON object"))?;

        let balance = |prefix: &str| -> LoanbookResult<ProductBalance> {
            Ok(ProductBalance {
                total: money(map, &format!("{prefix}_TOTAL_BALANCE_AMT"))?.unwrap_or_default(),
                average: money(map, &format!("{prefix}_AVG_BALANCE_AMT"))?.unwrap_or_default(),
                active: count(map, &format!("{prefix}_ALL_ACTIVE_CNT"))?,
                products: count(map, &format!("{prefix}_ALL_PROD_CNT"))?,
            })
        };

        let mut mcc_spending = BTreeMap::new();
        for key in map.keys() {
            if key.starts_with("MCC_") && key.ends_with("_AMT") {
                if let Some(amount) = money(map, key)? {
                    mcc_spending.insert(key.clone(), amount);
                }
            }
        }

        let customer_id = match map.get("CUSTOMER_ID").or_else(|| map.get("customer_id")) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        Ok(ClientRecord {
            customer_id,
            current_accounts: balance("CEC")?,
            deposits: balance("DEP")?,
            savings: balance("SAV")?,
            credit_cards: balance("CRT")?,
            consumer_loans: balance("CLO")?,
            overdraft: balance("OVD")?,
            overdraft_approved_limit: money(map, "OVD_APPROVED_LIMIT_AMT")?
                .filter(|l| !l.is_zero())
                .unwrap_or(DEFAULT_OVERDRAFT_LIMIT),
            overdraft_remaining_limit: money(map, "OVD_REMAINING_LIMIT_AMT")?.unwrap_or_default(),
            card_approved_limit: money(map, "ICC_APPROVED_LIMIT")?,
            card_remaining_limit: money(map, "ICC_REMAINING_LIMIT_AMT")?.unwrap_or_default(),
            credit_card_max_balance: money(map, "CRT_MAX_BALANCE_AMT")?,
            active_loans: count(map, "LOA_ALL_ACTIVE_CNT")?,
            loan_requests_total: count(map, "PTS_TOTAL_LOANS_REQ_CNT")?,
            loan_requests_rejected: count(map, "PTS_REJECTED_LOANS_REQ_CNT")?,
            inflow_amount: money(map, "TRX_IN_ALL_AMT")?.unwrap_or_default(),
            days_since_salary: count(map, "GPI_LST_SALARY_ND")?,
            deposit_days_to_maturity: count(map, "DEP_MAX_MAT_LEFT_ACT_ND")?,
            digital: DigitalFlags {
                internet_banking: flag(map, "PTS_IB_FLAG")?,
                george_pay: flag(map, "GEORGE_PAY_FLAG")?,
                apple_pay: flag(map, "APPLE_PAY_FLAG")?,
                google_pay: flag(map, "GOOGLE_PAY_FLAG")?,
                wallet: flag(map, "WALLET_FLAG")?,
            },
            mcc_spending,
        })
    }
}

fn present<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    match map.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(v) => Some(v),
    }
}

fn parse_decimal(key: &str, value: &Value) -> LoanbookResult<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        other => {
            return Err(LoanbookError::invalid(
                key,
                format!("expected a number, found {other}"),
            ))
        }
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| LoanbookError::invalid(key, format!("'{text}' is not a number")))
}

fn money(map: &Map<String, Value>, key: &str) -> LoanbookResult<Option<Money>> {
    let Some(v) = present(map, key) else {
        return Ok(None);
    };
    let amount = parse_decimal(key, v)?;
    if amount.abs() > MAX_AMOUNT {
        return Err(LoanbookError::invalid(
            key,
            format!("{amount} is outside the supported range of +/-{MAX_AMOUNT}"),
        ));
    }
    Ok(Some(amount))
}

/// Whole-number field; fractional values are truncated.
fn count(map: &Map<String, Value>, key: &str) -> LoanbookResult<u32> {
    let Some(v) = present(map, key) else {
        return Ok(0);
    };
    parse_decimal(key, v)?
        .trunc()
        .to_u32()
        .ok_or_else(|| LoanbookError::invalid(key, "expected a non-negative count"))
}

fn flag(map: &Map<String, Value>, key: &str) -> LoanbookResult<bool> {
    let Some(v) = present(map, key) else {
        return Ok(false);
    };
    match v {
        Value::Bool(b) => Ok(*b),
        Value::Number(_) => Ok(!parse_decimal(key, v)?.is_zero()),
        Value::String(s) => match s.trim().to_ascii_uppercase().as_str() {
            "Y" | "YES" | "TRUE" | "1" => Ok(true),
            "N" | "NO" | "FALSE" | "0" => Ok(false),
            other => Err(LoanbookError::invalid(key, format!("'{other}' is not a flag"))),
        },
        other => Err(LoanbookError::invalid(key, format!("'{other}' is not a flag"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mixed_string_and_number_fields() {
        let raw = json!({
            "CUSTOMER_ID": "12345",
            "CEC_TOTAL_BALANCE_AMT": "2698.12",
            "CEC_AVG_BALANCE_AMT": 1349.06,
            "OVD_TOTAL_BALANCE_AMT": "-350",
            "LOA_ALL_ACTIVE_CNT": "1",
            "PTS_IB_FLAG": "Y",
            "GEORGE_PAY_FLAG": 1,
            "APPLE_PAY_FLAG": "0",
            "MCC_FOOD_AMT": "120.5",
        });
        let rec = ClientRecord::from_json(&raw).unwrap();
        assert_eq!(rec.customer_id.as_deref(), Some("12345"));
        assert_eq!(rec.current_accounts.total, dec!(2698.12));
        assert_eq!(rec.current_accounts.average, dec!(1349.06));
        assert_eq!(rec.overdraft.total, dec!(-350));
        assert_eq!(rec.active_loans, 1);
        assert!(rec.digital.internet_banking);
        assert!(rec.digital.george_pay);
        assert!(!rec.digital.apple_pay);
        assert_eq!(rec.mcc_spending["MCC_FOOD_AMT"], dec!(120.5));
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let rec = ClientRecord::from_json(&json!({ "DEP_TOTAL_BALANCE_AMT": "" })).unwrap();
        assert_eq!(rec.deposits.total, Decimal::ZERO);
        assert_eq!(rec.overdraft_approved_limit, dec!(1000));
        assert_eq!(rec.card_approved_limit, None);
        assert!(rec.mcc_spending.is_empty());
    }

    #[test]
    fn test_zero_overdraft_limit_means_default() {
        for zero in [json!(0), json!("0"), json!("0.00")] {
            let rec = ClientRecord::from_json(&json!({ "OVD_APPROVED_LIMIT_AMT": zero })).unwrap();
            assert_eq!(rec.overdraft_approved_limit, dec!(1000));
        }
        let rec = ClientRecord::from_json(&json!({ "OVD_APPROVED_LIMIT_AMT": "500" })).unwrap();
        assert_eq!(rec.overdraft_approved_limit, dec!(500));
    }

    #[test]
    fn test_product_counts_per_family() {
        let rec = ClientRecord::from_json(&json!({
            "CEC_ALL_ACTIVE_CNT": "2",
            "CEC_ALL_PROD_CNT": 3,
            "CRT_ALL_ACTIVE_CNT": 1,
            "DEP_MAX_MAT_LEFT_ACT_ND": "45",
        }))
        .unwrap();
        assert_eq!(rec.current_accounts.active, 2);
        assert_eq!(rec.current_accounts.products, 3);
        assert_eq!(rec.credit_cards.active, 1);
        assert_eq!(rec.credit_cards.products, 0);
        assert_eq!(rec.deposit_days_to_maturity, 45);
    }

    #[test]
    fn test_amount_out_of_range_rejected() {
        let err = ClientRecord::from_json(&json!({ "CEC_TOTAL_BALANCE_AMT": "1e20" })).unwrap_err();
        match err {
            LoanbookError::InvalidArgument { field, .. } => {
                assert_eq!(field, "CEC_TOTAL_BALANCE_AMT")
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_garbage_value_names_field() {
        let err = ClientRecord::from_json(&json!({ "SAV_TOTAL_BALANCE_AMT": "abc" })).unwrap_err();
        match err {
            LoanbookError::InvalidArgument { field, .. } => {
                assert_eq!(field, "SAV_TOTAL_BALANCE_AMT")
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_count_truncates_and_rejects_negative() {
        let rec = ClientRecord::from_json(&json!({ "GPI_LST_SALARY_ND": "3.7" })).unwrap();
        assert_eq!(rec.days_since_salary, 3);
        assert!(ClientRecord::from_json(&json!({ "LOA_ALL_ACTIVE_CNT": -2 })).is_err());
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(ClientRecord::from_json(&json!([1, 2])).is_err());
    }
}
