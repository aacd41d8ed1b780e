use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::client_record::ClientRecord;
use crate::error::LoanbookError;
use crate::types::*;
use crate::LoanbookResult;

const DEFAULT_CARD_LIMIT: Decimal = dec!(2500);
const LOW_RISK_CEILING: Decimal = dec!(30);
const MEDIUM_RISK_CEILING: Decimal = dec!(70);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Grade a utilization percentage: below 30 is Low, below 70 Medium.
pub fn risk_level(utilization_pct: Decimal) -> RiskLevel {
    if utilization_pct < LOW_RISK_CEILING {
        RiskLevel::Low
    } else if utilization_pct < MEDIUM_RISK_CEILING {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utilization {
    pub used: Money,
    pub limit: Money,
    pub utilization_pct: Decimal,
    pub risk_level: RiskLevel,
}

pub fn utilization(used: Money, limit: Money) -> LoanbookResult<Utilization> {
    let used = used.abs();
    let utilization_pct = if limit > Decimal::ZERO {
        used.checked_div(limit)
            .and_then(|ratio| ratio.checked_mul(dec!(100)))
            .ok_or_else(|| LoanbookError::overflow("limit"))?
    } else {
        Decimal::ZERO
    };
    Ok(Utilization {
        used,
        limit,
        utilization_pct,
        risk_level: risk_level(utilization_pct),
    })
}

pub fn overdraft_utilization(record: &ClientRecord) -> LoanbookResult<Utilization> {
    utilization(record.overdraft.total, record.overdraft_approved_limit)
}

/// Card limit falls back from the card max balance to the approved limit,
/// then to a fixed default. Zero counts as unset.
pub fn credit_card_utilization(record: &ClientRecord) -> LoanbookResult<Utilization> {
    let limit = [record.credit_card_max_balance, record.card_approved_limit]
        .into_iter()
        .flatten()
        .find(|l| !l.is_zero())
        .unwrap_or(DEFAULT_CARD_LIMIT);
    utilization(record.credit_cards.total, limit)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountUtilization {
    pub overdraft: Utilization,
    pub credit_card: Utilization,
}

pub fn analyze_utilization(
    record: &ClientRecord,
) -> LoanbookResult<ComputationOutput<AccountUtilization>> {
    let start = Instant::now();
    let mut warnings = Vec::new();

    let output = AccountUtilization {
        overdraft: overdraft_utilization(record)?,
        credit_card: credit_card_utilization(record)?,
    };
    for (name, u) in [("Overdraft", &output.overdraft), ("Credit card", &output.credit_card)] {
        if u.utilization_pct > dec!(100) {
            warnings.push(format!(
                "{name} usage {} exceeds its limit {}",
                u.used, u.limit
            ));
        }
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Account Utilization",
        &serde_json::json!({
            "customer_id": record.customer_id,
            "risk_bands": { "low_below": "30", "medium_below": "70" },
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_risk_bands() {
        assert_eq!(risk_level(dec!(29.99)), RiskLevel::Low);
        assert_eq!(risk_level(dec!(30)), RiskLevel::Medium);
        assert_eq!(risk_level(dec!(69.9)), RiskLevel::Medium);
        assert_eq!(risk_level(dec!(70)), RiskLevel::High);
    }

    #[test]
    fn test_zero_limit() {
        let u = utilization(dec!(-100), Decimal::ZERO).unwrap();
        assert_eq!(u.used, dec!(100));
        assert_eq!(u.utilization_pct, Decimal::ZERO);
        assert_eq!(u.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_overdraft_default_limit() {
        let rec = ClientRecord::from_json(&json!({ "OVD_TOTAL_BALANCE_AMT": "-350" })).unwrap();
        let u = overdraft_utilization(&rec).unwrap();
        assert_eq!(u.utilization_pct, dec!(35));
        assert_eq!(u.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn test_zero_overdraft_limit_uses_default() {
        let rec = ClientRecord::from_json(&json!({
            "OVD_TOTAL_BALANCE_AMT": "-350",
            "OVD_APPROVED_LIMIT_AMT": 0,
        }))
        .unwrap();
        let u = overdraft_utilization(&rec).unwrap();
        assert_eq!(u.limit, dec!(1000));
        assert_eq!(u.utilization_pct, dec!(35));
    }

    #[test]
    fn test_vanishing_limit_is_an_error() {
        let err = utilization(dec!(1000000000000000), Decimal::new(1, 28)).unwrap_err();
        assert!(matches!(err, LoanbookError::InvalidArgument { .. }));
    }

    #[test]
    fn test_card_limit_fallback() {
        let rec = ClientRecord::from_json(&json!({
            "CRT_TOTAL_BALANCE_AMT": "-1250",
            "CRT_MAX_BALANCE_AMT": "0",
            "ICC_APPROVED_LIMIT": "5000",
        }))
        .unwrap();
        assert_eq!(credit_card_utilization(&rec).unwrap().limit, dec!(5000));

        let rec = ClientRecord::from_json(&json!({ "CRT_TOTAL_BALANCE_AMT": "-1250" })).unwrap();
        let u = credit_card_utilization(&rec).unwrap();
        assert_eq!(u.limit, dec!(2500));
        assert_eq!(u.utilization_pct, dec!(50));
    }

    #[test]
    fn test_over_limit_warns() {
        let rec = ClientRecord::from_json(&json!({
            "OVD_TOTAL_BALANCE_AMT": -1500,
            "OVD_APPROVED_LIMIT_AMT": 1000,
        }))
        .unwrap();
        let out = analyze_utilization(&rec).unwrap();
        assert_eq!(out.result.overdraft.risk_level, RiskLevel::High);
        assert_eq!(out.warnings.len(), 1);
    }
}
