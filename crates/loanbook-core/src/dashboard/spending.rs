use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::client_record::ClientRecord;
use crate::types::*;
use crate::LoanbookResult;

/// Display categories and the MCC amount fields rolled up into each.
pub const SPENDING_CATEGORIES: &[(&str, &[&str])] = &[
    ("Food & Dining", &["MCC_FOOD_AMT"]),
    (
        "Shopping",
        &[
            "MCC_MISCELLANEOUS_STORES_AMT",
            "MCC_RETAIL_OUTLET_SERV_AMT",
            "MCC_CLOTHING_STORES_AMT",
        ],
    ),
    ("Transportation", &["MCC_TRANSPORTATION_AMT", "MCC_CAR_RENTAL_AMT"]),
    (
        "Digital & Electronics",
        &["MCC_ELECT_AND_DIG_GOODS_AMT", "MCC_CONTRACTED_SERV_AMT"],
    ),
    (
        "Utilities & Bills",
        &[
            "MCC_UTILITY_SERV_AMT",
            "MCC_GOVERNMENT_SERV_AMT",
            "MCC_FINANCIAL_INST_AMT",
        ],
    ),
    ("Leisure & Travel", &["MCC_LEISURE_AMT", "MCC_TRAVEL_AMT"]),
    (
        "Professional Services",
        &[
            "MCC_PROFESSIONAL_SERV_AMT",
            "MCC_BUSINESS_SERV_AMT",
            "MCC_BANKING_ALTER_AMT",
        ],
    ),
    ("Home & Construction", &["MCC_HOME_AND_CONSTR_AMT"]),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingCategory {
    pub name: String,
    pub value: Money,
    pub share_pct: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingBreakdown {
    pub categories: Vec<SpendingCategory>,
    pub total: Money,
    pub has_data: bool,
}

/// Roll MCC amounts into categories. Only positive amounts count and empty
/// categories are dropped; the rest are ordered by value, largest first.
pub fn spending_breakdown(record: &ClientRecord) -> SpendingBreakdown {
    let mut categories: Vec<SpendingCategory> = SPENDING_CATEGORIES
        .iter()
        .filter_map(|(name, fields)| {
            let value: Money = fields
                .iter()
                .filter_map(|f| record.mcc_spending.get(*f))
                .filter(|a| **a > Decimal::ZERO)
                .sum();
            (value > Decimal::ZERO).then(|| SpendingCategory {
                name: (*name).to_string(),
                value,
                share_pct: Decimal::ZERO,
            })
        })
        .collect();

    let total: Money = categories.iter().map(|c| c.value).sum();
    if total > Decimal::ZERO {
        for c in &mut categories {
            c.share_pct = c.value / total * dec!(100);
        }
    }
    // Stable sort keeps category order for equal values.
    categories.sort_by(|a, b| b.value.cmp(&a.value));

    SpendingBreakdown {
        has_data: !categories.is_empty(),
        categories,
        total,
    }
}

/// MCC fields with positive spend that no category claims.
fn uncategorized(record: &ClientRecord) -> Vec<&str> {
    record
        .mcc_spending
        .iter()
        .filter(|(k, v)| {
            **v > Decimal::ZERO
                && !SPENDING_CATEGORIES
                    .iter()
                    .any(|(_, fields)| fields.contains(&k.as_str()))
        })
        .map(|(k, _)| k.as_str())
        .collect()
}

pub fn analyze_spending(
    record: &ClientRecord,
) -> LoanbookResult<ComputationOutput<SpendingBreakdown>> {
    let start = Instant::now();
    let mut warnings = Vec::new();

    let output = spending_breakdown(record);
    if !output.has_data {
        warnings.push("No positive MCC spending recorded for this client".into());
    }
    let extra = uncategorized(record);
    if !extra.is_empty() {
        warnings.push(format!(
            "Spending in {} is not mapped to a category and was excluded",
            extra.join(", ")
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "MCC Spending Breakdown",
        &serde_json::json!({
            "customer_id": record.customer_id,
            "categories": SPENDING_CATEGORIES.len(),
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

    fn record(raw: serde_json::Value) -> ClientRecord {
        ClientRecord::from_json(&raw).unwrap()
    }

    #[test]
    fn test_categories_sorted_with_shares() {
        let rec = record(json!({
            "MCC_FOOD_AMT": "100",
            "MCC_TRAVEL_AMT": "250",
            "MCC_LEISURE_AMT": "50",
            "MCC_CLOTHING_STORES_AMT": "-20",
            "MCC_CAR_RENTAL_AMT": "0",
        }));
        let b = spending_breakdown(&rec);
        assert_eq!(b.total, dec!(400));
        assert_eq!(b.categories.len(), 2);
        assert_eq!(b.categories[0].name, "Leisure & Travel");
        assert_eq!(b.categories[0].value, dec!(300));
        assert_eq!(b.categories[0].share_pct, dec!(75));
        assert_eq!(b.categories[1].share_pct, dec!(25));
    }

    #[test]
    fn test_ties_keep_category_order() {
        let rec = record(json!({ "MCC_HOME_AND_CONSTR_AMT": 10, "MCC_FOOD_AMT": 10 }));
        let b = spending_breakdown(&rec);
        assert_eq!(b.categories[0].name, "Food & Dining");
        assert_eq!(b.categories[1].name, "Home & Construction");
    }

    #[test]
    fn test_no_spending() {
        let out = analyze_spending(&record(json!({}))).unwrap();
        assert!(!out.result.has_data);
        assert_eq!(out.result.total, Decimal::ZERO);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_unmapped_mcc_field_warns() {
        let out = analyze_spending(&record(json!({ "MCC_PETS_AMT": "12" }))).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("MCC_PETS_AMT")));
    }
}
