use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::accounts::{self, AccountsOverview};
use super::client_record::ClientRecord;
use super::metrics::{self, CardInfo, DigitalServices, LastInflow, LoanActivity, NetPosition};
use super::spending::{self, SpendingBreakdown};
use super::utilization::{self, AccountUtilization};
use crate::types::*;
use crate::LoanbookResult;

/// Everything the dashboard shows for one client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientSummary {
    pub customer_id: Option<String>,
    pub net_position: NetPosition,
    pub available_credit: Money,
    pub last_inflow: LastInflow,
    pub digital_services: DigitalServices,
    pub loans: LoanActivity,
    pub cards: CardInfo,
    pub accounts: AccountsOverview,
    pub utilization: AccountUtilization,
    pub spending: SpendingBreakdown,
}

/// Parse a raw backend row and compute the full dashboard summary.
pub fn summarize_client(raw: &serde_json::Value) -> LoanbookResult<ComputationOutput<ClientSummary>> {
    let start = Instant::now();
    let record = ClientRecord::from_json(raw)?;

    let util = utilization::analyze_utilization(&record)?;
    let spend = spending::analyze_spending(&record)?;
    let accts = accounts::analyze_accounts(&record)?;
    let mut warnings = util.warnings;
    warnings.extend(spend.warnings);
    warnings.extend(accts.warnings);

    let output = ClientSummary {
        customer_id: record.customer_id.clone(),
        net_position: metrics::net_position(&record),
        available_credit: metrics::available_credit(&record),
        last_inflow: metrics::last_inflow(&record),
        digital_services: metrics::digital_services(&record),
        loans: metrics::loan_activity(&record),
        cards: metrics::card_info(&record),
        accounts: accts.result,
        utilization: util.result,
        spending: spend.result,
    };

    log::debug!(
        "dashboard summary for {}: net={}",
        output.customer_id.as_deref().unwrap_or("unknown"),
        output.net_position.net
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Client Dashboard Summary",
        &serde_json::json!({ "customer_id": record.customer_id }),
        warnings,
        elapsed,
        output,
    ))
}
