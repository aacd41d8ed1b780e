use clap::Args;
use serde_json::Value;

use loanbook_core::dashboard::{self, accounts, spending, utilization, ClientRecord};

use crate::input;

/// Arguments shared by the client dashboard commands
#[derive(Args)]
pub struct ClientArgs {
    /// Path to a JSON client record, or a paginated client listing, as
    /// served by the backend
    #[arg(long)]
    pub input: Option<String>,

    /// Pick this customer out of a client listing
    #[arg(long)]
    pub customer_id: Option<String>,
}

fn read_record(args: &ClientArgs, what: &str) -> Result<Value, Box<dyn std::error::Error>> {
    let raw = if let Some(ref path) = args.input {
        input::file::read_json_value(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err(format!("--input <file.json> or stdin required for {what}").into());
    };
    select_record(raw, args.customer_id.as_deref())
}

fn customer_id_of(row: &Value) -> Option<String> {
    match row.get("CUSTOMER_ID").or_else(|| row.get("customer_id"))? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A single row passes through. A listing (`{"data": [...]}` or a bare
/// array) yields the row matching `customer_id`, or its only row.
fn select_record(raw: Value, customer_id: Option<&str>) -> Result<Value, Box<dyn std::error::Error>> {
    let rows = match raw {
        Value::Array(rows) => rows,
        Value::Object(mut map) if matches!(map.get("data"), Some(Value::Array(_))) => {
            match map.remove("data") {
                Some(Value::Array(rows)) => rows,
                _ => Vec::new(),
            }
        }
        row => {
            if let (Some(wanted), Some(found)) = (customer_id, customer_id_of(&row)) {
                if wanted != found {
                    return Err(format!("record is for customer {found}, not {wanted}").into());
                }
            }
            return Ok(row);
        }
    };

    log::debug!("client listing with {} rows", rows.len());
    match customer_id {
        Some(wanted) => rows
            .into_iter()
            .find(|r| customer_id_of(r).as_deref() == Some(wanted))
            .ok_or_else(|| format!("customer {wanted} not found in listing").into()),
        None if rows.len() == 1 => Ok(rows.into_iter().next().unwrap_or(Value::Null)),
        None => Err(format!(
            "listing holds {} clients; choose one with --customer-id",
            rows.len()
        )
        .into()),
    }
}

pub fn run_dashboard(args: ClientArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let raw = read_record(&args, "dashboard summary")?;
    let result = dashboard::summarize_client(&raw)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_accounts(args: ClientArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let raw = read_record(&args, "accounts overview")?;
    let record = ClientRecord::from_json(&raw)?;
    let result = accounts::analyze_accounts(&record)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_utilization(args: ClientArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let raw = read_record(&args, "utilization")?;
    let record = ClientRecord::from_json(&raw)?;
    let result = utilization::analyze_utilization(&record)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_spending(args: ClientArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let raw = read_record(&args, "spending breakdown")?;
    let record = ClientRecord::from_json(&raw)?;
    let result = spending::analyze_spending(&record)?;
    Ok(serde_json::to_value(result)?)
}
