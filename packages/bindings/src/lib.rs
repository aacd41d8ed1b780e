use chrono::Utc;
use napi::Result as NapiResult;
use napi_derive::napi;

use loanbook_core::amortization::{mortgage, schedule};
use loanbook_core::dashboard::{self, accounts, spending, utilization, ClientRecord};
use loanbook_core::session::Session;
use loanbook_core::PricingConfig;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Parse an optional pricing configuration, falling back to the defaults.
fn pricing_config(config_json: Option<String>) -> NapiResult<PricingConfig> {
    let config = match config_json {
        Some(json) => serde_json::from_str(&json).map_err(to_napi_error)?,
        None => PricingConfig::default(),
    };
    config.validate().map_err(to_napi_error)?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Amortization
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_schedule(input_json: String, config_json: Option<String>) -> NapiResult<String> {
    let input: schedule::ScheduleInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let config = pricing_config(config_json)?;
    let output = schedule::compute_schedule(&input, &config).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn simulate_mortgage(input_json: String, config_json: Option<String>) -> NapiResult<String> {
    let input: mortgage::MortgageSimulationInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let config = pricing_config(config_json)?;
    let output = mortgage::simulate_mortgage(&input, &config).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn price_mortgage(request_json: String, config_json: Option<String>) -> NapiResult<String> {
    let request: mortgage::MortgageQuoteRequest =
        serde_json::from_str(&request_json).map_err(to_napi_error)?;
    let config = pricing_config(config_json)?;
    let output = mortgage::price_mortgage(
        &mortgage::LocalQuoteSource,
        &Session::anonymous(),
        &request,
        &config,
        Utc::now(),
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Client dashboard
// ---------------------------------------------------------------------------

fn client_record(record_json: &str) -> NapiResult<ClientRecord> {
    let raw: serde_json::Value = serde_json::from_str(record_json).map_err(to_napi_error)?;
    ClientRecord::from_json(&raw).map_err(to_napi_error)
}

#[napi]
pub fn summarize_client(record_json: String) -> NapiResult<String> {
    let raw: serde_json::Value = serde_json::from_str(&record_json).map_err(to_napi_error)?;
    let output = dashboard::summarize_client(&raw).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn accounts_overview(record_json: String) -> NapiResult<String> {
    let record = client_record(&record_json)?;
    let output = accounts::analyze_accounts(&record).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn account_utilization(record_json: String) -> NapiResult<String> {
    let record = client_record(&record_json)?;
    let output = utilization::analyze_utilization(&record).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn spending_breakdown(record_json: String) -> NapiResult<String> {
    let record = client_record(&record_json)?;
    let output = spending::analyze_spending(&record).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
