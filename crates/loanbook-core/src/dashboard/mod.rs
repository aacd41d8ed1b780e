pub mod accounts;
pub mod client_record;
pub mod metrics;
pub mod spending;
pub mod summary;
pub mod utilization;

pub use client_record::ClientRecord;
pub use summary::{summarize_client, ClientSummary};
