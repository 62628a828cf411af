pub mod export;
pub mod histogram;
pub mod records;
pub mod report;

pub use export::export_json;
pub use histogram::{Bucket, LinearHistogram};
pub use mpticks_common::{MpticksError, Result};
pub use records::{load_users, resolve_inputs, UserRecord};
pub use report::UsageReport;

use mpticks_common::HistogramsConfig;
use tracing::info;

/// Builds a report from every user export `input` resolves to.
pub fn build_report(input: &str, cfg: &HistogramsConfig) -> Result<UsageReport> {
    let mut report = UsageReport::new(cfg)?;
    let paths = resolve_inputs(input)?;
    for path in &paths {
        report.extend(&load_users(path)?);
    }
    info!(files = paths.len(), users = report.users, "aggregated user exports");
    Ok(report)
}
