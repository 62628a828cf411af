use crate::report::UsageReport;
use mpticks_common::{MpticksError, Result};
use std::path::Path;
use tracing::info;

pub fn export_json(output_path: &Path, report: &UsageReport) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut file = std::fs::File::create(output_path)?;
    serde_json::to_writer_pretty(&mut file, report).map_err(|e| MpticksError::Other(e.to_string()))?;
    info!(path = %output_path.display(), "exported usage report");
    Ok(())
}
