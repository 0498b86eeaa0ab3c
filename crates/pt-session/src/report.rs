//! The session's end-of-run report and its JSON rendering.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use pt_portfolio::PortfolioSnapshot;

use crate::SessionError;

/// What a finished session hands to the operator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub state: PortfolioSnapshot,
    /// Floor of the mean post-fill open-position count.
    pub average_num_positions: i64,
    pub num_trades: u64,
}

/// Serialize the report as pretty JSON and write it to `path`.
///
/// The in-memory report is unaffected by a write failure; the caller
/// decides whether to retry elsewhere.
pub fn write_report(report: &SessionReport, path: impl AsRef<Path>) -> Result<(), SessionError> {
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| SessionError::Report(format!("serialize: {e}")))?;
    fs::write(path.as_ref(), format!("{json}\n")).map_err(|e| {
        SessionError::Report(format!("write {}: {e}", path.as_ref().display()))
    })?;
    Ok(())
}
