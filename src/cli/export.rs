//! Export CLI command
//!
//! Writes the ledger and its totals as CSV, JSON or YAML, to a file or to
//! standard output.

use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::error::{SaverError, SaverResult};
use crate::export::{ExportFormat, ReportSnapshot};
use crate::session::Session;
use crate::storage::file_io::write_bytes_atomic;

/// Handle `saver export <format> [-o file]`
pub fn handle_export_command(
    session: &mut Session,
    format: ExportFormat,
    output: Option<&Path>,
) -> SaverResult<()> {
    let snapshot = ReportSnapshot::capture(session)?;
    let exporter = format.exporter();
    let bytes = exporter.export(&snapshot)?;

    match output {
        Some(path) => {
            write_bytes_atomic(path, &bytes).map_err(|e| {
                SaverError::Export(format!("Failed to write {}: {}", path.display(), e))
            })?;
            info!(path = %path.display(), bytes = bytes.len(), "wrote export");
            println!(
                "Exported {} transactions and {} categories to: {}",
                snapshot.ledger.transactions.len(),
                snapshot.ledger.categories.len(),
                path.display()
            );
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(&bytes)
                .and_then(|_| stdout.flush())
                .map_err(|e| SaverError::Export(e.to_string()))?;
        }
    }

    Ok(())
}
