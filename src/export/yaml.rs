//! YAML export
//!
//! The JSON dump, written as YAML behind a short comment header.

use std::io::Write;

use crate::error::{SaverError, SaverResult};

use super::json::FullExport;
use super::{ReportExporter, ReportSnapshot};

pub struct YamlExporter;

impl ReportExporter for YamlExporter {
    fn export(&self, snapshot: &ReportSnapshot) -> SaverResult<Vec<u8>> {
        let export = FullExport::from_snapshot(snapshot);
        let to_export_error = |e: std::io::Error| SaverError::Export(e.to_string());

        let mut out = Vec::new();
        writeln!(out, "# Budget Saver export").map_err(to_export_error)?;
        writeln!(out, "# Generated: {}", export.exported_at).map_err(to_export_error)?;
        writeln!(out, "# App Version: {}", export.app_version).map_err(to_export_error)?;
        writeln!(out).map_err(to_export_error)?;

        serde_yaml::to_writer(&mut out, &export).map_err(|e| SaverError::Export(e.to_string()))?;
        Ok(out)
    }

    fn extension(&self) -> &'static str {
        "yaml"
    }
}
