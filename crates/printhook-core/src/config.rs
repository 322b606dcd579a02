// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bridge configuration, loaded once from the JSON options file at startup.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::{PrinthookError, Result};
use crate::types::JobField;

/// Paper size used when neither the request, the headers, nor the options
/// file name one.
pub const FALLBACK_PAPER_SIZE: &str = "A4";

/// Static bridge settings.
///
/// Immutable after load; the service shares one instance behind an `Arc`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Host name or address of the CUPS server.
    pub cups_server: String,
    /// Port of the CUPS server (usually 631).
    pub cups_port: u16,
    /// Response header names carrying per-job printer metadata.
    #[serde(default)]
    pub header_names: HeaderNames,
    #[serde(default)]
    pub default_printer: String,
    #[serde(default)]
    pub default_printer_ip: String,
    /// Document URL used when the request body omits `endpoint`.
    #[serde(default)]
    pub default_endpoint: String,
    #[serde(default)]
    pub default_api_key: String,
    #[serde(default = "default_paper_size")]
    pub default_paper_size: String,
    /// Keep scratch files after each request (debugging aid). Also disables
    /// the stale-file sweep.
    #[serde(default)]
    pub keep_temp_files: bool,
}

fn default_paper_size() -> String {
    FALLBACK_PAPER_SIZE.to_string()
}

impl BridgeConfig {
    /// Minimal configuration pointing at a CUPS server; every default empty.
    pub fn new(cups_server: impl Into<String>, cups_port: u16) -> Self {
        Self {
            cups_server: cups_server.into(),
            cups_port,
            header_names: HeaderNames::default(),
            default_printer: String::new(),
            default_printer_ip: String::new(),
            default_endpoint: String::new(),
            default_api_key: String::new(),
            default_paper_size: default_paper_size(),
            keep_temp_files: false,
        }
    }

    /// Read and parse the options file.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            PrinthookError::Config(format!("read {}: {e}", path.as_ref().display()))
        })?;
        let config = Self::from_json(&raw)?;
        info!(
            cups_server = %config.cups_server,
            cups_port = config.cups_port,
            keep_temp_files = config.keep_temp_files,
            "configuration loaded"
        );
        Ok(config)
    }

    /// Parse an options document.
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)
            .map_err(|e| PrinthookError::Config(format!("parse options: {e}")))?;
        if config.cups_server.trim().is_empty() {
            return Err(PrinthookError::Config("cups_server must not be empty".into()));
        }
        Ok(config)
    }

    /// Paper size default with the hardcoded fallback applied.
    pub fn paper_size_or_fallback(&self) -> &str {
        if self.default_paper_size.is_empty() {
            FALLBACK_PAPER_SIZE
        } else {
            &self.default_paper_size
        }
    }
}

/// Mapping of logical job fields to HTTP response header names.
///
/// When the options file has no `header_names` key every field gets its
/// conventional `X-...` header.  When the key is present, fields it leaves
/// out have no mapping and their header lookup is skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderNames {
    pub printer_name: Option<String>,
    pub printer_ip: Option<String>,
    pub printer_port: Option<String>,
    pub job_id: Option<String>,
    pub job_type: Option<String>,
    pub paper_size: Option<String>,
    pub page_range: Option<String>,
}

impl Default for HeaderNames {
    fn default() -> Self {
        Self {
            printer_name: Some("X-Printer-Name".into()),
            printer_ip: Some("X-Printer-IP".into()),
            printer_port: Some("X-Printer-Port".into()),
            job_id: Some("X-Print-Job-ID".into()),
            job_type: Some("X-Printer-Job-Type".into()),
            paper_size: Some("X-Paper-Size".into()),
            page_range: Some("X-Page-Range".into()),
        }
    }
}

impl HeaderNames {
    /// Header configured for `field`, if any. Empty names count as unmapped.
    pub fn get(&self, field: JobField) -> Option<&str> {
        let name = match field {
            JobField::PrinterName => &self.printer_name,
            JobField::PrinterIp => &self.printer_ip,
            JobField::PrinterPort => &self.printer_port,
            JobField::JobId => &self.job_id,
            JobField::JobType => &self.job_type,
            JobField::PaperSize => &self.paper_size,
            JobField::PageRange => &self.page_range,
        };
        name.as_deref().filter(|n| !n.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_options_use_defaults() {
        let config =
            BridgeConfig::from_json(r#"{"cups_server": "localhost", "cups_port": 631}"#).unwrap();
        assert_eq!(config.default_paper_size, "A4");
        assert!(!config.keep_temp_files);
        assert_eq!(
            config.header_names.get(JobField::PrinterName),
            Some("X-Printer-Name")
        );
        assert_eq!(config.header_names.get(JobField::PageRange), Some("X-Page-Range"));
    }

    #[test]
    fn partial_header_map_leaves_other_fields_unmapped() {
        let config = BridgeConfig::from_json(
            r#"{
                "cups_server": "cups.local",
                "cups_port": 631,
                "header_names": {"printer_name": "X-Target", "paper_size": ""}
            }"#,
        )
        .unwrap();
        assert_eq!(config.header_names.get(JobField::PrinterName), Some("X-Target"));
        assert_eq!(config.header_names.get(JobField::PaperSize), None);
        assert_eq!(config.header_names.get(JobField::JobId), None);
    }

    #[test]
    fn full_options_document_parses() {
        let config = BridgeConfig::from_json(
            r#"{
                "cups_server": "192.168.1.5",
                "cups_port": 632,
                "default_printer": "Office",
                "default_printer_ip": "192.168.1.50",
                "default_endpoint": "http://docs.local/next",
                "default_api_key": "secret",
                "default_paper_size": "Letter",
                "keep_temp_files": true
            }"#,
        )
        .unwrap();
        assert_eq!(config.cups_port, 632);
        assert_eq!(config.default_printer, "Office");
        assert_eq!(config.paper_size_or_fallback(), "Letter");
        assert!(config.keep_temp_files);
    }

    #[test]
    fn missing_cups_server_is_rejected() {
        let err = BridgeConfig::from_json(r#"{"cups_port": 631}"#).unwrap_err();
        assert!(matches!(err, PrinthookError::Config(_)));
    }

    #[test]
    fn empty_paper_default_falls_back_to_a4() {
        let mut config = BridgeConfig::new("localhost", 631);
        config.default_paper_size.clear();
        assert_eq!(config.paper_size_or_fallback(), "A4");
    }

    #[test]
    fn load_reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.json");
        std::fs::write(&path, r#"{"cups_server": "localhost", "cups_port": 631}"#).unwrap();
        let config = BridgeConfig::load(&path).unwrap();
        assert_eq!(config.cups_server, "localhost");

        let missing = BridgeConfig::load(dir.path().join("absent.json"));
        assert!(matches!(missing, Err(PrinthookError::Config(_))));
    }
}
