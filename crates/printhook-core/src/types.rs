// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Printhook bridge.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// MIME type every fetched document must carry.
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Printer port reported when no header names one.
pub const DEFAULT_PRINTER_PORT: &str = "631";

/// CUPS job type used when no header names one.
pub const DEFAULT_JOB_TYPE: &str = "raw";

/// The seven per-job fields resolved from body, headers, and defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobField {
    PrinterName,
    PrinterIp,
    PrinterPort,
    JobId,
    JobType,
    PaperSize,
    PageRange,
}

impl JobField {
    /// Key used in configuration and log output.
    pub fn key(&self) -> &'static str {
        match self {
            Self::PrinterName => "printer_name",
            Self::PrinterIp => "printer_ip",
            Self::PrinterPort => "printer_port",
            Self::JobId => "job_id",
            Self::JobType => "job_type",
            Self::PaperSize => "paper_size",
            Self::PageRange => "page_range",
        }
    }
}

/// Inbound `POST /api/print` body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrintRequest {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub printer_name: Option<String>,
    pub printer_ip: Option<String>,
    pub paper_size: Option<String>,
    pub page_range: Option<String>,
}

impl PrintRequest {
    /// Value the body supplies for `field`. Port, job id, and job type are not
    /// accepted from the body.
    pub fn field(&self, field: JobField) -> Option<&str> {
        let value = match field {
            JobField::PrinterName => &self.printer_name,
            JobField::PrinterIp => &self.printer_ip,
            JobField::PaperSize => &self.paper_size,
            JobField::PageRange => &self.page_range,
            JobField::PrinterPort | JobField::JobId | JobField::JobType => return None,
        };
        value.as_deref().filter(|v| !v.is_empty())
    }
}

/// Case-insensitive snapshot of the document response's headers.
#[derive(Debug, Clone, Default)]
pub struct ResponseHeaders {
    entries: BTreeMap<String, String>,
}

impl ResponseHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a header. The first value for a name wins, as with
    /// `HeaderMap::get`.
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.entries
            .entry(name.to_ascii_lowercase())
            .or_insert_with(|| value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for ResponseHeaders {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.insert(name.as_ref(), value);
        }
        headers
    }
}

/// Printer identity echoed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterIdentity {
    pub name: String,
    pub ip: String,
    pub port: String,
}

/// Job parameters after body → header → default resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPrintJob {
    /// Never empty once resolution succeeded.
    pub printer_name: String,
    pub printer_ip: String,
    pub printer_port: String,
    pub job_id: Option<String>,
    pub job_type: String,
    pub paper_size: String,
    /// `None` prints every page.
    pub page_range: Option<String>,
}

impl ResolvedPrintJob {
    pub fn printer(&self) -> PrinterIdentity {
        PrinterIdentity {
            name: self.printer_name.clone(),
            ip: self.printer_ip.clone(),
            port: self.printer_port.clone(),
        }
    }

    /// Queue name for the job: `Job_` plus a slug of the job id.
    pub fn job_name(&self) -> String {
        crate::slug::job_name(self.job_id.as_deref())
    }

    /// Page range as shown to people: the range itself, or `all`.
    pub fn page_range_label(&self) -> &str {
        self.page_range.as_deref().unwrap_or("all")
    }

    /// Print-subsystem options for this job.
    pub fn job_options(&self) -> JobOptions {
        let mut options = JobOptions::new();
        options.set("job-type", &self.job_type);
        options.set("media", &self.paper_size);
        if let Some(range) = &self.page_range {
            options.set("page-ranges", range);
        }
        options
    }
}

/// CUPS-style job options (`name → value`), ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobOptions(BTreeMap<String, String>);

impl JobOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: &str) {
        self.0.insert(name.to_string(), value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
