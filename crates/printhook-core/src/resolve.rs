// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Layered job-parameter resolution.
//
// Every field is looked up in the same order:
//   1. the inbound request body (for the fields it accepts)
//   2. the document response's headers, under the configured header name
//   3. the configured or hardcoded default
//
// Empty strings count as absent at every layer.

use tracing::debug;

use crate::config::BridgeConfig;
use crate::error::{PrinthookError, Result};
use crate::types::{
    DEFAULT_JOB_TYPE, DEFAULT_PRINTER_PORT, JobField, PrintRequest, ResolvedPrintJob,
    ResponseHeaders,
};

/// Which layer supplied a resolved value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Body,
    Header,
    Default,
}

/// The three layers consulted for each job field.
pub struct ParameterSources<'a> {
    pub request: &'a PrintRequest,
    pub headers: &'a ResponseHeaders,
    pub config: &'a BridgeConfig,
}

impl<'a> ParameterSources<'a> {
    pub fn new(
        request: &'a PrintRequest,
        headers: &'a ResponseHeaders,
        config: &'a BridgeConfig,
    ) -> Self {
        Self {
            request,
            headers,
            config,
        }
    }

    /// Resolve one field, reporting which layer supplied it.
    pub fn lookup(&self, field: JobField) -> Option<(&'a str, Source)> {
        if let Some(value) = self.request.field(field) {
            return Some((value, Source::Body));
        }

        if let Some(value) = self
            .config
            .header_names
            .get(field)
            .and_then(|name| self.headers.get(name))
            .filter(|v| !v.is_empty())
        {
            return Some((value, Source::Header));
        }

        self.default_for(field)
            .filter(|v| !v.is_empty())
            .map(|v| (v, Source::Default))
    }

    fn default_for(&self, field: JobField) -> Option<&'a str> {
        match field {
            JobField::PrinterName => Some(self.config.default_printer.as_str()),
            JobField::PrinterIp => Some(self.config.default_printer_ip.as_str()),
            JobField::PrinterPort => Some(DEFAULT_PRINTER_PORT),
            JobField::JobType => Some(DEFAULT_JOB_TYPE),
            JobField::PaperSize => Some(self.config.paper_size_or_fallback()),
            JobField::JobId | JobField::PageRange => None,
        }
    }

    fn value(&self, field: JobField) -> Option<String> {
        let (value, source) = self.lookup(field)?;
        debug!(field = field.key(), ?source, value, "resolved job field");
        Some(value.to_string())
    }
}

/// Build the job parameters for one request.
///
/// Fails with [`PrinthookError::NoPrinterSelected`] when no layer names a
/// printer.
pub fn resolve_job(
    request: &PrintRequest,
    headers: &ResponseHeaders,
    config: &BridgeConfig,
) -> Result<ResolvedPrintJob> {
    let sources = ParameterSources::new(request, headers, config);

    let printer_name = sources
        .value(JobField::PrinterName)
        .ok_or(PrinthookError::NoPrinterSelected)?;

    Ok(ResolvedPrintJob {
        printer_name,
        printer_ip: sources.value(JobField::PrinterIp).unwrap_or_default(),
        printer_port: sources
            .value(JobField::PrinterPort)
            .unwrap_or_else(|| DEFAULT_PRINTER_PORT.to_string()),
        job_id: sources.value(JobField::JobId),
        job_type: sources
            .value(JobField::JobType)
            .unwrap_or_else(|| DEFAULT_JOB_TYPE.to_string()),
        paper_size: sources
            .value(JobField::PaperSize)
            .unwrap_or_else(|| config.paper_size_or_fallback().to_string()),
        page_range: sources.value(JobField::PageRange),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> BridgeConfig {
        BridgeConfig::new("localhost", 631)
    }

    fn headers(pairs: &[(&str, &str)]) -> ResponseHeaders {
        pairs.iter().copied().collect()
    }

    #[test]
    fn headers_fill_fields_missing_from_body() {
        let request = PrintRequest {
            endpoint: Some("http://x/doc".into()),
            ..Default::default()
        };
        let headers = headers(&[("X-Printer-Name", "HP1"), ("X-Paper-Size", "Letter")]);

        let job = resolve_job(&request, &headers, &config()).unwrap();
        assert_eq!(job.printer_name, "HP1");
        assert_eq!(job.paper_size, "Letter");
        assert_eq!(job.job_type, "raw");
        assert_eq!(job.printer_port, "631");
        assert_eq!(job.page_range, None);
        assert_eq!(job.page_range_label(), "all");
    }

    #[test]
    fn body_overrides_header() {
        let request = PrintRequest {
            printer_name: Some("HP2".into()),
            ..Default::default()
        };
        let headers = headers(&[("X-Printer-Name", "HP1")]);

        let job = resolve_job(&request, &headers, &config()).unwrap();
        assert_eq!(job.printer_name, "HP2");
    }

    #[test]
    fn defaults_apply_last() {
        let mut config = config();
        config.default_printer = "Office".into();
        config.default_printer_ip = "10.0.0.9".into();
        config.default_paper_size = "A3".into();

        let job = resolve_job(&PrintRequest::default(), &ResponseHeaders::new(), &config).unwrap();
        assert_eq!(job.printer_name, "Office");
        assert_eq!(job.printer_ip, "10.0.0.9");
        assert_eq!(job.paper_size, "A3");
    }

    #[test]
    fn header_only_fields_come_from_headers() {
        let headers = headers(&[
            ("X-Printer-Name", "HP1"),
            ("X-Printer-Port", "9100"),
            ("X-Print-Job-ID", "Order 7"),
            ("X-Printer-Job-Type", "pdf"),
            ("X-Page-Range", "2-4"),
        ]);

        let job = resolve_job(&PrintRequest::default(), &headers, &config()).unwrap();
        assert_eq!(job.printer_port, "9100");
        assert_eq!(job.job_id.as_deref(), Some("Order 7"));
        assert_eq!(job.job_name(), "Job_order-7");
        assert_eq!(job.job_type, "pdf");
        assert_eq!(job.page_range.as_deref(), Some("2-4"));
    }

    #[test]
    fn unmapped_headers_are_skipped() {
        let mut config = config();
        config.header_names.printer_name = None;
        config.default_printer = "Fallback".into();
        let headers = headers(&[("X-Printer-Name", "HP1")]);

        let job = resolve_job(&PrintRequest::default(), &headers, &config).unwrap();
        assert_eq!(job.printer_name, "Fallback");
    }

    #[test]
    fn custom_header_names_are_honoured() {
        let mut config = config();
        config.header_names.paper_size = Some("X-Media".into());
        let headers = headers(&[("X-Printer-Name", "HP1"), ("x-media", "Legal")]);

        let job = resolve_job(&PrintRequest::default(), &headers, &config).unwrap();
        assert_eq!(job.paper_size, "Legal");
    }

    #[test]
    fn empty_values_fall_through() {
        let request = PrintRequest {
            printer_name: Some(String::new()),
            ..Default::default()
        };
        let headers = headers(&[("X-Printer-Name", ""), ("X-Page-Range", "")]);
        let mut config = config();
        config.default_printer = "Office".into();

        let job = resolve_job(&request, &headers, &config).unwrap();
        assert_eq!(job.printer_name, "Office");
        assert_eq!(job.page_range, None);
    }

    #[test]
    fn missing_printer_is_an_error() {
        let err = resolve_job(&PrintRequest::default(), &ResponseHeaders::new(), &config())
            .unwrap_err();
        assert!(matches!(err, PrinthookError::NoPrinterSelected));
    }

    #[test]
    fn lookup_reports_source() {
        let request = PrintRequest {
            paper_size: Some("A5".into()),
            ..Default::default()
        };
        let headers = headers(&[("X-Printer-Name", "HP1")]);
        let config = config();
        let sources = ParameterSources::new(&request, &headers, &config);

        assert_eq!(sources.lookup(JobField::PaperSize), Some(("A5", Source::Body)));
        assert_eq!(sources.lookup(JobField::PrinterName), Some(("HP1", Source::Header)));
        assert_eq!(sources.lookup(JobField::JobType), Some(("raw", Source::Default)));
        assert_eq!(sources.lookup(JobField::JobId), None);
    }
}
