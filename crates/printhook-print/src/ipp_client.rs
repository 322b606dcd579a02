// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Async IPP client for a CUPS print server.
//
// Uses the `ipp` crate's async API to send:
//   - CUPS-Get-Printers  (CUPS extension, operation 0x4002)
//   - Print-Job          (RFC 8011 §4.2.1)
//
// Printers are addressed as `ipp://<server>:<port>/printers/<name>`.

use async_trait::async_trait;
use ipp::model::StatusCode;
use ipp::prelude::*;
use tracing::{debug, error, info, instrument};

use printhook_core::error::{PrinthookError, Result};
use printhook_core::types::PDF_MIME_TYPE;

use crate::options::to_ipp_attributes;
use crate::{PrintSubmission, PrintSubsystem};

/// Async IPP client bound to one CUPS server.
///
/// Holds no connection state; every call opens its own HTTP request, so one
/// instance can be shared across concurrent requests.
#[derive(Debug, Clone)]
pub struct CupsClient {
    host: String,
    port: u16,
    /// Server root URI, target of CUPS-Get-Printers.
    server_uri: Uri,
}

impl CupsClient {
    /// Create a client for the CUPS server at `host:port`.
    pub fn new(host: &str, port: u16) -> Result<Self> {
        let raw = format!("ipp://{host}:{port}/");
        let server_uri: Uri = raw
            .parse()
            .map_err(|e| PrinthookError::IppRequest(format!("invalid server URI '{raw}': {e}")))?;
        Ok(Self {
            host: host.to_string(),
            port,
            server_uri,
        })
    }

    /// Return the server URI this client is targeting.
    pub fn server_uri(&self) -> &Uri {
        &self.server_uri
    }

    /// URI of a named print queue on this server.
    pub fn printer_uri(&self, printer: &str) -> Result<Uri> {
        let raw = format!("ipp://{}:{}/printers/{printer}", self.host, self.port);
        raw.parse()
            .map_err(|e| PrinthookError::IppRequest(format!("invalid printer URI '{raw}': {e}")))
    }

    /// List the names of all printers known to the server.
    #[instrument(skip(self), fields(uri = %self.server_uri))]
    pub async fn list_printers(&self) -> Result<Vec<String>> {
        let operation = IppOperationBuilder::cups().get_printers();
        let client = AsyncIppClient::new(self.server_uri.clone());

        debug!("sending CUPS-Get-Printers");
        let response = client
            .send(operation)
            .await
            .map_err(|e| PrinthookError::IppRequest(format!("CUPS-Get-Printers: {e}")))?;

        let code = response.header().status_code();
        if !code.is_success() {
            error!(status = ?code, "CUPS-Get-Printers failed");
            return Err(PrinthookError::IppRequest(format!(
                "CUPS-Get-Printers returned status {code:?}"
            )));
        }

        let printers = printer_names(response.attributes());
        debug!(count = printers.len(), "received printer list");
        Ok(printers)
    }

    /// Submit a scratch file as a Print-Job.
    ///
    /// The file is streamed to the server; it is not read into memory first.
    /// Returns the job-id assigned by the server.
    #[instrument(
        skip(self, submission),
        fields(printer = %submission.printer, job_name = %submission.job_name)
    )]
    pub async fn print_file(&self, submission: &PrintSubmission) -> Result<i32> {
        let uri = self.printer_uri(&submission.printer)?;
        let attributes = to_ipp_attributes(&submission.options)?;

        let document = tokio::fs::File::open(&submission.document)
            .await
            .map_err(|e| {
                PrinthookError::ScratchFile(format!(
                    "open {}: {e}",
                    submission.document.display()
                ))
            })?
            .into_std()
            .await;
        let payload = IppPayload::new(document);

        let mut builder = IppOperationBuilder::print_job(uri.clone(), payload)
            .job_title(&submission.job_name)
            .document_format(PDF_MIME_TYPE);
        for attribute in attributes {
            builder = builder.attribute(attribute);
        }
        let operation = builder.build();

        let client = AsyncIppClient::new(uri);

        info!(options = ?submission.options, "sending Print-Job");
        let response = client
            .send(operation)
            .await
            .map_err(|e| PrinthookError::IppRequest(format!("Print-Job: {e}")))?;

        let code = response.header().status_code();
        if !code.is_success() {
            error!(status = ?code, "Print-Job failed");
            let detail = format!("Print-Job returned status {code:?}");
            return Err(if matches!(code, StatusCode::ClientErrorNotFound) {
                PrinthookError::TargetNotFound(detail)
            } else {
                PrinthookError::IppRequest(detail)
            });
        }

        let job_id = extract_job_id(response.attributes()).ok_or_else(|| {
            PrinthookError::IppRequest("Print-Job response missing job-id attribute".into())
        })?;

        info!(job_id, "print job accepted by server");
        Ok(job_id)
    }
}

#[async_trait]
impl PrintSubsystem for CupsClient {
    async fn printers(&self) -> Result<Vec<String>> {
        self.list_printers().await
    }

    async fn submit(&self, submission: &PrintSubmission) -> Result<i32> {
        self.print_file(submission).await
    }
}

// ---------------------------------------------------------------------------
// Helper functions for parsing IPP responses
// ---------------------------------------------------------------------------

/// Collect `printer-name` from every Printer Attributes group.
fn printer_names(attrs: &IppAttributes) -> Vec<String> {
    let mut names = Vec::new();
    for group in attrs.groups_of(DelimiterTag::PrinterAttributes) {
        if let Some(attr) = group.attributes().get("printer-name") {
            names.push(attr.value().to_string());
        }
    }
    names
}

/// Extract the `job-id` integer from a response's Job Attributes group.
fn extract_job_id(attrs: &IppAttributes) -> Option<i32> {
    for group in attrs.groups_of(DelimiterTag::JobAttributes) {
        if let Some(attr) = group.attributes().get("job-id")
            && let IppValue::Integer(id) = attr.value()
        {
            return Some(*id);
        }
    }
    None
}
