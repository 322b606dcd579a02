// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `POST /api/print`: fetch a PDF and submit it to the print server.
//
// Stages, each a possible exit with its own response:
//   1. parse body           → 400 invalid JSON / missing endpoint
//   2. fetch document       → 200 nothing to print / 500 fetch or content type
//   3. resolve parameters   → 400 no printer
//   4. write scratch file   → 500 save failure
//   5. check printer exists → 404 with the known printers
//   6. submit job           → 500 (with diagnostics for "not found")
//   7. notify, respond      → 200
//
// From stage 4 on the scratch file is released whatever happens; the handle
// also removes it if the request is cancelled or panics.  Every completed
// request ends with a sweep of stale scratch files.

use axum::{Json, body::Bytes, extract::State};
use serde::Serialize;
use tracing::{info, instrument, warn};

use printhook_core::error::PrinthookError;
use printhook_core::human_errors::humanize_error;
use printhook_core::types::{PrintRequest, PrinterIdentity, ResolvedPrintJob};
use printhook_core::resolve_job;
use printhook_print::diagnostics::diagnose_not_found;
use printhook_print::{PrintSubmission, ScratchFile};

use crate::error::ApiError;
use crate::fetch::{FetchOutcome, FetchedDocument};
use crate::services::ServiceContext;

/// Effective print options echoed to the caller.
#[derive(Debug, Serialize)]
pub struct PrintOptionsSummary {
    pub paper_size: String,
    /// The page range, or `all`.
    pub page_range: String,
}

/// Successful `POST /api/print` body.
#[derive(Debug, Serialize)]
pub struct PrintResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub printer: Option<PrinterIdentity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub print_options: Option<PrintOptionsSummary>,
}

impl PrintResponse {
    fn no_content() -> Self {
        Self {
            success: true,
            message: "No print job available".into(),
            job_id: None,
            printer: None,
            print_options: None,
        }
    }

    fn submitted(job_id: i32, job: &ResolvedPrintJob) -> Self {
        Self {
            success: true,
            message: "Print job submitted successfully".into(),
            job_id: Some(job_id),
            printer: Some(job.printer()),
            print_options: Some(PrintOptionsSummary {
                paper_size: job.paper_size.clone(),
                page_range: job.page_range_label().to_string(),
            }),
        }
    }
}

pub async fn print_document(
    State(ctx): State<ServiceContext>,
    body: Bytes,
) -> Result<Json<PrintResponse>, ApiError> {
    let result = handle_print(&ctx, &body).await;
    ctx.scratch().sweep().await;
    result.map(Json)
}

#[instrument(skip_all)]
async fn handle_print(ctx: &ServiceContext, body: &[u8]) -> Result<PrintResponse, ApiError> {
    let request: PrintRequest =
        serde_json::from_slice(body).map_err(|e| ApiError::InvalidJson(e.to_string()))?;

    let config = ctx.config();
    let endpoint = first_non_empty(request.endpoint.as_deref(), &config.default_endpoint)
        .ok_or(ApiError::MissingEndpoint)?;
    let api_key = first_non_empty(request.api_key.as_deref(), &config.default_api_key);

    info!(endpoint, "print request received");

    let document = match ctx.fetcher().fetch(endpoint, api_key).await {
        Ok(FetchOutcome::Document(document)) => document,
        Ok(FetchOutcome::NoContent) => return Ok(PrintResponse::no_content()),
        Err(PrinthookError::NotPdf(content_type)) => return Err(ApiError::NotPdf(content_type)),
        Err(e) => return Err(ApiError::Fetch(fetch_detail(e))),
    };

    let job = resolve_job(&request, document.headers(), config).map_err(|e| match e {
        PrinthookError::NoPrinterSelected => ApiError::NoPrinter,
        other => ApiError::Server(other.to_string()),
    })?;

    let (scratch, file) = ctx
        .scratch()
        .create()
        .await
        .map_err(|e| ApiError::SaveFailed(e.to_string()))?;

    let outcome = print_from_scratch(ctx, &job, document, file, &scratch).await;
    ctx.scratch().release(scratch);
    outcome
}

/// Stages 4 to 7, once the scratch file exists.
async fn print_from_scratch(
    ctx: &ServiceContext,
    job: &ResolvedPrintJob,
    document: FetchedDocument,
    file: tokio::fs::File,
    scratch: &ScratchFile,
) -> Result<PrintResponse, ApiError> {
    match document.write_to(file).await {
        Ok(_) => {}
        Err(PrinthookError::Fetch(detail)) => return Err(ApiError::Fetch(detail)),
        Err(e) => return Err(ApiError::SaveFailed(e.to_string())),
    }
    let size = ctx
        .scratch()
        .validate(scratch)
        .await
        .map_err(|e| ApiError::SaveFailed(e.to_string()))?;

    let available = ctx
        .printing()
        .printers()
        .await
        .map_err(|e| ApiError::PrinterQuery(e.to_string()))?;
    if !available.iter().any(|p| p == &job.printer_name) {
        warn!(printer = %job.printer_name, ?available, "printer unknown to print server");
        ctx.notifier().notify(format!(
            "Printer '{}' is not known to the print server.\nAvailable printers: {}",
            job.printer_name,
            available.join(", ")
        ));
        return Err(ApiError::UnknownPrinter {
            printer: job.printer_name.clone(),
            available,
        });
    }

    let submission = PrintSubmission {
        printer: job.printer_name.clone(),
        document: scratch.path().to_path_buf(),
        job_name: job.job_name(),
        options: job.job_options(),
    };

    info!(
        printer = %submission.printer,
        job_name = %submission.job_name,
        size,
        "submitting print job"
    );

    let job_id = match ctx.printing().submit(&submission).await {
        Ok(job_id) => job_id,
        Err(PrinthookError::TargetNotFound(message)) => {
            let report = diagnose_not_found(
                &job.printer_name,
                &available,
                scratch.path(),
                ctx.scratch().path(),
            )
            .await;
            warn!(summary = %report.summary, "print server reported not found");
            notify_failure(ctx, &PrinthookError::TargetNotFound(message.clone()));
            return Err(ApiError::TargetNotFound {
                message,
                report: Box::new(report),
            });
        }
        Err(e) => {
            notify_failure(ctx, &e);
            return Err(ApiError::PrintFailed(e.to_string()));
        }
    };

    info!(job_id, printer = %job.printer_name, "print job submitted");
    ctx.notifier().notify(format!(
        "Print job {job_id} sent to {}\nPaper size: {}\nPages: {}",
        job.printer_name,
        job.paper_size,
        job.page_range_label()
    ));

    Ok(PrintResponse::submitted(job_id, job))
}

fn notify_failure(ctx: &ServiceContext, err: &PrinthookError) {
    ctx.notifier()
        .notify(humanize_error(err).to_notification());
}

/// The fetch error text without the "failed to fetch PDF" prefix, which the
/// API message adds itself.
fn fetch_detail(err: PrinthookError) -> String {
    match err {
        PrinthookError::Fetch(detail) => detail,
        other => other.to_string(),
    }
}

fn first_non_empty<'a>(primary: Option<&'a str>, fallback: &'a str) -> Option<&'a str> {
    primary
        .filter(|v| !v.is_empty())
        .or(Some(fallback))
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_non_empty_prefers_primary() {
        assert_eq!(first_non_empty(Some("a"), "b"), Some("a"));
        assert_eq!(first_non_empty(Some(""), "b"), Some("b"));
        assert_eq!(first_non_empty(None, "b"), Some("b"));
        assert_eq!(first_non_empty(None, ""), None);
    }

    #[test]
    fn no_content_response_has_no_job_fields() {
        let json = serde_json::to_value(PrintResponse::no_content()).unwrap();
        assert_eq!(json["success"], true);
        assert!(json.get("job_id").is_none());
        assert!(json.get("printer").is_none());
    }
}
