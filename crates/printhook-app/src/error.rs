// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// HTTP-facing errors. Every failure of a request ends here and becomes a JSON
// body with `success: false`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use printhook_print::SubmissionReport;

/// A request failure and the status it maps to.
#[derive(Debug, Error)]
pub enum ApiError {
    // -- 400: caller input --
    #[error("Invalid JSON in request")]
    InvalidJson(String),

    #[error("No endpoint provided")]
    MissingEndpoint,

    #[error("No printer specified in request, response headers, or configuration")]
    NoPrinter,

    // -- 500: upstream document --
    #[error("Failed to fetch PDF: {0}")]
    Fetch(String),

    #[error("Response is not a PDF file (content type: {0})")]
    NotPdf(String),

    // -- 500: scratch storage --
    #[error("Failed to save PDF: {0}")]
    SaveFailed(String),

    // -- print subsystem --
    #[error("Failed to query printers: {0}")]
    PrinterQuery(String),

    #[error("Printer '{printer}' not found")]
    UnknownPrinter {
        printer: String,
        available: Vec<String>,
    },

    #[error("Print server could not find the printer or the document: {message}")]
    TargetNotFound {
        message: String,
        report: Box<SubmissionReport>,
    },

    #[error("{0}")]
    PrintFailed(String),

    // -- backstop --
    #[error("Server error: {0}")]
    Server(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidJson(_) | Self::MissingEndpoint | Self::NoPrinter => {
                StatusCode::BAD_REQUEST
            }
            Self::UnknownPrinter { .. } => StatusCode::NOT_FOUND,
            Self::Fetch(_)
            | Self::NotPdf(_)
            | Self::SaveFailed(_)
            | Self::PrinterQuery(_)
            | Self::TargetNotFound { .. }
            | Self::PrintFailed(_)
            | Self::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    available_printers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(%status, error = %self, "request failed");
        } else {
            warn!(%status, error = %self, "request rejected");
        }

        let error = self.to_string();
        let (available_printers, details) = match self {
            Self::UnknownPrinter { available, .. } => (Some(available), None),
            Self::TargetNotFound { report, .. } => {
                (None, serde_json::to_value(report.as_ref()).ok())
            }
            Self::InvalidJson(detail) => (None, Some(serde_json::Value::String(detail))),
            _ => (None, None),
        };

        let body = Json(ErrorResponse {
            success: false,
            error,
            available_printers,
            details,
        });

        (status, body).into_response()
    }
}
