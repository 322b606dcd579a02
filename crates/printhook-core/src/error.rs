// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Printhook.

use thiserror::Error;

/// Top-level error type for all Printhook operations.
#[derive(Debug, Error)]
pub enum PrinthookError {
    // -- Startup --
    #[error("configuration error: {0}")]
    Config(String),

    // -- Document fetch --
    #[error("failed to fetch PDF: {0}")]
    Fetch(String),

    #[error("response is not a PDF file (content type: {0})")]
    NotPdf(String),

    // -- Job parameters --
    #[error("no printer specified in request, response headers, or configuration")]
    NoPrinterSelected,

    #[error("invalid page range '{0}'")]
    InvalidPageRange(String),

    // -- Scratch storage --
    #[error("scratch file error: {0}")]
    ScratchFile(String),

    // -- Print subsystem --
    #[error("IPP request failed: {0}")]
    IppRequest(String),

    /// The print server answered "not found" to a submission. This covers both
    /// an unknown printer and a document the server could not reach.
    #[error("print server reported not found: {0}")]
    TargetNotFound(String),

    // -- Supervisor --
    #[error("notification failed: {0}")]
    Notification(String),

    #[error("service registration failed: {0}")]
    Registration(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PrinthookError>;
