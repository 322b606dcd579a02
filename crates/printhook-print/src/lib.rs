// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printhook print: the print subsystem boundary.  An IPP client adapter for
// CUPS servers, IPP encoding of job options, per-request scratch files, and
// the advisory diagnostics attached to ambiguous submission failures.

pub mod diagnostics;
pub mod ipp_client;
pub mod options;
pub mod scratch;

use std::path::PathBuf;

use async_trait::async_trait;

use printhook_core::error::Result;
use printhook_core::types::JobOptions;

pub use diagnostics::SubmissionReport;
pub use ipp_client::CupsClient;
pub use scratch::{ScratchDir, ScratchFile};

/// One document ready for the print subsystem.
#[derive(Debug, Clone)]
pub struct PrintSubmission {
    /// Destination queue name on the print server.
    pub printer: String,
    /// Scratch file holding the document.
    pub document: PathBuf,
    /// Human-readable job name shown in the queue.
    pub job_name: String,
    pub options: JobOptions,
}

/// Printer enumeration and job submission.
///
/// Implementations must be safe to call from concurrent requests.
#[async_trait]
pub trait PrintSubsystem: Send + Sync {
    /// Names of every printer the subsystem knows.
    async fn printers(&self) -> Result<Vec<String>>;

    /// Submit a job and return the job id assigned by the subsystem.
    ///
    /// A "not found" answer from the subsystem is reported as
    /// `PrinthookError::TargetNotFound`.
    async fn submit(&self, submission: &PrintSubmission) -> Result<i32>;
}
