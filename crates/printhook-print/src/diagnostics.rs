// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Diagnostics for the ambiguous "not found" submission failure.
//
// A CUPS server answers client-error-not-found both for an unknown queue and
// for a document it cannot reach through shared storage.  After such an
// answer we check, in order: printer listed → document exists → document
// readable → document permissions → scratch directory accessible.  Every step
// runs; the report is advisory and nothing is remediated.

use std::path::Path;

use serde::Serialize;
use tokio::fs;

/// Result of a single diagnostic step.
#[derive(Debug, Clone, Serialize)]
pub struct StepResult {
    /// Step name.
    pub name: String,
    /// Whether the step passed.
    pub passed: bool,
    /// What was checked and what was found.
    pub detail: String,
    /// What to check if the step failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<String>,
}

impl StepResult {
    fn pass(name: &str, detail: String) -> Self {
        Self {
            name: name.into(),
            passed: true,
            detail,
            fix: None,
        }
    }

    fn fail(name: &str, detail: String, fix: &str) -> Self {
        Self {
            name: name.into(),
            passed: false,
            detail,
            fix: Some(fix.into()),
        }
    }
}

/// Full diagnostic report, returned to the caller as `details`.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionReport {
    pub printer: String,
    pub document: String,
    pub steps: Vec<StepResult>,
    /// Overall summary.
    pub summary: String,
}

/// Inspect the printer listing, the scratch file, and its directory after a
/// "not found" submission failure.
pub async fn diagnose_not_found(
    printer: &str,
    known_printers: &[String],
    document: &Path,
    scratch_dir: &Path,
) -> SubmissionReport {
    let steps = vec![
        check_printer_listed(printer, known_printers),
        check_document_exists(document).await,
        check_document_readable(document).await,
        check_document_permissions(document).await,
        check_scratch_dir(scratch_dir).await,
    ];

    let summary = match steps.iter().find(|s| !s.passed) {
        Some(step) => step.detail.clone(),
        None => "The printer is listed and the document is readable here; the print server \
                 probably cannot see this scratch directory."
            .into(),
    };

    SubmissionReport {
        printer: printer.to_string(),
        document: document.display().to_string(),
        steps,
        summary,
    }
}

// -- Step implementations ---------------------------------------------------

fn check_printer_listed(printer: &str, known_printers: &[String]) -> StepResult {
    const NAME: &str = "Printer listed";
    if known_printers.iter().any(|p| p == printer) {
        StepResult::pass(NAME, format!("'{printer}' is listed by the print server."))
    } else {
        StepResult::fail(
            NAME,
            format!("'{printer}' is not listed by the print server."),
            "Check the printer name against the server's queue names.",
        )
    }
}

async fn check_document_exists(document: &Path) -> StepResult {
    const NAME: &str = "Document exists";
    match fs::metadata(document).await {
        Ok(meta) if meta.is_file() => StepResult::pass(
            NAME,
            format!("{} exists ({} bytes).", document.display(), meta.len()),
        ),
        Ok(_) => StepResult::fail(
            NAME,
            format!("{} is not a regular file.", document.display()),
            "Something replaced the scratch file; check other processes using the directory.",
        ),
        Err(e) => StepResult::fail(
            NAME,
            format!("{} is missing: {e}.", document.display()),
            "The scratch file disappeared before printing; check other processes cleaning the directory.",
        ),
    }
}

async fn check_document_readable(document: &Path) -> StepResult {
    const NAME: &str = "Document readable";
    match fs::File::open(document).await {
        Ok(_) => StepResult::pass(NAME, format!("{} can be opened.", document.display())),
        Err(e) => StepResult::fail(
            NAME,
            format!("{} cannot be opened: {e}.", document.display()),
            "Check ownership of the scratch directory.",
        ),
    }
}

#[cfg(unix)]
async fn check_document_permissions(document: &Path) -> StepResult {
    use std::os::unix::fs::PermissionsExt;

    const NAME: &str = "Document permissions";
    match fs::metadata(document).await {
        Ok(meta) => {
            let mode = meta.permissions().mode() & 0o777;
            if mode & 0o004 != 0 {
                StepResult::pass(NAME, format!("Mode {mode:o} is world-readable."))
            } else {
                StepResult::fail(
                    NAME,
                    format!("Mode {mode:o} is not world-readable."),
                    "The print server may run as another user; make scratch files world-readable.",
                )
            }
        }
        Err(e) => StepResult::fail(
            NAME,
            format!("Permissions unavailable: {e}."),
            "The scratch file is missing; see the previous steps.",
        ),
    }
}

#[cfg(not(unix))]
async fn check_document_permissions(document: &Path) -> StepResult {
    const NAME: &str = "Document permissions";
    match fs::metadata(document).await {
        Ok(meta) if meta.permissions().readonly() => {
            StepResult::pass(NAME, "Read-only file.".into())
        }
        Ok(_) => StepResult::pass(NAME, "Readable and writable file.".into()),
        Err(e) => StepResult::fail(
            NAME,
            format!("Permissions unavailable: {e}."),
            "The scratch file is missing; see the previous steps.",
        ),
    }
}

async fn check_scratch_dir(dir: &Path) -> StepResult {
    const NAME: &str = "Scratch directory accessible";
    match fs::metadata(dir).await {
        Ok(meta) if meta.is_dir() => match fs::read_dir(dir).await {
            Ok(_) if meta.permissions().readonly() => StepResult::fail(
                NAME,
                format!("{} is read-only.", dir.display()),
                "Make the scratch directory writable.",
            ),
            Ok(_) => StepResult::pass(NAME, format!("{} is readable.", dir.display())),
            Err(e) => StepResult::fail(
                NAME,
                format!("{} cannot be listed: {e}.", dir.display()),
                "Check permissions of the scratch directory.",
            ),
        },
        Ok(_) => StepResult::fail(
            NAME,
            format!("{} is not a directory.", dir.display()),
            "Point the scratch directory setting at a directory.",
        ),
        Err(e) => StepResult::fail(
            NAME,
            format!("{} is not accessible: {e}.", dir.display()),
            "Check that the scratch directory is mounted and shared with the print server.",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known() -> Vec<String> {
        vec!["Office".to_string()]
    }

    #[tokio::test]
    async fn readable_document_points_at_shared_storage() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("printhook-1.pdf");
        std::fs::write(&doc, b"%PDF").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&doc, std::fs::Permissions::from_mode(0o644)).unwrap();
        }

        let report = diagnose_not_found("Office", &known(), &doc, dir.path()).await;
        assert_eq!(report.steps.len(), 5);
        assert!(report.steps.iter().all(|s| s.passed));
        assert!(report.summary.contains("scratch directory"));
    }

    #[tokio::test]
    async fn missing_document_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("printhook-gone.pdf");

        let report = diagnose_not_found("Office", &known(), &doc, dir.path()).await;
        let exists = &report.steps[1];
        assert_eq!(exists.name, "Document exists");
        assert!(!exists.passed);
        assert!(exists.fix.is_some());
        assert_eq!(report.summary, exists.detail);
    }

    #[tokio::test]
    async fn unlisted_printer_is_reported_first() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("printhook-1.pdf");
        std::fs::write(&doc, b"%PDF").unwrap();

        let report = diagnose_not_found("Garage", &known(), &doc, dir.path()).await;
        assert!(!report.steps[0].passed);
        assert!(report.summary.contains("Garage"));
    }

    #[tokio::test]
    async fn missing_directory_fails_last_step() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("nope");

        let report = diagnose_not_found("Office", &known(), &gone.join("x.pdf"), &gone).await;
        assert!(!report.steps[4].passed);
    }

    #[test]
    fn report_serializes_without_empty_fix() {
        let step = StepResult::pass("Printer listed", "ok".into());
        let json = serde_json::to_value(&step).unwrap();
        assert!(json.get("fix").is_none());
    }
}
