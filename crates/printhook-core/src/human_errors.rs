// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Plain-language error descriptions for supervisor notifications.
//
// The JSON API returns the technical message; the notification shown in the
// home-automation UI gets a sentence and a suggestion instead.

use crate::error::PrinthookError;

/// A human-readable error with a plain message and an actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain summary (used as the first line of the notification).
    pub message: String,
    /// What the user should check next.
    pub suggestion: String,
}

impl HumanError {
    fn new(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Notification body: message and suggestion on separate lines.
    pub fn to_notification(&self) -> String {
        format!("{}\n{}", self.message, self.suggestion)
    }
}

/// Convert a `PrinthookError` into a `HumanError`.
pub fn humanize_error(err: &PrinthookError) -> HumanError {
    match err {
        PrinthookError::Config(detail) => HumanError::new(
            "The print bridge is misconfigured.",
            format!("Check the add-on options. ({detail})"),
        ),

        PrinthookError::Fetch(detail) => HumanError::new(
            "The document could not be downloaded.",
            format!("Check that the document address is reachable and the API key is valid. ({detail})"),
        ),

        PrinthookError::NotPdf(content_type) => HumanError::new(
            "The document is not a PDF.",
            format!("The server sent '{content_type}'. Only PDF documents can be printed."),
        ),

        PrinthookError::NoPrinterSelected => HumanError::new(
            "No printer was chosen for this document.",
            "Name a printer in the request, in the document headers, or set a default printer.",
        ),

        PrinthookError::InvalidPageRange(range) => HumanError::new(
            "The page range is not valid.",
            format!("Use ranges like 1-3,5 (got '{range}')."),
        ),

        PrinthookError::ScratchFile(_) | PrinthookError::Io(_) => HumanError::new(
            "The document could not be stored for printing.",
            "Check free disk space and permissions of the temporary directory.",
        ),

        PrinthookError::IppRequest(detail) => humanize_ipp_error(detail),

        PrinthookError::TargetNotFound(_) => HumanError::new(
            "The print server could not find the printer or the document.",
            "Check the printer name on the print server and that it can read the shared temporary directory.",
        ),

        PrinthookError::Notification(_)
        | PrinthookError::Registration(_)
        | PrinthookError::Serialization(_) => HumanError::new(
            "Something went wrong inside the print bridge.",
            "Check the add-on log for details.",
        ),
    }
}

/// Interpret an IPP failure detail string.
fn humanize_ipp_error(detail: &str) -> HumanError {
    let lower = detail.to_ascii_lowercase();

    if lower.contains("timed out") || lower.contains("connection refused") {
        return HumanError::new(
            "The print server is not responding.",
            "Make sure the CUPS server is running and reachable from the bridge.",
        );
    }

    if lower.contains("not-authorized") || lower.contains("forbidden") {
        return HumanError::new(
            "The print server refused the job.",
            "Allow remote printing for this printer on the CUPS server.",
        );
    }

    if lower.contains("document-format") {
        return HumanError::new(
            "The printer does not accept this document format.",
            "Try a different job type, or install a driver that accepts PDF.",
        );
    }

    HumanError::new(
        "The print job could not be sent.",
        format!("The print server said: {detail}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_pdf_mentions_content_type() {
        let human = humanize_error(&PrinthookError::NotPdf("text/html".into()));
        assert!(human.suggestion.contains("text/html"));
    }

    #[test]
    fn ipp_timeout_points_at_server() {
        let human = humanize_error(&PrinthookError::IppRequest("Print-Job: timed out".into()));
        assert_eq!(human.message, "The print server is not responding.");
    }

    #[test]
    fn unknown_ipp_error_echoes_detail() {
        let human = humanize_error(&PrinthookError::IppRequest("weird".into()));
        assert!(human.suggestion.ends_with("weird"));
        assert!(human.to_notification().contains('\n'));
    }
}
