// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document fetcher.
//
// GETs the caller's endpoint and decides, before anything touches the disk,
// whether the answer is printable:
//   204          → nothing to print
//   non-2xx      → fetch error
//   2xx, not PDF → content-type error
//   2xx, PDF     → a document whose body is streamed into a scratch file

use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument, warn};

use printhook_core::error::{PrinthookError, Result};
use printhook_core::types::{PDF_MIME_TYPE, ResponseHeaders};

/// Header carrying the caller's API key on the outbound fetch.
pub const API_KEY_HEADER: &str = "X-API-KEY";

/// Write buffer size while streaming a document to disk.
const CHUNK_SIZE: usize = 8 * 1024;

/// Whether a `Content-Type` value names the PDF media type. Parameters such
/// as `; charset=` are ignored.
pub fn is_pdf_content_type(value: &str) -> bool {
    value
        .split(';')
        .next()
        .map(str::trim)
        .is_some_and(|media| media.eq_ignore_ascii_case(PDF_MIME_TYPE))
}

/// Result of a successful fetch.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The endpoint answered 204: there is no job right now.
    NoContent,
    Document(FetchedDocument),
}

/// A PDF response whose body has not been read yet.
#[derive(Debug)]
pub struct FetchedDocument {
    response: reqwest::Response,
    headers: ResponseHeaders,
}

impl FetchedDocument {
    /// Snapshot of the response headers, for parameter resolution.
    pub fn headers(&self) -> &ResponseHeaders {
        &self.headers
    }

    /// Stream the body into `file` and return the number of bytes written.
    ///
    /// Network failures mid-body are [`PrinthookError::Fetch`]; disk failures
    /// are [`PrinthookError::ScratchFile`].
    pub async fn write_to(mut self, file: File) -> Result<u64> {
        let mut writer = BufWriter::with_capacity(CHUNK_SIZE, file);
        let mut written: u64 = 0;

        while let Some(chunk) = self
            .response
            .chunk()
            .await
            .map_err(|e| PrinthookError::Fetch(format!("reading body: {e}")))?
        {
            writer
                .write_all(&chunk)
                .await
                .map_err(|e| PrinthookError::ScratchFile(format!("write: {e}")))?;
            written += chunk.len() as u64;
        }

        writer
            .flush()
            .await
            .map_err(|e| PrinthookError::ScratchFile(format!("flush: {e}")))?;
        writer
            .into_inner()
            .sync_all()
            .await
            .map_err(|e| PrinthookError::ScratchFile(format!("sync: {e}")))?;

        debug!(bytes = written, "document body written");
        Ok(written)
    }
}

/// HTTP client for document endpoints.
#[derive(Debug, Clone)]
pub struct DocumentFetcher {
    client: reqwest::Client,
}

impl DocumentFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// GET `endpoint`, attaching the API key when one is given.
    #[instrument(skip(self, api_key), fields(has_api_key = api_key.is_some()))]
    pub async fn fetch(&self, endpoint: &str, api_key: Option<&str>) -> Result<FetchOutcome> {
        let mut request = self.client.get(endpoint);
        if let Some(key) = api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| PrinthookError::Fetch(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            info!("endpoint has no document to print");
            return Ok(FetchOutcome::NoContent);
        }
        if !status.is_success() {
            warn!(%status, "document endpoint returned an error status");
            return Err(PrinthookError::Fetch(format!("{endpoint} returned HTTP {status}")));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !is_pdf_content_type(&content_type) {
            warn!(content_type = %content_type, "document endpoint did not return a PDF");
            let shown = if content_type.is_empty() {
                "none".to_string()
            } else {
                content_type
            };
            return Err(PrinthookError::NotPdf(shown));
        }

        let headers: ResponseHeaders = response
            .headers()
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str(), v)))
            .collect();

        debug!(length = ?response.content_length(), "PDF response received");
        Ok(FetchOutcome::Document(FetchedDocument { response, headers }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_content_type_matching() {
        assert!(is_pdf_content_type("application/pdf"));
        assert!(is_pdf_content_type("Application/PDF; charset=binary"));
        assert!(is_pdf_content_type(" application/pdf "));
        assert!(!is_pdf_content_type("text/html"));
        assert!(!is_pdf_content_type("application/pdfx"));
        assert!(!is_pdf_content_type(""));
    }
}
