// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Supervisor notifications.
//
// Best effort: a missing token disables them, and a failed POST is logged and
// dropped.  Nothing here can fail the print request being described.

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument};

use printhook_core::error::{PrinthookError, Result};

/// Supervisor endpoint creating a persistent notification.
pub const SUPERVISOR_NOTIFY_URL: &str =
    "http://supervisor/core/api/services/persistent_notification/create";

/// Title shown on every notification.
pub const NOTIFICATION_TITLE: &str = "Printhook";

#[derive(Debug, Serialize)]
struct Notification<'a> {
    message: &'a str,
    title: &'a str,
}

/// Posts human-readable messages to the home-automation supervisor.
#[derive(Debug, Clone)]
pub struct Notifier {
    client: reqwest::Client,
    token: Option<String>,
    url: String,
}

impl Notifier {
    /// An empty token counts as no token.
    pub fn new(client: reqwest::Client, token: Option<String>) -> Self {
        Self {
            client,
            token: token.filter(|t| !t.is_empty()),
            url: SUPERVISOR_NOTIFY_URL.to_string(),
        }
    }

    /// A notifier that never sends anything.
    pub fn disabled() -> Self {
        Self::new(reqwest::Client::new(), None)
    }

    /// Point at a different notification endpoint.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.token.is_some()
    }

    /// Send `message` on a detached task. Returns the task handle, or `None`
    /// when notifications are disabled.
    pub fn notify(&self, message: String) -> Option<JoinHandle<()>> {
        if !self.is_enabled() {
            debug!("no supervisor token, notification skipped");
            return None;
        }

        let notifier = self.clone();
        Some(tokio::spawn(async move {
            if let Err(e) = notifier.send(&message).await {
                error!(error = %e, "supervisor notification failed");
            }
        }))
    }

    /// POST one notification and report the outcome. A disabled notifier
    /// succeeds without sending.
    #[instrument(skip_all)]
    pub async fn send(&self, message: &str) -> Result<()> {
        let Some(token) = &self.token else {
            return Ok(());
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(token)
            .json(&Notification {
                message,
                title: NOTIFICATION_TITLE,
            })
            .send()
            .await
            .map_err(|e| PrinthookError::Notification(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PrinthookError::Notification(format!("HTTP {status}: {body}")));
        }

        debug!("supervisor notification sent");
        Ok(())
    }
}
