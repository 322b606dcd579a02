// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Supervisor service registration.
//
// At startup the bridge announces `printhook.print_pdf` so automations can
// call it like any other service.  The service fields come from a YAML
// definition file.  Best effort like notifications: a missing token, a
// missing definition, or a failed POST is logged and startup carries on.

use std::path::PathBuf;

use reqwest::StatusCode;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use printhook_core::error::{PrinthookError, Result};

/// Supervisor endpoint registering a service.
pub const SUPERVISOR_REGISTER_URL: &str = "http://supervisor/core/api/services/register";

/// Service domain announced to the supervisor.
pub const SERVICE_DOMAIN: &str = "printhook";

/// Service name within [`SERVICE_DOMAIN`].
pub const SERVICE_NAME: &str = "print_pdf";

#[derive(Debug, Default, Serialize)]
struct Target {
    entity_id: Vec<String>,
    device_id: Vec<String>,
    area_id: Vec<String>,
}

#[derive(Debug, Serialize)]
struct Registration<'a> {
    domain: &'a str,
    service: &'a str,
    /// Empty target lists make the service available globally.
    target: Target,
    service_data: &'a serde_yaml::Value,
}

/// How the supervisor answered a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
    Registered,
    AlreadyRegistered,
}

/// Read the `printhook.print_pdf` definition from the first candidate file
/// that exists.
///
/// A file that exists but does not parse, or lacks the definition, ends the
/// search with an error rather than falling through to the next candidate.
pub async fn load_definition(candidates: &[PathBuf]) -> Result<serde_yaml::Value> {
    for path in candidates {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no service definition here");
                continue;
            }
            Err(e) => {
                return Err(PrinthookError::Registration(format!(
                    "read {}: {e}",
                    path.display()
                )));
            }
        };

        let definitions: serde_yaml::Value = serde_yaml::from_str(&raw).map_err(|e| {
            PrinthookError::Registration(format!("parse {}: {e}", path.display()))
        })?;

        return definitions
            .get(SERVICE_DOMAIN)
            .and_then(|domain| domain.get(SERVICE_NAME))
            .cloned()
            .ok_or_else(|| {
                PrinthookError::Registration(format!(
                    "{} has no {SERVICE_DOMAIN}.{SERVICE_NAME} definition",
                    path.display()
                ))
            });
    }

    let tried: Vec<String> = candidates.iter().map(|p| p.display().to_string()).collect();
    Err(PrinthookError::Registration(format!(
        "no service definition found (tried {})",
        tried.join(", ")
    )))
}

/// Registers the print service with the home-automation supervisor.
#[derive(Debug, Clone)]
pub struct ServiceRegistrar {
    client: reqwest::Client,
    token: Option<String>,
    url: String,
}

impl ServiceRegistrar {
    /// An empty token counts as no token.
    pub fn new(client: reqwest::Client, token: Option<String>) -> Self {
        Self {
            client,
            token: token.filter(|t| !t.is_empty()),
            url: SUPERVISOR_REGISTER_URL.to_string(),
        }
    }

    /// Point at a different registration endpoint.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.token.is_some()
    }

    /// Register on a detached task; the outcome is only logged.
    pub fn spawn(self, candidates: Vec<PathBuf>) -> JoinHandle<()> {
        tokio::spawn(async move { self.register_from(&candidates).await })
    }

    /// Load the definition and register it, logging every failure.
    pub async fn register_from(&self, candidates: &[PathBuf]) {
        if !self.is_enabled() {
            warn!("no supervisor token - service registration skipped");
            return;
        }

        let definition = match load_definition(candidates).await {
            Ok(definition) => definition,
            Err(e) => {
                error!(error = %e, "service definition unavailable");
                return;
            }
        };

        match self.register(&definition).await {
            Ok(RegistrationOutcome::Registered) => {
                info!(domain = SERVICE_DOMAIN, service = SERVICE_NAME, "service registered");
            }
            Ok(RegistrationOutcome::AlreadyRegistered) => {
                info!(domain = SERVICE_DOMAIN, service = SERVICE_NAME, "service already registered");
            }
            Err(e) => error!(error = %e, "service registration failed"),
        }
    }

    /// POST one registration. `409 Conflict` means the service exists and
    /// counts as success.
    #[instrument(skip_all, fields(url = %self.url))]
    pub async fn register(&self, definition: &serde_yaml::Value) -> Result<RegistrationOutcome> {
        let Some(token) = &self.token else {
            return Err(PrinthookError::Registration("no supervisor token".into()));
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(token)
            .json(&Registration {
                domain: SERVICE_DOMAIN,
                service: SERVICE_NAME,
                target: Target::default(),
                service_data: definition,
            })
            .send()
            .await
            .map_err(|e| PrinthookError::Registration(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::CONFLICT {
            return Ok(RegistrationOutcome::AlreadyRegistered);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PrinthookError::Registration(format!("HTTP {status}: {body}")));
        }
        Ok(RegistrationOutcome::Registered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFINITION: &str = "\
printhook:
  print_pdf:
    name: Print PDF
    fields:
      endpoint:
        required: true
";

    #[tokio::test]
    async fn first_existing_candidate_wins() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("services.yaml");
        std::fs::write(&present, DEFINITION).unwrap();

        let definition = load_definition(&[dir.path().join("missing.yaml"), present])
            .await
            .unwrap();
        assert_eq!(definition["name"].as_str(), Some("Print PDF"));
        assert_eq!(definition["fields"]["endpoint"]["required"].as_bool(), Some(true));
    }

    #[tokio::test]
    async fn malformed_file_stops_the_search() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.yaml");
        std::fs::write(&broken, "printhook: [unclosed").unwrap();
        let good = dir.path().join("good.yaml");
        std::fs::write(&good, DEFINITION).unwrap();

        let err = load_definition(&[broken, good]).await.unwrap_err();
        assert!(matches!(err, PrinthookError::Registration(msg) if msg.starts_with("parse")));
    }

    #[tokio::test]
    async fn file_without_the_service_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let other = dir.path().join("services.yaml");
        std::fs::write(&other, "cups_client:\n  print_pdf:\n    name: x\n").unwrap();

        let err = load_definition(&[other]).await.unwrap_err();
        assert!(err.to_string().contains("printhook.print_pdf"));
    }

    #[tokio::test]
    async fn no_candidates_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_definition(&[dir.path().join("a.yaml")]).await.unwrap_err();
        assert!(err.to_string().contains("no service definition found"));
    }

    #[tokio::test]
    async fn registration_needs_a_token() {
        let registrar = ServiceRegistrar::new(reqwest::Client::new(), Some(String::new()))
            .with_url("http://127.0.0.1:1/unreachable");
        assert!(!registrar.is_enabled());
        assert!(registrar.register(&serde_yaml::Value::Null).await.is_err());
        // The logging wrapper returns without trying.
        registrar.register_from(&[]).await;
    }
}
