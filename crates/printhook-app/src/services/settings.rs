// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Process settings from the environment.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use printhook_core::error::{PrinthookError, Result};

/// Options file written by the supervisor for add-ons.
pub const DEFAULT_OPTIONS_PATH: &str = "/data/options.json";

/// Service definition files tried in order when registering with the
/// supervisor.
pub const DEFAULT_SERVICE_DEFINITIONS: [&str; 2] = ["/data/services.yaml", "services.yaml"];

/// Address the HTTP endpoint listens on.
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8099";

/// Settings that locate things rather than configure printing.
#[derive(Debug, Clone)]
pub struct Settings {
    /// JSON options file (`PRINTHOOK_OPTIONS`).
    pub options_path: PathBuf,
    /// HTTP listen address (`PRINTHOOK_LISTEN`).
    pub listen_addr: SocketAddr,
    /// Shared scratch directory (`PRINTHOOK_SCRATCH_DIR`).
    pub scratch_dir: PathBuf,
    /// Supervisor API token (`SUPERVISOR_TOKEN`). `None` disables
    /// notifications and service registration.
    pub supervisor_token: Option<String>,
    /// Service definition candidates (`PRINTHOOK_SERVICES` names a single
    /// file).
    pub service_definitions: Vec<PathBuf>,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let listen = var("PRINTHOOK_LISTEN").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr = listen
            .parse()
            .map_err(|e| PrinthookError::Config(format!("PRINTHOOK_LISTEN '{listen}': {e}")))?;

        Ok(Self {
            options_path: var("PRINTHOOK_OPTIONS")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OPTIONS_PATH)),
            listen_addr,
            scratch_dir: var("PRINTHOOK_SCRATCH_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(env::temp_dir),
            supervisor_token: var("SUPERVISOR_TOKEN"),
            service_definitions: match var("PRINTHOOK_SERVICES") {
                Some(path) => vec![PathBuf::from(path)],
                None => DEFAULT_SERVICE_DEFINITIONS.iter().map(PathBuf::from).collect(),
            },
        })
    }
}
