// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The service context handed to every request handler.
//
// Built once at startup and never mutated: the loaded configuration, the
// print subsystem, the HTTP clients, and the scratch directory.  All fields
// are cheaply cloneable (Arc-wrapped or internally reference counted) so axum
// can clone the context per request.

use std::sync::Arc;

use printhook_core::BridgeConfig;
use printhook_core::error::Result;
use printhook_print::{CupsClient, PrintSubsystem, ScratchDir};
use tracing::info;

use super::settings::Settings;
use crate::fetch::DocumentFetcher;
use crate::notify::Notifier;

/// Shared, read-only request context.
#[derive(Clone)]
pub struct ServiceContext {
    config: Arc<BridgeConfig>,
    printing: Arc<dyn PrintSubsystem>,
    fetcher: DocumentFetcher,
    notifier: Notifier,
    scratch: ScratchDir,
}

impl ServiceContext {
    /// Assemble a context from already-initialised parts.
    ///
    /// The scratch retention policy is taken from `config.keep_temp_files`.
    pub fn new(
        config: BridgeConfig,
        printing: Arc<dyn PrintSubsystem>,
        scratch_dir: impl Into<std::path::PathBuf>,
        notifier: Notifier,
    ) -> Self {
        let scratch = ScratchDir::new(scratch_dir, config.keep_temp_files);
        Self {
            config: Arc::new(config),
            printing,
            fetcher: DocumentFetcher::new(reqwest::Client::new()),
            notifier,
            scratch,
        }
    }

    /// Initialise all services.  Call once at startup.
    ///
    /// Loads the options file, checks that the print server answers, and
    /// creates the scratch directory.  Any failure here is fatal.
    pub async fn init(settings: &Settings) -> Result<Self> {
        info!(path = %settings.options_path.display(), "initialising services");

        let config = BridgeConfig::load(&settings.options_path)?;

        let cups = CupsClient::new(&config.cups_server, config.cups_port)?;
        let printers = cups.list_printers().await?;
        info!(count = printers.len(), printers = ?printers, "print server reachable");

        let client = reqwest::Client::new();
        let notifier = Notifier::new(client.clone(), settings.supervisor_token.clone());
        if !notifier.is_enabled() {
            tracing::warn!("no supervisor token - notifications disabled");
        }

        let scratch = ScratchDir::new(&settings.scratch_dir, config.keep_temp_files);
        scratch.ensure().await?;

        info!("services initialised");

        Ok(Self {
            config: Arc::new(config),
            printing: Arc::new(cups),
            fetcher: DocumentFetcher::new(client),
            notifier,
            scratch,
        })
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn printing(&self) -> &dyn PrintSubsystem {
        self.printing.as_ref()
    }

    pub fn fetcher(&self) -> &DocumentFetcher {
        &self.fetcher
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn scratch(&self) -> &ScratchDir {
        &self.scratch
    }
}
