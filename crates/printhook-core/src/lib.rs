// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printhook core: configuration, domain types, and parameter resolution shared
// by the print adapter and the HTTP service.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod resolve;
pub mod slug;
pub mod types;

pub use config::{BridgeConfig, HeaderNames};
pub use error::PrinthookError;
pub use resolve::resolve_job;
pub use types::*;
