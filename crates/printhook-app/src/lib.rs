// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printhook HTTP service: routes, request context, and the outbound HTTP
// clients (document fetch, supervisor notifications and registration).

pub mod error;
pub mod fetch;
pub mod notify;
pub mod register;
pub mod routes;
pub mod services;

pub use error::ApiError;
pub use fetch::DocumentFetcher;
pub use notify::Notifier;
pub use register::ServiceRegistrar;
pub use routes::router;
pub use services::{ServiceContext, Settings};
