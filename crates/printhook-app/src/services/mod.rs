// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer: process settings and the request-independent context every
// handler receives.

pub mod context;
pub mod settings;

pub use context::ServiceContext;
pub use settings::Settings;
