// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printer listing, for checking names before pointing a webhook at them.

use axum::{Json, extract::State};
use serde::Serialize;

use crate::error::ApiError;
use crate::services::ServiceContext;

#[derive(Serialize)]
pub struct PrintersResponse {
    pub success: bool,
    pub printers: Vec<String>,
}

pub async fn list_printers(
    State(ctx): State<ServiceContext>,
) -> Result<Json<PrintersResponse>, ApiError> {
    let printers = ctx
        .printing()
        .printers()
        .await
        .map_err(|e| ApiError::PrinterQuery(e.to_string()))?;

    Ok(Json(PrintersResponse {
        success: true,
        printers,
    }))
}
