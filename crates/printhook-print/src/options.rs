// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// IPP encoding of CUPS-style job options.
//
// Options travel as `name=value` strings until they reach the IPP client.
// Here they become Job Template attributes (RFC 8011 §5.2):
//   - `page-ranges` → 1setOf rangeOfInteger (`"1-3,5,7-"`)
//   - everything else (`media`, `job-type`, ...) → keyword

use ipp::prelude::*;

use printhook_core::error::{PrinthookError, Result};
use printhook_core::types::JobOptions;

/// Upper bound used for open-ended ranges such as `"7-"`.
const LAST_PAGE: i32 = i32::MAX;

/// Parse a CUPS page-range string into inclusive `(first, last)` pairs.
///
/// Accepts comma-separated single pages (`5`), closed ranges (`1-3`), and
/// open-ended ranges (`7-`). Pages start at 1.
pub fn parse_page_ranges(input: &str) -> Result<Vec<(i32, i32)>> {
    let invalid = || PrinthookError::InvalidPageRange(input.to_string());

    let mut ranges = Vec::new();
    for part in input.split(',') {
        let part = part.trim();
        if part.is_empty() {
            return Err(invalid());
        }

        let (first, last) = match part.split_once('-') {
            Some((first, last)) => {
                let first = parse_page(first).ok_or_else(invalid)?;
                let last = if last.trim().is_empty() {
                    LAST_PAGE
                } else {
                    parse_page(last).ok_or_else(invalid)?
                };
                (first, last)
            }
            None => {
                let page = parse_page(part).ok_or_else(invalid)?;
                (page, page)
            }
        };

        if last < first {
            return Err(invalid());
        }
        ranges.push((first, last));
    }

    Ok(ranges)
}

fn parse_page(raw: &str) -> Option<i32> {
    raw.trim().parse::<i32>().ok().filter(|page| *page >= 1)
}

/// Convert job options into IPP job attributes.
pub fn to_ipp_attributes(options: &JobOptions) -> Result<Vec<IppAttribute>> {
    options
        .iter()
        .map(|(name, value)| {
            let value = match name {
                "page-ranges" => page_ranges_value(value)?,
                _ => IppValue::Keyword(value.to_string().into()),
            };
            Ok(IppAttribute::new(name, value))
        })
        .collect()
}

fn page_ranges_value(raw: &str) -> Result<IppValue> {
    let mut values: Vec<IppValue> = parse_page_ranges(raw)?
        .into_iter()
        .map(|(min, max)| IppValue::RangeOfInteger { min, max })
        .collect();

    Ok(if values.len() == 1 {
        values.remove(0)
    } else {
        IppValue::Array(values)
    })
}
