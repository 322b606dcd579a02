// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Job-name slugs. Job ids arrive in a response header, so they are
// transliterated to ASCII and reduced to lowercase alphanumerics joined by
// single hyphens before they reach the print queue.

use deunicode::deunicode_with_tofu;

/// Name used when the job id is absent or slugs to nothing.
const FALLBACK_SLUG: &str = "print";

/// Transliterate `input` to ASCII, lowercase it, turn every run of
/// non-alphanumeric characters into a single `-`, and trim hyphens from both
/// ends. Characters without a transliteration are dropped.
pub fn slugify(input: &str) -> String {
    let ascii = deunicode_with_tofu(input, "");
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_hyphen = false;

    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// `Job_<slug>` for the given job id, falling back to `Job_print`.
pub fn job_name(job_id: Option<&str>) -> String {
    let slug = job_id.map(slugify).unwrap_or_default();
    if slug.is_empty() {
        format!("Job_{FALLBACK_SLUG}")
    } else {
        format!("Job_{slug}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Invoice #42 / March"), "invoice-42-march");
        assert_eq!(slugify("--already-slugged--"), "already-slugged");
        assert_eq!(slugify("ABC_123"), "abc-123");
    }

    #[test]
    fn slugify_transliterates_non_ascii() {
        assert_eq!(slugify("Größe 7"), "grosse-7");
        assert_eq!(slugify("Café Déjà-vu"), "cafe-deja-vu");
        assert_eq!(job_name(Some("Übersicht Nr. 3")), "Job_ubersicht-nr-3");
    }

    #[test]
    fn job_name_uses_fallback() {
        assert_eq!(job_name(None), "Job_print");
        assert_eq!(job_name(Some("")), "Job_print");
        assert_eq!(job_name(Some("!!!")), "Job_print");
        assert_eq!(job_name(Some("Order 1001")), "Job_order-1001");
    }
}
