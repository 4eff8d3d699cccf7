//! Letter text composition.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use closeflow_shared::types::{format_currency, parse_amount};
use regex::Regex;

static NON_SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9]+").expect("valid slug pattern"));

/// Placeholder replaced by the service summary.
pub const SERVICE_SUMMARY_PLACEHOLDER: &str = "{{ServiceSummary}}";

/// File-name slug: runs of non-alphanumerics become `_`.
///
/// Falls back to `client` when nothing alphanumeric remains.
#[must_use]
pub fn slugify(value: &str) -> String {
    let slug = NON_SLUG_RE.replace_all(value, "_");
    let slug = slug.trim_matches('_');
    if slug.is_empty() {
        "client".to_string()
    } else {
        slug.to_string()
    }
}

/// Draft letter file name for a client and fiscal year.
#[must_use]
pub fn letter_file_name(client_name: &str, fiscal_year: &str) -> String {
    format!("{}_EngagementLetter_FY{fiscal_year}.docx", slugify(client_name))
}

/// Previous year's letter for the client, if the folder holds one.
///
/// Fiscal years that are not integers have no predecessor.
#[must_use]
pub fn prior_letter_path(folder: &Path, client_name: &str, fiscal_year: &str) -> Option<PathBuf> {
    let prior_year = fiscal_year.trim().parse::<i64>().ok()?.checked_sub(1)?;
    let candidate = folder.join(letter_file_name(client_name, &prior_year.to_string()));
    candidate.is_file().then_some(candidate)
}

/// Picks a file name not yet in `used` and records it.
///
/// Collisions first get the client id slug appended, then a counter.
pub fn unique_file_name(
    used: &mut BTreeSet<String>,
    client_name: &str,
    client_id: &str,
    fiscal_year: &str,
) -> String {
    let base = letter_file_name(client_name, fiscal_year);
    let stem = base.trim_end_matches(".docx").to_string();

    let mut candidate = base;
    if used.contains(&candidate) {
        candidate = format!("{stem}_{}.docx", slugify(client_id));
    }
    let with_id = candidate.trim_end_matches(".docx").to_string();
    let mut counter = 2;
    while used.contains(&candidate) {
        candidate = format!("{with_id}_{counter}.docx");
        counter += 1;
    }
    used.insert(candidate.clone());
    candidate
}

/// Decodes text as UTF-8, falling back to Latin-1.
#[must_use]
pub fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => e.into_bytes().iter().map(|&b| char::from(b)).collect(),
    }
}

/// Decodes text as UTF-8, dropping invalid sequences.
#[must_use]
pub fn decode_text_lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).replace(char::REPLACEMENT_CHARACTER, "")
}

/// One service line as shown in a letter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDetail {
    /// Upper-cased service code.
    pub code: String,
    /// Reference description.
    pub description: String,
    /// Rate as found in the reference data.
    pub rate: String,
}

impl ServiceDetail {
    /// Rate as currency when it parses after removing `$` and `,`; else verbatim.
    #[must_use]
    pub fn rate_display(&self) -> String {
        let cleaned = self.rate.replace(['$', ','], "");
        parse_amount(&cleaned).map_or_else(|| self.rate.clone(), format_currency)
    }

    /// `- CODE (Description) @ $1,234.00`
    #[must_use]
    pub fn summary_line(&self) -> String {
        format!("- {} ({}) @ {}", self.code, self.description, self.rate_display())
    }
}

/// Summary block listing every service line.
#[must_use]
pub fn service_summary(details: &[ServiceDetail]) -> String {
    details
        .iter()
        .map(ServiceDetail::summary_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Values merged into a letter.
#[derive(Debug, Clone, Copy)]
pub struct LetterFields<'a> {
    /// Client display name.
    pub client_name: &'a str,
    /// Client identifier.
    pub client_id: &'a str,
    /// Fiscal year, e.g. `2025`.
    pub fiscal_year: &'a str,
    /// Output of [`service_summary`].
    pub service_summary: &'a str,
    /// Generation timestamp.
    pub generated_on: &'a str,
}

impl LetterFields<'_> {
    fn placeholders(&self) -> [(&'static str, &str); 5] {
        [
            ("{{ClientName}}", self.client_name),
            ("{{ClientID}}", self.client_id),
            ("{{FiscalYear}}", self.fiscal_year),
            (SERVICE_SUMMARY_PLACEHOLDER, self.service_summary),
            ("{{GeneratedOn}}", self.generated_on),
        ]
    }
}

/// Merges `fields` into `base`.
///
/// A base without a summary placeholder gets the summary appended, and a
/// letter that never mentions `FY<year>` gets a fiscal-year line.
#[must_use]
pub fn compose_letter(base: &str, fields: &LetterFields<'_>) -> String {
    let mut text = base.to_string();
    if !base.contains(SERVICE_SUMMARY_PLACEHOLDER) {
        text = format!(
            "{}\n\nService Summary:\n{}\n",
            text.trim_end(),
            SERVICE_SUMMARY_PLACEHOLDER
        );
    }
    for (placeholder, value) in fields.placeholders() {
        text = text.replace(placeholder, value);
    }

    let fiscal_marker = format!("FY{}", fields.fiscal_year);
    if !text.contains(&fiscal_marker) {
        text = format!("{}\n\nFiscal Year: {fiscal_marker}\n", text.trim_end());
    }
    text
}
