//! Draft manifest and notification log.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where a letter's base text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LetterSource {
    /// The standard template.
    Template,
    /// The client's prior-year letter.
    RolledForward,
}

/// One generated letter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterEntry {
    /// Client identifier.
    pub client_id: String,
    /// Client display name.
    pub client_name: String,
    /// Fiscal year the letter covers.
    pub fiscal_year: String,
    /// Service codes listed in the letter.
    pub service_lines: Vec<String>,
    /// Where the draft was written.
    pub output_path: String,
    /// Base text origin.
    pub source: LetterSource,
    /// Generation time, `%Y-%m-%d %H:%M UTC`.
    pub generated_on: String,
}

/// One record flagged for review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionEntry {
    /// Client identifier, empty when the record had none.
    pub client_id: String,
    /// Why the record was not drafted.
    pub reason: String,
}

/// Everything one run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftManifest {
    /// Run timestamp (ISO 8601, UTC).
    pub timestamp: String,
    /// Drafted letters, in client order.
    pub letters: Vec<LetterEntry>,
    /// Records flagged for review.
    pub exceptions: Vec<ExceptionEntry>,
}

/// Notification recipients from a single name or a list of names.
#[must_use]
pub fn recipients(value: Option<&Value>) -> Vec<String> {
    let text = |v: &Value| match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    };
    let present = |r: &String| !r.trim().is_empty();
    match value {
        Some(Value::Array(items)) => items.iter().map(text).filter(present).collect(),
        Some(value) => Some(text(value)).filter(present).into_iter().collect(),
        None => Vec::new(),
    }
}

/// Notification log body.
///
/// One header line, then one line per letter. Without recipients the log
/// only says so.
#[must_use]
pub fn notification_text(recipients: &[String], manifest: &DraftManifest) -> String {
    if recipients.is_empty() {
        return "No notification recipients configured.".to_string();
    }

    let notify = recipients.join(", ");
    let mut lines = vec![format!(
        "{} | Draft engagement letters ready: {} clients",
        manifest.timestamp,
        manifest.letters.len()
    )];
    lines.extend(manifest.letters.iter().map(|letter| {
        format!(
            "Notify {notify} → {} letter saved to {}",
            letter.client_name, letter.output_path
        )
    }));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn manifest() -> DraftManifest {
        DraftManifest {
            timestamp: "2025-01-31T09:00:00.000000Z".to_string(),
            letters: vec![LetterEntry {
                client_id: "C1".to_string(),
                client_name: "Acme".to_string(),
                fiscal_year: "2025".to_string(),
                service_lines: vec!["AUD".to_string()],
                output_path: "out/Acme_EngagementLetter_FY2025.docx".to_string(),
                source: LetterSource::RolledForward,
                generated_on: "2025-01-31 09:00 UTC".to_string(),
            }],
            exceptions: Vec::new(),
        }
    }

    #[test]
    fn test_recipients_accepts_string_or_list() {
        assert_eq!(recipients(Some(&json!("mgr@firm.test"))), vec!["mgr@firm.test"]);
        assert_eq!(recipients(Some(&json!(["a", " ", "b"]))), vec!["a", "b"]);
        assert!(recipients(Some(&json!(""))).is_empty());
        assert!(recipients(None).is_empty());
    }

    #[test]
    fn test_notification_text() {
        let text = notification_text(&["a".to_string(), "b".to_string()], &manifest());
        assert_eq!(
            text,
            "2025-01-31T09:00:00.000000Z | Draft engagement letters ready: 1 clients\n\
             Notify a, b → Acme letter saved to out/Acme_EngagementLetter_FY2025.docx"
        );
        assert_eq!(
            notification_text(&[], &manifest()),
            "No notification recipients configured."
        );
    }

    #[test]
    fn test_source_serializes_snake_case() {
        let value = serde_json::to_value(manifest()).unwrap();
        assert_eq!(value["letters"][0]["source"], "rolled_forward");
        assert_eq!(value["exceptions"], json!([]));
    }
}
