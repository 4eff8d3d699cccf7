//! ClientEngagementLetterDraft: drafts one engagement letter per client.
//!
//! Client metadata and the service-line reference table are joined on
//! service code. Each valid client gets a letter built from the prior
//! year's letter when one exists, or from the standard template. Records
//! that cannot be drafted are collected as exceptions for review. A JSON
//! manifest and a notification log describe the run.

mod letter;
mod manifest;
mod records;

pub use letter::{
    LetterFields, ServiceDetail, compose_letter, letter_file_name, prior_letter_path, service_summary,
    slugify,
};
pub use manifest::{DraftManifest, ExceptionEntry, LetterEntry, LetterSource, notification_text, recipients};
pub use records::{
    Record, RecordError, extract_field, extract_service_codes, extract_text, index_service_lines,
    load_client_metadata, load_service_lines,
};

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::contracts::{StepIO, ValidationResult};
use crate::pipeline::{PipelineError, PipelineResult, Step, StepContext, parse_params, planned};

use letter::{decode_text, decode_text_lossy, unique_file_name};
use records::{
    CLIENT_ID_FIELDS, CLIENT_NAME_FIELDS, DESCRIPTION_FIELDS, FISCAL_YEAR_FIELDS, RATE_FIELDS,
};

/// Registered step name.
pub const NAME: &str = "ClientEngagementLetterDraft";

/// Default letters folder.
pub const DEFAULT_OUTPUT_FOLDER: &str = "{support}/EngagementLetters/{period}";

const REQUIRED_PARAMS: [&str; 3] = ["client_metadata", "service_lines", "template_path"];

/// ClientEngagementLetterDraft parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LetterDraftParams {
    /// Client metadata file (JSON, CSV or workbook).
    pub client_metadata: Option<String>,
    /// Service-line reference file (JSON, CSV or workbook).
    pub service_lines: Option<String>,
    /// Standard letter template.
    pub template_path: Option<String>,
    /// Folder holding last year's letters.
    pub prior_letters_folder: Option<String>,
    /// Letters folder; defaults to [`DEFAULT_OUTPUT_FOLDER`].
    pub output_folder: Option<String>,
    /// Manifest path; defaults to `draft_manifest_{period}.json` in the letters folder.
    pub manifest_path: Option<String>,
    /// Notification log path; defaults to `notifications_{period}.txt` in the letters folder.
    pub notification_log: Option<String>,
    /// One recipient or a list of recipients.
    pub notification_recipients: Option<Value>,
}

/// Drafts client engagement letters.
#[derive(Debug, Clone)]
pub struct ClientEngagementLetterDraft {
    ctx: StepContext,
    params: LetterDraftParams,
}

/// Builds the step from raw parameters.
///
/// # Errors
///
/// Returns `InvalidParams` when the parameters are malformed.
pub fn build(ctx: StepContext, params: &Value) -> PipelineResult<Box<dyn Step>> {
    Ok(Box::new(ClientEngagementLetterDraft::new(
        ctx,
        parse_params(NAME, params)?,
    )))
}

/// A client record ready to be drafted.
struct ClientDraft {
    name: String,
    id: String,
    fiscal_year: String,
    services: Vec<ServiceDetail>,
}

fn describe(record: &Record) -> String {
    serde_json::to_string(record).unwrap_or_default()
}

/// Validates a client record against the service-line index.
fn prepare_client(
    record: &Record,
    services: &BTreeMap<String, Record>,
    default_fiscal_year: &str,
) -> Result<ClientDraft, ExceptionEntry> {
    let name = extract_text(record, CLIENT_NAME_FIELDS);
    let id = extract_text(record, CLIENT_ID_FIELDS);
    let fiscal_year = extract_text(record, FISCAL_YEAR_FIELDS)
        .or_else(|| Some(default_fiscal_year.to_string()).filter(|fy| !fy.is_empty()));
    let codes = extract_service_codes(record);

    let mut missing = Vec::new();
    if name.is_none() {
        missing.push("client_name");
    }
    if id.is_none() {
        missing.push("client_id");
    }
    if fiscal_year.is_none() {
        missing.push("fiscal_year");
    }
    if codes.is_empty() {
        missing.push("service_lines");
    }
    let (Some(name), Some(id), Some(fiscal_year)) = (name, id.clone(), fiscal_year) else {
        return Err(ExceptionEntry {
            client_id: id.unwrap_or_default(),
            reason: format!("Record missing required fields {missing:?}: {}", describe(record)),
        });
    };
    if codes.is_empty() {
        return Err(ExceptionEntry {
            client_id: id,
            reason: format!("Record missing required fields {missing:?}: {}", describe(record)),
        });
    }

    let mut details = Vec::with_capacity(codes.len());
    let mut invalid = Vec::new();
    for code in codes {
        let found = services
            .get(&code)
            .and_then(|info| Some((info, extract_text(info, RATE_FIELDS)?)));
        let Some((info, rate)) = found else {
            invalid.push(code);
            continue;
        };
        details.push(ServiceDetail {
            description: extract_text(info, DESCRIPTION_FIELDS).unwrap_or_default(),
            code,
            rate,
        });
    }
    if !invalid.is_empty() {
        return Err(ExceptionEntry {
            reason: format!(
                "Service line validation failed for client {name} ({id}): invalid or missing rate for {invalid:?}"
            ),
            client_id: id,
        });
    }

    Ok(ClientDraft {
        name,
        id,
        fiscal_year,
        services: details,
    })
}

impl ClientEngagementLetterDraft {
    /// Creates the step.
    #[must_use]
    pub fn new(ctx: StepContext, params: LetterDraftParams) -> Self {
        Self { ctx, params }
    }

    fn expand_optional(&self, template: Option<&String>) -> PipelineResult<Option<String>> {
        template
            .filter(|t| !t.is_empty())
            .map(|t| self.ctx.expand(t))
            .transpose()
    }
}

/// Base text for a client's letter and where it came from.
fn base_text(
    prior_folder: Option<&Path>,
    client: &ClientDraft,
    template: &str,
    messages: &mut Vec<String>,
) -> PipelineResult<(String, LetterSource)> {
    let Some(folder) = prior_folder else {
        return Ok((template.to_string(), LetterSource::Template));
    };
    match prior_letter_path(folder, &client.name, &client.fiscal_year) {
        Some(path) => {
            let bytes = std::fs::read(&path).map_err(|e| PipelineError::io(&path, e))?;
            let text = decode_text_lossy(&bytes);
            if text.is_empty() {
                Ok((template.to_string(), LetterSource::Template))
            } else {
                debug!(client = %client.name, path = %path.display(), "Rolling forward prior letter");
                Ok((text, LetterSource::RolledForward))
            }
        }
        None => {
            messages.push(format!(
                "Prior year letter not found for {} FY{} → defaulted to template.",
                client.name, client.fiscal_year
            ));
            Ok((template.to_string(), LetterSource::Template))
        }
    }
}

fn ensure_parent(path: &Path) -> PipelineResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
    }
    Ok(())
}

impl Step for ClientEngagementLetterDraft {
    fn name(&self) -> &'static str {
        NAME
    }

    fn plan_io(&self) -> PipelineResult<StepIO> {
        let p = &self.params;
        let required = [&p.client_metadata, &p.service_lines, &p.template_path];
        let missing: Vec<&str> = REQUIRED_PARAMS
            .iter()
            .zip(required)
            .filter(|(_, value)| value.is_none())
            .map(|(key, _)| *key)
            .collect();
        let [Some(metadata), Some(services), Some(template)] = required.map(Option::as_ref) else {
            return Err(PipelineError::invalid_params(
                NAME,
                format!("Missing required params for {NAME}: {missing:?}"),
            ));
        };

        let mut io = StepIO::new()
            .with_input("client_metadata", self.ctx.expand(metadata)?)
            .with_input("service_lines", self.ctx.expand(services)?)
            .with_input("template_path", self.ctx.expand(template)?);
        if let Some(prior) = self.expand_optional(p.prior_letters_folder.as_ref())? {
            io = io.with_input("prior_letters_folder", prior);
        }

        let letters_dir = self.ctx.expand(p.output_folder.as_deref().unwrap_or(DEFAULT_OUTPUT_FOLDER))?;
        let period = &self.ctx.period;
        let manifest = match self.expand_optional(p.manifest_path.as_ref())? {
            Some(path) => path,
            None => Path::new(&letters_dir)
                .join(format!("draft_manifest_{period}.json"))
                .to_string_lossy()
                .into_owned(),
        };
        let notification_log = match self.expand_optional(p.notification_log.as_ref())? {
            Some(path) => path,
            None => Path::new(&letters_dir)
                .join(format!("notifications_{period}.txt"))
                .to_string_lossy()
                .into_owned(),
        };

        Ok(io
            .with_output("letters_dir", letters_dir)
            .with_output("manifest", manifest)
            .with_output("notification_log", notification_log))
    }

    fn run(&self, io: &StepIO) -> PipelineResult<ValidationResult> {
        let metadata_path = Path::new(planned(NAME, &io.inputs, "client_metadata")?);
        let service_path = Path::new(planned(NAME, &io.inputs, "service_lines")?);
        let template_path = Path::new(planned(NAME, &io.inputs, "template_path")?);
        let prior_folder = io.input("prior_letters_folder").map(Path::new);
        let letters_dir = PathBuf::from(planned(NAME, &io.outputs, "letters_dir")?);
        let manifest_path = Path::new(planned(NAME, &io.outputs, "manifest")?);
        let notification_path = Path::new(planned(NAME, &io.outputs, "notification_log")?);

        let clients = match load_client_metadata(metadata_path, &self.ctx.tables) {
            Ok(rows) => rows,
            Err(e) if e.is_not_found() => {
                return Ok(ValidationResult::failure([format!(
                    "Client metadata file not found: {}",
                    metadata_path.display()
                )]));
            }
            Err(e) => {
                return Ok(ValidationResult::failure([format!(
                    "Failed to load client metadata: {e}"
                )]));
            }
        };
        let service_rows = match load_service_lines(service_path, &self.ctx.tables) {
            Ok(rows) => rows,
            Err(e) if e.is_not_found() => {
                return Ok(ValidationResult::failure([format!(
                    "Service line reference file not found: {}",
                    service_path.display()
                )]));
            }
            Err(e) => {
                return Ok(ValidationResult::failure([format!(
                    "Failed to load service line reference data: {e}"
                )]));
            }
        };

        let mut messages = Vec::new();
        let mut metrics = BTreeMap::new();
        metrics.insert("clients_processed".to_string(), Value::from(clients.len()));
        if clients.is_empty() {
            messages.push(
                "Client metadata file contained no records → escalate to Manager for delayed export."
                    .to_string(),
            );
        }

        let services = index_service_lines(service_rows);
        metrics.insert("service_lines_available".to_string(), Value::from(services.len()));

        let template = match std::fs::read(template_path) {
            Ok(bytes) => decode_text(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                messages.push(format!("Template file not found: {}", template_path.display()));
                return Ok(ValidationResult::failure(messages).with_metrics(metrics));
            }
            Err(e) => return Err(PipelineError::io(template_path, e)),
        };

        std::fs::create_dir_all(&letters_dir).map_err(|e| PipelineError::io(&letters_dir, e))?;

        let default_fiscal_year = self.ctx.period.year().to_string();
        let mut manifest = DraftManifest::default();
        let mut used_names = BTreeSet::new();
        let mut rolled_forward = 0usize;

        for record in &clients {
            let client = match prepare_client(record, &services, &default_fiscal_year) {
                Ok(client) => client,
                Err(exception) => {
                    warn!(client_id = %exception.client_id, "Client flagged for review");
                    messages.push(exception.reason.clone());
                    manifest.exceptions.push(exception);
                    continue;
                }
            };

            let (base, source) = base_text(prior_folder, &client, &template, &mut messages)?;
            if source == LetterSource::RolledForward {
                rolled_forward += 1;
            }

            let summary = service_summary(&client.services);
            let generated_on = Utc::now().format("%Y-%m-%d %H:%M UTC").to_string();
            let text = compose_letter(
                &base,
                &LetterFields {
                    client_name: &client.name,
                    client_id: &client.id,
                    fiscal_year: &client.fiscal_year,
                    service_summary: &summary,
                    generated_on: &generated_on,
                },
            );

            let file_name = unique_file_name(&mut used_names, &client.name, &client.id, &client.fiscal_year);
            let output_path = letters_dir.join(file_name);
            std::fs::write(&output_path, text).map_err(|e| PipelineError::io(&output_path, e))?;
            debug!(client = %client.name, path = %output_path.display(), "Drafted letter");

            manifest.letters.push(LetterEntry {
                client_id: client.id,
                client_name: client.name,
                fiscal_year: client.fiscal_year,
                service_lines: client.services.into_iter().map(|s| s.code).collect(),
                output_path: output_path.to_string_lossy().into_owned(),
                source,
                generated_on,
            });
        }

        manifest.timestamp = Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string();
        ensure_parent(manifest_path)?;
        let payload = serde_json::to_string_pretty(&manifest)?;
        std::fs::write(manifest_path, payload).map_err(|e| PipelineError::io(manifest_path, e))?;

        let recipients = recipients(self.params.notification_recipients.as_ref());
        ensure_parent(notification_path)?;
        std::fs::write(notification_path, notification_text(&recipients, &manifest))
            .map_err(|e| PipelineError::io(notification_path, e))?;

        let letters = manifest.letters.len();
        let exceptions = manifest.exceptions.len();
        info!(letters, exceptions, rolled_forward, "Drafted engagement letters");

        metrics.insert("letters_generated".to_string(), Value::from(letters));
        metrics.insert("exceptions".to_string(), Value::from(exceptions));
        metrics.insert("rolled_forward_letters".to_string(), Value::from(rolled_forward));
        metrics.insert(
            "notifications_prepared".to_string(),
            Value::from(recipients.len() * letters),
        );

        messages.push(format!("Generated {letters} engagement letter drafts."));
        if exceptions > 0 {
            messages.push(format!("Flagged {exceptions} records for Administrator review."));
        }

        let result = if exceptions == 0 && letters > 0 {
            ValidationResult::success(messages)
        } else {
            ValidationResult::failure(messages)
        };
        Ok(result.with_metrics(metrics))
    }
}
