//! Support package assembly.
//!
//! Each source table is rendered to a plain-text `.pdf` next to it (one line
//! per row, values joined by `" | "`), and the renderings are concatenated
//! into the support package.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::contracts::{StepIO, ValidationResult};
use crate::io::Table;
use crate::pipeline::{PipelineError, PipelineResult, Step, StepContext, parse_params, planned};

/// Registered step name.
pub const NAME: &str = "PDFAssembler";

/// Support package name when `naming.support_pdf` is not configured.
pub const DEFAULT_SUPPORT_PDF: &str = "Support_{period}.pdf";

/// Rows rendered per source.
pub const MAX_RENDERED_ROWS: usize = 1000;

const CELL_SEPARATOR: &str = " | ";

/// PDFAssembler parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct PdfAssemblerParams {
    /// Source table templates, in package order.
    pub include: Vec<String>,
}

/// Assembles source tables into one support document.
#[derive(Debug, Clone)]
pub struct PdfAssembler {
    ctx: StepContext,
    params: PdfAssemblerParams,
}

/// Builds the step from raw parameters.
///
/// # Errors
///
/// Returns `InvalidParams` when `include` is missing or malformed.
pub fn build(ctx: StepContext, params: &Value) -> PipelineResult<Box<dyn Step>> {
    Ok(Box::new(PdfAssembler::new(ctx, parse_params(NAME, params)?)))
}

/// Renders up to [`MAX_RENDERED_ROWS`] rows as text lines.
#[must_use]
pub fn render_table(table: &Table) -> String {
    let mut text = String::new();
    for row in table.rows().iter().take(MAX_RENDERED_ROWS) {
        text.push_str(&row.join(CELL_SEPARATOR));
        text.push('\n');
    }
    text
}

impl PdfAssembler {
    /// Creates the step.
    #[must_use]
    pub fn new(ctx: StepContext, params: PdfAssemblerParams) -> Self {
        Self { ctx, params }
    }

    /// Expanded source paths with their rendering paths.
    fn sources(&self) -> PipelineResult<Vec<(String, PathBuf)>> {
        self.params
            .include
            .iter()
            .map(|template| -> PipelineResult<(String, PathBuf)> {
                let source = self.ctx.expand(template)?;
                let rendered = Path::new(&source).with_extension("pdf");
                Ok((source, rendered))
            })
            .collect()
    }
}

impl Step for PdfAssembler {
    fn name(&self) -> &'static str {
        NAME
    }

    fn plan_io(&self) -> PipelineResult<StepIO> {
        let support = self.ctx.folder(NAME, "support")?;
        let package = self.ctx.file_name("support_pdf", DEFAULT_SUPPORT_PDF)?;

        let mut io = StepIO::new().with_output("support", format!("{support}/{package}"));
        for (index, (source, rendered)) in self.sources()?.into_iter().enumerate() {
            io = io
                .with_input(format!("source_{index:04}"), source)
                .with_output(
                    format!("rendered_{index:04}"),
                    rendered.to_string_lossy(),
                );
        }
        Ok(io)
    }

    fn run(&self, io: &StepIO) -> PipelineResult<ValidationResult> {
        let support = Path::new(planned(NAME, &io.outputs, "support")?);

        let mut package = String::new();
        let mut rendered_count = 0usize;
        for (source, rendered) in self.sources()? {
            let table = self.ctx.tables.read(&source)?;
            let text = render_table(&table);
            std::fs::write(&rendered, &text).map_err(|e| PipelineError::io(&rendered, e))?;
            debug!(source = %source, rows = table.len(), "Rendered source");

            package.push_str(&text);
            package.push('\n');
            rendered_count += 1;
        }

        if let Some(parent) = support.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
        }
        std::fs::write(support, package).map_err(|e| PipelineError::io(support, e))?;
        info!(path = %support.display(), sources = rendered_count, "Assembled support package");

        Ok(ValidationResult::success([format!(
            "Merged {rendered_count} PDFs → {}",
            support.display()
        )])
        .with_metric("source_pdfs", rendered_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::TableStore;
    use closeflow_shared::PipelineConfig;
    use serde_json::json;

    fn assembler(root: &Path, include: &[&str]) -> Box<dyn Step> {
        let config = PipelineConfig::new("202501")
            .with_folder("tb", root.join("tb").to_string_lossy())
            .with_folder("support", root.join("support").to_string_lossy());
        let ctx = StepContext::new(&config, config.reporting_period().unwrap(), TableStore::delimited());
        build(ctx, &json!({ "include": include })).unwrap()
    }

    #[test]
    fn test_render_table_caps_rows() {
        let mut table = Table::new(["A", "B"]);
        for i in 0..(MAX_RENDERED_ROWS + 5) {
            table.push_row(vec![i.to_string(), "x".to_string()]);
        }
        let text = render_table(&table);
        assert_eq!(text.lines().count(), MAX_RENDERED_ROWS);
        assert!(text.starts_with("0 | x\n1 | x\n"));
    }

    #[test]
    fn test_include_is_required() {
        let config = PipelineConfig::new("202501");
        let ctx = StepContext::new(&config, config.reporting_period().unwrap(), TableStore::delimited());
        assert!(matches!(
            build(ctx, &Value::Null).err().unwrap(),
            PipelineError::InvalidParams { .. }
        ));
    }

    #[test]
    fn test_merges_sources_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = TableStore::delimited();
        store
            .write(
                &Table::from_str_rows(&["EntityCode", "Debit"], &[&["US", "100"]]),
                dir.path().join("tb/Master_TB_202501.xlsx"),
            )
            .unwrap();
        store
            .write(
                &Table::from_str_rows(&["Note"], &[&["first"], &["second"]]),
                dir.path().join("tb/Notes_202501.xlsx"),
            )
            .unwrap();

        let step = assembler(
            dir.path(),
            &["{tb}/Master_TB_{period}.xlsx", "{tb}/Notes_{period}.xlsx"],
        );
        let io = step.plan_io().unwrap();
        let result = step.run(&io).unwrap();

        assert!(result.ok);
        assert_eq!(result.metrics["source_pdfs"], 2);
        assert!(dir.path().join("tb/Master_TB_202501.pdf").is_file());

        let package = std::fs::read_to_string(io.output("support").unwrap()).unwrap();
        assert_eq!(package, "US | 100\n\nfirst\nsecond\n\n");
        assert!(result.messages[0].starts_with("Merged 2 PDFs → "));
    }

    #[test]
    fn test_missing_source_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let step = assembler(dir.path(), &["{tb}/Missing_{period}.xlsx"]);
        let err = step.run(&step.plan_io().unwrap()).unwrap_err();
        assert!(matches!(err, PipelineError::Table(ref e) if e.is_not_found()));
    }
}
