use crate::annotate::{AnnotationReport, Annotator, PortPolicy};
use crate::catalog::{load_templates_from_path, write_catalog};
use crate::schema_loader::CatalogSchema;
use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};
use tracing::info;

// Run plumbing shared by the label-templates binary and the integration
// suite: path defaults, then load, validate, annotate and write in one
// place so the CLI stays a thin flag parser.

pub const INPUT_FILE_NAME: &str = "templates.json";
pub const OUTPUT_FILE_NAME: &str = "templates_with_labels.json";

#[derive(Clone, Debug)]
pub struct RunConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub schema: Option<PathBuf>,
    pub policy: PortPolicy,
}

impl RunConfig {
    /// Config reading `input` and writing the annotated catalog beside it.
    pub fn for_input(input: PathBuf) -> Self {
        let output = sibling_output_path(&input);
        Self {
            input,
            output,
            schema: None,
            policy: PortPolicy::default(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct RunSummary {
    pub input: PathBuf,
    pub output: PathBuf,
    pub report: AnnotationReport,
}

/// `templates_with_labels.json` in the same directory as `input`.
pub fn sibling_output_path(input: &Path) -> PathBuf {
    match input.parent() {
        Some(dir) => dir.join(OUTPUT_FILE_NAME),
        None => PathBuf::from(OUTPUT_FILE_NAME),
    }
}

/// Default input location: `templates.json` one directory above the
/// directory holding the running executable.
pub fn default_input_path() -> Result<PathBuf> {
    let exe = env::current_exe().context("resolving current executable")?;
    let exe = exe.canonicalize().unwrap_or(exe);
    let exe_dir = exe
        .parent()
        .with_context(|| format!("executable {} has no parent dir", exe.display()))?;
    Ok(exe_dir.join("..").join(INPUT_FILE_NAME))
}

/// Load, optionally validate, annotate, and write one catalog.
///
/// Nothing is written unless every earlier step succeeded.
pub fn run(config: &RunConfig) -> Result<RunSummary> {
    let schema = config
        .schema
        .as_deref()
        .map(CatalogSchema::load)
        .transpose()?;

    info!(input = %config.input.display(), "loading template catalog");
    let templates = load_templates_from_path(&config.input, schema.as_ref())?;
    if let Some(schema) = &schema {
        info!(schema = %schema.path().display(), "input catalog matches schema");
    }

    let annotated = Annotator::new(config.policy)
        .annotate(templates)
        .context("annotating templates")?;

    write_catalog(&config.output, &annotated.catalog)?;
    let report = annotated.report;
    info!(
        output = %config.output.display(),
        templates = report.total(),
        labeled = report.labeled,
        skipped = report.skipped.len(),
        "wrote annotated catalog"
    );

    Ok(RunSummary {
        input: config.input.clone(),
        output: config.output.clone(),
        report,
    })
}
