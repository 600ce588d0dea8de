//! Shared library for the template labeler.
//!
//! The crate exposes the template catalog types and the annotation pass used
//! by the `label-templates` binary. Public functions here form the contract
//! the binary depends on: catalog loading and writing, per-template
//! normalization, Traefik/Mafl label synthesis, and the optional schema check
//! applied to input catalogs.

pub mod annotate;
pub mod catalog;
pub mod error;
pub mod logging;
pub mod markdown;
pub mod run_support;
pub mod schema_loader;

pub use annotate::{
    Annotated, AnnotationReport, Annotator, Outcome, PortPolicy, SkippedTemplate, annotate,
    annotate_template, normalize,
};
pub use catalog::{
    Catalog, Label, Template, Volume, load_templates_from_path, merge_labels, upsert_label,
    write_catalog,
};
pub use error::{AnnotateError, LabelError};
pub use markdown::{first_sentence, strip_markdown};
pub use run_support::{RunConfig, RunSummary, default_input_path, run};
pub use schema_loader::CatalogSchema;
