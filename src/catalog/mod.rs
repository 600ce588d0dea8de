//! Template catalog wiring.
//!
//! This module wraps the JSON template catalog (`templates.json`) so the
//! annotator works on typed templates while unknown fields pass through
//! untouched. `labels` holds the name-unique merge rules used when
//! synthesized labels meet hand-written ones.

pub mod labels;
pub mod model;

pub use labels::{merge_labels, upsert_label};
pub use model::{
    Catalog, Label, OUTPUT_CATALOG_VERSION, Template, Volume, catalog_from_value,
    load_templates_from_path, read_catalog_value, render_catalog, write_catalog,
};
