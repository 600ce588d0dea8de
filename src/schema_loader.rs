//! Optional JSON Schema check for input catalogs.
//!
//! The schema is compiled once and applied to the raw input document before
//! it is deserialized, so violations are reported against the file as
//! written rather than against the typed templates.

use anyhow::{Context, Result, anyhow, bail};
use jsonschema::JSONSchema;
use serde_json::Value;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Compiled schema plus the path it came from, for error messages.
pub struct CatalogSchema {
    path: PathBuf,
    compiled: JSONSchema,
}

impl CatalogSchema {
    /// Read and compile a schema file.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("opening schema {}", path.display()))?;
        let raw: Value = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parsing schema {}", path.display()))?;
        Self::from_value(path, &raw)
    }

    /// Compile an in-memory schema; `origin` only labels errors.
    pub fn from_value(origin: &Path, raw: &Value) -> Result<Self> {
        let compiled = JSONSchema::compile(raw)
            .map_err(|err| anyhow!("compiling schema {}: {err}", origin.display()))?;
        Ok(Self {
            path: origin.to_path_buf(),
            compiled,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every violation in `document`, formatted as `<pointer>: <message>`.
    pub fn violations(&self, document: &Value) -> Vec<String> {
        match self.compiled.validate(document) {
            Ok(()) => Vec::new(),
            Err(errors) => errors
                .map(|err| {
                    let pointer = err.instance_path.to_string();
                    if pointer.is_empty() {
                        err.to_string()
                    } else {
                        format!("{pointer}: {err}")
                    }
                })
                .collect(),
        }
    }

    /// Fail with all violations listed when `document` does not conform.
    pub fn validate(&self, document: &Value, label: &str) -> Result<()> {
        let violations = self.violations(document);
        if violations.is_empty() {
            return Ok(());
        }
        bail!(
            "{label} failed validation against {}:\n{}",
            self.path.display(),
            violations.join("\n")
        );
    }
}
