#![allow(dead_code)]

use anyhow::{Context, Result, bail};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

pub fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

pub fn catalog_schema_path() -> PathBuf {
    repo_root().join("schema").join("templates.schema.json")
}

pub fn label_templates_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_label-templates"))
}

pub fn write_json(path: &Path, value: &Value) -> Result<()> {
    let rendered = serde_json::to_vec_pretty(value)?;
    fs::write(path, rendered).with_context(|| format!("writing fixture {}", path.display()))
}

pub fn read_json(path: &Path) -> Result<Value> {
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&data).with_context(|| format!("parsing {}", path.display()))
}

pub fn run_command(mut cmd: Command) -> Result<Output> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to run command: {:?}", cmd))?;
    if output.status.success() {
        Ok(output)
    } else {
        bail!(
            "command {:?} failed: status {:?}\nstdout: {}\nstderr: {}",
            cmd,
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    }
}

/// Run a command that is expected to fail and return its output.
pub fn run_command_expect_failure(mut cmd: Command) -> Result<Output> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to run command: {:?}", cmd))?;
    if output.status.success() {
        bail!(
            "command {:?} unexpectedly succeeded\nstderr: {}",
            cmd,
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(output)
}

/// Labels of a rendered template as `(name, value)` pairs, in order.
pub fn label_pairs(template: &Value) -> Vec<(String, String)> {
    template
        .get("labels")
        .and_then(Value::as_array)
        .map(|labels| {
            labels
                .iter()
                .map(|label| {
                    (
                        label["name"].as_str().unwrap_or_default().to_string(),
                        label["value"].as_str().unwrap_or_default().to_string(),
                    )
                })
                .collect()
        })
        .unwrap_or_default()
}

pub fn label_value<'a>(template: &'a Value, name: &str) -> Option<&'a str> {
    template
        .get("labels")?
        .as_array()?
        .iter()
        .find(|label| label["name"] == name)
        .and_then(|label| label["value"].as_str())
}

/// The test process umask, read from procfs where available. Spawned
/// binaries inherit it.
#[cfg(unix)]
pub fn process_umask() -> Option<u32> {
    let status = fs::read_to_string("/proc/self/status").ok()?;
    let line = status.lines().find(|line| line.starts_with("Umask:"))?;
    u32::from_str_radix(line.trim_start_matches("Umask:").trim(), 8).ok()
}
