//! Deserializable representation of a container app template catalog.
//!
//! The types mirror the template document fields the annotator reads or
//! rewrites. Anything else a template or volume carries (`image`, `env`,
//! `restart_policy`, `container`, ...) is captured in `extra` and written back
//! untouched. Both keep the key order they were read with.

use crate::schema_loader::CatalogSchema;
use anyhow::{Context, Result};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

#[cfg(unix)]
const NEW_FILE_MODE: u32 = 0o666;

/// Catalog version stamped on every annotated output.
pub const OUTPUT_CATALOG_VERSION: &str = "2";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// Catalog as written to disk: a version tag plus the ordered templates.
pub struct Catalog {
    pub version: String,
    pub templates: Vec<Template>,
}

impl Catalog {
    /// Build an output catalog with the fixed output version.
    pub fn new(templates: Vec<Template>) -> Self {
        Self {
            version: OUTPUT_CATALOG_VERSION.to_string(),
            templates,
        }
    }
}

#[derive(Deserialize)]
/// Input shape: only `templates` matters, other top-level keys are ignored.
struct SourceCatalog {
    #[serde(default)]
    templates: Vec<Template>,
}

/// Template keys lifted into typed fields; everything else stays in `extra`.
const TEMPLATE_KEYS: [&str; 9] = [
    "name",
    "title",
    "description",
    "network",
    "volumes",
    "ports",
    "categories",
    "logo",
    "labels",
];
const VOLUME_KEYS: [&str; 1] = ["bind"];

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
/// One container application descriptor.
///
/// Serializes keys in the order they were read; keys the annotator adds
/// (`network`, `categories`, `labels`) are appended after them.
pub struct Template {
    pub name: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub network: Option<String>,
    pub volumes: Option<Vec<Volume>>,
    pub ports: Option<Vec<String>>,
    pub categories: Option<Vec<String>>,
    pub logo: Option<String>,
    pub labels: Option<Vec<Label>>,
    pub extra: Map<String, Value>,
    pub(crate) key_order: Vec<String>,
}

#[derive(Deserialize)]
struct TemplateFields {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    network: Option<String>,
    #[serde(default)]
    volumes: Option<Vec<Volume>>,
    #[serde(default)]
    ports: Option<Vec<String>>,
    #[serde(default)]
    categories: Option<Vec<String>>,
    #[serde(default)]
    logo: Option<String>,
    #[serde(default)]
    labels: Option<Vec<Label>>,
}

impl TryFrom<Map<String, Value>> for Template {
    type Error = serde_json::Error;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        let (typed, extra, key_order) = split_known_keys(map, &TEMPLATE_KEYS);
        let fields: TemplateFields = serde_json::from_value(Value::Object(typed))?;
        Ok(Self {
            name: fields.name,
            title: fields.title,
            description: fields.description,
            network: fields.network,
            volumes: fields.volumes,
            ports: fields.ports,
            categories: fields.categories,
            logo: fields.logo,
            labels: fields.labels,
            extra,
            key_order,
        })
    }
}

impl Serialize for Template {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_in_key_order(
            serializer,
            &self.key_order,
            &TEMPLATE_KEYS,
            &self.extra,
            |key, map| match key {
                "name" => entry(map, key, &self.name),
                "title" => entry(map, key, &self.title),
                "description" => entry(map, key, &self.description),
                "network" => entry(map, key, &self.network),
                "volumes" => entry(map, key, &self.volumes),
                "ports" => entry(map, key, &self.ports),
                "categories" => entry(map, key, &self.categories),
                "logo" => entry(map, key, &self.logo),
                "labels" => entry(map, key, &self.labels),
                _ => Ok(()),
            },
        )
    }
}

impl Template {
    /// Non-empty port list, if the template publishes any ports.
    pub fn published_ports(&self) -> Option<&[String]> {
        self.ports.as_deref().filter(|ports| !ports.is_empty())
    }

    /// Look up a label value by name.
    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels
            .as_ref()?
            .iter()
            .find(|label| label.name == name)
            .map(|label| label.value.as_str())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
/// Volume mount; only the host-side `bind` path is rewritten.
pub struct Volume {
    pub bind: Option<String>,
    pub extra: Map<String, Value>,
    pub(crate) key_order: Vec<String>,
}

impl Volume {
    pub fn with_bind(bind: impl Into<String>) -> Self {
        Self {
            bind: Some(bind.into()),
            ..Self::default()
        }
    }
}

impl TryFrom<Map<String, Value>> for Volume {
    type Error = serde_json::Error;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        let (mut typed, extra, key_order) = split_known_keys(map, &VOLUME_KEYS);
        let bind = match typed.remove("bind") {
            Some(value) => serde_json::from_value(value)?,
            None => None,
        };
        Ok(Self {
            bind,
            extra,
            key_order,
        })
    }
}

impl Serialize for Volume {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_in_key_order(
            serializer,
            &self.key_order,
            &VOLUME_KEYS,
            &self.extra,
            |key, map| entry(map, key, &self.bind),
        )
    }
}

/// Split an object into (known keys, other keys, original key order).
fn split_known_keys(
    map: Map<String, Value>,
    known: &[&str],
) -> (Map<String, Value>, Map<String, Value>, Vec<String>) {
    let key_order: Vec<String> = map.keys().cloned().collect();
    let mut typed = Map::new();
    let mut extra = Map::new();
    for (key, value) in map {
        if known.contains(&key.as_str()) {
            typed.insert(key, value);
        } else {
            extra.insert(key, value);
        }
    }
    (typed, extra, key_order)
}

/// Write keys in `key_order` first, then known keys that were not read, then
/// extra keys that were not read.
fn serialize_in_key_order<S, F>(
    serializer: S,
    key_order: &[String],
    known: &[&str],
    extra: &Map<String, Value>,
    mut write_known: F,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    F: FnMut(&str, &mut S::SerializeMap) -> Result<(), S::Error>,
{
    let mut map = serializer.serialize_map(None)?;
    for key in key_order {
        if known.contains(&key.as_str()) {
            write_known(key.as_str(), &mut map)?;
        } else if let Some(value) = extra.get(key) {
            map.serialize_entry(key, value)?;
        }
    }
    for key in known {
        if !key_order.iter().any(|seen| seen == key) {
            write_known(*key, &mut map)?;
        }
    }
    for (key, value) in extra {
        if !key_order.contains(key) {
            map.serialize_entry(key, value)?;
        }
    }
    map.end()
}

fn entry<M, T>(map: &mut M, key: &str, value: &Option<T>) -> Result<(), M::Error>
where
    M: SerializeMap,
    T: Serialize,
{
    match value {
        Some(value) => map.serialize_entry(key, value),
        None => Ok(()),
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// Container label as stored in the template (`{name, value}`).
pub struct Label {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

impl Label {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Parse a catalog from an already-decoded JSON document.
pub fn catalog_from_value(value: Value) -> Result<Vec<Template>> {
    let source: SourceCatalog =
        serde_json::from_value(value).context("catalog does not match the template layout")?;
    Ok(source.templates)
}

/// Read a catalog document from disk without interpreting it.
pub fn read_catalog_value(path: &Path) -> Result<Value> {
    let file = File::open(path).with_context(|| format!("opening catalog {}", path.display()))?;
    serde_json::from_reader(std::io::BufReader::new(file))
        .with_context(|| format!("parsing catalog {}", path.display()))
}

/// Read the templates of a catalog file, checking the raw document against
/// `schema` first when one is given.
pub fn load_templates_from_path(
    path: &Path,
    schema: Option<&CatalogSchema>,
) -> Result<Vec<Template>> {
    let value = read_catalog_value(path)?;
    if let Some(schema) = schema {
        schema.validate(&value, &path.display().to_string())?;
    }
    catalog_from_value(value).with_context(|| format!("reading templates from {}", path.display()))
}

/// Render a catalog with four-space indentation.
pub fn render_catalog(catalog: &Catalog) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    catalog
        .serialize(&mut serializer)
        .context("serializing annotated catalog")?;
    Ok(buf)
}

/// Write a catalog next to its final location and rename it into place, so a
/// failed run never leaves a truncated output file behind.
///
/// A new file gets `0o666` less the umask; an existing file keeps its mode.
pub fn write_catalog(path: &Path, catalog: &Catalog) -> Result<()> {
    let rendered = render_catalog(catalog)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).with_context(|| format!("creating output dir {}", dir.display()))?;

    let tmp = staging_file(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file());
        writer
            .write_all(&rendered)
            .with_context(|| format!("writing catalog {}", path.display()))?;
        writer.flush()?;
    }
    if let Ok(existing) = fs::metadata(path) {
        fs::set_permissions(tmp.path(), existing.permissions())
            .with_context(|| format!("copying permissions of {}", path.display()))?;
    }
    tmp.persist(path)
        .with_context(|| format!("moving catalog into place at {}", path.display()))?;
    Ok(())
}

fn staging_file(dir: &Path) -> Result<NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(".templates-");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(NEW_FILE_MODE));
    }
    builder
        .tempfile_in(dir)
        .with_context(|| format!("allocating temp file in {}", dir.display()))
}
