use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use jsonschema::JSONSchema;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::json_schema::manifest_json_schema;
use crate::schema::Manifest;

/// Serialization formats understood by the manifest loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Toml,
    Json,
}

impl ManifestFormat {
    /// Pick a format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("json") => Ok(Self::Json),
            Some(other) => Err(Error::UnsupportedFormat(other.to_string())),
            None => Err(Error::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Parse a manifest document.
///
/// Omitted top-level collections become empty lists. A document whose top
/// level is not an object, or which violates the manifest JSON Schema, is
/// rejected with a single [`Error::Structure`] listing every violation.
pub fn parse_manifest(text: &str, format: ManifestFormat) -> Result<Manifest> {
    let value = match format {
        ManifestFormat::Json => serde_json::from_str::<Value>(text)?,
        ManifestFormat::Toml => {
            let table: toml::Table = toml::from_str(text)?;
            serde_json::to_value(table)?
        }
    };

    check_structure(&value)?;

    Ok(serde_json::from_value(value)?)
}

/// Canonical textual serialization of a manifest.
pub fn serialize_manifest(manifest: &Manifest, format: ManifestFormat) -> Result<String> {
    match format {
        ManifestFormat::Json => {
            let mut text = serde_json::to_string_pretty(manifest)?;
            text.push('\n');
            Ok(text)
        }
        ManifestFormat::Toml => Ok(toml::to_string_pretty(manifest)?),
    }
}

/// Read and parse a manifest file; the format follows the extension.
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let format = ManifestFormat::from_path(path)?;
    let text = fs::read_to_string(path)?;
    let manifest = parse_manifest(&text, format)?;

    tracing::debug!(
        event = "manifest_loaded",
        path = %path.display(),
        entities = manifest.entities.len(),
        relationships = manifest.relationships.len(),
        propagations = manifest.propagations.len(),
        tables = manifest.tables.len(),
    );

    Ok(manifest)
}

/// Serialize a manifest to `path` in `format`.
///
/// Parent directories are created as needed and the file is replaced through
/// a sibling temp file and a rename, so readers never see a partial write.
pub fn write_manifest(path: &Path, manifest: &Manifest, format: ManifestFormat) -> Result<()> {
    let text = serialize_manifest(manifest, format)?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent)?;
    }

    let tmp_path = temp_path(path)?;
    let mut file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&tmp_path)?;
    file.write_all(text.as_bytes())?;
    file.sync_all()?;
    fs::rename(&tmp_path, path)?;

    tracing::debug!(event = "manifest_written", path = %path.display());
    Ok(())
}

fn temp_path(path: &Path) -> Result<PathBuf> {
    let file_name = path.file_name().ok_or_else(|| {
        Error::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("no file name in {}", path.display()),
        ))
    })?;
    Ok(path.with_file_name(format!("{}.tmp", file_name.to_string_lossy())))
}

fn check_structure(value: &Value) -> Result<()> {
    if !value.is_object() {
        return Err(Error::Structure(format!(
            "top level must be an object, found {}",
            value_kind(value)
        )));
    }

    let schema = serde_json::to_value(manifest_json_schema())?;
    let compiled =
        JSONSchema::compile(&schema).map_err(|err| Error::Structure(err.to_string()))?;

    if let Err(errors) = compiled.validate(value) {
        let violations: Vec<String> = errors
            .map(|error| {
                let path = normalized_json_pointer(&error.instance_path.to_string());
                format!("{path}: {error}")
            })
            .collect();
        return Err(Error::Structure(violations.join("; ")));
    }

    Ok(())
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn normalized_json_pointer(pointer: &str) -> String {
    if pointer.is_empty() {
        "/".to_string()
    } else {
        pointer.to_string()
    }
}
