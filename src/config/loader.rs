//! Settings file and context loading
//!
//! Settings are read as YAML (`.yml`, `.yaml`), JSON (`.json`) or TOML
//! (`.toml`) and converted into a JSON mapping. The SHA-256 digest of the
//! raw bytes is kept as provenance.

use gha_tree::Mapping;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// A parsed settings file with provenance
#[derive(Debug, Clone)]
pub struct SettingsFile {
    pub path: PathBuf,

    /// SHA-256 digest of raw file bytes
    pub digest: String,

    /// Parsed top-level mapping
    pub mapping: Mapping,
}

/// Settings file formats, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsFormat {
    Yaml,
    Json,
    Toml,
}

impl SettingsFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => SettingsFormat::Json,
            Some("toml") => SettingsFormat::Toml,
            _ => SettingsFormat::Yaml,
        }
    }
}

impl SettingsFile {
    /// Load and parse a settings file
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let digest = hex::encode(hasher.finalize());

        let contents = String::from_utf8(bytes).map_err(|e| {
            Error::MalformedConfig(format!("{}: invalid UTF-8: {}", path.display(), e))
        })?;

        let value = parse_settings(&contents, SettingsFormat::from_path(path))
            .map_err(|e| Error::MalformedConfig(format!("{}: {}", path.display(), e)))?;

        let mapping = match value {
            Value::Object(map) => map,
            // An empty YAML document
            Value::Null => Mapping::new(),
            other => {
                return Err(Error::MalformedConfig(format!(
                    "{}: top level must be a mapping, found {}",
                    path.display(),
                    kind(&other)
                )))
            }
        };

        tracing::debug!(path = %path.display(), %digest, keys = mapping.len(), "loaded settings");

        Ok(Self {
            path: path.to_path_buf(),
            digest,
            mapping,
        })
    }
}

/// Parse settings text into a JSON value
pub fn parse_settings(
    contents: &str,
    format: SettingsFormat,
) -> std::result::Result<Value, String> {
    match format {
        SettingsFormat::Yaml => {
            if contents.trim().is_empty() {
                return Ok(Value::Null);
            }
            let mut yaml: serde_yaml::Value =
                serde_yaml::from_str(contents).map_err(|e| format!("YAML parse error: {}", e))?;
            yaml.apply_merge().map_err(|e| format!("YAML merge key error: {}", e))?;
            serde_json::to_value(&yaml).map_err(|e| format!("YAML conversion error: {}", e))
        }
        SettingsFormat::Json => {
            serde_json::from_str(contents).map_err(|e| format!("JSON parse error: {}", e))
        }
        SettingsFormat::Toml => {
            let toml_value: toml::Value =
                toml::from_str(contents).map_err(|e| format!("TOML parse error: {}", e))?;
            Ok(toml_to_json(toml_value))
        }
    }
}

/// Parse a JSON context object (`github`, `inputs`) passed on the command line
pub fn parse_context(name: &str, text: &str) -> Result<Mapping> {
    let value: Value = serde_json::from_str(text.trim())
        .map_err(|e| Error::MalformedConfig(format!("{} context: {}", name, e)))?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(Error::MalformedConfig(format!(
            "{} context must be an object, found {}",
            name,
            kind(&other)
        ))),
    }
}

/// Convert TOML into JSON
fn toml_to_json(toml: toml::Value) -> Value {
    match toml {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(arr) => Value::Array(arr.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}
