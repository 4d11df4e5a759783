//! Key/value settings the coverage import reads its configuration from.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{NetcovError, Result};

/// Read access to analysis settings.
pub trait Settings {
    fn has_key(&self, key: &str) -> bool;

    /// The raw value of `key`, if set.
    fn get_string(&self, key: &str) -> Option<String>;

    /// `true` only when `key` is set to `true` (case-insensitive).
    fn get_bool(&self, key: &str) -> bool {
        self.get_string(key)
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
    }
}

/// Settings held in memory, usually loaded from a TOML file with
/// command-line overrides applied on top.
///
/// Nested TOML tables flatten into dotted keys, so
///
/// ```toml
/// [sonar.cs.opencover]
/// reportsPaths = ["a.xml", "b/*.xml"]
/// useCache = true
/// ```
///
/// yields `sonar.cs.opencover.reportsPaths = "a.xml,b/*.xml"` and
/// `sonar.cs.opencover.useCache = "true"`.
#[derive(Debug, Clone, Default)]
pub struct PropertySettings {
    values: HashMap<String, String>,
}

impl PropertySettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml_str(input: &str) -> Result<Self> {
        let table: toml::Table = input
            .parse()
            .map_err(|e: toml::de::Error| NetcovError::Configuration(e.to_string()))?;
        let mut settings = Self::new();
        flatten_table("", &table, &mut settings.values)?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let input = std::fs::read_to_string(path).map_err(|e| {
            NetcovError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&input)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Apply a `key=value` override.
    pub fn apply_override(&mut self, spec: &str) -> Result<()> {
        let (key, value) = spec.split_once('=').ok_or_else(|| {
            NetcovError::Configuration(format!("expected key=value, got '{spec}'"))
        })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(NetcovError::Configuration(format!(
                "empty key in override '{spec}'"
            )));
        }
        self.set(key, value.trim());
        Ok(())
    }
}

impl Settings for PropertySettings {
    fn has_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    fn get_string(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

fn flatten_table(prefix: &str, table: &toml::Table, out: &mut HashMap<String, String>) -> Result<()> {
    for (name, value) in table {
        let key = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}.{name}")
        };
        match value {
            toml::Value::Table(inner) => flatten_table(&key, inner, out)?,
            toml::Value::Array(items) => {
                let parts = items
                    .iter()
                    .map(|item| {
                        scalar_to_string(item).ok_or_else(|| {
                            NetcovError::Configuration(format!(
                                "'{key}' must be an array of plain values"
                            ))
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                out.insert(key, parts.join(","));
            }
            scalar => {
                if let Some(s) = scalar_to_string(scalar) {
                    out.insert(key, s);
                }
            }
        }
    }
    Ok(())
}

fn scalar_to_string(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Integer(i) => Some(i.to_string()),
        toml::Value::Float(f) => Some(f.to_string()),
        toml::Value::Boolean(b) => Some(b.to_string()),
        toml::Value::Datetime(d) => Some(d.to_string()),
        toml::Value::Array(_) | toml::Value::Table(_) => None,
    }
}
