use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::io::data_dir::config_path;
use crate::io::recovery::atomic_write;
use crate::model::config::Config;

/// Error type for config.toml access
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("could not parse config.toml: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("could not parse config.toml: {0}")]
    Document(#[from] toml_edit::TomlError),
    #[error("could not write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("invalid config key: {0}")]
    InvalidKey(String),
}

/// Read config.toml, or defaults when there is none.
pub fn read_config(data_dir: &Path) -> Result<Config, ConfigError> {
    let text = read_text(data_dir)?;
    Ok(toml::from_str(&text)?)
}

/// Read the raw document for round-trip-safe editing.
pub fn read_document(data_dir: &Path) -> Result<toml_edit::DocumentMut, ConfigError> {
    Ok(read_text(data_dir)?.parse()?)
}

fn read_text(data_dir: &Path) -> Result<String, ConfigError> {
    let path = config_path(data_dir);
    match fs::read_to_string(&path) {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(ConfigError::Read { path, source: e }),
    }
}

/// Write the document back to disk, preserving formatting.
pub fn write_document(data_dir: &Path, doc: &toml_edit::DocumentMut) -> Result<(), ConfigError> {
    let path = config_path(data_dir);
    fs::create_dir_all(data_dir)
        .and_then(|_| atomic_write(&path, doc.to_string().as_bytes()))
        .map_err(|e| ConfigError::Write { path, source: e })
}

/// Look up a dotted key (`timeline.day_width`) in the effective config,
/// defaults included.
pub fn get_value(config: &Config, key: &str) -> Result<String, ConfigError> {
    let value = toml::Value::try_from(config)
        .map_err(|_| ConfigError::InvalidKey(key.to_string()))?;
    let mut cur = &value;
    for part in key.split('.') {
        cur = cur
            .get(part)
            .ok_or_else(|| ConfigError::InvalidKey(key.to_string()))?;
    }
    Ok(match cur {
        toml::Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

/// Set a dotted key in the document. Integers and booleans are written as
/// such, anything else as a string. The result must still parse as a
/// `Config`, otherwise the document is left unchanged.
pub fn set_value(
    doc: &mut toml_edit::DocumentMut,
    key: &str,
    raw: &str,
) -> Result<(), ConfigError> {
    let parts: Vec<&str> = key.split('.').collect();
    let Some((last, tables)) = parts.split_last() else {
        return Err(ConfigError::InvalidKey(key.to_string()));
    };
    if parts.iter().any(|p| p.is_empty()) {
        return Err(ConfigError::InvalidKey(key.to_string()));
    }

    let mut candidate = doc.clone();
    let mut table = candidate.as_table_mut();
    for name in tables {
        if !table.contains_key(name) {
            table.insert(name, toml_edit::Item::Table(toml_edit::Table::new()));
        }
        table = table[*name]
            .as_table_mut()
            .ok_or_else(|| ConfigError::InvalidKey(key.to_string()))?;
    }
    table[*last] = toml_edit::value(typed_value(raw));

    toml::from_str::<Config>(&candidate.to_string())?;
    *doc = candidate;
    Ok(())
}

fn typed_value(raw: &str) -> toml_edit::Value {
    if let Ok(n) = raw.parse::<i64>() {
        n.into()
    } else if let Ok(b) = raw.parse::<bool>() {
        b.into()
    } else {
        raw.into()
    }
}
