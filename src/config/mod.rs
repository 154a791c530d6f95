//! Configuration loading, parsing, and validation
//!
//! This module handles:
//! - The `ConfigStore` lookup interface the media-key client reads from
//! - Loading a TOML-backed store with span preservation for error reporting
//! - Validating the recognized media-key options

mod error;
mod types;

pub use error::{ConfigError, ConfigIssue, ConfigValidationError};
pub use types::*;

use serde::Deserialize;
use serde::de::IntoDeserializer;
use std::collections::HashMap;
use std::path::Path;
use toml::de::DeTable;
use tracing::warn;

/// Read-only key/value configuration lookups
///
/// Implemented by [`Config`], and by host applications that keep their own
/// settings store.
pub trait ConfigStore {
    /// Boolean value of `key`, or `default` when absent or not a boolean
    fn get_bool(&self, key: &str, default: bool) -> bool;

    /// String value of `key`, or `default` when absent or not a string
    fn get_string(&self, key: &str, default: &str) -> String;

    /// Whether `key` is set at all
    fn exists(&self, key: &str) -> bool;
}

/// In-memory configuration store, usually loaded from a TOML file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    values: HashMap<String, ConfigValue>,
}

impl Config {
    /// Set a boolean option
    pub fn with_bool(mut self, key: impl Into<String>, value: bool) -> Self {
        self.values.insert(key.into(), ConfigValue::Bool(value));
        self
    }

    /// Set a string option
    pub fn with_string(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values
            .insert(key.into(), ConfigValue::String(value.into()));
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ConfigStore for Config {
    fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.values.get(key) {
            Some(ConfigValue::Bool(value)) => *value,
            _ => default,
        }
    }

    fn get_string(&self, key: &str, default: &str) -> String {
        match self.values.get(key) {
            Some(ConfigValue::String(value)) => value.clone(),
            _ => default.to_string(),
        }
    }

    fn exists(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}

/// Load and validate configuration from a file
///
/// Returns the parsed config, or a detailed error with source locations for
/// all validation issues found.
pub fn load(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let source_name = path.display().to_string();

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::io(&source_name, e))?;

    load_from_str(&source_name, content)
}

/// Load and validate configuration from a string
pub fn load_from_str(source_name: &str, content: String) -> Result<Config, ConfigError> {
    let mut loader = ConfigLoader::new(source_name.to_string(), content);
    loader.parse()
}

/// Internal config loader that tracks validation issues
struct ConfigLoader {
    source_name: String,
    source_content: String,
    issues: Vec<ConfigIssue>,
}

impl ConfigLoader {
    fn new(source_name: String, source_content: String) -> Self {
        Self {
            source_name,
            source_content,
            issues: Vec::new(),
        }
    }

    fn parse(&mut self) -> Result<Config, ConfigError> {
        // DeTable borrows from the source, which must outlive the mutable borrow of self
        let content_for_parse = self.source_content.clone();
        let table = DeTable::parse(&content_for_parse)
            .map_err(|e| ConfigError::parse(&self.source_name, self.source_content.clone(), e))?;

        let config = self.parse_table(table.into_inner());

        if self.issues.is_empty() {
            Ok(config)
        } else {
            Err(ConfigValidationError::new(
                self.source_name.clone(),
                self.source_content.clone(),
                std::mem::take(&mut self.issues),
            )
            .into())
        }
    }

    /// Parse the root TOML table into a Config
    fn parse_table(&mut self, table: DeTable) -> Config {
        let mut values = HashMap::new();

        for (key, value) in table {
            let key_str = key.get_ref().to_string();
            let span = value.span();

            let parsed = match OptionKind::of(&key_str) {
                Some(OptionKind::Bool) => match bool::deserialize(value.into_deserializer()) {
                    Ok(b) => Some(ConfigValue::Bool(b)),
                    Err(_) => {
                        self.issues
                            .push(ConfigIssue::wrong_type(span, &key_str, OptionKind::Bool));
                        None
                    }
                },
                Some(OptionKind::String) => match String::deserialize(value.into_deserializer()) {
                    Ok(s) => Some(ConfigValue::String(s)),
                    Err(_) => {
                        self.issues
                            .push(ConfigIssue::wrong_type(span, &key_str, OptionKind::String));
                        None
                    }
                },
                None => match ConfigValue::deserialize(value.into_deserializer()) {
                    Ok(v) => {
                        warn!(key = %key_str, "unrecognized config option");
                        Some(v)
                    }
                    Err(_) => {
                        warn!(
                            key = %key_str,
                            "unrecognized config option is not a boolean or string, skipping"
                        );
                        None
                    }
                },
            };

            if let Some(v) = parsed {
                values.insert(key_str, v);
            }
        }

        Config { values }
    }
}
