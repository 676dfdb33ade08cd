//! Form configuration loaded from `filters.yaml`.
//!
//! Supplies the choice options for the select widgets and, optionally, the
//! record the committed filters start from. Every key may be omitted.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::types::criteria::FilterCriteria;

pub const CONFIG_FILE_NAME: &str = "filters.yaml";

/// One selectable option: the stored value and the label shown for it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChoiceOption {
    pub value: String,
    pub label: String,
}

impl ChoiceOption {
    pub fn new(value: &str, label: &str) -> Self {
        ChoiceOption {
            value: value.to_string(),
            label: label.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FormConfig {
    #[serde(default = "default_income_types")]
    pub income_types: Vec<ChoiceOption>,
    #[serde(default)]
    pub donation_items: Vec<ChoiceOption>,
    #[serde(default)]
    pub locations: Vec<ChoiceOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<FilterCriteria>,
}

fn default_income_types() -> Vec<ChoiceOption> {
    vec![
        ChoiceOption::new("1", "Regular Donation"),
        ChoiceOption::new("2", "Single Donation"),
    ]
}

impl Default for FormConfig {
    fn default() -> Self {
        FormConfig {
            income_types: default_income_types(),
            donation_items: Vec::new(),
            locations: Vec::new(),
            defaults: None,
        }
    }
}

impl FormConfig {
    pub fn from_yaml(path: &Path, text: &str) -> Result<Self, ConfigError> {
        // an empty file deserializes to unit, not to an empty map
        if text.trim().is_empty() {
            return Ok(FormConfig::default());
        }
        serde_yaml::from_str(text).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load a config file that must exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = FormConfig::from_yaml(path, &text)?;
        debug!(path = %path.display(), "loaded form config");
        Ok(config)
    }

    /// Load `path`, falling back to the defaults when it does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "no form config, using defaults");
            return Ok(FormConfig::default());
        }
        FormConfig::load(path)
    }

    /// The record the committed filters start from.
    pub fn initial_filters(&self) -> FilterCriteria {
        self.defaults.clone().unwrap_or_default()
    }
}

/// Config directory: `FDRAFT_CONFIG_DIR`, else `$HOME/.config/filter-draft`.
pub fn resolve_config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("FDRAFT_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
    PathBuf::from(home).join(".config").join("filter-draft")
}
