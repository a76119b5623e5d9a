use crate::cli::OutputFormat;
use crate::filter::fold_aliases;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MailfilterConfig {
    pub output: OutputRules,
    pub archive: ArchiveRules,
    pub fields: FieldRules,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputRules {
    /// Used when `--format` is not given on the command line
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveRules {
    /// Remove one level of `>From ` quoting before reading message fields.
    /// Extracted messages are always written verbatim.
    pub unescape_from: bool,
}

impl Default for ArchiveRules {
    fn default() -> Self {
        Self {
            unescape_from: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldRules {
    /// Alternative names accepted in filters, e.g. `sender = "from"`
    pub aliases: BTreeMap<String, String>,
}

impl FieldRules {
    /// Resolve a single field name the way filters resolve it
    pub fn resolve(&self, field: &str) -> String {
        let field = field.to_lowercase();
        fold_aliases(&self.aliases).remove(&field).unwrap_or(field)
    }
}

pub fn load_config(path: Option<&Path>) -> Result<MailfilterConfig, ConfigError> {
    if let Some(path) = path {
        load_config_from_path(path)
    } else {
        Ok(default_config().clone())
    }
}

pub fn load_config_from_path(path: &Path) -> Result<MailfilterConfig, ConfigError> {
    let path_display = path.display().to_string();
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path_display.clone(),
        source,
    })?;

    toml::from_str::<MailfilterConfig>(&raw).map_err(|source| ConfigError::Parse {
        path: path_display,
        source,
    })
}

pub fn default_config() -> &'static MailfilterConfig {
    static DEFAULT_CONFIG: LazyLock<MailfilterConfig> = LazyLock::new(MailfilterConfig::default);
    &DEFAULT_CONFIG
}
