//! Configuration file support for herzog CLI
//!
//! Loads settings from `_herzog.toml` configuration file.

use anyhow::{Context, Result};
use herzog_core::LineEnding;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "_herzog.toml";

/// Schema URL for the configuration file
pub const SCHEMA_URL: &str =
    "https://raw.githubusercontent.com/xbrianh/herzog/main/crates/herzog-cli/schema/herzog.schema.json";

/// Root configuration structure
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct Config {
    /// Script reading and writing configuration
    #[serde(skip_serializing_if = "ScriptConfig::is_empty")]
    pub script: ScriptConfig,
    /// Notebook output configuration
    #[serde(skip_serializing_if = "NotebookConfig::is_empty")]
    pub notebook: NotebookConfig,
}

/// Script reading and writing configuration
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct ScriptConfig {
    /// Module name cell blocks are opened with, as in `with herzog.Cell("python"):` (default: "herzog")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Indentation width of cell bodies in generated scripts (default: 4)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indent: Option<usize>,
    /// Emit `import <namespace>` at the top of generated scripts (default: true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import: Option<bool>,
}

impl ScriptConfig {
    fn is_empty(&self) -> bool {
        self.namespace.is_none() && self.indent.is_none() && self.import.is_none()
    }
}

/// Notebook output configuration
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct NotebookConfig {
    /// JSON file with notebook metadata replacing the bundled Python 3 boilerplate.
    /// Relative paths are resolved against the directory of the configuration file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<PathBuf>,
    /// Line terminator inside cell sources: "native", "lf" or "crlf" (default: "native")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_ending: Option<LineEndingSetting>,
}

impl NotebookConfig {
    fn is_empty(&self) -> bool {
        self.template.is_none() && self.line_ending.is_none()
    }
}

/// Line terminator setting shared by the config file and the command line
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, JsonSchema, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum LineEndingSetting {
    /// The host platform's terminator
    Native,
    Lf,
    Crlf,
}

impl From<LineEndingSetting> for LineEnding {
    fn from(setting: LineEndingSetting) -> Self {
        match setting {
            LineEndingSetting::Native => LineEnding::Native,
            LineEndingSetting::Lf => LineEnding::Lf,
            LineEndingSetting::Crlf => LineEnding::Crlf,
        }
    }
}

impl Config {
    /// Load configuration from a specific file path
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Try to load configuration from a directory (looks for `_herzog.toml`)
    ///
    /// Returns `Ok(None)` if the config file doesn't exist.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Generate JSON schema for the configuration
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }

    /// Generate JSON schema as a string
    pub fn json_schema_string() -> Result<String> {
        let schema = Self::json_schema();
        serde_json::to_string_pretty(&schema).context("Failed to serialize JSON schema")
    }

    /// Serialize configuration to TOML string with schema directive
    pub fn to_toml_with_schema(&self) -> Result<String> {
        let toml_content =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        Ok(format!("#:schema {}\n\n{}", SCHEMA_URL, toml_content))
    }

    /// Create a sample configuration with the defaults spelled out, for the init command
    pub fn sample() -> Self {
        Config {
            script: ScriptConfig {
                namespace: Some("herzog".to_string()),
                indent: Some(4),
                import: Some(true),
            },
            notebook: NotebookConfig {
                template: None, // bundled Python 3 boilerplate
                line_ending: Some(LineEndingSetting::Native),
            },
        }
    }
}
