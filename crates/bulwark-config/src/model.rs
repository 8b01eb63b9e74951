// SPDX-FileCopyrightText: 2026 Bulwark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Bulwark tool.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key is
//! reported at startup instead of being silently ignored.

use serde::{Deserialize, Serialize};

/// Top-level Bulwark configuration.
///
/// Every section is optional and defaults to the standard install layout.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BulwarkConfig {
    /// Filesystem locations of settings, plugins, and the stored environment.
    #[serde(default)]
    pub paths: PathsConfig,

    /// External generator invocation.
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Filesystem locations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    /// JSON file holding the built-in General settings.
    #[serde(default = "default_settings_file")]
    pub settings_file: String,

    /// Directory of plugins shipped with the product.
    #[serde(default = "default_core_plugins_dir")]
    pub core_plugins_dir: String,

    /// Directory of plugins installed at runtime.
    #[serde(default = "default_external_plugins_dir")]
    pub external_plugins_dir: String,

    /// Merged environment kept by the file-backed store.
    #[serde(default = "default_variables_file")]
    pub variables_file: String,

    /// Where temporary environment files are written. `None` uses the system temp dir.
    #[serde(default)]
    pub temp_dir: Option<String>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            settings_file: default_settings_file(),
            core_plugins_dir: default_core_plugins_dir(),
            external_plugins_dir: default_external_plugins_dir(),
            variables_file: default_variables_file(),
            temp_dir: None,
        }
    }
}

fn default_settings_file() -> String {
    "/usr/share/bulwark/settings.json".to_string()
}

fn default_core_plugins_dir() -> String {
    "/usr/share/bulwark/core".to_string()
}

fn default_external_plugins_dir() -> String {
    "/etc/bulwark/plugins".to_string()
}

fn default_variables_file() -> String {
    "/etc/bulwark/variables.env".to_string()
}

/// External generator command.
///
/// Invoked as `{program} {args..} --variables <file> --method <method>`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    #[serde(default = "default_program")]
    pub program: String,

    #[serde(default = "default_args")]
    pub args: Vec<String>,

    /// Tag identifying who asked for the generation.
    #[serde(default = "default_method")]
    pub method: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
            method: default_method(),
        }
    }
}

fn default_program() -> String {
    "python3".to_string()
}

fn default_args() -> Vec<String> {
    vec!["/usr/share/bulwark/gen/save_config.py".to_string()]
}

fn default_method() -> String {
    "ui".to_string()
}

/// Log output configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
