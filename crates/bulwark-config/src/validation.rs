// SPDX-FileCopyrightText: 2026 Bulwark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::BulwarkConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Check semantic constraints serde cannot express.
///
/// Collects every problem instead of stopping at the first.
pub fn validate_config(config: &BulwarkConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut require = |value: &str, key: &str| {
        if value.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("{key} must not be empty"),
            });
        }
    };

    require(&config.paths.settings_file, "paths.settings_file");
    require(&config.paths.variables_file, "paths.variables_file");
    require(&config.generator.program, "generator.program");
    require(&config.generator.method, "generator.method");

    if config.paths.core_plugins_dir == config.paths.external_plugins_dir {
        errors.push(ConfigError::Validation {
            message: format!(
                "paths.core_plugins_dir and paths.external_plugins_dir must differ, both are `{}`",
                config.paths.core_plugins_dir
            ),
        });
    }

    if config.generator.method.contains(char::is_whitespace) {
        errors.push(ConfigError::Validation {
            message: format!(
                "generator.method `{}` must be a single word",
                config.generator.method
            ),
        });
    }

    if !LOG_LEVELS.contains(&config.logging.level.to_lowercase().as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "logging.level `{}` is not one of {}",
                config.logging.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_message(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&BulwarkConfig::default()).is_ok());
    }

    #[test]
    fn empty_program_fails() {
        let mut config = BulwarkConfig::default();
        config.generator.program = "  ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "generator.program"));
    }

    #[test]
    fn shared_plugin_dirs_fail() {
        let mut config = BulwarkConfig::default();
        config.paths.external_plugins_dir = config.paths.core_plugins_dir.clone();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "must differ"));
    }

    #[test]
    fn errors_are_collected() {
        let mut config = BulwarkConfig::default();
        config.generator.method = String::new();
        config.logging.level = "loud".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "generator.method"));
        assert!(has_message(&errors, "logging.level"));
    }
}
