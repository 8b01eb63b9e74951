// SPDX-FileCopyrightText: 2026 Bulwark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Bulwark tool.
//!
//! TOML configuration with strict key checking, a file hierarchy, `BULWARK_`
//! environment overrides, and miette diagnostics with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use bulwark_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("generator: {}", config.generator.program);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::BulwarkConfig;

/// Load configuration from the standard hierarchy and validate it.
pub fn load_and_validate() -> Result<BulwarkConfig, Vec<ConfigError>> {
    finish(loader::load_config(), collect_toml_sources)
}

/// Load configuration from one explicit file and validate it.
pub fn load_and_validate_path(path: &Path) -> Result<BulwarkConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_path(path), || {
        std::fs::read_to_string(path)
            .map(|content| vec![(path.display().to_string(), content)])
            .unwrap_or_default()
    })
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<BulwarkConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_str(toml_content), || {
        vec![("<inline>".to_string(), toml_content.to_string())]
    })
}

fn finish(
    loaded: Result<BulwarkConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<(String, String)>,
) -> Result<BulwarkConfig, Vec<ConfigError>> {
    match loaded {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err, &sources())),
    }
}

/// Read the hierarchy's TOML files so errors can point into them.
fn collect_toml_sources() -> Vec<(String, String)> {
    let local = std::env::current_dir()
        .map(|d| d.join("bulwark.toml"))
        .unwrap_or_else(|_| "bulwark.toml".into());

    [Some(local), loader::user_config_path(), Some(loader::SYSTEM_CONFIG_PATH.into())]
        .into_iter()
        .flatten()
        .filter_map(|path| {
            std::fs::read_to_string(&path)
                .ok()
                .map(|content| (path.display().to_string(), content))
        })
        .collect()
}
