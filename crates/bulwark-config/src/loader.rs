// SPDX-FileCopyrightText: 2026 Bulwark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports the hierarchy `./bulwark.toml` > `~/.config/bulwark/bulwark.toml` >
//! `/etc/bulwark/bulwark.toml` with environment variable overrides via `BULWARK_`.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::BulwarkConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/bulwark/bulwark.toml";

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/bulwark/bulwark.toml`
/// 3. `~/.config/bulwark/bulwark.toml`
/// 4. `./bulwark.toml`
/// 5. `BULWARK_*` environment variables
pub fn load_config() -> Result<BulwarkConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no file lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<BulwarkConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BulwarkConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from one explicit file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<BulwarkConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BulwarkConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for the standard hierarchy, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(BulwarkConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file("bulwark.toml"))
        .merge(env_provider())
}

/// `~/.config/bulwark/bulwark.toml`, when a config dir exists.
pub fn user_config_path() -> Option<std::path::PathBuf> {
    dirs::config_dir().map(|d| d.join("bulwark/bulwark.toml"))
}

/// Environment provider with explicit section mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `BULWARK_PATHS_SETTINGS_FILE` must become
/// `paths.settings_file`, not `paths.settings.file`.
fn env_provider() -> Env {
    Env::prefixed("BULWARK_").map(|key| map_env_key(key.as_str()).into())
}

fn map_env_key(key: &str) -> String {
    key.replacen("paths_", "paths.", 1)
        .replacen("generator_", "generator.", 1)
        .replacen("logging_", "logging.", 1)
}
