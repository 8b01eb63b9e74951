// SPDX-FileCopyrightText: 2026 Bulwark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin manifest parsing from `plugin.json` files, and the General
//! settings file.

use std::collections::BTreeMap;
use std::path::Path;

use bulwark_core::types::name_settings;
use bulwark_core::{BulwarkError, PluginDescriptor, SettingDescriptor};
use serde::Deserialize;

/// File that marks a directory as a plugin.
pub const MANIFEST_FILE: &str = "plugin.json";

/// On-disk shape of `plugin.json`.
///
/// Unknown fields (job definitions, ordering hints, ...) are ignored.
#[derive(Debug, Deserialize)]
struct PluginManifestFile {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    version: String,
    #[serde(default)]
    settings: BTreeMap<String, SettingDescriptor>,
}

/// Parse a plugin manifest from JSON content.
///
/// `id` and `name` must be non-empty. `external`, `method`, and `has_page`
/// depend on where the plugin was found and are left for the caller.
pub fn parse_plugin_manifest(json: &str) -> Result<PluginDescriptor, BulwarkError> {
    let file: PluginManifestFile = serde_json::from_str(json)
        .map_err(|e| BulwarkError::plugin(format!("invalid plugin manifest: {e}"), e))?;

    if file.id.trim().is_empty() {
        return Err(BulwarkError::Plugin {
            message: "plugin manifest: id must not be empty".to_string(),
            source: None,
        });
    }
    if file.name.trim().is_empty() {
        return Err(BulwarkError::Plugin {
            message: format!("plugin manifest `{}`: name must not be empty", file.id),
            source: None,
        });
    }

    Ok(PluginDescriptor {
        id: file.id,
        name: file.name,
        description: file.description,
        version: file.version,
        external: false,
        method: String::new(),
        has_page: false,
        settings: name_settings(file.settings),
        bundle: None,
    })
}

/// Parse the General settings: a JSON object of setting name to descriptor.
pub fn parse_general_settings(
    json: &str,
) -> Result<BTreeMap<String, SettingDescriptor>, BulwarkError> {
    let settings: BTreeMap<String, SettingDescriptor> = serde_json::from_str(json)
        .map_err(|e| BulwarkError::Config(format!("invalid general settings: {e}")))?;
    Ok(name_settings(settings))
}

/// Read and parse the General settings file.
pub fn load_general_settings(
    path: &Path,
) -> Result<BTreeMap<String, SettingDescriptor>, BulwarkError> {
    let json = std::fs::read_to_string(path).map_err(|e| {
        BulwarkError::Config(format!(
            "failed to read general settings `{}`: {e}",
            path.display()
        ))
    })?;
    parse_general_settings(&json)
}
