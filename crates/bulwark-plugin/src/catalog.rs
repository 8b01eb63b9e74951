// SPDX-FileCopyrightText: 2026 Bulwark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin catalog.
//!
//! Discovers plugin descriptors, either by scanning the built-in and
//! external plugin directories or from records handed over by the config
//! store, and exposes the merged settings schema. A synthetic "General"
//! plugin carrying the built-in settings always comes first.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use bulwark_core::{BulwarkError, PluginDescriptor, SettingDescriptor, SettingsSchema};
use tracing::{debug, warn};

use crate::bundle::package_plugin;
use crate::manifest::{MANIFEST_FILE, load_general_settings, parse_plugin_manifest};

/// Id of the synthetic plugin holding the built-in settings.
pub const GENERAL_PLUGIN_ID: &str = "general";

/// Where plugins come from.
#[derive(Debug, Clone)]
enum PluginSource {
    Directories {
        core: Option<PathBuf>,
        external: PathBuf,
    },
    Records(Vec<PluginDescriptor>),
}

/// Catalog of every known plugin and its settings.
#[derive(Debug, Clone)]
pub struct PluginCatalog {
    general: BTreeMap<String, SettingDescriptor>,
    source: PluginSource,
}

impl PluginCatalog {
    /// Catalog that scans `core_dir` (built-in plugins, optional) and
    /// `external_dir` (runtime-installed plugins).
    pub fn new(
        general: BTreeMap<String, SettingDescriptor>,
        core_dir: Option<PathBuf>,
        external_dir: PathBuf,
    ) -> Self {
        Self {
            general,
            source: PluginSource::Directories {
                core: core_dir,
                external: external_dir,
            },
        }
    }

    /// Catalog reading the General settings from `settings_file`.
    pub fn from_paths(
        settings_file: &Path,
        core_dir: Option<PathBuf>,
        external_dir: PathBuf,
    ) -> Result<Self, BulwarkError> {
        let general = load_general_settings(settings_file)?;
        debug!(
            settings_file = %settings_file.display(),
            settings = general.len(),
            "general settings loaded"
        );
        Ok(Self::new(general, core_dir, external_dir))
    }

    /// Catalog over plugin records supplied by the config store.
    ///
    /// A record named "General" is dropped; the catalog's own General
    /// plugin takes its place.
    pub fn from_records(
        general: BTreeMap<String, SettingDescriptor>,
        records: Vec<PluginDescriptor>,
    ) -> Self {
        let records = records
            .into_iter()
            .filter(|p| p.id != GENERAL_PLUGIN_ID && p.name != "General")
            .collect();
        Self {
            general,
            source: PluginSource::Records(records),
        }
    }

    /// The synthetic General plugin.
    pub fn general_plugin(&self) -> PluginDescriptor {
        PluginDescriptor {
            id: GENERAL_PLUGIN_ID.to_string(),
            name: "General".to_string(),
            description: "The general settings for the server".to_string(),
            version: "0.1".to_string(),
            external: false,
            method: "manual".to_string(),
            has_page: false,
            settings: self.general.clone(),
            bundle: None,
        }
    }

    /// Built-in plugins (plus external ones when `include_external`), sorted
    /// by name, with General first.
    ///
    /// With `with_bundle`, each directory-backed plugin carries its archive
    /// and checksum.
    pub fn list_plugins(
        &self,
        include_external: bool,
        with_bundle: bool,
    ) -> Result<Vec<PluginDescriptor>, BulwarkError> {
        let mut plugins = self.discover(true, include_external, with_bundle)?;
        plugins.insert(0, self.general_plugin());
        Ok(plugins)
    }

    /// Only the externally installed plugins, sorted by name.
    ///
    /// This is the set shipped to peer instances, so General is not included.
    pub fn external_plugins(&self, with_bundle: bool) -> Result<Vec<PluginDescriptor>, BulwarkError> {
        self.discover(false, true, with_bundle)
    }

    /// Union of every plugin's settings, overlaid with the General settings.
    ///
    /// A name declared twice is logged; the later plugin in name order wins
    /// among plugins and General always wins last.
    pub fn merged_settings(&self) -> Result<SettingsSchema, BulwarkError> {
        let mut schema = SettingsSchema::new();
        let mut owner: BTreeMap<String, String> = BTreeMap::new();

        for plugin in self.discover(true, true, false)? {
            for setting in plugin.settings.into_values() {
                if let Some(previous) = owner.insert(setting.name.clone(), plugin.id.clone()) {
                    warn!(
                        setting = %setting.name,
                        first = %previous,
                        second = %plugin.id,
                        "setting declared by more than one plugin"
                    );
                }
                schema.insert(setting);
            }
        }

        for setting in self.general.values() {
            if let Some(plugin) = owner.get(&setting.name) {
                warn!(
                    setting = %setting.name,
                    plugin = %plugin,
                    "plugin setting shadowed by general setting"
                );
            }
            schema.insert(setting.clone());
        }

        Ok(schema)
    }

    fn discover(
        &self,
        include_core: bool,
        include_external: bool,
        with_bundle: bool,
    ) -> Result<Vec<PluginDescriptor>, BulwarkError> {
        let mut plugins = Vec::new();

        match &self.source {
            PluginSource::Directories { core, external } => {
                if include_external {
                    plugins.extend(scan_directory(external, true, with_bundle)?);
                }
                if include_core {
                    if let Some(core) = core {
                        plugins.extend(scan_directory(core, false, with_bundle)?);
                    }
                }
            }
            PluginSource::Records(records) => {
                plugins.extend(
                    records
                        .iter()
                        .filter(|p| if p.external { include_external } else { include_core })
                        .cloned()
                        .map(|mut p| {
                            if !with_bundle {
                                p.bundle = None;
                            }
                            p
                        }),
                );
            }
        }

        plugins.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(plugins)
    }
}

/// Load every plugin found directly under `root`.
///
/// A missing `root` yields no plugins. Sub-directories without a
/// `plugin.json` are not plugins and are skipped.
fn scan_directory(
    root: &Path,
    external: bool,
    with_bundle: bool,
) -> Result<Vec<PluginDescriptor>, BulwarkError> {
    if !root.is_dir() {
        debug!(dir = %root.display(), "plugin directory absent");
        return Ok(Vec::new());
    }

    let entries = std::fs::read_dir(root).map_err(|e| {
        BulwarkError::plugin(format!("failed to read `{}`: {e}", root.display()), e)
    })?;

    let mut plugins = Vec::new();
    for entry in entries {
        let dir = entry
            .map_err(|e| {
                BulwarkError::plugin(format!("failed to read `{}`: {e}", root.display()), e)
            })?
            .path();
        if !dir.is_dir() {
            continue;
        }
        let manifest = dir.join(MANIFEST_FILE);
        if !manifest.is_file() {
            debug!(dir = %dir.display(), "no plugin.json, skipping");
            continue;
        }
        plugins.push(load_plugin(&dir, &manifest, external, with_bundle)?);
    }
    Ok(plugins)
}

fn load_plugin(
    dir: &Path,
    manifest: &Path,
    external: bool,
    with_bundle: bool,
) -> Result<PluginDescriptor, BulwarkError> {
    let json = std::fs::read_to_string(manifest).map_err(|e| {
        BulwarkError::plugin(format!("failed to read `{}`: {e}", manifest.display()), e)
    })?;
    let mut plugin = parse_plugin_manifest(&json).map_err(|e| BulwarkError::Plugin {
        message: format!("{}: {e}", manifest.display()),
        source: Some(Box::new(e)),
    })?;

    plugin.external = external;
    plugin.method = if external { "ui" } else { "manual" }.to_string();
    plugin.has_page = dir.join("ui").join("template.html").is_file();
    if with_bundle {
        plugin.bundle = Some(package_plugin(dir)?);
    }
    Ok(plugin)
}
