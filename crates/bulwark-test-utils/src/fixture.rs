// SPDX-FileCopyrightText: 2026 Bulwark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! On-disk plugin layout for catalog and reconciler tests.

use std::path::{Path, PathBuf};

use bulwark_core::{BulwarkError, SettingsSchema};
use bulwark_plugin::PluginCatalog;
use tempfile::TempDir;

/// General settings written by [`CatalogFixture::new`].
pub const GENERAL_SETTINGS: &str = r#"{
    "SERVER_NAME": {"context": "multisite", "default": "www.example.com", "regex": "\\S+( \\S+)*"},
    "WORKER_PROCESSES": {"context": "global", "default": "auto", "regex": "auto|\\d+"},
    "LOG_LEVEL": {"context": "global", "default": "notice", "regex": "debug|info|notice|warn|error"},
    "USE_GZIP": {"context": "multisite", "default": "no", "regex": "yes|no"}
}"#;

/// A temp dir holding `settings.json`, `core/` and `plugins/`.
///
/// Seeded with the General settings above, a built-in `blacklist` plugin
/// (repeatable `BLOCKED_IPS`) and an external `clamav` plugin
/// (`USE_CLAMAV`). Removed when dropped.
pub struct CatalogFixture {
    dir: TempDir,
}

impl CatalogFixture {
    pub fn new() -> Result<Self, BulwarkError> {
        let dir = tempfile::tempdir().map_err(io_error)?;
        let fixture = Self { dir };
        std::fs::write(fixture.settings_file(), GENERAL_SETTINGS).map_err(io_error)?;
        std::fs::create_dir_all(fixture.core_dir()).map_err(io_error)?;
        std::fs::create_dir_all(fixture.external_dir()).map_err(io_error)?;

        fixture.add_core_plugin(
            "blacklist",
            "Blacklist",
            r#"{"BLOCKED_IPS": {"context": "multisite", "regex": "(\\d{1,3}\\.){3}\\d{1,3}", "multiple": "blacklist"}}"#,
        )?;
        fixture.add_external_plugin(
            "clamav",
            "ClamAV",
            r#"{"USE_CLAMAV": {"context": "multisite", "regex": "yes|no"}}"#,
        )?;
        Ok(fixture)
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn settings_file(&self) -> PathBuf {
        self.root().join("settings.json")
    }

    pub fn core_dir(&self) -> PathBuf {
        self.root().join("core")
    }

    pub fn external_dir(&self) -> PathBuf {
        self.root().join("plugins")
    }

    /// Add a built-in plugin; `settings` is the JSON object of its settings.
    pub fn add_core_plugin(&self, id: &str, name: &str, settings: &str) -> Result<PathBuf, BulwarkError> {
        write_plugin(&self.core_dir(), id, name, settings)
    }

    /// Add an externally installed plugin.
    pub fn add_external_plugin(&self, id: &str, name: &str, settings: &str) -> Result<PathBuf, BulwarkError> {
        write_plugin(&self.external_dir(), id, name, settings)
    }

    /// Catalog over the fixture's directories.
    pub fn catalog(&self) -> Result<PluginCatalog, BulwarkError> {
        PluginCatalog::from_paths(&self.settings_file(), Some(self.core_dir()), self.external_dir())
    }

    /// The merged schema of the fixture's catalog.
    pub fn schema(&self) -> Result<SettingsSchema, BulwarkError> {
        self.catalog()?.merged_settings()
    }
}

fn write_plugin(root: &Path, id: &str, name: &str, settings: &str) -> Result<PathBuf, BulwarkError> {
    let settings: serde_json::Value = serde_json::from_str(settings)
        .map_err(|e| BulwarkError::Internal(format!("fixture settings for {id}: {e}")))?;
    let manifest = serde_json::json!({
        "id": id,
        "name": name,
        "description": format!("{name} test plugin"),
        "version": "1.0",
        "settings": settings,
    });

    let dir = root.join(id);
    std::fs::create_dir_all(&dir).map_err(io_error)?;
    std::fs::write(dir.join("plugin.json"), manifest.to_string()).map_err(io_error)?;
    tracing::debug!(plugin = %id, dir = %dir.display(), "fixture plugin written");
    Ok(dir)
}

fn io_error(e: std::io::Error) -> BulwarkError {
    BulwarkError::Internal(format!("fixture io: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_catalog_has_seeded_plugins() {
        let fixture = CatalogFixture::new().unwrap();
        let plugins = fixture.catalog().unwrap().list_plugins(true, false).unwrap();
        let ids: Vec<&str> = plugins.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["general", "blacklist", "clamav"]);

        let schema = fixture.schema().unwrap();
        assert!(schema.get("BLOCKED_IPS").unwrap().multiple);
        assert!(schema.get("WORKER_PROCESSES").unwrap().is_global());
        assert_eq!(schema.len(), 6);
    }
}
