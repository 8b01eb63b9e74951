// SPDX-FileCopyrightText: 2026 Bulwark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Config store backed by a single `variables.env` file.
//!
//! The file holds the merged environment in the stable representation.
//! Reads split it back into the global map and the service maps using the
//! catalog's schema; writes replace the file atomically.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use bulwark_core::{BulwarkError, ConfigMap, ConfigStore, PluginDescriptor};
use bulwark_engine::{parse_env_str, split_environment, to_env_string};
use bulwark_plugin::PluginCatalog;

/// File-backed [`ConfigStore`].
pub struct FileStore {
    path: PathBuf,
    catalog: Arc<PluginCatalog>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>, catalog: Arc<PluginCatalog>) -> Self {
        Self {
            path: path.into(),
            catalog,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_split(&self) -> Result<(ConfigMap, Vec<ConfigMap>), BulwarkError> {
        let env = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => parse_env_str(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => ConfigMap::new(),
            Err(e) => return Err(BulwarkError::store(e)),
        };
        let schema = self.catalog.merged_settings()?;
        Ok(split_environment(&env, &schema))
    }
}

#[async_trait]
impl ConfigStore for FileStore {
    async fn get_global(&self) -> Result<ConfigMap, BulwarkError> {
        Ok(self.read_split().await?.0)
    }

    async fn get_services(&self) -> Result<Vec<ConfigMap>, BulwarkError> {
        Ok(self.read_split().await?.1)
    }

    async fn get_state(&self) -> Result<(ConfigMap, Vec<ConfigMap>), BulwarkError> {
        self.read_split().await
    }

    async fn get_plugins(&self) -> Result<Vec<PluginDescriptor>, BulwarkError> {
        self.catalog.list_plugins(true, false)
    }

    async fn write_environment(&self, merged: &ConfigMap) -> Result<(), BulwarkError> {
        let content = to_env_string(merged)?;
        let dir = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or(Path::new("."));

        let mut staged = tempfile::Builder::new()
            .prefix(".variables-")
            .suffix(".env")
            .tempfile_in(dir)
            .map_err(BulwarkError::store)?;
        staged
            .write_all(content.as_bytes())
            .and_then(|()| staged.as_file().sync_all())
            .map_err(BulwarkError::store)?;
        staged
            .persist(&self.path)
            .map_err(|e| BulwarkError::store(e.error))?;

        tracing::info!(path = %self.path.display(), keys = merged.len(), "environment written");
        Ok(())
    }
}
