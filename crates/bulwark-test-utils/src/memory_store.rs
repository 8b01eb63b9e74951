// SPDX-FileCopyrightText: 2026 Bulwark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory config store for deterministic testing.
//!
//! `MemoryStore` keeps the global map and the service maps the way a real
//! store would after splitting the written environment, and records every
//! environment passed to `write_environment()` for assertions.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use bulwark_core::{BulwarkError, ConfigMap, ConfigStore, PluginDescriptor, SettingsSchema};
use bulwark_engine::split_environment;

#[derive(Debug, Default)]
struct State {
    global: ConfigMap,
    services: Vec<ConfigMap>,
    written: Vec<ConfigMap>,
    reads: usize,
    fail_writes: bool,
}

/// A config store held in memory.
///
/// Writes split the merged environment with the schema given at
/// construction, so later reads see the same global/service shape a
/// persistent store would return.
pub struct MemoryStore {
    schema: SettingsSchema,
    plugins: Vec<PluginDescriptor>,
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    /// An empty store: no services and an empty `SERVER_NAME`.
    pub fn new(schema: SettingsSchema) -> Self {
        let mut global = ConfigMap::new();
        global.insert("SERVER_NAME".to_string(), String::new());
        Self::with_state(schema, global, Vec::new())
    }

    /// A store seeded with explicit global and service maps.
    pub fn with_state(schema: SettingsSchema, global: ConfigMap, services: Vec<ConfigMap>) -> Self {
        Self {
            schema,
            plugins: Vec::new(),
            state: Arc::new(Mutex::new(State {
                global,
                services,
                ..State::default()
            })),
        }
    }

    /// A store seeded from a flat merged environment.
    pub fn from_environment(schema: SettingsSchema, env: &ConfigMap) -> Self {
        let (global, services) = split_environment(env, &schema);
        Self::with_state(schema, global, services)
    }

    /// Plugin records returned by `get_plugins()`.
    pub fn with_plugins(mut self, plugins: Vec<PluginDescriptor>) -> Self {
        self.plugins = plugins;
        self
    }

    /// Make every following `write_environment()` fail.
    pub async fn fail_writes(&self, fail: bool) {
        self.state.lock().await.fail_writes = fail;
    }

    /// Current global map.
    pub async fn global(&self) -> ConfigMap {
        self.state.lock().await.global.clone()
    }

    /// Current service maps.
    pub async fn services(&self) -> Vec<ConfigMap> {
        self.state.lock().await.services.clone()
    }

    /// Every successfully written environment, oldest first.
    pub async fn written(&self) -> Vec<ConfigMap> {
        self.state.lock().await.written.clone()
    }

    /// Number of successful writes.
    pub async fn write_count(&self) -> usize {
        self.state.lock().await.written.len()
    }

    /// Number of reads served, counting `get_state()` as one.
    pub async fn read_count(&self) -> usize {
        self.state.lock().await.reads
    }

    /// The most recently written environment.
    pub async fn last_environment(&self) -> Option<ConfigMap> {
        self.state.lock().await.written.last().cloned()
    }
}

#[async_trait]
impl ConfigStore for MemoryStore {
    async fn get_global(&self) -> Result<ConfigMap, BulwarkError> {
        let mut state = self.state.lock().await;
        state.reads += 1;
        Ok(state.global.clone())
    }

    async fn get_services(&self) -> Result<Vec<ConfigMap>, BulwarkError> {
        let mut state = self.state.lock().await;
        state.reads += 1;
        Ok(state.services.clone())
    }

    async fn get_state(&self) -> Result<(ConfigMap, Vec<ConfigMap>), BulwarkError> {
        let mut state = self.state.lock().await;
        state.reads += 1;
        Ok((state.global.clone(), state.services.clone()))
    }

    async fn get_plugins(&self) -> Result<Vec<PluginDescriptor>, BulwarkError> {
        Ok(self.plugins.clone())
    }

    async fn write_environment(&self, merged: &ConfigMap) -> Result<(), BulwarkError> {
        let mut state = self.state.lock().await;
        if state.fail_writes {
            return Err(BulwarkError::store(std::io::Error::other("memory store write refused")));
        }
        let (global, services) = split_environment(merged, &self.schema);
        state.global = global;
        state.services = services;
        state.written.push(merged.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bulwark_core::{SettingContext, SettingDescriptor};

    fn schema() -> SettingsSchema {
        [
            SettingDescriptor::new("SERVER_NAME", SettingContext::Multisite, ".*"),
            SettingDescriptor::new("USE_GZIP", SettingContext::Multisite, ".*"),
        ]
        .into_iter()
        .collect()
    }

    #[tokio::test]
    async fn new_store_is_empty() {
        let store = MemoryStore::new(schema());
        assert_eq!(store.get_global().await.unwrap()["SERVER_NAME"], "");
        assert!(store.get_services().await.unwrap().is_empty());
        assert_eq!(store.write_count().await, 0);
    }

    #[tokio::test]
    async fn write_splits_environment() {
        let store = MemoryStore::new(schema());
        let env = ConfigMap::from([
            ("SERVER_NAME".to_string(), "a.com".to_string()),
            ("a.com_SERVER_NAME".to_string(), "a.com".to_string()),
            ("a.com_USE_GZIP".to_string(), "yes".to_string()),
        ]);
        store.write_environment(&env).await.unwrap();

        let services = store.get_services().await.unwrap();
        assert_eq!(services.len(), 1);
        assert_eq!(services[0]["USE_GZIP"], "yes");
        assert_eq!(store.last_environment().await, Some(env));
    }

    #[tokio::test]
    async fn refused_write_keeps_state() {
        let store = MemoryStore::new(schema());
        store.fail_writes(true).await;
        let env = ConfigMap::from([("SERVER_NAME".to_string(), "a.com".to_string())]);
        assert!(store.write_environment(&env).await.is_err());
        assert_eq!(store.write_count().await, 0);
        assert_eq!(store.get_global().await.unwrap()["SERVER_NAME"], "");
    }
}
