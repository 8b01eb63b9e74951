// SPDX-FileCopyrightText: 2026 Bulwark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Config store adapter trait.

use async_trait::async_trait;

use crate::error::BulwarkError;
use crate::types::{ConfigMap, PluginDescriptor};

/// Narrow get/set contract over the persistent configuration store.
///
/// Reads return the current global map and the ordered list of service maps.
/// `write_environment` is the only mutating call and must be atomic from the
/// caller's point of view: either the new environment takes effect or the
/// previous one stays intact. Failures are returned unmodified to callers;
/// retry policy, if any, belongs to the implementation.
#[async_trait]
pub trait ConfigStore: Send + Sync + 'static {
    /// The global settings, including `SERVER_NAME`.
    async fn get_global(&self) -> Result<ConfigMap, BulwarkError>;

    /// Every service's settings, in `SERVER_NAME` order.
    async fn get_services(&self) -> Result<Vec<ConfigMap>, BulwarkError>;

    /// Global and service maps from a single read.
    ///
    /// Stores that derive both from one source should override this.
    async fn get_state(&self) -> Result<(ConfigMap, Vec<ConfigMap>), BulwarkError> {
        let global = self.get_global().await?;
        let services = self.get_services().await?;
        Ok((global, services))
    }

    /// Plugin records held by the store, if it tracks any.
    async fn get_plugins(&self) -> Result<Vec<PluginDescriptor>, BulwarkError> {
        Ok(Vec::new())
    }

    /// Replace the stored environment with `merged`.
    async fn write_environment(&self, merged: &ConfigMap) -> Result<(), BulwarkError>;
}
