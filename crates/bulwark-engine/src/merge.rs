// SPDX-FileCopyrightText: 2026 Bulwark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Flat namespace merge.
//!
//! The generator consumes one environment, so service settings are stored in
//! the same map as global ones under a `{primary_identifier}_` prefix. This
//! module owns the prefixing rule in both directions and the key classifier
//! that decides, from a key's text alone, which scope it belongs to.

use std::collections::BTreeMap;

use bulwark_core::{BulwarkError, ConfigMap, Resolution, SettingsSchema};
use tracing::{debug, warn};

/// Key holding the space-separated names of a service, or in the global map
/// the primary identifiers of every service.
pub const SERVER_NAME: &str = "SERVER_NAME";

/// First space-separated token of a `SERVER_NAME` value.
pub fn primary_identifier(server_name: &str) -> Option<&str> {
    server_name.split_whitespace().next()
}

/// Primary identifiers listed in a global map's `SERVER_NAME`, in order,
/// without duplicates.
pub fn service_identifiers(global: &ConfigMap) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    if let Some(names) = global.get(SERVER_NAME) {
        for id in names.split_whitespace() {
            if !ids.iter().any(|known| known == id) {
                ids.push(id.to_string());
            }
        }
    }
    ids
}

/// Scope a flat environment key belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyScope {
    /// A setting of the global scope.
    Global,
    /// A setting of the service with this primary identifier.
    Service(String),
    /// Neither a known setting nor prefixed by a known service.
    Unknown,
}

/// Classify `key` using only its text.
///
/// Checked in order: an exact setting name is global; a key starting with
/// `{id}_` belongs to the service `id` (the longest such identifier wins, so
/// `www.a.com` beats `www`); a `multiple` setting with a suffix is global;
/// anything else is unknown.
pub fn classify_key<S: AsRef<str>>(
    key: &str,
    primary_identifiers: &[S],
    schema: &SettingsSchema,
) -> KeyScope {
    if schema.contains(key) {
        return KeyScope::Global;
    }

    let owner = primary_identifiers
        .iter()
        .map(AsRef::as_ref)
        .filter(|id| service_suffix(key, id).is_some())
        .max_by_key(|id| id.len());
    if let Some(id) = owner {
        return KeyScope::Service(id.to_string());
    }

    match schema.resolve(key) {
        Some((_, Resolution::Suffixed)) => KeyScope::Global,
        _ => KeyScope::Unknown,
    }
}

/// The part of `key` after `{id}_`, if non-empty.
fn service_suffix<'k>(key: &'k str, id: &str) -> Option<&'k str> {
    key.strip_prefix(id)
        .and_then(|rest| rest.strip_prefix('_'))
        .filter(|rest| !rest.is_empty())
}

/// Merge the global map and the service maps into one flat environment.
///
/// Each service key is stored as `{id}_{key}`, where `id` is the service's
/// primary identifier, unless it already carries that prefix and is not
/// itself a setting name. The result's `SERVER_NAME` lists every primary
/// identifier in service order; global keys fill in whatever the services
/// did not set.
///
/// Fails with [`BulwarkError::Config`] if a service has no `SERVER_NAME`.
pub fn merge(
    global: &ConfigMap,
    services: &[ConfigMap],
    schema: &SettingsSchema,
) -> Result<ConfigMap, BulwarkError> {
    let mut merged = ConfigMap::new();
    let mut ids: Vec<&str> = Vec::with_capacity(services.len());

    for (index, service) in services.iter().enumerate() {
        let id = service
            .get(SERVER_NAME)
            .and_then(|names| primary_identifier(names))
            .ok_or_else(|| {
                BulwarkError::Config(format!("service #{index} has no {SERVER_NAME}"))
            })?;

        for (key, value) in service {
            let bare = service_suffix(key, id).unwrap_or(key);
            if schema.get(bare).is_some_and(|setting| setting.is_global()) {
                warn!(
                    service = %id,
                    key = %key,
                    "global setting set on a service, keeping it service-scoped"
                );
            }

            let already_prefixed = service_suffix(key, id).is_some() && !schema.contains(key);
            let target = if already_prefixed {
                key.clone()
            } else {
                format!("{id}_{key}")
            };
            merged.insert(target, value.clone());
        }

        if ids.contains(&id) {
            warn!(service = %id, "primary identifier listed twice, keys merged");
        } else {
            ids.push(id);
        }
    }

    merged.insert(SERVER_NAME.to_string(), ids.join(" "));
    for (key, value) in global {
        merged.entry(key.clone()).or_insert_with(|| value.clone());
    }

    debug!(services = ids.len(), keys = merged.len(), "configuration merged");
    Ok(merged)
}

/// Split a flat environment back into the global map and the service maps.
///
/// Services are returned in `SERVER_NAME` order. A key classified as
/// belonging to a service moves to that service without its `{id}_` prefix;
/// every other key stays global. A service with no stored `SERVER_NAME`
/// gets its primary identifier.
pub fn split_environment(
    env: &ConfigMap,
    schema: &SettingsSchema,
) -> (ConfigMap, Vec<ConfigMap>) {
    let ids = service_identifiers(env);
    let mut global = ConfigMap::new();
    let mut services: BTreeMap<&str, ConfigMap> = BTreeMap::new();

    for (key, value) in env {
        if key == SERVER_NAME {
            continue;
        }
        match classify_key(key, &ids, schema) {
            KeyScope::Service(id) => {
                let Some(owner) = ids.iter().find(|known| **known == id) else {
                    continue;
                };
                let bare = service_suffix(key, owner).unwrap_or(key);
                services
                    .entry(owner.as_str())
                    .or_default()
                    .insert(bare.to_string(), value.clone());
            }
            KeyScope::Global | KeyScope::Unknown => {
                global.insert(key.clone(), value.clone());
            }
        }
    }

    global.insert(SERVER_NAME.to_string(), ids.join(" "));

    let services = ids
        .iter()
        .map(|id| {
            let mut service = services.remove(id.as_str()).unwrap_or_default();
            service
                .entry(SERVER_NAME.to_string())
                .or_insert_with(|| id.clone());
            service
        })
        .collect();

    (global, services)
}
