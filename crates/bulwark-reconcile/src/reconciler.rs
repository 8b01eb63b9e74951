// SPDX-FileCopyrightText: 2026 Bulwark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The reconciler: one read, one in-memory change, one regenerate.
//!
//! Every operation rebuilds the settings schema from the catalog, loads the
//! global map and service maps from the store, stages its change on local
//! copies, and hands the result to [`Reconciler::regenerate`]. The store is
//! written only after the generator succeeded, so a refused or failed
//! operation leaves it untouched.
//!
//! Operations assume a single writer per store; nothing here serializes
//! concurrent callers.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use bulwark_core::{BulwarkError, ConfigMap, ConfigStore, Generator, SettingsSchema};
use bulwark_engine::merge::SERVER_NAME;
use bulwark_engine::{
    KeyScope, ValidationResult, classify_key, merge, primary_identifier, to_env_string, validate,
};
use bulwark_plugin::PluginCatalog;
use tracing::{debug, info, warn};

use crate::outcome::Outcome;

/// Method tag passed to the generator unless overridden.
pub const DEFAULT_METHOD: &str = "ui";

/// Orchestrates service lifecycle operations against a store and a generator.
pub struct Reconciler {
    store: Arc<dyn ConfigStore>,
    generator: Arc<dyn Generator>,
    catalog: Arc<PluginCatalog>,
    method: String,
    temp_dir: Option<PathBuf>,
}

/// Current state as read from the store.
struct State {
    global: ConfigMap,
    services: Vec<ConfigMap>,
}

impl Reconciler {
    pub fn new(
        store: Arc<dyn ConfigStore>,
        generator: Arc<dyn Generator>,
        catalog: Arc<PluginCatalog>,
    ) -> Self {
        Self {
            store,
            generator,
            catalog,
            method: DEFAULT_METHOD.to_string(),
            temp_dir: None,
        }
    }

    /// Tag generator calls with `method` instead of `"ui"`.
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// Write temporary environment files under `dir`.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Regenerate the current state without changes.
    pub async fn reload(&self) -> Result<Outcome, BulwarkError> {
        let schema = self.schema()?;
        let state = self.load().await?;
        self.regenerate(&state.global, &state.services, &schema).await?;
        info!("configuration reloaded");
        Ok(Outcome::applied("The configuration has been reloaded."))
    }

    /// Add a service. Its names must not include an existing primary
    /// identifier.
    pub async fn create_service(&self, variables: ConfigMap) -> Result<Outcome, BulwarkError> {
        let schema = self.schema()?;
        let id = match check_service_variables(&variables, &schema) {
            Ok(id) => id,
            Err(outcome) => return Ok(outcome),
        };

        let mut state = self.load().await?;
        if let Err(outcome) = stage_create(&mut state.services, variables, false) {
            return Ok(outcome);
        }

        self.regenerate(&state.global, &state.services, &schema).await?;
        info!(service = %id, "service created");
        Ok(Outcome::applied(format!("Configuration for {id} has been generated.")))
    }

    /// Replace the service `old` with `variables`.
    ///
    /// The removal of `old` and the creation of the new service are staged
    /// together and committed with one regenerate: if either half is refused
    /// or generation fails, the store keeps the previous state. The removal
    /// is staged first, so a missing `old` is reported before any rejection
    /// of `variables`.
    pub async fn edit_service(&self, old: &str, variables: ConfigMap) -> Result<Outcome, BulwarkError> {
        let schema = self.schema()?;
        let mut state = self.load().await?;
        let old = primary_identifier(old).unwrap_or(old).to_string();
        if let Err(outcome) = stage_delete(&mut state, &old, &schema) {
            return Ok(outcome);
        }

        let new_id = match check_service_variables(&variables, &schema) {
            Ok(id) => id,
            Err(outcome) => return Ok(outcome),
        };
        if let Err(outcome) = stage_create(&mut state.services, variables, true) {
            return Ok(outcome);
        }

        self.regenerate(&state.global, &state.services, &schema).await?;
        info!(service = %old, renamed_to = %new_id, "service edited");
        Ok(Outcome::applied(format!("Configuration for {old} has been edited.")))
    }

    /// Remove the service whose primary identifier is `id`, along with any
    /// of its keys that leaked into the global map or other services.
    pub async fn delete_service(&self, id: &str) -> Result<Outcome, BulwarkError> {
        let schema = self.schema()?;
        let id = primary_identifier(id).unwrap_or(id).to_string();
        let mut state = self.load().await?;
        if let Err(outcome) = stage_delete(&mut state, &id, &schema) {
            return Ok(outcome);
        }

        self.regenerate(&state.global, &state.services, &schema).await?;
        info!(service = %id, "service deleted");
        Ok(Outcome::applied(format!("Configuration for {id} has been deleted.")))
    }

    /// Overlay `variables` onto the global map. Services are untouched.
    pub async fn edit_global(&self, variables: ConfigMap) -> Result<Outcome, BulwarkError> {
        let schema = self.schema()?;
        let result = validate(&variables, true, &schema);
        if !result.ok {
            return Ok(Outcome::rejected(result.messages));
        }

        let mut state = self.load().await?;
        let changed = variables.len();
        state.global.extend(variables);

        self.regenerate(&state.global, &state.services, &schema).await?;
        info!(keys = changed, "global configuration edited");
        Ok(Outcome::applied("The global configuration has been edited."))
    }

    /// Validate `variables` for a global (`is_global`) or service change.
    pub fn validate(&self, variables: &ConfigMap, is_global: bool) -> Result<ValidationResult, BulwarkError> {
        Ok(validate(variables, is_global, &self.schema()?))
    }

    /// The merged stable representation of the current state, without
    /// invoking the generator.
    pub async fn render_environment(&self) -> Result<String, BulwarkError> {
        let schema = self.schema()?;
        let state = self.load().await?;
        to_env_string(&merge(&state.global, &state.services, &schema)?)
    }

    fn schema(&self) -> Result<SettingsSchema, BulwarkError> {
        self.catalog.merged_settings()
    }

    async fn load(&self) -> Result<State, BulwarkError> {
        let (global, services) = self.store.get_state().await?;
        debug!(services = services.len(), "state loaded");
        Ok(State { global, services })
    }

    /// Merge, hand the result to the generator through a temporary file,
    /// and commit it to the store once the generator exits with 0.
    ///
    /// The temporary file is removed whatever the outcome.
    async fn regenerate(
        &self,
        global: &ConfigMap,
        services: &[ConfigMap],
        schema: &SettingsSchema,
    ) -> Result<ConfigMap, BulwarkError> {
        let merged = merge(global, services, schema)?;
        let rendered = to_env_string(&merged)?;

        let mut builder = tempfile::Builder::new();
        builder.prefix("bulwark-").suffix(".env");
        let mut file = match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(|e| BulwarkError::Internal(format!("failed to create temporary environment file: {e}")))?;
        file.write_all(rendered.as_bytes())
            .and_then(|()| file.flush())
            .map_err(|e| BulwarkError::Internal(format!("failed to write temporary environment file: {e}")))?;

        debug!(path = %file.path().display(), keys = merged.len(), "invoking generator");
        let result = self.generator.generate(file.path(), &self.method).await;

        let path = file.path().to_path_buf();
        if let Err(e) = file.close() {
            warn!(path = %path.display(), error = %e, "failed to remove temporary environment file");
        }

        let output = result?;
        if !output.success() {
            warn!(code = ?output.code, "generator failed");
            return Err(BulwarkError::Generation {
                code: output.code,
                output: output.output,
            });
        }
        debug!(output = %output.output, "generator succeeded");

        self.store.write_environment(&merged).await?;
        Ok(merged)
    }
}

/// Validate service variables and extract the new primary identifier.
fn check_service_variables(variables: &ConfigMap, schema: &SettingsSchema) -> Result<String, Outcome> {
    let result = validate(variables, false, schema);
    if !result.ok {
        return Err(Outcome::rejected(result.messages));
    }
    variables
        .get(SERVER_NAME)
        .and_then(|names| primary_identifier(names))
        .map(str::to_string)
        .ok_or_else(|| Outcome::rejected(vec![format!("Variable {SERVER_NAME} is not valid.")]))
}

/// Append `variables` as a new service.
///
/// An existing service collides when its primary identifier is one of the
/// new names. Outside edit mode that refuses the change; in edit mode the
/// colliding service is replaced.
fn stage_create(services: &mut Vec<ConfigMap>, variables: ConfigMap, edit: bool) -> Result<(), Outcome> {
    let new_names: Vec<&str> = variables
        .get(SERVER_NAME)
        .map(|names| names.split_whitespace().collect())
        .unwrap_or_default();
    let collision = |service: &ConfigMap| {
        service
            .get(SERVER_NAME)
            .and_then(|names| primary_identifier(names))
            .filter(|existing| new_names.contains(existing))
            .map(str::to_string)
    };

    if !edit {
        if let Some(existing) = services.iter().find_map(|service| collision(service)) {
            return Err(Outcome::already_exists(format!("Service {existing} already exists.")));
        }
    }
    services.retain(|service| match collision(service) {
        Some(existing) => {
            warn!(service = %existing, "existing service replaced by edited service");
            false
        }
        None => true,
    });

    services.push(variables);
    Ok(())
}

/// Remove service `id` from `state`, including leaked keys classified as
/// belonging to it.
fn stage_delete(state: &mut State, id: &str, schema: &SettingsSchema) -> Result<(), Outcome> {
    let position = state.services.iter().position(|service| {
        service
            .get(SERVER_NAME)
            .and_then(|names| primary_identifier(names))
            == Some(id)
    });
    let Some(position) = position else {
        return Err(Outcome::not_found(format!("Can't delete missing {id} configuration.")));
    };

    let mut ids: Vec<String> = state
        .services
        .iter()
        .filter_map(|service| service.get(SERVER_NAME).and_then(|names| primary_identifier(names)))
        .map(str::to_string)
        .collect();
    if let Some(names) = state.global.get(SERVER_NAME) {
        ids.extend(names.split_whitespace().map(str::to_string));
    }

    state.services.remove(position);

    let owned_by = |key: &str| classify_key(key, &ids, schema) == KeyScope::Service(id.to_string());
    let before = state.global.len();
    state.global.retain(|key, _| !owned_by(key));
    let leaked = before - state.global.len();
    for service in &mut state.services {
        service.retain(|key, _| !owned_by(key));
    }
    if leaked > 0 {
        debug!(service = %id, keys = leaked, "removed service keys from global map");
    }

    let remaining = state
        .global
        .get(SERVER_NAME)
        .map(|names| {
            names
                .split_whitespace()
                .filter(|name| *name != id)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default();
    state.global.insert(SERVER_NAME.to_string(), remaining);
    Ok(())
}
