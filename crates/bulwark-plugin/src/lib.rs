// SPDX-FileCopyrightText: 2026 Bulwark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin catalog, manifest parser, and bundle packaging.
//!
//! Plugins are directories holding a `plugin.json` that declares the
//! settings they contribute. The catalog finds them (built-in and
//! externally installed), prepends the synthetic General plugin, and
//! merges every declared setting into one schema for the engine.

pub mod bundle;
pub mod catalog;
pub mod manifest;

pub use bundle::{package_plugin, sha256_hex};
pub use catalog::{GENERAL_PLUGIN_ID, PluginCatalog};
pub use manifest::{MANIFEST_FILE, load_general_settings, parse_general_settings, parse_plugin_manifest};
