// SPDX-FileCopyrightText: 2026 Bulwark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Bulwark.
//!
//! Holds the error type, the setting and plugin descriptors, the merged
//! settings schema, and the adapter traits for the config store and the
//! external generator.

pub mod error;
pub mod traits;
pub mod types;

pub use error::BulwarkError;
pub use traits::{ConfigStore, Generator};
pub use types::{
    ConfigMap, GeneratorOutput, PluginBundle, PluginDescriptor, Resolution, SettingContext,
    SettingDescriptor, SettingsSchema,
};
