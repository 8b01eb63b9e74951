// SPDX-FileCopyrightText: 2026 Bulwark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Setting and plugin descriptors shared by the catalog, engine, and reconciler.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumString};

/// A flat `KEY -> VALUE` configuration map.
///
/// Ordered so that iteration, validation messages, and serialization are stable.
pub type ConfigMap = BTreeMap<String, String>;

/// Where a setting may be applied.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SettingContext {
    /// Process-wide only.
    Global,
    /// May vary per service.
    Multisite,
}

/// Schema entry for one configurable key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingDescriptor {
    /// Setting name. Filled from the map key when descriptors are loaded.
    #[serde(default, skip_serializing)]
    pub name: String,
    pub context: SettingContext,
    #[serde(default)]
    pub regex: String,
    /// Whether the key may be repeated with a `_suffix`.
    ///
    /// Descriptor files carry either a boolean or the name of the group the
    /// repeated keys belong to; any non-empty group name counts as `true`.
    #[serde(default, deserialize_with = "deserialize_multiple")]
    pub multiple: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl SettingDescriptor {
    /// A bare descriptor with no presentation metadata.
    pub fn new(name: impl Into<String>, context: SettingContext, regex: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            context,
            regex: regex.into(),
            multiple: false,
            default: None,
            help: None,
            label: None,
            id: None,
            kind: None,
        }
    }

    /// Mark the setting as repeatable.
    pub fn repeatable(mut self) -> Self {
        self.multiple = true;
        self
    }

    pub fn is_global(&self) -> bool {
        self.context == SettingContext::Global
    }
}

fn deserialize_multiple<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Multiple {
        Flag(bool),
        Group(String),
    }

    Ok(match Option::<Multiple>::deserialize(deserializer)? {
        Some(Multiple::Flag(flag)) => flag,
        Some(Multiple::Group(group)) => !group.is_empty(),
        None => false,
    })
}

/// Copy each map key into its descriptor's `name` field.
pub fn name_settings(
    settings: BTreeMap<String, SettingDescriptor>,
) -> BTreeMap<String, SettingDescriptor> {
    settings
        .into_iter()
        .map(|(name, mut setting)| {
            setting.name = name.clone();
            (name, setting)
        })
        .collect()
}

/// Archived plugin directory plus its content checksum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginBundle {
    /// gzip-compressed tar of the plugin directory.
    pub data: Vec<u8>,
    /// Lowercase hex SHA-256 of `data`.
    pub checksum: String,
}

/// A discovered plugin and the settings it contributes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginDescriptor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub version: String,
    /// Installed at runtime rather than shipped with the product.
    #[serde(default)]
    pub external: bool,
    /// `"ui"` for external plugins, `"manual"` for built-ins.
    #[serde(default)]
    pub method: String,
    /// Contributes a UI page. Carried through untouched.
    #[serde(default)]
    pub has_page: bool,
    #[serde(default)]
    pub settings: BTreeMap<String, SettingDescriptor>,
    #[serde(skip)]
    pub bundle: Option<PluginBundle>,
}

/// How a key resolved against the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The key is a setting name.
    Literal,
    /// The key is `{setting}_{suffix}` for a repeatable setting.
    Suffixed,
}

/// The merged setting schema of every plugin plus the General settings.
///
/// Built once per operation and passed explicitly to whoever needs it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsSchema {
    settings: BTreeMap<String, SettingDescriptor>,
}

impl SettingsSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a descriptor, replacing any previous one with the same name.
    pub fn insert(&mut self, setting: SettingDescriptor) -> Option<SettingDescriptor> {
        self.settings.insert(setting.name.clone(), setting)
    }

    pub fn get(&self, name: &str) -> Option<&SettingDescriptor> {
        self.settings.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.settings.contains_key(name)
    }

    /// Resolve a key to its descriptor.
    ///
    /// A literal setting name resolves to itself. Otherwise the text after the
    /// last underscore is dropped and the remainder must name a repeatable
    /// setting, so `BLOCKED_IPS_1` resolves to `BLOCKED_IPS` while
    /// `BLOCKED_IPS_abc_1` looks up `BLOCKED_IPS_abc`.
    pub fn resolve(&self, key: &str) -> Option<(&SettingDescriptor, Resolution)> {
        if let Some(setting) = self.settings.get(key) {
            return Some((setting, Resolution::Literal));
        }
        let (base, _) = key.rsplit_once('_')?;
        self.settings
            .get(base)
            .filter(|setting| setting.multiple)
            .map(|setting| (setting, Resolution::Suffixed))
    }

    pub fn iter(&self) -> impl Iterator<Item = &SettingDescriptor> {
        self.settings.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.settings.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.settings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }

    pub fn into_map(self) -> BTreeMap<String, SettingDescriptor> {
        self.settings
    }
}

impl FromIterator<SettingDescriptor> for SettingsSchema {
    fn from_iter<I: IntoIterator<Item = SettingDescriptor>>(iter: I) -> Self {
        let mut schema = SettingsSchema::new();
        for setting in iter {
            schema.insert(setting);
        }
        schema
    }
}

/// Exit status and captured output of one generator run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOutput {
    /// Process exit code; `None` when killed by a signal.
    pub code: Option<i32>,
    /// Combined stdout and stderr.
    pub output: String,
}

impl GeneratorOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}
