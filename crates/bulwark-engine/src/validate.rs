// SPDX-FileCopyrightText: 2026 Bulwark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Validation of proposed variables against the settings schema.
//!
//! Setting patterns are written for a backtracking engine (lookaround and
//! backreferences are common), so they are compiled with `fancy-regex`.

use bulwark_core::{ConfigMap, SettingDescriptor, SettingsSchema};
use fancy_regex::Regex;
use tracing::warn;

/// Outcome of [`validate`]: every rejected key gets its own message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub ok: bool,
    pub messages: Vec<String>,
}

impl ValidationResult {
    fn from_messages(messages: Vec<String>) -> Self {
        Self {
            ok: messages.is_empty(),
            messages,
        }
    }
}

/// Check `variables` against `schema`.
///
/// A key must resolve to a setting (literally, or as a suffixed instance of
/// a `multiple` setting), the setting's context must be global exactly when
/// `is_global` is set, and the value must fully match the setting's regex.
/// All keys are checked; messages come out in key order.
pub fn validate(variables: &ConfigMap, is_global: bool, schema: &SettingsSchema) -> ValidationResult {
    let messages = variables
        .iter()
        .filter(|(key, value)| !accepts(schema, key, value, is_global))
        .map(|(key, _)| format!("Variable {key} is not valid."))
        .collect();
    ValidationResult::from_messages(messages)
}

fn accepts(schema: &SettingsSchema, key: &str, value: &str, is_global: bool) -> bool {
    let Some((setting, _)) = schema.resolve(key) else {
        return false;
    };
    setting.is_global() == is_global && value_matches(setting, key, value)
}

fn value_matches(setting: &SettingDescriptor, key: &str, value: &str) -> bool {
    let pattern = match Regex::new(&format!("^(?:{})$", setting.regex)) {
        Ok(pattern) => pattern,
        Err(e) => {
            warn!(setting = %setting.name, key = %key, error = %e, "setting regex does not compile");
            return false;
        }
    };
    pattern.is_match(value).unwrap_or_else(|e| {
        warn!(setting = %setting.name, key = %key, error = %e, "setting regex failed to run");
        false
    })
}
