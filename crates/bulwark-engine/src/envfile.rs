// SPDX-FileCopyrightText: 2026 Bulwark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The stable `KEY=VALUE` representation handed to the generator.
//!
//! One pair per line, keys in ascending order, values verbatim. There is no
//! escaping, so a value must not contain a line break and a key must not
//! contain `=`.

use std::io;
use std::path::Path;

use bulwark_core::{BulwarkError, ConfigMap};

/// Render `map` as sorted `KEY=VALUE` lines.
pub fn to_env_string(map: &ConfigMap) -> Result<String, BulwarkError> {
    let mut lines = Vec::with_capacity(map.len());
    for (key, value) in map {
        if key.contains(['=', '\n', '\r']) {
            return Err(BulwarkError::Environment(format!(
                "key {key:?} cannot be written to an environment file"
            )));
        }
        if value.contains(['\n', '\r']) {
            return Err(BulwarkError::Environment(format!(
                "value of {key} contains a line break"
            )));
        }
        lines.push(format!("{key}={value}"));
    }
    Ok(lines.join("\n"))
}

/// Parse `KEY=VALUE` lines. Lines without `=` are ignored; a value keeps any
/// further `=` characters.
pub fn parse_env_str(content: &str) -> ConfigMap {
    content
        .lines()
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// Write `map` to `path` in the stable representation.
pub fn write_env_file(path: &Path, map: &ConfigMap) -> Result<(), BulwarkError> {
    let content = to_env_string(map)?;
    std::fs::write(path, content).map_err(BulwarkError::store)
}

/// Read a stable representation file. A missing file is an empty map.
pub fn read_env_file(path: &Path) -> Result<ConfigMap, BulwarkError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(parse_env_str(&content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(ConfigMap::new()),
        Err(e) => Err(BulwarkError::store(e)),
    }
}
