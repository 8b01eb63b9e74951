// SPDX-FileCopyrightText: 2026 Bulwark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure configuration logic for Bulwark.
//!
//! Everything here works on in-memory maps and an explicitly passed
//! [`SettingsSchema`](bulwark_core::SettingsSchema):
//!
//! - [`merge`] flattens the global map and the service maps into one
//!   environment, prefixing service keys with their primary identifier.
//! - [`split_environment`] is its inverse, for stores that keep the flat form.
//! - [`validate`] checks proposed values against setting contexts and regexes.
//! - [`envfile`] reads and writes the sorted `KEY=VALUE` representation.

pub mod envfile;
pub mod merge;
pub mod validate;

pub use envfile::{parse_env_str, read_env_file, to_env_string, write_env_file};
pub use merge::{KeyScope, classify_key, merge, primary_identifier, service_identifiers, split_environment};
pub use validate::{ValidationResult, validate};
