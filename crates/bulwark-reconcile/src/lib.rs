// SPDX-FileCopyrightText: 2026 Bulwark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service lifecycle orchestration for Bulwark.
//!
//! The [`Reconciler`] reads the current state from a [`ConfigStore`],
//! applies one change in memory, validates it, writes the merged
//! environment to a temporary file for the [`Generator`], and only commits
//! to the store once the generator succeeded.
//!
//! [`ProcessGenerator`] and [`FileStore`] are the in-tree adapters used by
//! the CLI.
//!
//! [`ConfigStore`]: bulwark_core::ConfigStore
//! [`Generator`]: bulwark_core::Generator

pub mod file_store;
pub mod outcome;
pub mod process;
pub mod reconciler;

pub use file_store::FileStore;
pub use outcome::{Outcome, OutcomeKind};
pub use process::ProcessGenerator;
pub use reconciler::Reconciler;
