// SPDX-FileCopyrightText: 2026 Bulwark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Bulwark integration tests.
//!
//! # Components
//!
//! - [`MemoryStore`] - In-memory config store that records every written environment
//! - [`ScriptedGenerator`] - Generator stand-in with scripted exit codes and captured inputs
//! - [`CatalogFixture`] - Settings file and plugin directories in a temp dir

pub mod fixture;
pub mod memory_store;
pub mod scripted_generator;

pub use fixture::CatalogFixture;
pub use memory_store::MemoryStore;
pub use scripted_generator::{GeneratorCall, ScriptedGenerator};
