// SPDX-FileCopyrightText: 2026 Bulwark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter traits for the collaborators Bulwark drives but does not own.
//!
//! Both traits use `#[async_trait]` so implementations can be held as
//! `Arc<dyn ...>` by the reconciler.

pub mod generator;
pub mod store;

pub use generator::Generator;
pub use store::ConfigStore;
