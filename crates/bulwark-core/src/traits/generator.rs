// SPDX-FileCopyrightText: 2026 Bulwark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! External generator trait.

use std::path::Path;

use async_trait::async_trait;

use crate::error::BulwarkError;
use crate::types::GeneratorOutput;

/// The external process that turns a stable environment file into runnable
/// proxy configuration.
#[async_trait]
pub trait Generator: Send + Sync + 'static {
    /// Run the generator against `variables`, tagging the call with `method`.
    ///
    /// A generator that ran but exited non-zero returns `Ok` with the exit
    /// code; `Err` is reserved for failing to run it at all.
    async fn generate(&self, variables: &Path, method: &str)
    -> Result<GeneratorOutput, BulwarkError>;
}
