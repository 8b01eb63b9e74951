// SPDX-FileCopyrightText: 2026 Bulwark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted generator for deterministic testing.
//!
//! `ScriptedGenerator` returns queued exit codes (0 once the queue is empty)
//! and snapshots the variables file it was handed, since the caller removes
//! that file as soon as the call returns.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use bulwark_core::{BulwarkError, Generator, GeneratorOutput};

/// One recorded generator invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorCall {
    pub variables: PathBuf,
    pub method: String,
    /// Content of the variables file at call time.
    pub contents: String,
}

/// A generator that never spawns anything.
pub struct ScriptedGenerator {
    exit_codes: Arc<Mutex<VecDeque<i32>>>,
    calls: Arc<Mutex<Vec<GeneratorCall>>>,
}

impl ScriptedGenerator {
    /// A generator that always succeeds.
    pub fn new() -> Self {
        Self {
            exit_codes: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A generator whose next call exits with `code`.
    pub fn failing(code: i32) -> Self {
        Self {
            exit_codes: Arc::new(Mutex::new(VecDeque::from([code]))),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue the exit code of a future call.
    pub async fn push_exit_code(&self, code: i32) {
        self.exit_codes.lock().await.push_back(code);
    }

    /// All recorded calls, oldest first.
    pub async fn calls(&self) -> Vec<GeneratorCall> {
        self.calls.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }
}

impl Default for ScriptedGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, variables: &Path, method: &str) -> Result<GeneratorOutput, BulwarkError> {
        let contents = tokio::fs::read_to_string(variables)
            .await
            .map_err(|e| BulwarkError::Internal(format!("variables file unreadable: {e}")))?;
        self.calls.lock().await.push(GeneratorCall {
            variables: variables.to_path_buf(),
            method: method.to_string(),
            contents,
        });

        let code = self.exit_codes.lock().await.pop_front().unwrap_or(0);
        Ok(GeneratorOutput {
            code: Some(code),
            output: format!("scripted generator exited with {code}"),
        })
    }
}
