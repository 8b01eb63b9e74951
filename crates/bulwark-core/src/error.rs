// SPDX-FileCopyrightText: 2026 Bulwark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for Bulwark.
//!
//! Only fatal conditions live here. Operation-level refusals (missing service,
//! name collision, rejected variables) are reported as outcomes, not errors.

use thiserror::Error;

/// The primary error type used across Bulwark crates and adapter traits.
#[derive(Debug, Error)]
pub enum BulwarkError {
    /// Configuration errors (unreadable settings file, malformed service map).
    #[error("configuration error: {0}")]
    Config(String),

    /// Plugin discovery or packaging errors.
    #[error("plugin error: {message}")]
    Plugin {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The config store failed to read or write.
    #[error("store error: {source}")]
    Store {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A map could not be written as a stable environment file.
    #[error("environment error: {0}")]
    Environment(String),

    /// The external generator exited unsuccessfully.
    #[error("{}", generation_message(*code))]
    Generation { code: Option<i32>, output: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

fn generation_message(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("error from generator (return code = {code})"),
        None => "error from generator (terminated by signal)".to_string(),
    }
}

impl BulwarkError {
    /// Wrap any error as a store failure.
    pub fn store(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        BulwarkError::Store {
            source: Box::new(err),
        }
    }

    /// Build a plugin error from a message and an underlying cause.
    pub fn plugin(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        BulwarkError::Plugin {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_error_reports_return_code() {
        let err = BulwarkError::Generation {
            code: Some(2),
            output: "boom".into(),
        };
        assert_eq!(err.to_string(), "error from generator (return code = 2)");
    }

    #[test]
    fn generation_error_without_code_mentions_signal() {
        let err = BulwarkError::Generation {
            code: None,
            output: String::new(),
        };
        assert!(err.to_string().contains("signal"));
    }

    #[test]
    fn store_helper_keeps_source_message() {
        let err = BulwarkError::store(std::io::Error::other("disk gone"));
        assert_eq!(err.to_string(), "store error: disk gone");
    }
}
