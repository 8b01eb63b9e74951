// SPDX-FileCopyrightText: 2026 Bulwark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operation results reported back to the caller.

use std::fmt;

/// What happened to a requested change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeKind {
    /// The change was generated and committed.
    Applied,
    /// The targeted service does not exist.
    NotFound,
    /// The new service collides with an existing primary identifier.
    AlreadyExists,
    /// The submitted variables failed validation; one message per key.
    Rejected(Vec<String>),
}

/// A human-readable message plus its kind. Nothing was written unless the
/// kind is [`OutcomeKind::Applied`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub message: String,
    pub kind: OutcomeKind,
}

impl Outcome {
    pub fn applied(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: OutcomeKind::Applied,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: OutcomeKind::NotFound,
        }
    }

    pub fn already_exists(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: OutcomeKind::AlreadyExists,
        }
    }

    /// A rejection carrying every validation message.
    pub fn rejected(messages: Vec<String>) -> Self {
        Self {
            message: messages.join("\n"),
            kind: OutcomeKind::Rejected(messages),
        }
    }

    pub fn is_success(&self) -> bool {
        self.kind == OutcomeKind::Applied
    }

    /// `0` on success, `1` otherwise.
    pub fn status_code(&self) -> i32 {
        if self.is_success() { 0 } else { 1 }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(Outcome::applied("ok").status_code(), 0);
        assert_eq!(Outcome::not_found("gone").status_code(), 1);
        assert_eq!(Outcome::already_exists("dup").status_code(), 1);
    }

    #[test]
    fn rejection_keeps_every_message() {
        let outcome = Outcome::rejected(vec!["Variable A is not valid.".into(), "Variable B is not valid.".into()]);
        assert_eq!(outcome.message, "Variable A is not valid.\nVariable B is not valid.");
        assert!(matches!(&outcome.kind, OutcomeKind::Rejected(m) if m.len() == 2));
        assert!(!outcome.is_success());
    }
}
