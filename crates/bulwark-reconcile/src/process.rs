// SPDX-FileCopyrightText: 2026 Bulwark Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generator backed by an external program.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use bulwark_core::{BulwarkError, Generator, GeneratorOutput};

/// Runs `{program} {args..} --variables <file> --method <method>`.
///
/// stdin is closed; stdout and stderr are captured and returned together.
#[derive(Debug, Clone)]
pub struct ProcessGenerator {
    program: String,
    args: Vec<String>,
}

impl ProcessGenerator {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

#[async_trait]
impl Generator for ProcessGenerator {
    async fn generate(&self, variables: &Path, method: &str) -> Result<GeneratorOutput, BulwarkError> {
        tracing::debug!(program = %self.program, variables = %variables.display(), method, "spawning generator");

        let output = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .arg("--variables")
            .arg(variables)
            .arg("--method")
            .arg(method)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| BulwarkError::Internal(format!("failed to run generator `{}`: {e}", self.program)))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let combined = if stderr.is_empty() {
            stdout.into_owned()
        } else {
            format!("{stdout}{stderr}")
        };

        Ok(GeneratorOutput {
            code: output.status.code(),
            output: combined,
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn shell(script: &str) -> ProcessGenerator {
        ProcessGenerator::new("sh", vec!["-c".into(), script.into(), "generator".into()])
    }

    #[tokio::test]
    async fn passes_variables_and_method() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "SERVER_NAME=a.com").unwrap();

        let output = shell(r#"echo "$1 $3 $4"; cat "$2""#)
            .generate(file.path(), "ui")
            .await
            .unwrap();
        assert!(output.success());
        assert_eq!(output.output, "--variables --method ui\nSERVER_NAME=a.com");
    }

    #[tokio::test]
    async fn non_zero_exit_is_reported_not_raised() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let output = shell("echo broken >&2; exit 3")
            .generate(file.path(), "ui")
            .await
            .unwrap();
        assert_eq!(output.code, Some(3));
        assert_eq!(output.output, "broken\n");
    }

    #[tokio::test]
    async fn missing_program_is_an_error() {
        let generator = ProcessGenerator::new("/nonexistent/bulwark-generator", Vec::new());
        let result = generator.generate(Path::new("/tmp/x.env"), "ui").await;
        assert!(matches!(result, Err(BulwarkError::Internal(_))));
    }
}
