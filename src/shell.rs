//! External command runner used as a per-line operation by the CLI.

use crate::error::{FanoutError, Result};
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;

/// Replaced by the input line in command arguments.
pub const PLACEHOLDER: &str = "{}";

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("command failed for `{input}` ({status}): {stderr}")]
    Failed {
        input: String,
        status: String,
        stderr: String,
    },
}

/// A program plus argument template, run once per input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand {
    program: String,
    args: Vec<String>,
}

impl ShellCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from a full argv (`program arg...`).
    pub fn from_argv(argv: Vec<String>) -> Result<Self> {
        let mut argv = argv.into_iter();
        let program = argv
            .next()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| FanoutError::Other("missing command to run".into()))?;
        Ok(Self::new(program, argv.collect()))
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments for one input line. `{}` is substituted everywhere it occurs;
    /// without any placeholder the line is appended as the last argument.
    pub fn args_for(&self, input: &str) -> Vec<String> {
        if self.args.iter().any(|a| a.contains(PLACEHOLDER)) {
            self.args
                .iter()
                .map(|a| a.replace(PLACEHOLDER, input))
                .collect()
        } else {
            let mut args = self.args.clone();
            args.push(input.to_string());
            args
        }
    }

    /// Run for `input` and return raw stdout. Non-zero exit is an error.
    pub async fn run(&self, input: &str) -> std::result::Result<String, CommandError> {
        let output = Command::new(&self.program)
            .args(self.args_for(input))
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| CommandError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(CommandError::Failed {
                input: input.to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Run and keep only the exit status.
    pub async fn status(&self, input: &str) -> std::result::Result<(), CommandError> {
        self.run(input).await.map(|_| ())
    }

    /// Run and return trimmed stdout.
    pub async fn stdout(&self, input: &str) -> std::result::Result<String, CommandError> {
        self.run(input).await.map(|out| out.trim().to_string())
    }

    /// Run and return trimmed stdout, or `None` when it is empty.
    pub async fn stdout_nonempty(
        &self,
        input: &str,
    ) -> std::result::Result<Option<String>, CommandError> {
        let out = self.stdout(input).await?;
        Ok((!out.is_empty()).then_some(out))
    }

    /// Run and return each non-blank stdout line.
    pub async fn stdout_lines(&self, input: &str) -> std::result::Result<Vec<String>, CommandError> {
        let out = self.run(input).await?;
        Ok(out
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_placeholder_substitution() {
        let cmd = ShellCommand::from_argv(argv(&["sh", "-c", "echo {}-{}"])).unwrap();
        assert_eq!(cmd.program(), "sh");
        assert_eq!(cmd.args_for("x"), argv(&["-c", "echo x-x"]));
    }

    #[test]
    fn test_line_appended_without_placeholder() {
        let cmd = ShellCommand::from_argv(argv(&["echo", "-n"])).unwrap();
        assert_eq!(cmd.args_for("hello"), argv(&["-n", "hello"]));
    }

    #[test]
    fn test_empty_argv_is_rejected() {
        assert!(ShellCommand::from_argv(vec![]).is_err());
        assert!(ShellCommand::from_argv(argv(&["  "])).is_err());
    }

    #[tokio::test]
    async fn test_stdout_shapes() {
        let cmd = ShellCommand::from_argv(argv(&["sh", "-c", "printf '{}\\n{}\\n'"])).unwrap();
        assert_eq!(cmd.stdout("a").await.unwrap(), "a\na");
        assert_eq!(cmd.stdout_lines("b").await.unwrap(), argv(&["b", "b"]));

        let silent = ShellCommand::from_argv(argv(&["sh", "-c", "true {}"])).unwrap();
        assert_eq!(silent.stdout_nonempty("x").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_failure() {
        let cmd = ShellCommand::from_argv(argv(&["sh", "-c", "echo oops >&2; exit 3"])).unwrap();
        match cmd.status("input").await {
            Err(CommandError::Failed { input, stderr, .. }) => {
                assert_eq!(input, "input");
                assert_eq!(stderr, "oops");
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let cmd = ShellCommand::new("definitely-not-a-real-program-fanout", vec![]);
        assert!(matches!(
            cmd.status("x").await,
            Err(CommandError::Spawn { .. })
        ));
    }
}
