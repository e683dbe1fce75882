//! One-shot external process execution.
//!
//! A call either yields the trimmed stdout of a zero exit, or a
//! [`CommandError`] carrying stderr (or the process failure if stderr was
//! empty). No streaming, no timeout, no retry.

use std::future::Future;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, warn};

/// A fully formed command line plus environment overrides.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandInvocation {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
}

impl CommandInvocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Printable form, for logs and error messages.
    pub fn command_line(&self) -> String {
        std::iter::once(&self.program)
            .chain(self.args.iter())
            .map(|part| {
                if part.is_empty() || part.contains(char::is_whitespace) {
                    format!("'{part}'")
                } else {
                    part.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// The process could not be started at all.
    #[error("failed to run `{command}`: {message}")]
    Spawn { command: String, message: String },
    /// The process ran and exited non-zero.
    #[error("{diagnostic}")]
    Failed {
        command: String,
        status: Option<i32>,
        diagnostic: String,
    },
}

impl CommandError {
    /// Message suitable for forwarding to a caller verbatim.
    pub fn diagnostic(&self) -> String {
        match self {
            CommandError::Spawn { .. } => self.to_string(),
            CommandError::Failed { diagnostic, .. } => diagnostic.clone(),
        }
    }
}

/// Something that can execute a [`CommandInvocation`].
pub trait CommandRunner: Send + Sync + 'static {
    fn run(
        &self,
        invocation: CommandInvocation,
    ) -> impl Future<Output = Result<String, CommandError>> + Send;
}

/// Runs invocations as real child processes (no shell involved).
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    async fn run(&self, invocation: CommandInvocation) -> Result<String, CommandError> {
        let command = invocation.command_line();
        debug!(%command, "running external command");

        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                warn!(%command, error = %e, "external command could not start");
                CommandError::Spawn {
                    command: command.clone(),
                    message: e.to_string(),
                }
            })?;

        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).trim().to_string());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let diagnostic = if stderr.is_empty() {
            format!("`{command}` exited with {}", output.status)
        } else {
            stderr
        };
        warn!(%command, status = ?output.status.code(), %diagnostic, "external command failed");
        Err(CommandError::Failed {
            command,
            status: output.status.code(),
            diagnostic,
        })
    }
}
