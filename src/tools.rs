//! External command execution.
//!
//! The script transpiler, stylesheet compiler, bundler, page renderer, package
//! manager, and version control are all opaque external commands. The
//! [`ToolRunner`] trait is the single seam through which the pipeline invokes
//! them, so tests can substitute a recording mock and never spawn processes.
//!
//! Command lines are split on whitespace. There is no shell: no quoting,
//! globbing, or variable expansion.
//!
//! Any spawn failure or non-zero exit is a [`ToolError`]. The pipeline treats
//! every `ToolError` as fatal for the build it belongs to.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Empty command line")]
    EmptyCommand,
    #[error("Failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` exited with {}{}", exit_label(.code), stderr_suffix(.stderr))]
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("code {c}"),
        None => "a signal".to_string(),
    }
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(":\n{trimmed}")
    }
}

impl ToolError {
    /// Exit code to propagate to the process boundary.
    pub fn exit_code(&self) -> i32 {
        match self {
            ToolError::Failed {
                code: Some(code), ..
            } if *code != 0 => *code,
            _ => 1,
        }
    }
}

/// A parsed command line: program plus arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    /// Split on whitespace. The first word is the program.
    pub fn parse(line: &str) -> Result<Self, ToolError> {
        let mut words = line.split_whitespace().map(str::to_string);
        let program = words.next().ok_or(ToolError::EmptyCommand)?;
        Ok(Self {
            program,
            args: words.collect(),
        })
    }
}

/// Where a command's output goes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// Capture stdout and stderr. Stderr is attached to failures.
    #[default]
    Capture,
    /// Share the parent's stdin, stdout, and stderr.
    Inherit,
}

/// Options for a single invocation.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub cwd: Option<PathBuf>,
    pub output: OutputMode,
}

impl RunOptions {
    pub fn in_dir(cwd: &Path) -> Self {
        Self {
            cwd: Some(cwd.to_path_buf()),
            output: OutputMode::Capture,
        }
    }

    pub fn inherit(mut self) -> Self {
        self.output = OutputMode::Inherit;
        self
    }
}

/// Captured result of a successful invocation. `stdout` is empty when the
/// output was inherited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub stdout: Vec<u8>,
}

/// Runs external commands.
pub trait ToolRunner {
    /// Run `command_line` to completion. Non-zero exit is an error.
    fn run(&self, command_line: &str, options: &RunOptions) -> Result<ToolOutput, ToolError>;
}

/// [`ToolRunner`] backed by `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct CommandRunner;

impl ToolRunner for CommandRunner {
    fn run(&self, command_line: &str, options: &RunOptions) -> Result<ToolOutput, ToolError> {
        let parsed = CommandLine::parse(command_line)?;
        let mut cmd = Command::new(&parsed.program);
        cmd.args(&parsed.args);
        if let Some(cwd) = &options.cwd {
            cmd.current_dir(cwd);
        }

        tracing::debug!(command = command_line, "running external tool");

        let spawn_error = |source: std::io::Error| ToolError::Spawn {
            command: command_line.to_string(),
            source,
        };

        match options.output {
            OutputMode::Inherit => {
                let status = cmd
                    .stdin(Stdio::inherit())
                    .stdout(Stdio::inherit())
                    .stderr(Stdio::inherit())
                    .status()
                    .map_err(spawn_error)?;
                if !status.success() {
                    return Err(ToolError::Failed {
                        command: command_line.to_string(),
                        code: status.code(),
                        stderr: String::new(),
                    });
                }
                Ok(ToolOutput::default())
            }
            OutputMode::Capture => {
                let output = cmd.stdin(Stdio::null()).output().map_err(spawn_error)?;
                if !output.status.success() {
                    return Err(ToolError::Failed {
                        command: command_line.to_string(),
                        code: output.status.code(),
                        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                    });
                }
                Ok(ToolOutput {
                    stdout: output.stdout,
                })
            }
        }
    }
}
