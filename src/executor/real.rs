//! Real command executor implementation.
//!
//! This module provides [`RealCommandExecutor`], which executes commands
//! using `std::process::Command`. stdout is always captured for the
//! caller; both streams are mirrored to the log only in verbose mode.

use std::process::{Child, Command, Stdio};
use std::thread;
use std::thread::JoinHandle;

use anyhow::{Context, Result};
use which::which;

use super::pipe::{drain_stderr_pipe, panic_message, read_stdout_pipe};
use super::{CommandExecutor, CommandSpec, ExecutionResult};
use crate::error::BuilderError;

/// Cleans up a child process and its associated reader threads.
///
/// Kills the child process, waits for it to terminate, and joins the
/// given reader threads to prevent resource leaks. Called from error
/// paths in [`RealCommandExecutor::execute()`].
fn cleanup_child_process<T, I>(child: &mut Child, handles: I)
where
    I: IntoIterator<Item = JoinHandle<T>>,
{
    let pid = child.id();
    if let Err(e) = child.kill() {
        tracing::debug!(pid = pid, "kill returned error (process may have already exited): {}", e);
    }
    if let Err(e) = child.wait() {
        tracing::warn!(pid = pid, "failed to wait for child process after kill: {}", e);
    }
    for handle in handles {
        if let Err(e) = handle.join() {
            tracing::warn!("reader thread panicked during cleanup: {}", panic_message(&*e));
        }
    }
}

/// Command executor that runs actual system commands.
///
/// When `verbose` is true, all command output is streamed to the log in
/// real-time; when false, output is suppressed entirely (stdout is still
/// captured for the caller). When `dry_run` is true, commands are logged
/// but not executed, and `execute()` returns an empty successful result.
pub struct RealCommandExecutor {
    pub verbose: bool,
    pub dry_run: bool,
}

impl CommandExecutor for RealCommandExecutor {
    fn execute(&self, spec: &CommandSpec) -> Result<ExecutionResult> {
        if self.dry_run {
            tracing::info!("dry run: {}", spec.display());
            return Ok(ExecutionResult {
                status: None,
                stdout: String::new(),
            });
        }

        let cmd =
            which(&spec.command).with_context(|| format!("command not found: {}", spec.command))?;
        tracing::trace!("command found: {}: {}", spec.command, cmd.to_string_lossy());

        let mut command = Command::new(cmd);
        command.args(&spec.args);

        for (key, value) in &spec.env {
            command.env(key, value);
        }

        command.stdout(Stdio::piped());
        command.stderr(Stdio::piped());

        let mut child = command
            .spawn()
            .with_context(|| format!("failed to spawn command `{}`", spec.display()))?;

        tracing::trace!("spawned command: {}: pid={}", spec.command, child.id());

        let stdout_pipe = child.stdout.take();
        let stderr_pipe = child.stderr.take();
        let verbose = self.verbose;

        let stdout_handle = match thread::Builder::new()
            .name("stdout-reader".to_string())
            .spawn(move || read_stdout_pipe(stdout_pipe, verbose))
        {
            Ok(handle) => handle,
            Err(e) => {
                cleanup_child_process::<String, _>(&mut child, []);
                return Err(BuilderError::Execution {
                    command: spec.display(),
                    status: format!("failed to spawn stdout reader thread: {}", e),
                }
                .into());
            }
        };

        let stderr_handle = match thread::Builder::new()
            .name("stderr-reader".to_string())
            .spawn(move || drain_stderr_pipe(stderr_pipe, verbose))
        {
            Ok(handle) => handle,
            Err(e) => {
                cleanup_child_process(&mut child, [stdout_handle]);
                return Err(BuilderError::Execution {
                    command: spec.display(),
                    status: format!("failed to spawn stderr reader thread: {}", e),
                }
                .into());
            }
        };

        let status = match child.wait() {
            Ok(s) => s,
            Err(e) => {
                // If waiting fails, the process might still be running.
                // Kill it and clean up threads to prevent resource leaks.
                cleanup_child_process(&mut child, [stdout_handle]);
                if let Err(p) = stderr_handle.join() {
                    tracing::warn!("stderr reader thread panicked during cleanup: {}", panic_message(&*p));
                }
                return Err(BuilderError::Execution {
                    command: spec.display(),
                    status: format!("failed to wait for command: {}", e),
                }
                .into());
            }
        };

        let stdout = match stdout_handle.join() {
            Ok(captured) => captured,
            Err(e) => {
                let msg = panic_message(&*e);
                tracing::error!(stream = "stdout", panic = msg, "reader thread panicked");
                return Err(BuilderError::Execution {
                    command: spec.display(),
                    status: format!("stdout reader thread panicked: {}", msg),
                }
                .into());
            }
        };
        if let Err(e) = stderr_handle.join() {
            let msg = panic_message(&*e);
            tracing::error!(stream = "stderr", panic = msg, "reader thread panicked");
            return Err(BuilderError::Execution {
                command: spec.display(),
                status: format!("stderr reader thread panicked: {}", msg),
            }
            .into());
        }

        tracing::trace!("executed command: {}: success={}", spec.command, status.success());

        Ok(ExecutionResult {
            status: Some(status),
            stdout,
        })
    }
}
