//! Chroot command runner for the mounted target.
//!
//! This is the sole channel through which provisioning steps affect the
//! target filesystem. Each invocation is independent; no state persists
//! between calls other than what is written to the target itself.

use std::sync::Arc;

use anyhow::Result;
use camino::{Utf8Path, Utf8PathBuf};

use crate::error::BuilderError;
use crate::executor::{CommandExecutor, CommandSpec};

/// Which chroot entry command to use.
///
/// Arch rootfs tarballs ship `arch-chroot`, which bind-mounts the API
/// filesystems itself; everything else uses plain `chroot`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChrootFlavor {
    Chroot,
    ArchChroot,
}

/// Executes shell command strings with the mounted target as their
/// effective root.
pub struct ChrootRunner {
    rootfs: Utf8PathBuf,
    flavor: ChrootFlavor,
    executor: Arc<dyn CommandExecutor>,
}

impl ChrootRunner {
    pub fn new(
        rootfs: impl Into<Utf8PathBuf>,
        flavor: ChrootFlavor,
        executor: Arc<dyn CommandExecutor>,
    ) -> Self {
        Self {
            rootfs: rootfs.into(),
            flavor,
            executor,
        }
    }

    /// The mounted target root this runner operates on.
    pub fn rootfs(&self) -> &Utf8Path {
        &self.rootfs
    }

    fn spec(&self, command: &str, env: &[(&str, &str)]) -> CommandSpec {
        let (entry, shell) = match self.flavor {
            ChrootFlavor::Chroot => ("chroot", "/bin/sh"),
            ChrootFlavor::ArchChroot => ("arch-chroot", "bash"),
        };
        let mut spec = CommandSpec::new(
            entry,
            vec![
                self.rootfs.to_string(),
                shell.to_string(),
                "-c".to_string(),
                command.to_string(),
            ],
        );
        for (key, value) in env {
            spec = spec.with_env(*key, *value);
        }
        spec
    }

    /// Runs a command inside the target, failing on non-zero exit.
    ///
    /// Package-manager failures are systemic (network, repository, disk)
    /// and abort the whole run; they are never retried.
    pub fn run_checked(&self, command: &str) -> Result<()> {
        self.run_checked_with_env(command, &[])
    }

    /// Like [`run_checked`](Self::run_checked), with extra environment
    /// variables visible inside the chroot (e.g. `DEBIAN_FRONTEND`).
    pub fn run_checked_with_env(&self, command: &str, env: &[(&str, &str)]) -> Result<()> {
        let spec = self.spec(command, env);
        let result = self.executor.execute(&spec)?;
        if !result.success() {
            return Err(BuilderError::Execution {
                command: command.to_string(),
                status: match result.status {
                    Some(status) => status.to_string(),
                    None => "unknown status".to_string(),
                },
            }
            .into());
        }
        Ok(())
    }

    /// Runs a command on the host (not inside the chroot), failing on
    /// non-zero exit. Used for the few host-side steps such as the Arch
    /// self bind-mount.
    pub fn run_host_checked(&self, command: &str, args: &[&str]) -> Result<()> {
        let spec = CommandSpec::new(command, args.iter().map(|a| a.to_string()).collect());
        let result = self.executor.execute(&spec)?;
        if !result.success() {
            return Err(BuilderError::Execution {
                command: spec.display(),
                status: match result.status {
                    Some(status) => status.to_string(),
                    None => "unknown status".to_string(),
                },
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::ExecutionResult;
    use std::sync::Mutex;

    struct RecordingExecutor {
        specs: Mutex<Vec<CommandSpec>>,
        succeed: bool,
    }

    impl CommandExecutor for RecordingExecutor {
        fn execute(&self, spec: &CommandSpec) -> Result<ExecutionResult> {
            self.specs.lock().unwrap().push(spec.clone());
            if self.succeed {
                Ok(ExecutionResult {
                    status: None,
                    stdout: String::new(),
                })
            } else {
                #[cfg(unix)]
                {
                    use std::os::unix::process::ExitStatusExt;
                    Ok(ExecutionResult {
                        status: Some(std::process::ExitStatus::from_raw(256)),
                        stdout: String::new(),
                    })
                }
                #[cfg(not(unix))]
                anyhow::bail!("simulated failure")
            }
        }
    }

    fn runner(flavor: ChrootFlavor, succeed: bool) -> (ChrootRunner, Arc<RecordingExecutor>) {
        let executor = Arc::new(RecordingExecutor {
            specs: Mutex::new(Vec::new()),
            succeed,
        });
        let runner = ChrootRunner::new("/mnt/eupnea", flavor, executor.clone());
        (runner, executor)
    }

    #[test]
    fn plain_chroot_builds_sh_command_line() {
        let (runner, executor) = runner(ChrootFlavor::Chroot, true);
        runner.run_checked("apt-get update -y").unwrap();
        let specs = executor.specs.lock().unwrap();
        assert_eq!(specs[0].command, "chroot");
        assert_eq!(
            specs[0].args,
            vec!["/mnt/eupnea", "/bin/sh", "-c", "apt-get update -y"]
        );
    }

    #[test]
    fn arch_chroot_uses_bash() {
        let (runner, executor) = runner(ChrootFlavor::ArchChroot, true);
        runner.run_checked("pacman-key --init").unwrap();
        let specs = executor.specs.lock().unwrap();
        assert_eq!(specs[0].command, "arch-chroot");
        assert_eq!(specs[0].args[1], "bash");
    }

    #[test]
    fn env_is_attached_to_spec() {
        let (runner, executor) = runner(ChrootFlavor::Chroot, true);
        runner
            .run_checked_with_env("apt-get install -y gnome", &[("DEBIAN_FRONTEND", "noninteractive")])
            .unwrap();
        let specs = executor.specs.lock().unwrap();
        assert_eq!(specs[0].env[0], ("DEBIAN_FRONTEND".to_string(), "noninteractive".to_string()));
    }

    #[test]
    #[cfg(unix)]
    fn non_zero_exit_is_fatal() {
        let (runner, _) = runner(ChrootFlavor::Chroot, false);
        let err = runner.run_checked("pacman -Syu --noconfirm").unwrap_err();
        let err = err.downcast_ref::<BuilderError>().expect("typed error");
        assert!(matches!(err, BuilderError::Execution { .. }));
    }
}
