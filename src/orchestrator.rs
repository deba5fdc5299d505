//! Provisioning orchestrator.
//!
//! Takes the handoff from the top-level driver, selects the distro
//! variant matching the build configuration and runs it to completion.
//! Provisioning is not resumable: the first fatal step error aborts the
//! run, leaving the target filesystem in whatever state the last
//! successful step produced for post-mortem inspection.

use std::sync::Arc;

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use tracing::info;

use crate::chroot::{ChrootFlavor, ChrootRunner};
use crate::config::{BuildConfig, Distro, KernelType};
use crate::distro::{ProvisionContext, provisioner_for};
use crate::executor::CommandExecutor;

/// Where the driver mounts the target root filesystem.
pub const TARGET_MOUNT: &str = "/mnt/eupnea";

/// Handoff contract from the top-level driver.
///
/// Kernel selection, dev builds and local artifact paths are consumed by
/// the excluded download/partitioning collaborators; they are carried
/// here so one value describes the whole run.
#[derive(Debug)]
pub struct BuildRequest {
    /// Run-wide verbosity. Informational at this boundary: the executor
    /// built by the driver already carries the same value and owns the
    /// streaming behavior; it is recorded here with the run log.
    pub verbose: bool,
    /// Dry-run mode. The executor skips command execution on its own;
    /// this value additionally disables the provisioners' file edits.
    pub dry_run: bool,
    pub kernel_type: KernelType,
    pub dev_release: bool,
    pub local_path: Option<Utf8PathBuf>,
    /// Name of the invoking (pre-elevation) user.
    pub user_id: String,
    pub config: BuildConfig,
}

/// Runs the full provisioning sequence for the request's distro against
/// the mounted target at `rootfs`.
pub fn run_provisioning(
    request: &BuildRequest,
    rootfs: &Utf8Path,
    root_partuuid: &str,
    executor: Arc<dyn CommandExecutor>,
) -> Result<()> {
    let config = &request.config;
    info!(
        distro = %config.distro,
        version = %config.distro_version,
        desktop = %config.desktop,
        device = %config.device,
        user = %request.user_id,
        verbose = request.verbose,
        dry_run = request.dry_run,
        "starting provisioning run"
    );

    let flavor = match config.distro {
        Distro::Arch => ChrootFlavor::ArchChroot,
        Distro::Ubuntu | Distro::Debian | Distro::Fedora => ChrootFlavor::Chroot,
    };
    let ctx = ProvisionContext {
        config,
        chroot: ChrootRunner::new(rootfs, flavor, executor),
        root_partuuid: root_partuuid.to_string(),
        dry_run: request.dry_run,
    };

    let provisioner = provisioner_for(config.distro);
    provisioner
        .provision(&ctx)
        .with_context(|| format!("provisioning failed for {}", provisioner.name()))?;

    info!("provisioning run completed successfully");
    Ok(())
}
