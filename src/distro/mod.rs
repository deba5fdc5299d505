//! Distro provisioning variants.
//!
//! Each variant runs the same shape of sequence with distro-specific
//! commands: baseline dependencies, desktop environment, distro fixes,
//! cosmetic rebranding. The set of variants is closed; the orchestrator
//! selects one by exhaustive match on [`Distro`], so an unknown distro
//! cannot reach a provisioner at all. Desktop compatibility is already
//! guaranteed by the wizard; a provisioner hitting an incompatible
//! desktop is an internal invariant violation and fails the run.

pub mod arch;
pub mod debian;
pub mod fedora;
pub mod ubuntu;

use std::fs;

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use tracing::{debug, info};

use crate::chroot::ChrootRunner;
use crate::config::{BuildConfig, DesktopEnvironment, Distro};
use crate::error::BuilderError;
use crate::patcher::TargetFile;

pub use arch::ArchProvisioner;
pub use debian::DebianProvisioner;
pub use fedora::FedoraProvisioner;
pub use ubuntu::UbuntuProvisioner;

/// Cosmetic suffix appended to the os-release name fields.
pub const BRAND_SUFFIX: &str = " (Eupnea)";

/// Everything a provisioning step needs: the validated configuration and
/// the chroot channel into the mounted target.
pub struct ProvisionContext<'a> {
    pub config: &'a BuildConfig,
    pub chroot: ChrootRunner,
    /// Identifier of the target's root partition, produced by the
    /// partitioning collaborator. Threaded through for the variants that
    /// reference it in boot configuration.
    pub root_partuuid: String,
    /// In dry-run mode the provisioners mutate nothing on the target:
    /// the executor skips commands on its own, and every file edit going
    /// through this context is logged instead of applied.
    pub dry_run: bool,
}

impl ProvisionContext<'_> {
    pub fn desktop(&self) -> DesktopEnvironment {
        self.config.desktop
    }

    /// Resolves a target-relative path (e.g. `etc/pacman.conf`) against
    /// the mounted rootfs.
    pub fn target_path(&self, relative: &str) -> Utf8PathBuf {
        self.chroot.rootfs().join(relative.trim_start_matches('/'))
    }

    /// Loads a target file, applies `patch` and writes the result back.
    /// In dry-run mode the file is never opened; the planned edit is
    /// logged so the run works against an unmounted target too.
    pub fn patch_file(
        &self,
        relative: &str,
        patch: impl FnOnce(&mut TargetFile) -> Result<(), BuilderError>,
    ) -> Result<()> {
        let path = self.target_path(relative);
        if self.dry_run {
            info!("dry run: would patch {}", path);
            return Ok(());
        }
        let mut file = TargetFile::load(path)?;
        patch(&mut file)?;
        file.write()?;
        Ok(())
    }
}

/// One distro's provisioning behavior.
///
/// `provision` runs the capabilities strictly in sequence; each step
/// assumes the target filesystem state left by the previous one. A
/// failing step aborts the whole run with no rollback.
pub trait DistroProvisioner {
    fn name(&self) -> &'static str;

    /// Refreshes package metadata and installs baseline dependencies
    /// (network manager, sudo, firmware, build essentials). Fatal on
    /// failure; nothing else can succeed without them.
    fn install_dependencies(&self, ctx: &ProvisionContext) -> Result<()>;

    /// Installs the requested desktop environment and enables its
    /// login service. `cli` installs nothing and enables nothing.
    fn install_desktop_environment(&self, ctx: &ProvisionContext) -> Result<()>;

    /// Applies distro-specific post-install fixes.
    fn apply_distro_fixes(&self, ctx: &ProvisionContext) -> Result<()>;

    /// Appends the Eupnea suffix to the os-release name fields.
    fn rebrand(&self, ctx: &ProvisionContext) -> Result<()>;

    /// Runs the full ordered sequence for this distro.
    fn provision(&self, ctx: &ProvisionContext) -> Result<()> {
        info!("configuring {}", self.name());
        debug!(rootfs = %ctx.chroot.rootfs(), root_partuuid = %ctx.root_partuuid);

        info!("installing dependencies");
        self.install_dependencies(ctx)
            .with_context(|| format!("failed to install {} dependencies", self.name()))?;

        info!("downloading and installing de, might take a while");
        self.install_desktop_environment(ctx)
            .with_context(|| format!("failed to install desktop environment on {}", self.name()))?;
        info!("desktop environment setup complete");

        self.apply_distro_fixes(ctx)
            .with_context(|| format!("failed to apply {} fixes", self.name()))?;

        self.rebrand(ctx)
            .with_context(|| format!("failed to rebrand {}", self.name()))?;

        info!("{} configuration complete", self.name());
        Ok(())
    }
}

/// Selects the provisioner variant for a distro.
pub fn provisioner_for(distro: Distro) -> Box<dyn DistroProvisioner> {
    match distro {
        Distro::Ubuntu => Box::new(UbuntuProvisioner),
        Distro::Debian => Box::new(DebianProvisioner),
        Distro::Arch => Box::new(ArchProvisioner),
        Distro::Fedora => Box::new(FedoraProvisioner),
    }
}

/// Appends the brand suffix inside the quotes of the given os-release
/// keys. Cosmetic only, but a missing key still fails loudly: it means
/// the release shipped a different os-release layout.
pub(crate) fn rebrand_os_release(ctx: &ProvisionContext, keys: &[&str]) -> Result<()> {
    ctx.patch_file("etc/os-release", |file| {
        for key in keys {
            file.amend_quoted_value(key, BRAND_SUFFIX)?;
        }
        Ok(())
    })
}

/// Copies the util-linux securetty example over `/etc/securetty`.
///
/// Works around a gdm3 login failure on apt distros; the example file is
/// not shipped by every release, so a missing source is tolerated.
pub(crate) fn copy_securetty_example(ctx: &ProvisionContext) -> Result<()> {
    let source = ctx.target_path("usr/share/doc/util-linux/examples/securetty");
    let dest = ctx.target_path("etc/securetty");
    if ctx.dry_run {
        info!("dry run: would copy {} to {}", source, dest);
        return Ok(());
    }
    match fs::copy(&source, &dest) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("securetty example not present, skipping");
            Ok(())
        }
        Err(e) => Err(BuilderError::io(format!("failed to copy {} to {}", source, dest), e).into()),
    }
}

/// Removes a stray xsession entry, tolerating its absence.
pub(crate) fn remove_xsession_entry(ctx: &ProvisionContext, name: &str) -> Result<()> {
    let path = ctx.target_path(&format!("usr/share/xsessions/{}", name));
    if ctx.dry_run {
        info!("dry run: would remove {}", path);
        return Ok(());
    }
    match fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(BuilderError::io(path.to_string(), e).into()),
    }
}
