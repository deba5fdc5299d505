//! Fedora provisioner (dnf).

use anyhow::{Result, bail};

use super::{DistroProvisioner, ProvisionContext, rebrand_os_release};
use crate::config::DesktopEnvironment;

pub struct FedoraProvisioner;

impl DistroProvisioner for FedoraProvisioner {
    fn name(&self) -> &'static str {
        "fedora"
    }

    fn install_dependencies(&self, ctx: &ProvisionContext) -> Result<()> {
        ctx.chroot.run_checked("dnf update -y --refresh")?;
        ctx.chroot.run_checked(
            "dnf install -y NetworkManager sudo linux-firmware cloud-utils git",
        )?;
        Ok(())
    }

    fn install_desktop_environment(&self, ctx: &ProvisionContext) -> Result<()> {
        match ctx.desktop() {
            DesktopEnvironment::Gnome => {
                ctx.chroot.run_checked(
                    "dnf install -y @workstation-product-environment gnome-initial-setup",
                )?;
                ctx.chroot.run_checked("systemctl enable gdm.service")?;
            }
            DesktopEnvironment::Kde => {
                ctx.chroot
                    .run_checked("dnf install -y @kde-desktop-environment")?;
                ctx.chroot.run_checked("systemctl enable sddm.service")?;
            }
            DesktopEnvironment::Mate => {
                ctx.chroot
                    .run_checked("dnf install -y @mate-desktop-environment lightdm")?;
                ctx.chroot.run_checked("systemctl enable lightdm.service")?;
            }
            DesktopEnvironment::Xfce => {
                ctx.chroot
                    .run_checked("dnf install -y @xfce-desktop-environment")?;
                ctx.chroot.run_checked("systemctl enable lightdm.service")?;
            }
            DesktopEnvironment::Lxqt => {
                ctx.chroot
                    .run_checked("dnf install -y @lxqt-desktop-environment")?;
                ctx.chroot.run_checked("systemctl enable sddm.service")?;
            }
            DesktopEnvironment::Deepin => {
                ctx.chroot
                    .run_checked("dnf install -y @deepin-desktop-environment")?;
                ctx.chroot.run_checked("systemctl enable lightdm.service")?;
            }
            DesktopEnvironment::Budgie => {
                // The wizard never returns this pair; reaching it means a
                // caller bypassed validation.
                bail!("internal error: budgie is not available for fedora")
            }
            DesktopEnvironment::Cli => {
                tracing::info!("skipping desktop environment install");
            }
        }
        Ok(())
    }

    fn apply_distro_fixes(&self, ctx: &ProvisionContext) -> Result<()> {
        if ctx.desktop() != DesktopEnvironment::Cli {
            ctx.chroot
                .run_checked("systemctl set-default graphical.target")?;
        }
        ctx.chroot
            .run_checked("systemctl enable NetworkManager.service")?;
        Ok(())
    }

    fn rebrand(&self, ctx: &ProvisionContext) -> Result<()> {
        rebrand_os_release(ctx, &["NAME", "PRETTY_NAME"])
    }
}
