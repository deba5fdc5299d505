//! Debian provisioner (apt).

use anyhow::{Result, bail};

use super::{
    DistroProvisioner, ProvisionContext, copy_securetty_example, rebrand_os_release,
    remove_xsession_entry,
};
use crate::config::DesktopEnvironment;

/// Skips the interactive locale questions apt packages like to ask.
const NONINTERACTIVE: [(&str, &str); 1] = [("DEBIAN_FRONTEND", "noninteractive")];

pub struct DebianProvisioner;

impl DistroProvisioner for DebianProvisioner {
    fn name(&self) -> &'static str {
        "debian"
    }

    fn install_dependencies(&self, ctx: &ProvisionContext) -> Result<()> {
        ctx.chroot.run_checked("apt-get update -y")?;
        // add-apt-repository lives in software-properties-common
        ctx.chroot
            .run_checked("apt-get install -y software-properties-common")?;
        ctx.chroot.run_checked("add-apt-repository -y non-free")?;
        ctx.chroot.run_checked("apt-get update -y")?;
        ctx.chroot.run_checked(
            "apt-get install -y network-manager sudo firmware-linux-free cloud-utils \
             firmware-linux-nonfree firmware-iwlwifi iw git",
        )?;
        Ok(())
    }

    fn install_desktop_environment(&self, ctx: &ProvisionContext) -> Result<()> {
        let install = |packages: &str| {
            ctx.chroot.run_checked_with_env(
                &format!("apt-get install -y {}", packages),
                &NONINTERACTIVE,
            )
        };
        match ctx.desktop() {
            DesktopEnvironment::Gnome => install("gnome/stable gnome-initial-setup")?,
            DesktopEnvironment::Kde => install("task-kde-desktop")?,
            DesktopEnvironment::Mate => {
                install("mate-desktop-environment mate-desktop-environment-extras gdm3")?
            }
            DesktopEnvironment::Xfce => install("task-xfce-desktop")?,
            DesktopEnvironment::Lxqt => install("task-lxqt-desktop")?,
            DesktopEnvironment::Deepin => {
                // The wizard never returns this pair; reaching it means a
                // caller bypassed validation.
                bail!("internal error: deepin is not available for debian")
            }
            DesktopEnvironment::Budgie => {
                install(
                    "budgie-desktop budgie-indicator-applet budgie-core lightdm \
                     lightdm-gtk-greeter",
                )?;
                ctx.chroot.run_checked("systemctl enable lightdm.service")?;
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

        // gdm3 auto-installs a minimal gnome shell; drop it when the user
        // picked a different desktop.
        if ctx.desktop() != DesktopEnvironment::Gnome {
            remove_xsession_entry(ctx, "ubuntu.desktop")?;
            ctx.chroot.run_checked("apt-get remove -y gnome-shell")?;
            ctx.chroot.run_checked("apt-get autoremove -y")?;
        }

        copy_securetty_example(ctx)?;

        // input-libinput has much better touchpad support
        tracing::info!("upgrading touchpad drivers");
        ctx.chroot
            .run_checked("apt-get remove -y xserver-xorg-input-synaptics")?;
        ctx.chroot
            .run_checked("apt-get install -y xserver-xorg-input-libinput")?;
        Ok(())
    }

    fn rebrand(&self, ctx: &ProvisionContext) -> Result<()> {
        rebrand_os_release(ctx, &["NAME", "VERSION", "PRETTY_NAME"])
    }
}
