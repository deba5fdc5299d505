//! Ubuntu provisioner (apt).

use anyhow::Result;

use super::{
    DistroProvisioner, ProvisionContext, copy_securetty_example, rebrand_os_release,
};
use crate::config::DesktopEnvironment;

const NONINTERACTIVE: [(&str, &str); 1] = [("DEBIAN_FRONTEND", "noninteractive")];

pub struct UbuntuProvisioner;

impl DistroProvisioner for UbuntuProvisioner {
    fn name(&self) -> &'static str {
        "ubuntu"
    }

    fn install_dependencies(&self, ctx: &ProvisionContext) -> Result<()> {
        ctx.chroot.run_checked("apt-get update -y")?;
        ctx.chroot
            .run_checked_with_env("apt-get upgrade -y", &NONINTERACTIVE)?;
        ctx.chroot.run_checked(
            "apt-get install -y network-manager sudo linux-firmware cloud-utils \
             software-properties-common git",
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
            DesktopEnvironment::Gnome => install("ubuntu-desktop gnome-initial-setup")?,
            DesktopEnvironment::Kde => install("kubuntu-desktop")?,
            DesktopEnvironment::Mate => install("ubuntu-mate-desktop")?,
            DesktopEnvironment::Xfce => install("xubuntu-desktop")?,
            DesktopEnvironment::Lxqt => install("lubuntu-desktop")?,
            DesktopEnvironment::Deepin => {
                // deepin is not in the ubuntu archive; UbuntuDDE packages it
                ctx.chroot
                    .run_checked("add-apt-repository -y ppa:ubuntudde-dev/stable")?;
                ctx.chroot.run_checked("apt-get update -y")?;
                install("ubuntudde-dde")?;
            }
            DesktopEnvironment::Budgie => install("ubuntu-budgie-desktop")?,
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

        copy_securetty_example(ctx)?;

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
