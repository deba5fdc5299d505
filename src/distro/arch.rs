//! Arch provisioner (pacman).

use anyhow::Result;

use super::{DistroProvisioner, ProvisionContext, rebrand_os_release};
use crate::config::DesktopEnvironment;

/// First worldwide mirror in the stock mirrorlist; uncommented so pacman
/// works before reflector ever runs.
const WORLDWIDE_MIRROR_ANCHOR: &str = "geo.mirror.pkgbuild.com";

/// Pacman's free-space pre-check. It misbehaves when pacman runs inside
/// a chroot, so it is commented out for the duration of the run and
/// restored afterwards. Arch-specific; apt and dnf need no such fix.
const CHECKSPACE_ANCHOR: &str = "CheckSpace";

pub struct ArchProvisioner;

impl DistroProvisioner for ArchProvisioner {
    fn name(&self) -> &'static str {
        "arch"
    }

    fn install_dependencies(&self, ctx: &ProvisionContext) -> Result<()> {
        ctx.patch_file("etc/pacman.d/mirrorlist", |f| {
            f.uncomment_containing(WORLDWIDE_MIRROR_ANCHOR)
        })?;

        // arch-chroot refuses to operate on a plain directory; bind-mount
        // the target onto itself so it looks like a mount point.
        let rootfs = ctx.chroot.rootfs().as_str();
        ctx.chroot
            .run_host_checked("mount", &["--bind", rootfs, rootfs])?;

        ctx.patch_file("etc/pacman.conf", |f| {
            f.comment_containing(CHECKSPACE_ANCHOR)
        })?;

        ctx.chroot.run_checked("pacman-key --init")?;
        ctx.chroot.run_checked("pacman-key --populate archlinux")?;
        ctx.chroot.run_checked("pacman -Syy --noconfirm")?;
        ctx.chroot.run_checked("pacman -Syu --noconfirm")?;
        ctx.chroot.run_checked(
            "pacman -S --noconfirm base base-devel nano networkmanager xkeyboard-config \
             linux-firmware sudo cloud-utils",
        )?;
        Ok(())
    }

    fn install_desktop_environment(&self, ctx: &ProvisionContext) -> Result<()> {
        match ctx.desktop() {
            DesktopEnvironment::Gnome => {
                ctx.chroot
                    .run_checked("pacman -S --noconfirm gnome gnome-extra gnome-initial-setup")?;
                ctx.chroot.run_checked("systemctl enable gdm.service")?;
            }
            DesktopEnvironment::Kde => {
                ctx.chroot.run_checked(
                    "pacman -S --noconfirm plasma-meta plasma-wayland-session kde-applications",
                )?;
                ctx.chroot.run_checked("systemctl enable sddm.service")?;
            }
            DesktopEnvironment::Mate => {
                // no wayland support in mate
                ctx.chroot.run_checked(
                    "pacman -S --noconfirm mate mate-extra xorg xorg-server lightdm \
                     lightdm-gtk-greeter",
                )?;
                ctx.chroot.run_checked("systemctl enable lightdm.service")?;
            }
            DesktopEnvironment::Xfce => {
                // no wayland support in xfce
                ctx.chroot.run_checked(
                    "pacman -S --noconfirm xfce4 xfce4-goodies xorg xorg-server lightdm \
                     lightdm-gtk-greeter",
                )?;
                ctx.chroot.run_checked("systemctl enable lightdm.service")?;
            }
            DesktopEnvironment::Lxqt => {
                ctx.chroot
                    .run_checked("pacman -S --noconfirm lxqt breeze-icons xorg xorg-server sddm")?;
                ctx.chroot.run_checked("systemctl enable sddm.service")?;
            }
            DesktopEnvironment::Deepin => {
                ctx.chroot.run_checked(
                    "pacman -S --noconfirm deepin deepin-kwin deepin-extra xorg xorg-server \
                     lightdm",
                )?;
                // deepin ships its own greeter, lightdm defaults to gtk
                ctx.patch_file("etc/lightdm/lightdm.conf", |f| {
                    f.append_line("greeter-session=lightdm-deepin-greeter");
                    Ok(())
                })?;
                ctx.chroot.run_checked("systemctl enable lightdm.service")?;
            }
            DesktopEnvironment::Budgie => {
                ctx.chroot.run_checked(
                    "pacman -S --noconfirm budgie-desktop budgie-desktop-view budgie-screensaver \
                     budgie-control-center lightdm lightdm-gtk-greeter",
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
        ctx.chroot
            .run_checked("systemctl enable NetworkManager.service")?;

        ctx.patch_file("etc/sudoers", |f| f.uncomment_all_containing("%wheel"))?;

        tracing::info!("restoring pacman config");
        ctx.patch_file("etc/pacman.conf", |f| {
            f.uncomment_containing(CHECKSPACE_ANCHOR)
        })?;
        Ok(())
    }

    fn rebrand(&self, ctx: &ProvisionContext) -> Result<()> {
        rebrand_os_release(ctx, &["NAME", "PRETTY_NAME"])
    }
}
