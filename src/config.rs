//! Build configuration model.
//!
//! The [`BuildConfig`] value is produced once by the configuration wizard
//! and consumed once by the provisioning orchestrator. It has no persisted
//! form and is never mutated after creation.

use serde::{Deserialize, Serialize};
use strum::Display;

/// Linux distribution flavors the builder can provision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Distro {
    Ubuntu,
    Debian,
    Arch,
    Fedora,
}

impl Distro {
    /// Returns true if this distro has multiple catalog releases the user
    /// picks between. Debian is resolved purely by package-manager
    /// metadata, arch is rolling.
    pub fn has_version_dialog(&self) -> bool {
        matches!(self, Distro::Ubuntu | Distro::Fedora)
    }
}

/// Desktop environments installable on the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DesktopEnvironment {
    Gnome,
    Kde,
    Mate,
    Xfce,
    Lxqt,
    Deepin,
    Budgie,
    /// No graphical session at all.
    Cli,
}

impl DesktopEnvironment {
    /// Static distro/desktop compatibility matrix.
    ///
    /// Deepin has no Debian packaging; the Fedora budgie repo was retired.
    pub fn available_on(&self, distro: Distro) -> bool {
        match self {
            DesktopEnvironment::Deepin => distro != Distro::Debian,
            DesktopEnvironment::Budgie => distro != Distro::Fedora,
            _ => true,
        }
    }

    /// Returns the desktops offered for the given distro, in prompt order.
    pub fn options_for(distro: Distro) -> Vec<DesktopEnvironment> {
        [
            DesktopEnvironment::Gnome,
            DesktopEnvironment::Kde,
            DesktopEnvironment::Mate,
            DesktopEnvironment::Xfce,
            DesktopEnvironment::Lxqt,
            DesktopEnvironment::Deepin,
            DesktopEnvironment::Budgie,
            DesktopEnvironment::Cli,
        ]
        .into_iter()
        .filter(|de| de.available_on(distro))
        .collect()
    }
}

/// Where the finished build should end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetDevice {
    /// Produce a file image instead of writing to physical media.
    Image,
    /// Write directly to an attached removable drive, by short name
    /// (e.g., "sdb").
    Disk(String),
}

impl std::fmt::Display for TargetDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetDevice::Image => f.write_str("image"),
            TargetDevice::Disk(name) => write!(f, "/dev/{}", name),
        }
    }
}

/// Kernel flavor selector, part of the handoff contract from the
/// top-level driver. The provisioning core threads it through but does
/// not interpret it; kernel download and installation happen elsewhere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, clap::ValueEnum)]
#[strum(serialize_all = "lowercase")]
pub enum KernelType {
    /// Modified chromeos kernel (default).
    #[default]
    Stable,
    /// Alt kernel for older devices.
    Alt,
    /// Experimental 5.15 kernel.
    Exp,
    /// Mainline linux kernel.
    Mainline,
}

/// Default username substituted for blank input.
pub const DEFAULT_USERNAME: &str = "localuser";
/// Default hostname substituted for blank input.
pub const DEFAULT_HOSTNAME: &str = "eupnea-chromebook";

/// A fully validated build configuration.
///
/// Invariants, guaranteed by the wizard:
/// - `desktop.available_on(distro)` holds;
/// - `distro_version` is a catalog key for ubuntu/fedora;
/// - `username`/`hostname` contain only allow-listed characters;
/// - `password` is non-empty and free of `(` and `)` whenever it was
///   elicited; gnome skips elicitation (its first-boot setup owns the
///   account) and leaves it empty.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub distro: Distro,
    pub distro_version: String,
    /// Download link from the catalog, for distros resolved by direct
    /// download (arch, fedora). Empty for the others.
    pub distro_link: Option<String>,
    pub desktop: DesktopEnvironment,
    pub username: String,
    pub password: String,
    pub hostname: String,
    pub device: TargetDevice,
    pub rebind_search: bool,
}
