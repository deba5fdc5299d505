//! Static catalog of distro releases and download links.
//!
//! The catalog is a small YAML document mapping each distro to its known
//! release identifiers: a plain list for ubuntu and debian, a single
//! bootstrap-tarball link for arch, and a version-to-link map for fedora.
//! A compiled-in default is used when no catalog file is given.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;

use anyhow::{Context, Result};
use camino::Utf8Path;
use serde::Deserialize;
use url::Url;

use crate::config::Distro;
use crate::error::BuilderError;

/// Fedora's rolling development release. Present in the catalog so users
/// can select it explicitly, but never resolved as "latest".
pub const FEDORA_RAWHIDE: &str = "Rawhide";

/// Known distro releases and their download links.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DistroCatalog {
    /// Ubuntu release identifiers (e.g., "22.04").
    pub ubuntu: Vec<String>,
    /// Debian release identifiers (currently just "stable").
    pub debian: Vec<String>,
    /// Arch bootstrap tarball link (arch is rolling, no versions).
    pub arch: String,
    /// Fedora release identifier to raw-image link. Ordered so that
    /// "latest" is the maximum key after excluding Rawhide.
    pub fedora: BTreeMap<String, String>,
}

impl DistroCatalog {
    /// Loads a catalog from a YAML file and validates it.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let file = File::open(path)
            .map_err(|e| BuilderError::io(format!("failed to open catalog: {}", path), e))?;
        let reader = BufReader::new(file);
        let catalog: DistroCatalog = serde_yaml::from_reader(reader)
            .with_context(|| format!("failed to parse catalog: {}", path))?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Returns the compiled-in default catalog.
    pub fn builtin() -> Self {
        DistroCatalog {
            ubuntu: vec!["20.04".to_string(), "21.10".to_string(), "22.04".to_string()],
            debian: vec!["stable".to_string()],
            arch: "https://geo.mirror.pkgbuild.com/iso/latest/archlinux-bootstrap-x86_64.tar.gz"
                .to_string(),
            fedora: BTreeMap::from([
                (
                    "36".to_string(),
                    "https://download.fedoraproject.org/pub/fedora/linux/releases/36/Cloud/x86_64/images/Fedora-Cloud-Base-36-1.5.x86_64.raw.xz"
                        .to_string(),
                ),
                (
                    "37".to_string(),
                    "https://download.fedoraproject.org/pub/fedora/linux/releases/37/Cloud/x86_64/images/Fedora-Cloud-Base-37-1.7.x86_64.raw.xz"
                        .to_string(),
                ),
                (
                    FEDORA_RAWHIDE.to_string(),
                    "https://download.fedoraproject.org/pub/fedora/linux/development/rawhide/Cloud/x86_64/images/"
                        .to_string(),
                ),
            ]),
        }
    }

    /// Validates that every distro has at least one release and that all
    /// download links parse as URLs.
    pub fn validate(&self) -> Result<(), BuilderError> {
        if self.ubuntu.is_empty() {
            return Err(BuilderError::Catalog("ubuntu has no known releases".to_string()));
        }
        if self.debian.is_empty() {
            return Err(BuilderError::Catalog("debian has no known releases".to_string()));
        }
        if self.fedora.is_empty() {
            return Err(BuilderError::Catalog("fedora has no known releases".to_string()));
        }
        Url::parse(&self.arch)
            .map_err(|e| BuilderError::Catalog(format!("invalid arch link {:?}: {}", self.arch, e)))?;
        for (version, link) in &self.fedora {
            Url::parse(link).map_err(|e| {
                BuilderError::Catalog(format!("invalid fedora {} link {:?}: {}", version, link, e))
            })?;
        }
        Ok(())
    }

    /// Returns the known release identifiers for a distro.
    pub fn versions(&self, distro: Distro) -> Vec<&str> {
        match distro {
            Distro::Ubuntu => self.ubuntu.iter().map(String::as_str).collect(),
            Distro::Debian => self.debian.iter().map(String::as_str).collect(),
            Distro::Arch => Vec::new(),
            Distro::Fedora => self.fedora.keys().map(String::as_str).collect(),
        }
    }

    /// Returns true if the given version is a known release of the distro.
    pub fn contains(&self, distro: Distro, version: &str) -> bool {
        self.versions(distro).contains(&version)
    }

    /// Resolves the latest release identifier for a distro: the maximum
    /// known identifier, with fedora's Rawhide excluded from the
    /// candidate set first.
    pub fn latest(&self, distro: Distro) -> Result<String, BuilderError> {
        let latest = match distro {
            Distro::Ubuntu => self.ubuntu.iter().max().cloned(),
            Distro::Debian => self.debian.iter().max().cloned(),
            Distro::Arch => None,
            Distro::Fedora => self
                .fedora
                .keys()
                .filter(|v| *v != FEDORA_RAWHIDE)
                .max()
                .cloned(),
        };
        latest.ok_or_else(|| {
            BuilderError::Catalog(format!("no releases available for {}", distro))
        })
    }

    /// Returns the download link for a distro/version pair, where the
    /// catalog carries one.
    pub fn link(&self, distro: Distro, version: &str) -> Option<String> {
        match distro {
            Distro::Arch => Some(self.arch.clone()),
            Distro::Fedora => self.fedora.get(version).cloned(),
            Distro::Ubuntu | Distro::Debian => None,
        }
    }
}
