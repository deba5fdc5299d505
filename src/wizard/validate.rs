//! Pure per-field validation for the configuration wizard.
//!
//! Every function here maps raw console input to a validated value or a
//! typed rejection, without touching the console. The thin re-prompt
//! driver in the parent module loops on `Validation`/`Incompatible`
//! errors; these functions never perform I/O.

use crate::catalog::DistroCatalog;
use crate::config::{
    DEFAULT_HOSTNAME, DEFAULT_USERNAME, DesktopEnvironment, Distro, TargetDevice,
};
use crate::error::BuilderError;

/// Parses a distro choice. Aliases are case-insensitive; blank input
/// selects the recommended default (ubuntu).
pub fn parse_distro(input: &str) -> Result<Distro, BuilderError> {
    match input.trim().to_lowercase().as_str() {
        "" | "ubuntu" => Ok(Distro::Ubuntu),
        "debian" => Ok(Distro::Debian),
        "arch" | "arch btw" => Ok(Distro::Arch),
        "fedora" => Ok(Distro::Fedora),
        _ => Err(BuilderError::Validation(
            "Check your spelling and try again".to_string(),
        )),
    }
}

/// Resolves a version choice against the catalog. Blank input resolves
/// to the catalog's maximum release (fedora's Rawhide excluded);
/// non-blank input must exactly match a catalog key.
pub fn resolve_version(
    catalog: &DistroCatalog,
    distro: Distro,
    input: &str,
) -> Result<String, BuilderError> {
    let input = input.trim();
    if input.is_empty() {
        return catalog.latest(distro);
    }
    if catalog.contains(distro, input) {
        Ok(input.to_string())
    } else {
        Err(BuilderError::Validation(
            "Version not available, please choose another".to_string(),
        ))
    }
}

/// Outcome of a desktop-environment parse.
#[derive(Debug, PartialEq, Eq)]
pub enum DesktopChoice {
    /// A desktop was selected and is compatible with the distro.
    Selected(DesktopEnvironment),
    /// The user asked for no desktop at all; the driver must obtain an
    /// explicit confirmation before accepting it.
    CliNeedsConfirmation,
}

/// Parses a desktop-environment choice for the given distro. Blank input
/// selects gnome. Combinations the distro cannot provide (deepin+debian,
/// budgie+fedora) are rejected as incompatible, not invalid.
pub fn parse_desktop(input: &str, distro: Distro) -> Result<DesktopChoice, BuilderError> {
    let desktop = match input.trim().to_lowercase().as_str() {
        "" | "gnome" => DesktopEnvironment::Gnome,
        "kde" => DesktopEnvironment::Kde,
        "mate" => DesktopEnvironment::Mate,
        "xfce" => DesktopEnvironment::Xfce,
        "lxqt" => DesktopEnvironment::Lxqt,
        "deepin" => DesktopEnvironment::Deepin,
        "budgie" => DesktopEnvironment::Budgie,
        "cli" | "none" => return Ok(DesktopChoice::CliNeedsConfirmation),
        _ => {
            return Err(BuilderError::Validation(
                "No such Desktop environment. Check your spelling and try again".to_string(),
            ));
        }
    };
    if !desktop.available_on(distro) {
        return Err(BuilderError::Incompatible(format!(
            "{} is not available for {}, please choose another DE",
            capitalized(&desktop.to_string()),
            capitalized(&distro.to_string()),
        )));
    }
    Ok(DesktopChoice::Selected(desktop))
}

fn capitalized(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Validates a username against its allow-list (alphanumeric plus
/// `._-`), reporting the first offending character. Blank input
/// substitutes the default.
pub fn validate_username(input: &str) -> Result<String, BuilderError> {
    if input.is_empty() {
        return Ok(DEFAULT_USERNAME.to_string());
    }
    if let Some(offending) = input
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && !"._-".contains(*c))
    {
        return Err(BuilderError::Validation(format!(
            "Username contains invalid character: {}",
            offending
        )));
    }
    Ok(input.to_string())
}

/// Validates a hostname: alphanumeric plus `-`, no leading `-`. Blank
/// input substitutes the default.
pub fn validate_hostname(input: &str) -> Result<String, BuilderError> {
    if input.is_empty() {
        return Ok(DEFAULT_HOSTNAME.to_string());
    }
    if input.starts_with('-') {
        return Err(BuilderError::Validation(
            "Hostname cannot start with a '-'".to_string(),
        ));
    }
    if let Some(offending) = input
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && *c != '-')
    {
        return Err(BuilderError::Validation(format!(
            "Hostname contains invalid character: {}",
            offending
        )));
    }
    Ok(input.to_string())
}

/// Validates a password candidate before the repeat entry is even asked
/// for: non-empty and free of parentheses, which break the downstream
/// chpasswd invocation.
pub fn validate_password_candidate(password: &str) -> Result<(), BuilderError> {
    if password.is_empty() {
        return Err(BuilderError::Validation("Password cannot be empty".to_string()));
    }
    if password.contains(')') {
        return Err(BuilderError::Validation("Password cannot contain: )".to_string()));
    }
    if password.contains('(') {
        return Err(BuilderError::Validation("Password cannot contain: (".to_string()));
    }
    Ok(())
}

/// Compares the two password entries.
pub fn match_passwords(password: &str, repeat: &str) -> Result<String, BuilderError> {
    if password == repeat {
        Ok(password.to_string())
    } else {
        Err(BuilderError::Validation(
            "Passwords do not match, please try again".to_string(),
        ))
    }
}

/// Interprets an explicit yes/no confirmation: only the literal "yes"
/// confirms.
pub fn parse_yes(input: &str) -> bool {
    input.trim() == "yes"
}

/// Parses the target-device choice: the literal "image" sentinel or a
/// short-name out of the enumerated removable drives.
pub fn parse_device(input: &str, devices: &[String]) -> Result<TargetDevice, BuilderError> {
    let input = input.trim();
    if input == "image" {
        return Ok(TargetDevice::Image);
    }
    if devices.iter().any(|d| d == input) {
        return Ok(TargetDevice::Disk(input.to_string()));
    }
    Err(BuilderError::Validation(
        "No such device. Check your spelling and try again".to_string(),
    ))
}
