//! Removable-media enumeration for the target-device step.
//!
//! Attached drives are discovered by running `lsblk` through the command
//! executor and keeping usb-transport rows. The `MassStorageClass` row is
//! a card-reader placeholder, not a real device, and is excluded.

use anyhow::{Context, Result};

use crate::executor::{CommandExecutor, CommandSpec};

/// Non-physical placeholder entry emitted by some card readers.
const PLACEHOLDER_MODEL: &str = "MassStorageClass";

/// One attached removable drive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovableDevice {
    /// Kernel short name, e.g. "sdb".
    pub name: String,
    /// The full lsblk row, shown to the user when choosing.
    pub description: String,
}

/// Enumerates currently attached removable drives.
pub fn list_removable_devices(executor: &dyn CommandExecutor) -> Result<Vec<RemovableDevice>> {
    let spec = CommandSpec::new(
        "lsblk",
        vec!["-o".to_string(), "NAME,MODEL,SIZE,TRAN".to_string()],
    );
    let result = executor
        .execute(&spec)
        .context("failed to enumerate block devices")?;
    Ok(parse_lsblk(&result.stdout))
}

/// Extracts usb-transport drives from `lsblk -o NAME,MODEL,SIZE,TRAN`
/// output.
pub fn parse_lsblk(output: &str) -> Vec<RemovableDevice> {
    output
        .lines()
        .skip(1) // header row
        .filter(|line| line.contains("usb") && !line.contains(PLACEHOLDER_MODEL))
        .filter_map(|line| {
            let name = line
                .trim_start_matches(|c: char| !c.is_ascii_alphanumeric())
                .split_whitespace()
                .next()?;
            Some(RemovableDevice {
                name: name.to_string(),
                description: line.trim().to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LSBLK_OUTPUT: &str = "\
NAME        MODEL             SIZE TRAN
nvme0n1     Samsung SSD 970 465.8G nvme
sda         MassStorageClass    0B usb
sdb         Cruzer Blade      29.3G usb
sdc         SD Card Reader    14.9G usb
";

    #[test]
    fn keeps_only_usb_devices() {
        let devices = parse_lsblk(LSBLK_OUTPUT);
        let names: Vec<&str> = devices.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["sdb", "sdc"]);
    }

    #[test]
    fn excludes_mass_storage_placeholder() {
        let devices = parse_lsblk(LSBLK_OUTPUT);
        assert!(devices.iter().all(|d| d.name != "sda"));
    }

    #[test]
    fn empty_output_yields_no_devices() {
        assert!(parse_lsblk("").is_empty());
        assert!(parse_lsblk("NAME MODEL SIZE TRAN\n").is_empty());
    }

    #[test]
    fn description_carries_the_full_row() {
        let devices = parse_lsblk(LSBLK_OUTPUT);
        assert!(devices[0].description.contains("Cruzer Blade"));
        assert!(devices[0].description.contains("29.3G"));
    }
}
