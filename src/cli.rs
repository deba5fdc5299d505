use anyhow::Result;
use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};

use crate::config::KernelType;
use crate::orchestrator::TARGET_MOUNT;

#[derive(Parser, Debug)]
#[command(
    name = env!("CARGO_PKG_NAME"),
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = env!("CARGO_PKG_DESCRIPTION"),
)]
pub struct Cli {
    /// Print all command output while provisioning
    #[arg(short, long)]
    pub verbose: bool,

    /// Use latest dev build. May be unstable.
    #[arg(long = "dev")]
    pub dev_build: bool,

    /// Kernel flavor to install
    #[arg(long, value_enum, default_value_t = KernelType::Stable)]
    pub kernel: KernelType,

    /// Use local files instead of downloading from the internet (not
    /// recommended)
    #[arg(short, long)]
    pub local_path: Option<Utf8PathBuf>,

    /// Path to a YAML release catalog; the compiled-in catalog is used
    /// when omitted
    #[arg(long)]
    pub catalog: Option<Utf8PathBuf>,

    /// Where the target root filesystem is mounted
    #[arg(long, default_value = TARGET_MOUNT)]
    pub rootfs: Utf8PathBuf,

    /// PARTUUID of the target's root partition, as reported by the
    /// partitioning step
    #[arg(long, default_value = "")]
    pub root_partuuid: String,

    /// Set the log level
    #[arg(long, default_value = "info")]
    pub log_level: LogLevel,

    /// Do not run commands or edit target files, just show what would
    /// be done
    #[arg(long)]
    pub dry_run: bool,
}

/// Represents log levels for controlling the verbosity of logging output.
///
/// This enum maps directly to the log levels used by the `tracing` crate.
/// It is independent of `--verbose`, which controls whether provisioning
/// command output is streamed or suppressed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

pub fn parse_args() -> Result<Cli> {
    Ok(Cli::parse())
}
