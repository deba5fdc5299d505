pub mod catalog;
pub mod chroot;
pub mod cli;
pub mod config;
pub mod distro;
pub mod error;
pub mod executor;
pub mod orchestrator;
pub mod patcher;
pub mod wizard;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::{FmtSubscriber, filter::LevelFilter};

use crate::catalog::DistroCatalog;
use crate::executor::CommandExecutor;
use crate::orchestrator::BuildRequest;
use crate::wizard::{Console, Wizard};

pub fn init_logging(log_level: cli::LogLevel) -> Result<()> {
    let filter = match log_level {
        cli::LogLevel::Trace => LevelFilter::TRACE,
        cli::LogLevel::Debug => LevelFilter::DEBUG,
        cli::LogLevel::Info => LevelFilter::INFO,
        cli::LogLevel::Warn => LevelFilter::WARN,
        cli::LogLevel::Error => LevelFilter::ERROR,
    };

    tracing::subscriber::set_global_default(
        FmtSubscriber::builder().with_max_level(filter).finish(),
    )
    .context("failed to set global default tracing subscriber")
}

/// Name of the user that invoked the build, as left behind by the
/// privilege-elevation wrapper.
fn resolve_user_id() -> String {
    std::env::var("SUDO_USER").unwrap_or_else(|_| "root".to_string())
}

/// Runs the whole build flow: wizard, then provisioning of the mounted
/// target.
pub fn run_build(
    args: &cli::Cli,
    console: &dyn Console,
    executor: Arc<dyn CommandExecutor>,
) -> Result<()> {
    log_option_warnings(args);

    let catalog = match &args.catalog {
        Some(path) => DistroCatalog::load(path)
            .with_context(|| format!("failed to load catalog from {}", path))?,
        None => DistroCatalog::builtin(),
    };

    let config = Wizard::new(&catalog, console, executor.as_ref())
        .run()
        .context("configuration wizard failed")?;

    let request = BuildRequest {
        verbose: args.verbose,
        dry_run: args.dry_run,
        kernel_type: args.kernel,
        dev_release: args.dev_build,
        local_path: args.local_path.clone(),
        user_id: resolve_user_id(),
        config,
    };

    orchestrator::run_provisioning(&request, &args.rootfs, &args.root_partuuid, executor)
}

/// Warns about the non-default driver options before any prompt is
/// shown, so the operator sees them up front.
fn log_option_warnings(args: &cli::Cli) {
    use tracing::warn;

    if args.dev_build {
        warn!("using dev release");
    }
    if args.kernel != crate::config::KernelType::Stable {
        warn!("using {} kernel", args.kernel);
    }
    if let Some(path) = &args.local_path {
        warn!("using local files from {}", path);
    }
    if args.verbose {
        warn!("verbosity increased");
    }
}
