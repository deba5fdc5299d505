use std::process;
use std::sync::Arc;

use anyhow::Result;
use tracing::error;

use eupnea_builder::executor::{CommandExecutor, RealCommandExecutor};
use eupnea_builder::wizard::StdConsole;
use eupnea_builder::{cli, init_logging, run_build};

fn main() -> Result<()> {
    let args = cli::parse_args()?;
    init_logging(args.log_level)?;

    let executor: Arc<dyn CommandExecutor> = Arc::new(RealCommandExecutor {
        verbose: args.verbose,
        dry_run: args.dry_run,
    });
    let console = StdConsole;

    if let Err(e) = run_build(&args, &console, executor) {
        error!("build failed: {:#}", e);
        process::exit(1);
    }

    Ok(())
}
