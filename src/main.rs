// src/main.rs

use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::Result;
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

mod cli;
mod logging;

use cli::Cli;
use securitytxt_scanner::app::App;

/// How long shutdown waits for blocking tasks. Stdin is read on one of
/// them, and a read waiting for a line cannot be interrupted.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

fn main() -> Result<()> {
    // --- Setup ---
    color_eyre::install()?;
    let cli = Cli::parse();
    if let Some(path) = logging::initialize_logging(cli.debug, cli.log_file)? {
        debug!(path = %path.display(), "logging to file");
    }

    // --- Run ---
    let runtime = build_runtime()?;
    let result = runtime.block_on(scan(cli));
    runtime.shutdown_timeout(SHUTDOWN_GRACE);
    result
}

fn build_runtime() -> std::io::Result<Runtime> {
    tokio::runtime::Builder::new_multi_thread().enable_all().build()
}

async fn scan(cli: Cli) -> Result<()> {
    let app = App::new(cli.into_config())?;

    // Ctrl-C aborts in-flight probes; the output array is still closed.
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupted, cancelling scan");
                cancel.cancel();
            }
        });
    }

    let summary = app.run(tokio::io::stdin(), std::io::stdout(), cancel).await?;
    info!(
        not_found = summary.not_found,
        failed = summary.failed,
        "scan finished"
    );

    Ok(())
}
