// src/logging.rs

use color_eyre::eyre::Result;
use directories::ProjectDirs;
use lazy_static::lazy_static;
use std::path::PathBuf;
use tracing_error::ErrorLayer;
use tracing_subscriber::{self, EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

lazy_static! {
    pub static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase();
    pub static ref LOG_ENV: String = format!("{}_LOGLEVEL", PROJECT_NAME.as_str());
    pub static ref LOG_FILE: String = format!("{}.log", env!("CARGO_PKG_NAME"));
}

fn project_directory() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "securitytxt", env!("CARGO_PKG_NAME"))
}

pub fn get_data_dir() -> PathBuf {
    if let Some(proj_dirs) = project_directory() {
        proj_dirs.data_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".data")
    }
}

/// Filter directive: `RUST_LOG`, then `<CRATE>_LOGLEVEL`, then a default
/// for this crate only.
fn log_directive(debug: bool) -> String {
    std::env::var("RUST_LOG")
        .or_else(|_| std::env::var(LOG_ENV.as_str()))
        .unwrap_or_else(|_| {
            let level = if debug { "debug" } else { "info" };
            format!("{}={level}", env!("CARGO_CRATE_NAME"))
        })
}

/// Initializes logging to stderr, plus a plain-text copy in the data
/// directory when `to_file` is set. Stdout is left to the JSON output.
///
/// # Returns
/// The path of the log file, if one was opened.
pub fn initialize_logging(debug: bool, to_file: bool) -> Result<Option<PathBuf>> {
    let directive = log_directive(debug);

    let stderr_subscriber = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(EnvFilter::new(&directive));

    let (file_subscriber, log_path) = if to_file {
        let directory = get_data_dir();
        std::fs::create_dir_all(&directory)?;
        let log_path = directory.join(LOG_FILE.as_str());
        let log_file = std::fs::File::create(&log_path)?;

        let layer = tracing_subscriber::fmt::layer()
            .with_writer(log_file)
            .with_target(false)
            .with_ansi(false)
            .with_filter(EnvFilter::new(&directive));
        (Some(layer), Some(log_path))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(stderr_subscriber)
        .with(file_subscriber)
        .with(ErrorLayer::default())
        .init();

    Ok(log_path)
}
