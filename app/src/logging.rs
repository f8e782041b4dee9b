use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use color_eyre::Result;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt::writer::BoxMakeWriter, prelude::*};

use crate::config::PROJECT_NAME;

/// Stdout plus a log file in the data directory, filtered by `RUST_LOG`
/// (default `info`)
pub fn init(data_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(data_dir)?;
    let log_path = data_dir.join(format!("{}.log", PROJECT_NAME.to_lowercase()));
    let file = File::create(log_path)?;

    let file_log = tracing_subscriber::fmt::layer()
        .with_writer(BoxMakeWriter::new(Arc::new(file)))
        .with_ansi(false)
        .with_file(false);
    let stdout_log = tracing_subscriber::fmt::layer().with_file(false);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_log)
        .with(file_log)
        .with(ErrorLayer::default())
        .try_init()?;

    Ok(())
}
