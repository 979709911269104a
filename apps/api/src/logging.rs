use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::LevelFilter, layer::SubscriberExt, registry::LookupSpan, util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::config::Config;

/// Initialize logging for the API.
///
/// Everything allowed by `RUST_LOG` goes to stdout. Events at `ERROR` are
/// also appended to `config.error_log_path` without ANSI colors.
///
/// The returned guard flushes the file writer on drop and must live as long
/// as the process.
pub fn init(config: &Config) -> Result<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
    });
    let (error_layer, guard) = error_file_layer(Path::new(&config.error_log_path))?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(error_layer)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    Ok(guard)
}

/// A fmt layer writing `ERROR` events to `path` through a non-blocking
/// appender. The parent directory is created if missing.
fn error_file_layer<S>(path: &Path) -> Result<(Box<dyn Layer<S> + Send + Sync>, WorkerGuard)>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let (dir, file_name) = split_log_path(path)?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;

    let file_appender = tracing_appender::rolling::never(&dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_filter(LevelFilter::ERROR)
        .boxed();

    Ok((layer, guard))
}

fn split_log_path(path: &Path) -> Result<(PathBuf, String)> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("Invalid error log path: {}", path.display()))?
        .to_string();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, file_name))
}
