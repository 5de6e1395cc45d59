use color_eyre::{eyre::eyre, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `logging.filter`. The returned guard
/// flushes buffered log lines on drop and must live as long as the server.
pub fn init(config: &LoggingConfig) -> Result<WorkerGuard> {
  let filter = EnvFilter::try_from_default_env()
    .or_else(|_| EnvFilter::try_new(&config.filter))
    .map_err(|e| eyre!("Invalid log filter {:?}: {}", config.filter, e))?;

  let (writer, guard, ansi) = match &config.file {
    Some(path) => {
      let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| eyre!("Failed to open log file {}: {}", path.display(), e))?;
      let (writer, guard) = tracing_appender::non_blocking(file);
      (writer, guard, false)
    }
    None => {
      let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());
      (writer, guard, true)
    }
  };

  fmt()
    .with_env_filter(filter)
    .with_writer(writer)
    .with_ansi(ansi)
    .try_init()
    .map_err(|e| eyre!("Failed to install tracing subscriber: {}", e))?;

  Ok(guard)
}
