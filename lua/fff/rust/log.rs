use crate::error::Error;
use once_cell::sync::OnceCell;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

static LOG_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

/// Routes all tracing output into `log_file_path`. Returns the path actually used.
///
/// Only the first call installs a subscriber; later calls are no-ops so that
/// re-sourcing the plugin does not panic on a second global default.
pub fn init_tracing(log_file_path: &str, log_level: Option<&str>) -> Result<String, Error> {
    if LOG_GUARD.get().is_some() {
        return Ok(log_file_path.to_string());
    }

    let path = Path::new(log_file_path);
    let directory = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| Error::InvalidPath(log_file_path.to_string()))?;

    std::fs::create_dir_all(directory).map_err(|e| Error::Tracing(e.to_string()))?;

    let filter = EnvFilter::try_new(log_level.unwrap_or("info"))
        .map_err(|e| Error::Tracing(e.to_string()))?;

    let appender = tracing_appender::rolling::never(directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_env_filter(filter)
        .with_ansi(false)
        .with_thread_names(true)
        .try_init()
        .map_err(|e| Error::Tracing(e.to_string()))?;

    let _ = LOG_GUARD.set(guard);
    tracing::info!("TRACING_INIT: logging to {}", log_file_path);

    Ok(log_file_path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_path_without_file_name() {
        let result = init_tracing("/", Some("debug"));
        assert!(matches!(result, Err(Error::InvalidPath(_))));
    }
}
