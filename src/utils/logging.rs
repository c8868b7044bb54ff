use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_appender::non_blocking::WorkerGuard;
use anyhow::Result;
use crate::config::LoggingSettings;

/// Initializes the logging system for the service
///
/// Console output is always on. When the settings carry a directory, a log file named after
/// `logging.file` (default `iqx-dq_{current_date}.log`) is written there as well.
/// `RUST_LOG` takes precedence over `logging.level`; `reqwest` and `hyper` are held at `warn`.
///
/// # Arguments
///
/// * `settings`: The logging section of the application settings
///
/// # Returns
///
/// * `Ok(Some(WorkerGuard))`: File logging is active; keep the guard alive for the life of the process
/// * `Ok(None)`: Console only
/// * `Err(anyhow::Error)`: The filter, directory or global subscriber could not be set up
pub fn init_logger(settings: &LoggingSettings) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("{},reqwest=warn,hyper=warn", settings.level)))?;

    let format = fmt::format()
        .with_timer(fmt::time::LocalTime::rfc_3339())
        .compact()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    let subscriber = tracing_subscriber::registry().with(env_filter);
    let console_layer = fmt::Layer::default()
        .event_format(format.clone().with_ansi(true))
        .with_writer(std::io::stdout);

    let Some(path) = settings.path.clone() else {
        tracing::subscriber::set_global_default(subscriber.with(console_layer))?;
        tracing::info!("Logging initialized successfully (console only)");
        return Ok(None);
    };

    std::fs::create_dir_all(&path)?;
    let file_name = settings.file.clone().unwrap_or_else(|| log_file_name(chrono::Local::now().date_naive()));
    let file_appender = RollingFileAppender::new(Rotation::NEVER, &path, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::Layer::default()
        .event_format(format)
        .with_writer(non_blocking);

    tracing::subscriber::set_global_default(subscriber.with(file_layer.and_then(console_layer)))?;
    tracing::info!("Logging initialized successfully at {}", path.display());
    Ok(Some(guard))
}

fn log_file_name(date: chrono::NaiveDate) -> String {
    format!("iqx-dq_{}.log", date.format("%Y-%m-%d"))
}

