use std::time::Duration;
use anyhow::Result;
use tracing::{error, info};
use tokio::signal::ctrl_c;
use tokio::time::interval;
use iqx_dockqueue::config::Settings;
use iqx_dockqueue::init;
use iqx_dockqueue::utils::logging;

/// The main entry point of the IQX Dock Queue service
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Application error: {}", e);
        std::process::exit(1);
    }
}

/// Loads settings, starts logging, wires the queue and refreshes the dashboards on every polling tick
/// until ctrl-c.
///
/// # Returns
///
/// * `Ok(())` on graceful shutdown
/// * `Err(anyhow::Error)` if settings, logging or wiring fail
async fn run() -> Result<()> {
    let settings = Settings::new()?;
    let _guard = logging::init_logger(&settings.logging)?;

    let app = init::initialize(settings)?;
    info!(
        "IQX Dock Queue started for {} ({})",
        app.settings.geofence.site_name, app.settings.geofence.address
    );

    let mut polling_interval = interval(Duration::from_secs(app.settings.polling.interval_secs));

    loop {
        tokio::select! {
            _ = polling_interval.tick() => {
                if let Err(e) = app.controller.run_polling_cycle().await {
                    error!("Error during polling cycle: {}", e);
                }
            }
            _ = ctrl_c() => {
                info!("Received shutdown signal. Shutting down gracefully...");
                break;
            }
        }
    }
    Ok(())
}
