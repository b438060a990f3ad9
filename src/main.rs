use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};
use verdant::config::{self, VerdantConfig};
use verdant::controller::Controller;
use verdant::telemetry::MemoryStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "verdant=info".into()),
        )
        .init();

    let cfg = match std::env::args().nth(1) {
        Some(path) => config::load_config(&path)
            .map_err(|e| anyhow::anyhow!("failed to load config {}: {}", path, e))?,
        None => VerdantConfig::default(),
    };

    info!(
        moisture_threshold = cfg.control.moisture_threshold,
        "Verdant starting..."
    );

    let store = Arc::new(MemoryStore::new());
    let mut controller = Controller::new(
        Arc::clone(&store),
        cfg.control.clone(),
        cfg.notifications.clone(),
    );
    let mut alerts = controller.alerts();
    controller.start();

    // Surface low-water alerts in the log until a display layer attaches
    tokio::spawn(async move {
        while let Ok(alert) = alerts.recv().await {
            warn!(level = alert.level, "{}: {}", alert.title, alert.body);
        }
    });

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    controller.stop();

    Ok(())
}
