//! Uptime monitoring scheduler.
//!
//! # Architecture Overview
//!
//! ```text
//!   monitors.toml ──▶ MonitorRepository ◀──────────────┐
//!                          │                            │
//!                          ▼  every reconcile interval  │ per firing
//!                   ┌─────────────┐   add/remove   ┌──────────┐
//!                   │ Reconciler  │──────────────▶│ Registry │ one timer per monitor
//!                   └─────────────┘                └────┬─────┘
//!                                                       │ tick
//!                                                       ▼
//!                        ┌───────────────────────────────────────────┐
//!                        │ HealthCheckPipeline                        │
//!                        │ lookup → probe (reqwest) → record → notify │
//!                        └───────────────────────────────────────────┘
//!                                   │                  │
//!                                   ▼                  ▼
//!                             RunRecorder       FailureNotifier
//!
//!   admin API (axum) ──▶ status / runs / stats / manual check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use uptime_scheduler::admin::{setup_admin_router, AdminState};
use uptime_scheduler::config::{load_config, AppConfig};
use uptime_scheduler::lifecycle::{build_app, wait_for_signal, Shutdown};
use uptime_scheduler::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "uptime-scheduler")]
#[command(about = "Runs scheduled HTTP health checks for a catalog of monitors", long_about = None)]
struct Args {
    /// Path to the scheduler config file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = if args.config.exists() {
        Some(load_config(&args.config)?)
    } else {
        None
    };
    let config_found = config.is_some();
    let config = config.unwrap_or_default();

    logging::init(&config.observability.log_level)?;
    tracing::info!("uptime-scheduler v{} starting", env!("CARGO_PKG_VERSION"));
    if !config_found {
        tracing::warn!(path = %args.config.display(), "Config file not found, using defaults");
    }
    log_config(&config);

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let app = build_app(&config)?;
    app.scheduler.start().await;

    let admin_shutdown = Shutdown::new();
    let admin_task = if config.admin.enabled {
        let listener = TcpListener::bind(&config.admin.bind_address).await?;
        tracing::info!(address = %listener.local_addr()?, "Admin API listening");

        let router = setup_admin_router(AdminState::new(
            app.scheduler.clone(),
            app.recorder.clone(),
            &config.admin.api_key,
        ));
        let mut signal = admin_shutdown.subscribe();
        Some(tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move { signal.recv().await })
                .await
        }))
    } else {
        None
    };

    wait_for_signal().await;
    tracing::info!("Shutting down");

    app.scheduler.stop().await;
    admin_shutdown.trigger();
    if let Some(task) = admin_task {
        match task.await {
            Ok(Err(e)) => tracing::error!(error = %e, "Admin API exited with error"),
            Err(e) => tracing::error!(error = %e, "Admin API task failed"),
            Ok(Ok(())) => {}
        }
    }

    if let Err(e) = app.recorder.save_to_file() {
        tracing::error!(error = %e, "Failed to save run history");
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

fn log_config(config: &AppConfig) {
    if config.admin.enabled && config.admin.api_key == AppConfig::default().admin.api_key {
        tracing::warn!("Admin API is using the default api_key; set admin.api_key");
    }
    tracing::info!(
        catalog = %config.monitors.catalog_path,
        reconcile_interval_secs = config.scheduler.reconcile_interval_secs,
        probe_timeout_secs = config.scheduler.probe_timeout_secs,
        overlap = ?config.scheduler.overlap,
        notifier = ?config.notifications.kind,
        "Configuration loaded"
    );
}
