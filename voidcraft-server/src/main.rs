use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use voidcraft_server::config::Config;
use voidcraft_server::service::{HttpStoryGenerator, RetentionSweeper};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "voidcraft_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Voidcraft Server...");

    let config = Config::from_env().context("Invalid configuration")?;
    info!(
        "Loaded configuration: output_dir={}, generator_url={}",
        config.output_dir.display(),
        config.generator_url
    );

    match config.generation_timeout {
        Some(timeout) => info!("Generation timeout: {:?}", timeout),
        None => info!("Generation timeout: none"),
    }
    match config.max_concurrent_jobs {
        Some(max) => info!("Max concurrent jobs: {}", max),
        None => info!("Max concurrent jobs: unbounded"),
    }

    let generator = Arc::new(HttpStoryGenerator::new(config.generator_url.clone()));
    let app = voidcraft_server::build_app(&config, generator);

    if let Some(retention) = config.job_retention {
        RetentionSweeper::new(
            Arc::clone(&app.store),
            retention,
            config.retention_sweep_interval,
        )
        .start();
    } else {
        info!("Job retention: keep for process lifetime");
    }

    info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    axum::serve(listener, app.router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down server...");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
