use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use thingbook::{ServerConfig, ThingService, app, open_store};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "thingbook")]
#[command(about = "Thing CRUD backend with write-time revalidation")]
struct Cli {
    /// Overrides APP_HOST
    #[arg(long)]
    host: Option<String>,
    /// Overrides APP_PORT
    #[arg(long)]
    port: Option<u16>,
    /// Overrides THINGBOOK_DATA_FILE
    #[arg(long)]
    data_file: Option<PathBuf>,
}

impl Cli {
    fn apply(self, mut config: ServerConfig) -> ServerConfig {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(data_file) = self.data_file {
            config.data_file = Some(data_file);
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = cli.apply(
        ServerConfig::from_env().context("failed to load application configuration")?,
    );

    let store = open_store(&config)
        .await
        .context("failed to open thing store")?;
    match &config.data_file {
        Some(path) => info!(path = %path.display(), "store: snapshot file"),
        None => info!("store: in-memory"),
    }

    let router = app(Arc::new(ThingService::new(store)), &config);

    let addr = config.address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(address = %addr, cors = config.cors, "thingbook started");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("thingbook=debug,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "unable to install Ctrl+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "unable to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
