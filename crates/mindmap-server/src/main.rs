use std::process::ExitCode;

use mindmap_core::{AppBuilder, AppConfig};
use mindmap_server::{AppState, router, telemetry};
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    telemetry::init();

    // (A) 設定は起動時に 1 回だけ読む
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    let bind_addr = config.bind_addr;

    // (B) ワイヤリング（Fail-fast）
    let app = match AppBuilder::from_config(config).build() {
        Ok(app) => app,
        Err(err) => {
            error!(error = %err, "failed to build application");
            return ExitCode::FAILURE;
        }
    };

    // (C) 待ち受け
    let listener = match TcpListener::bind(bind_addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(addr = %bind_addr, error = %err, "failed to bind");
            return ExitCode::FAILURE;
        }
    };
    info!(addr = %bind_addr, "mindmap server listening");

    let served = axum::serve(listener, router(AppState::new(app)))
        .with_graceful_shutdown(shutdown_signal())
        .await;
    if let Err(err) = served {
        error!(error = %err, "server error");
        return ExitCode::FAILURE;
    }

    info!("mindmap server stopped");
    ExitCode::SUCCESS
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
