// Driftchat Gateway — Daemon entry point

use driftchat::engine::config::GatewayConfig;
use driftchat::engine::gateway;
use log::{error, info, warn};
use std::path::PathBuf;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Positional config path wins, then DRIFTCHAT_CONFIG, then the default.
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var("DRIFTCHAT_CONFIG").ok().map(PathBuf::from));

    let config = match GatewayConfig::load(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("[gateway] Config error: {}", e);
            std::process::exit(1);
        }
    };

    // Seed the default config file on first run so there is a file to edit.
    if config_path.is_none() {
        let default_path = GatewayConfig::default_path();
        if !default_path.exists() {
            if let Err(e) = config.save(&default_path) {
                warn!("[gateway] Could not write starter config: {}", e);
            }
        }
    }

    info!(
        "[gateway] Starting driftchat on {}:{} (model {})",
        config.bind_address, config.port, config.provider.model
    );

    let mut server = tokio::spawn(gateway::run(config));

    tokio::select! {
        result = &mut server => {
            match result {
                Ok(Ok(())) => info!("[gateway] Server exited"),
                Ok(Err(e)) => {
                    error!("[gateway] Server error: {}", e);
                    std::process::exit(1);
                }
                Err(e) => {
                    error!("[gateway] Server task failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("[gateway] Ctrl-C received, shutting down");
            gateway::stop();
            // The serve loop re-checks the stop signal within a second.
            let _ = tokio::time::timeout(std::time::Duration::from_secs(3), &mut server).await;
        }
    }

    let status = gateway::status();
    info!("[gateway] Served {} replies, {} failures", status.served, status.failed);
}
