// Driftchat Gateway — Completion Gateway
//
// The stateless HTTP daemon between the browser widget and the completion
// provider. Holds the provider credential and the persona so neither ever
// reaches a browser, and flattens every outcome into one `{reply}` JSON
// shape the widget can render without status-specific code paths.
//
// Architecture:
//   - Binds a TCP listener on a configurable port (default 8787)
//   - GET  /            → demo page with the widget mounted + copy-paste snippets
//   - GET  /embed.js    → ES-module loader a host page points a script tag at
//   - GET  /pkg/*       → the built widget bundle (when widget_dir is set)
//   - POST /api/chat    → one completion attempt, outcome as `{reply}` JSON
//   - OPTIONS /api/chat → CORS pre-flight
//   - GET  /api/status  → liveness probe with request counters
//   - Optional TLS via rustls when cert+key paths are set
//
// No sessions, no queues: each request carries its own message and each
// response closes the connection.

mod embed;
mod http;
mod routes;
mod server;

use crate::atoms::error::GatewayResult;
use crate::engine::config::GatewayConfig;
use crate::engine::persona::{self, PersonaSource};
use crate::engine::provider::{self, CompletionBackend};
use log::{info, warn};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use tokio::net::TcpListener;

// ── Global State ───────────────────────────────────────────────────────

static GATEWAY_RUNNING: AtomicBool = AtomicBool::new(false);
pub(crate) static SERVED_COUNT: AtomicU64 = AtomicU64::new(0);
pub(crate) static FAILED_COUNT: AtomicU64 = AtomicU64::new(0);
static STOP_SIGNAL: OnceLock<Arc<AtomicBool>> = OnceLock::new();

fn get_stop_signal() -> Arc<AtomicBool> {
    STOP_SIGNAL.get_or_init(|| Arc::new(AtomicBool::new(false))).clone()
}

// ── Context ────────────────────────────────────────────────────────────

/// Everything a request handler needs, assembled once at startup and shared
/// across connections.
pub struct GatewayContext {
    pub config: GatewayConfig,
    pub persona: Arc<dyn PersonaSource>,
    pub backend: Arc<dyn CompletionBackend>,
}

impl GatewayContext {
    /// Load persona files and build the provider backend from config.
    pub fn from_config(config: GatewayConfig) -> GatewayResult<Self> {
        let persona = persona::load_persona(&config)?;
        let backend = provider::build_backend(&config.provider);
        Ok(GatewayContext { config, persona, backend })
    }
}

// ── Public API ─────────────────────────────────────────────────────────

/// Bind the configured address and serve until [`stop`] is called.
pub async fn run(config: GatewayConfig) -> GatewayResult<()> {
    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| format!("Bind {} failed: {}", addr, e))?;

    if let Some(url) = &config.public_url {
        if url.starts_with("https://") && config.tls_cert_path.is_none() {
            warn!(
                "[gateway] public_url is https but no TLS cert configured — \
                 put a TLS-terminating proxy in front or set tls_cert_path/tls_key_path"
            );
        }
    }

    let context = GatewayContext::from_config(config)?;
    serve_with(listener, context).await
}

/// Serve on an already-bound listener. Split from [`run`] so tests can bind
/// an ephemeral port first and learn the address before serving.
pub async fn serve_with(listener: TcpListener, context: GatewayContext) -> GatewayResult<()> {
    server::serve(listener, context).await
}

/// Signal the serve loop to exit. Takes effect within one accept timeout.
pub fn stop() {
    get_stop_signal().store(true, Ordering::Relaxed);
    info!("[gateway] Stop signal sent");
}

/// Point-in-time counters, for shutdown logging.
#[derive(Debug, Clone, Copy)]
pub struct GatewayStatus {
    pub running: bool,
    pub served: u64,
    pub failed: u64,
}

pub fn status() -> GatewayStatus {
    GatewayStatus {
        running: GATEWAY_RUNNING.load(Ordering::Relaxed),
        served: SERVED_COUNT.load(Ordering::Relaxed),
        failed: FAILED_COUNT.load(Ordering::Relaxed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_signal_is_shared_and_sticky() {
        let a = get_stop_signal();
        let b = get_stop_signal();
        a.store(true, Ordering::Relaxed);
        assert!(b.load(Ordering::Relaxed), "both handles see the same flag");
        a.store(false, Ordering::Relaxed);
    }

    #[test]
    fn context_builds_from_default_config() {
        let context = GatewayContext::from_config(GatewayConfig::default())
            .expect("defaults must always produce a working context");
        assert!(!context.persona.system_prompt().is_empty());
    }
}
