// Driftchat Gateway — Server Core
//
// TCP/TLS listener, request accumulation, and the routing table. One small
// hand-rolled HTTP/1.1 surface instead of a framework: every route returns
// a fully-formed HttpResponse and every connection closes after one
// request/response exchange.

use super::embed::{build_demo_page, build_embed_js};
use super::http::{parse_request, HttpRequest, HttpResponse, ParseOutcome};
use super::routes;
use super::{get_stop_signal, GatewayContext, GATEWAY_RUNNING};
use crate::atoms::constants::{
    MAX_REQUEST_BYTES, READ_CHUNK_BYTES, ROUTE_CHAT, ROUTE_EMBED_JS, ROUTE_PKG_JS,
    ROUTE_PKG_WASM, ROUTE_STATUS,
};
use crate::atoms::error::{GatewayError, GatewayResult};
use crate::engine::config::GatewayConfig;
use log::{debug, info, warn};
use std::io::BufReader as StdBufReader;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;

// ── Stream Abstraction ─────────────────────────────────────────────────

pub(crate) trait ChatStream: AsyncRead + AsyncWrite + Unpin + Send {}
impl<T: AsyncRead + AsyncWrite + Unpin + Send> ChatStream for T {}

/// Build a TLS acceptor from PEM cert+key files, or `None` if not configured.
fn build_tls_acceptor(config: &GatewayConfig) -> GatewayResult<Option<tokio_rustls::TlsAcceptor>> {
    let (Some(cert_path), Some(key_path)) = (&config.tls_cert_path, &config.tls_key_path) else {
        return Ok(None);
    };

    let cert_file = std::fs::File::open(cert_path)
        .map_err(|e| GatewayError::Tls(format!("open cert {cert_path}: {e}")))?;
    let certs: Vec<_> = rustls_pemfile::certs(&mut StdBufReader::new(cert_file))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| GatewayError::Tls(format!("parse cert: {e}")))?;

    let key_file = std::fs::File::open(key_path)
        .map_err(|e| GatewayError::Tls(format!("open key {key_path}: {e}")))?;
    let key = rustls_pemfile::private_key(&mut StdBufReader::new(key_file))
        .map_err(|e| GatewayError::Tls(format!("parse key: {e}")))?
        .ok_or_else(|| GatewayError::Tls("no private key found in PEM file".into()))?;

    let tls_config = rustls::ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .map_err(|e| GatewayError::Tls(format!("server config: {e}")))?;

    Ok(Some(tokio_rustls::TlsAcceptor::from(Arc::new(tls_config))))
}

// ── Serve Loop ─────────────────────────────────────────────────────────

pub(crate) async fn serve(listener: TcpListener, context: GatewayContext) -> GatewayResult<()> {
    let stop = get_stop_signal();
    stop.store(false, Ordering::Relaxed);
    GATEWAY_RUNNING.store(true, Ordering::Relaxed);

    let tls_acceptor = build_tls_acceptor(&context.config)?;
    let scheme = if tls_acceptor.is_some() { "https" } else { "http" };
    if let Ok(addr) = listener.local_addr() {
        info!("[gateway] Listening on {}://{}", scheme, addr);
    }

    let context = Arc::new(context);
    let tls_acceptor = tls_acceptor.map(Arc::new);

    loop {
        if stop.load(Ordering::Relaxed) {
            break;
        }

        // Accept with timeout so we can check the stop signal
        let accept =
            tokio::time::timeout(std::time::Duration::from_secs(1), listener.accept()).await;

        match accept {
            Ok(Ok((tcp_stream, peer))) => {
                let ctx = context.clone();
                let tls = tls_acceptor.clone();
                tokio::spawn(async move {
                    // Wrap in TLS if configured, then box for type erasure
                    let stream: Box<dyn ChatStream> = if let Some(acceptor) = tls {
                        match acceptor.accept(tcp_stream).await {
                            Ok(tls_stream) => Box::new(tls_stream),
                            Err(e) => {
                                warn!("[gateway] TLS handshake failed from {}: {}", peer, e);
                                return;
                            }
                        }
                    } else {
                        Box::new(tcp_stream)
                    };

                    if let Err(e) = handle_connection(stream, peer, ctx).await {
                        warn!("[gateway] Connection error from {}: {}", peer, e);
                    }
                });
            }
            Ok(Err(e)) => {
                warn!("[gateway] Accept error: {}", e);
            }
            Err(_) => { /* timeout — loop to check stop signal */ }
        }
    }

    GATEWAY_RUNNING.store(false, Ordering::Relaxed);
    info!("[gateway] Server stopped");
    Ok(())
}

// ── Connection Handler ─────────────────────────────────────────────────

async fn handle_connection(
    mut stream: Box<dyn ChatStream>,
    peer: std::net::SocketAddr,
    context: Arc<GatewayContext>,
) -> GatewayResult<()> {
    // Accumulate until one full request is buffered. Browsers routinely
    // split the head and the JSON body across packets.
    let mut buf: Vec<u8> = Vec::with_capacity(READ_CHUNK_BYTES);
    let mut chunk = [0u8; READ_CHUNK_BYTES];
    let request = loop {
        let n = stream
            .read(&mut chunk)
            .await
            .map_err(|e| format!("read from {peer}: {e}"))?;
        if n == 0 {
            if !buf.is_empty() {
                debug!("[gateway] {} closed mid-request", peer);
            }
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);

        match parse_request(&buf) {
            ParseOutcome::Complete(req) => break req,
            ParseOutcome::Partial => {
                if buf.len() > MAX_REQUEST_BYTES + READ_CHUNK_BYTES {
                    debug!("[gateway] Dropping oversized request from {}", peer);
                    return Ok(());
                }
            }
            ParseOutcome::Invalid(reason) => {
                debug!("[gateway] Dropping request from {}: {}", peer, reason);
                return Ok(());
            }
        }
    };

    let response = route(&context, &request).await;
    stream
        .write_all(&response.into_bytes())
        .await
        .map_err(|e| format!("write to {peer}: {e}"))?;
    let _ = stream.shutdown().await;
    Ok(())
}

// ── Routing ────────────────────────────────────────────────────────────

async fn route(context: &GatewayContext, request: &HttpRequest) -> HttpResponse {
    match (request.method.as_str(), request.path.as_str()) {
        ("POST", p) if p == ROUTE_CHAT => routes::handle_chat(context, &request.body).await,
        ("OPTIONS", p) if p == ROUTE_CHAT => routes::handle_preflight(),
        ("GET", "/") | ("GET", "/index.html") => {
            HttpResponse::html(build_demo_page(&context.config))
        }
        ("GET", p) if p == ROUTE_EMBED_JS => {
            HttpResponse::javascript(build_embed_js(&context.config))
        }
        ("GET", p) if p == ROUTE_STATUS => routes::handle_status(),
        ("GET", p) if p == ROUTE_PKG_JS => {
            serve_pkg_file(context, "driftchat_widget.js", "text/javascript; charset=utf-8").await
        }
        ("GET", p) if p == ROUTE_PKG_WASM => {
            serve_pkg_file(context, "driftchat_widget_bg.wasm", "application/wasm").await
        }
        (method, path) => routes::handle_not_found(method, path),
    }
}

/// Serve one file of the built widget bundle out of `widget_dir`. The
/// bundle file names are fixed by the build, so only the directory is
/// configurable.
async fn serve_pkg_file(
    context: &GatewayContext,
    file: &str,
    content_type: &'static str,
) -> HttpResponse {
    let Some(dir) = &context.config.widget_dir else {
        return routes::handle_not_found("GET", file);
    };
    let path = std::path::Path::new(dir).join(file);
    match tokio::fs::read(&path).await {
        Ok(bytes) => HttpResponse::binary(content_type, bytes),
        Err(e) => {
            warn!("[gateway] Widget bundle {} unreadable: {}", path.display(), e);
            routes::handle_not_found("GET", file)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::persona::StaticPersona;
    use crate::engine::provider::{CompletionBackend, ProviderFailure};
    use async_trait::async_trait;

    struct EchoBackend;

    #[async_trait]
    impl CompletionBackend for EchoBackend {
        async fn complete(&self, _: &str, user: &str) -> Result<String, ProviderFailure> {
            Ok(format!("echo: {user}"))
        }
    }

    fn test_context(config: GatewayConfig) -> GatewayContext {
        GatewayContext {
            config,
            persona: Arc::new(StaticPersona::new("route test persona")),
            backend: Arc::new(EchoBackend),
        }
    }

    fn get(path: &str) -> HttpRequest {
        let raw = format!("GET {path} HTTP/1.1\r\nHost: t\r\n\r\n");
        match parse_request(raw.as_bytes()) {
            ParseOutcome::Complete(req) => req,
            other => panic!("expected complete request, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn chat_route_accepts_post_and_rejects_get() {
        let ctx = test_context(GatewayConfig::default());
        let raw = b"POST /api/chat HTTP/1.1\r\nContent-Length: 15\r\n\r\n{\"message\":\"x\"}";
        let ParseOutcome::Complete(post) = parse_request(raw) else {
            panic!("post request should parse");
        };
        assert_eq!(route(&ctx, &post).await.status(), 200);
        assert_eq!(route(&ctx, &get("/api/chat")).await.status(), 404);
    }

    #[tokio::test]
    async fn preflight_only_applies_to_the_chat_route() {
        let ctx = test_context(GatewayConfig::default());
        let raw = b"OPTIONS /api/chat HTTP/1.1\r\n\r\n";
        let ParseOutcome::Complete(req) = parse_request(raw) else {
            panic!("options request should parse");
        };
        assert_eq!(route(&ctx, &req).await.status(), 200);

        let raw = b"OPTIONS /embed.js HTTP/1.1\r\n\r\n";
        let ParseOutcome::Complete(req) = parse_request(raw) else {
            panic!("options request should parse");
        };
        assert_eq!(route(&ctx, &req).await.status(), 404);
    }

    #[tokio::test]
    async fn root_serves_the_demo_page() {
        let ctx = test_context(GatewayConfig::default());
        let response = route(&ctx, &get("/")).await;
        assert_eq!(response.status(), 200);
        let wire = String::from_utf8(response.into_bytes()).unwrap();
        assert!(wire.contains("Content-Type: text/html"));
        assert!(wire.contains("<!DOCTYPE html>"));
    }

    #[tokio::test]
    async fn embed_js_is_served_as_a_module_script() {
        let ctx = test_context(GatewayConfig::default());
        let response = route(&ctx, &get("/embed.js")).await;
        assert_eq!(response.status(), 200);
        let wire = String::from_utf8(response.into_bytes()).unwrap();
        assert!(wire.contains("Content-Type: text/javascript"));
        assert!(wire.contains("import init"));
    }

    #[tokio::test]
    async fn pkg_routes_are_404_without_a_widget_dir() {
        let ctx = test_context(GatewayConfig::default());
        assert_eq!(route(&ctx, &get("/pkg/driftchat_widget.js")).await.status(), 404);
        assert_eq!(route(&ctx, &get("/pkg/driftchat_widget_bg.wasm")).await.status(), 404);
    }

    #[tokio::test]
    async fn pkg_route_serves_the_configured_bundle() {
        let dir = std::env::temp_dir().join(format!("driftchat-test-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("driftchat_widget.js"), b"export function mount() {}").unwrap();

        let mut config = GatewayConfig::default();
        config.widget_dir = Some(dir.to_string_lossy().into_owned());
        let ctx = test_context(config);

        let response = route(&ctx, &get("/pkg/driftchat_widget.js")).await;
        assert_eq!(response.status(), 200);
        let wire = String::from_utf8(response.into_bytes()).unwrap();
        assert!(wire.contains("export function mount"));

        // Missing sibling file still 404s even with the dir configured
        assert_eq!(route(&ctx, &get("/pkg/driftchat_widget_bg.wasm")).await.status(), 404);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn status_route_reports_ok() {
        let ctx = test_context(GatewayConfig::default());
        let response = route(&ctx, &get("/api/status")).await;
        assert_eq!(response.status(), 200);
        let wire = String::from_utf8(response.into_bytes()).unwrap();
        let body = wire.split("\r\n\r\n").nth(1).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(parsed["status"], "ok");
        assert!(parsed["served"].is_u64());
        assert!(parsed["failed"].is_u64());
    }

    #[test]
    fn tls_acceptor_is_none_when_unconfigured() {
        let acceptor = build_tls_acceptor(&GatewayConfig::default()).unwrap();
        assert!(acceptor.is_none());
    }

    #[test]
    fn tls_acceptor_fails_on_missing_cert_file() {
        let mut config = GatewayConfig::default();
        config.tls_cert_path = Some("/nonexistent/cert.pem".into());
        config.tls_key_path = Some("/nonexistent/key.pem".into());
        assert!(build_tls_acceptor(&config).is_err());
    }
}
