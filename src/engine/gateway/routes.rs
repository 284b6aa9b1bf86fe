// Driftchat Gateway — Request Handlers
//
// One ChatRequest in, one ChatResponse out, with every failure mode
// normalized into the same `{reply}` shape. Only the HTTP status code
// distinguishes outcomes (200 vs 500); the widget never needs a
// status-specific code path. Classification ladder:
//
//   transport / exception        → "unexpected error"        500
//   provider non-success status  → "trouble connecting"      500
//   provider success, no content → "couldn't generate"       500
//   provider success + content   → the content, verbatim     200
//
// An unparsable request body takes the generic "unexpected error" path
// rather than echoing a parse error.

use crate::atoms::constants::{
    REPLY_CONNECTING, REPLY_NOT_FOUND, REPLY_NO_CONTENT, REPLY_UNEXPECTED,
};
use crate::engine::gateway::http::HttpResponse;
use crate::engine::gateway::{GatewayContext, FAILED_COUNT, SERVED_COUNT};
use crate::engine::provider::ProviderFailure;
use driftchat_core::ChatRequest;
use log::{debug, error, info, warn};
use serde_json::json;
use std::sync::atomic::Ordering;

/// Short id correlating the log lines of one request.
fn short_request_id() -> String {
    uuid::Uuid::new_v4().to_string().replace('-', "")[..8].to_string()
}

/// POST /api/chat.
pub(crate) async fn handle_chat(ctx: &GatewayContext, body: &[u8]) -> HttpResponse {
    let id = short_request_id();

    let request: ChatRequest = match serde_json::from_slice(body) {
        Ok(req) => req,
        Err(e) => {
            warn!("[gateway] {} unparsable request body: {}", id, e);
            FAILED_COUNT.fetch_add(1, Ordering::Relaxed);
            return HttpResponse::reply(500, REPLY_UNEXPECTED);
        }
    };

    info!("[gateway] {} chat message ({} chars)", id, request.message.chars().count());
    if let Some(path) = &request.page_path {
        debug!(
            "[gateway] {} from page {} ({})",
            id,
            path,
            request.page_title.as_deref().unwrap_or("untitled"),
        );
    }

    let system_prompt = ctx.persona.system_prompt();
    match ctx.backend.complete(&system_prompt, &request.message).await {
        Ok(content) => {
            info!("[gateway] {} replied ({} chars)", id, content.chars().count());
            SERVED_COUNT.fetch_add(1, Ordering::Relaxed);
            HttpResponse::reply(200, &content)
        }
        Err(ProviderFailure::Transport(detail)) => {
            error!("[gateway] {} provider transport failure: {}", id, detail);
            FAILED_COUNT.fetch_add(1, Ordering::Relaxed);
            HttpResponse::reply(500, REPLY_UNEXPECTED)
        }
        Err(ProviderFailure::Status { code, detail }) => {
            error!("[gateway] {} provider status {}: {}", id, code, detail);
            FAILED_COUNT.fetch_add(1, Ordering::Relaxed);
            HttpResponse::reply(500, REPLY_CONNECTING)
        }
        Err(ProviderFailure::Empty) => {
            warn!("[gateway] {} provider returned no content", id);
            FAILED_COUNT.fetch_add(1, Ordering::Relaxed);
            HttpResponse::reply(500, REPLY_NO_CONTENT)
        }
    }
}

/// OPTIONS /api/chat — CORS pre-flight. Empty success body, the permissive
/// header set (attached by the response writer), no provider call.
pub(crate) fn handle_preflight() -> HttpResponse {
    HttpResponse::empty_ok()
}

/// GET /api/status — liveness probe with the request counters.
pub(crate) fn handle_status() -> HttpResponse {
    HttpResponse::json(
        200,
        json!({
            "status": "ok",
            "served": SERVED_COUNT.load(Ordering::Relaxed),
            "failed": FAILED_COUNT.load(Ordering::Relaxed),
        }),
    )
}

/// Anything else. Same reply shape as every other path.
pub(crate) fn handle_not_found(method: &str, path: &str) -> HttpResponse {
    debug!("[gateway] No route for {} {}", method, path);
    HttpResponse::reply(404, REPLY_NOT_FOUND)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::GatewayConfig;
    use crate::engine::persona::StaticPersona;
    use crate::engine::provider::CompletionBackend;
    use async_trait::async_trait;
    use driftchat_core::ChatResponse;
    use parking_lot::Mutex;
    use std::sync::Arc;

    struct FixedBackend(Result<String, ProviderFailure>);

    #[async_trait]
    impl CompletionBackend for FixedBackend {
        async fn complete(&self, _: &str, _: &str) -> Result<String, ProviderFailure> {
            self.0.clone()
        }
    }

    #[derive(Default)]
    struct RecordingBackend {
        calls: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl CompletionBackend for RecordingBackend {
        async fn complete(&self, system: &str, user: &str) -> Result<String, ProviderFailure> {
            self.calls.lock().push((system.to_string(), user.to_string()));
            Ok("recorded".into())
        }
    }

    fn ctx_with(result: Result<String, ProviderFailure>) -> GatewayContext {
        GatewayContext {
            config: GatewayConfig::default(),
            persona: Arc::new(StaticPersona::new("test persona prompt")),
            backend: Arc::new(FixedBackend(result)),
        }
    }

    /// Pull the JSON body back out of the serialized response.
    fn reply_body(response: HttpResponse) -> ChatResponse {
        let wire = String::from_utf8(response.into_bytes()).unwrap();
        let body = wire.split("\r\n\r\n").nth(1).unwrap();
        serde_json::from_str(body).expect("every chat response must keep the reply shape")
    }

    #[tokio::test]
    async fn success_returns_content_verbatim_with_200() {
        let ctx = ctx_with(Ok("hello".into()));
        let response = handle_chat(&ctx, br#"{"message":"hi"}"#).await;
        assert_eq!(response.status(), 200);
        assert_eq!(reply_body(response).reply, "hello");
    }

    #[tokio::test]
    async fn transport_failure_returns_unexpected_error() {
        let ctx = ctx_with(Err(ProviderFailure::Transport("timeout".into())));
        let response = handle_chat(&ctx, br#"{"message":"hi"}"#).await;
        assert_eq!(response.status(), 500);
        assert_eq!(reply_body(response).reply, REPLY_UNEXPECTED);
    }

    #[tokio::test]
    async fn provider_status_failure_returns_trouble_connecting() {
        let ctx = ctx_with(Err(ProviderFailure::Status { code: 502, detail: "bad gateway".into() }));
        let response = handle_chat(&ctx, br#"{"message":"hi"}"#).await;
        assert_eq!(response.status(), 500);
        assert_eq!(reply_body(response).reply, REPLY_CONNECTING);
    }

    #[tokio::test]
    async fn empty_completion_returns_couldnt_generate() {
        let ctx = ctx_with(Err(ProviderFailure::Empty));
        let response = handle_chat(&ctx, br#"{"message":"hi"}"#).await;
        assert_eq!(response.status(), 500);
        assert_eq!(reply_body(response).reply, REPLY_NO_CONTENT);
    }

    #[tokio::test]
    async fn malformed_body_gets_generic_reply_not_parse_error() {
        let ctx = ctx_with(Ok("never reached".into()));
        for body in [&b"{oops"[..], &b""[..], &b"[]"[..], &b"42"[..]] {
            let response = handle_chat(&ctx, body).await;
            assert_eq!(response.status(), 500);
            let parsed = reply_body(response);
            assert_eq!(parsed.reply, REPLY_UNEXPECTED);
        }
    }

    #[tokio::test]
    async fn missing_message_field_is_malformed() {
        let ctx = ctx_with(Ok("never reached".into()));
        let response = handle_chat(&ctx, br#"{"pagePath":"/about"}"#).await;
        assert_eq!(response.status(), 500);
        assert_eq!(reply_body(response).reply, REPLY_UNEXPECTED);
    }

    #[tokio::test]
    async fn page_context_is_optional_and_harmless() {
        let ctx = ctx_with(Ok("ok".into()));
        let body = br#"{"message":"hi","pagePath":"/p","pageTitle":"T","pageUrl":"https://s/p"}"#;
        let response = handle_chat(&ctx, body).await;
        assert_eq!(response.status(), 200);
        assert_eq!(reply_body(response).reply, "ok");
    }

    #[tokio::test]
    async fn persona_and_message_reach_the_backend() {
        let backend = Arc::new(RecordingBackend::default());
        let ctx = GatewayContext {
            config: GatewayConfig::default(),
            persona: Arc::new(StaticPersona::new("system persona here")),
            backend: backend.clone(),
        };
        let _ = handle_chat(&ctx, br#"{"message":"what is this site?"}"#).await;
        let calls = backend.calls.lock();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "system persona here");
        assert_eq!(calls[0].1, "what is this site?");
    }

    #[test]
    fn preflight_is_empty_200_with_cors_headers() {
        let wire = String::from_utf8(handle_preflight().into_bytes()).unwrap();
        assert!(wire.starts_with("HTTP/1.1 200 OK"));
        assert!(wire.contains("Access-Control-Allow-Origin: *"));
        assert!(wire.contains("Access-Control-Allow-Methods: POST, OPTIONS"));
        assert!(wire.contains("Access-Control-Allow-Headers: Content-Type"));
        assert!(wire.contains("Content-Length: 0"));
    }

    #[test]
    fn unknown_route_keeps_the_reply_shape() {
        let response = handle_not_found("GET", "/nope");
        assert_eq!(response.status(), 404);
        assert_eq!(reply_body(response).reply, REPLY_NOT_FOUND);
    }

    #[tokio::test]
    async fn served_counter_moves_on_success() {
        let before = SERVED_COUNT.load(Ordering::Relaxed);
        let ctx = ctx_with(Ok("counted".into()));
        let _ = handle_chat(&ctx, br#"{"message":"hi"}"#).await;
        assert!(SERVED_COUNT.load(Ordering::Relaxed) > before);
    }
}
