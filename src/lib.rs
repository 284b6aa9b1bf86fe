// Driftchat Gateway — Library root
//
// Driftchat is an embeddable chat widget plus the gateway daemon that backs
// it. This crate is the daemon: it serves the widget bundle and demo page,
// and relays chat messages to an OpenAI-compatible completion provider while
// keeping the credential and persona server-side. The widget itself lives in
// `driftchat-widget` (WASM) and the shared state machine in `driftchat-core`.

pub mod atoms;
pub mod engine;

pub use atoms::error::{GatewayError, GatewayResult};
pub use engine::config::GatewayConfig;
pub use engine::gateway::{run, serve_with, status, stop, GatewayContext, GatewayStatus};
