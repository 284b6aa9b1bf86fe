// ── Driftchat Atoms: Constants ─────────────────────────────────────────────
// All named constants for the crate live here.
// Rationale: collecting constants in one place eliminates magic strings,
// makes auditing easier, and keeps every layer's code self-documenting.

// ── Canonical reply strings ────────────────────────────────────────────────
// These exact strings are part of the wire behavior: widgets already in the
// field display them verbatim, so changing a character is a visible change.
// One string per failure class; the gateway never emits anything else on a
// failed turn.
pub const REPLY_UNEXPECTED: &str = "Sorry, there was an unexpected error. Please try again.";
pub const REPLY_CONNECTING: &str =
    "Sorry, I'm having trouble connecting to the AI service right now. Please try again later.";
pub const REPLY_NO_CONTENT: &str = "Sorry, I couldn't generate a response. Please try again.";
pub const REPLY_NOT_FOUND: &str = "Not found.";

// ── CORS contract ──────────────────────────────────────────────────────────
// The widget embeds cross-origin, so every response carries this header set,
// not just the OPTIONS pre-flight.
pub const CORS_ALLOW_ORIGIN: &str = "*";
pub const CORS_ALLOW_METHODS: &str = "POST, OPTIONS";
pub const CORS_ALLOW_HEADERS: &str = "Content-Type";

// ── Routes ─────────────────────────────────────────────────────────────────
pub const ROUTE_CHAT: &str = "/api/chat";
pub const ROUTE_STATUS: &str = "/api/status";
pub const ROUTE_EMBED_JS: &str = "/embed.js";
pub const ROUTE_PKG_JS: &str = "/pkg/driftchat_widget.js";
pub const ROUTE_PKG_WASM: &str = "/pkg/driftchat_widget_bg.wasm";

// ── Listener limits ────────────────────────────────────────────────────────
// A chat turn is a short JSON body; anything near this cap is hostile or
// broken. Requests over the cap are dropped before parsing.
pub const MAX_REQUEST_BYTES: usize = 64 * 1024;
// Read chunk for the request loop. One chunk covers the common case; the
// loop continues only when Content-Length says more is coming.
pub const READ_CHUNK_BYTES: usize = 8192;

// ── Provider defaults ──────────────────────────────────────────────────────
// Generation parameters are configuration, never caller input. Low
// temperature keeps answers on-script for an embedded assistant; the token
// cap bounds per-request cost.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_MAX_TOKENS: u32 = 600;
// Env var consulted when the config file carries no credential.
pub const CREDENTIAL_ENV: &str = "OPENAI_API_KEY";

// ── Gateway defaults ───────────────────────────────────────────────────────
pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8787;
