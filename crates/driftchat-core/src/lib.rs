// Driftchat Core — Widget State Machine & Wire Protocol
//
// Everything the embeddable widget needs to decide, none of what it needs to
// render: drag geometry with viewport clamping, the conversation submit
// lifecycle, theme configuration, and the request/response wire types shared
// with the gateway.
//
// This crate is WASM-safe by construction: no tokio, no filesystem, no HTTP.
// The browser adapter (driftchat-widget) and the gateway (driftchat) both
// depend on it; it depends on serde and nothing else.

pub mod drag;
pub mod embed;
pub mod geometry;
pub mod protocol;
pub mod theme;
pub mod widget;

pub use drag::DragState;
pub use geometry::{clamp_position, Point, Size};
pub use protocol::{ChatRequest, ChatResponse};
pub use theme::{WidgetOptions, WidgetTheme};
pub use widget::{ConversationEntry, SendOutcome, SurfaceId, WidgetState, FALLBACK_REPLY};
