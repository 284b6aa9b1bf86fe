// Driftchat Gateway — Completion Backend
//
// The provider seam: one async trait, one OpenAI-compatible implementation,
// and the failure classification the chat handler turns into its three
// canonical reply strings. One attempt per request; a provider failure is a
// terminal outcome for that turn, so there is no retry machinery here.

mod openai;

pub use openai::OpenAiBackend;

use crate::engine::config::ProviderSettings;
use async_trait::async_trait;
use std::sync::Arc;

/// Why a completion attempt produced no usable content. Each variant maps
/// 1:1 to a canonical reply string in the chat handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderFailure {
    /// The request never completed or its body never decoded: DNS/TLS/
    /// timeout, missing credential, or an unreadable success body.
    Transport(String),
    /// The provider answered with a non-success HTTP status.
    Status { code: u16, detail: String },
    /// The provider answered success but the content field was absent or
    /// empty.
    Empty,
}

impl std::fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderFailure::Transport(detail) => write!(f, "transport: {detail}"),
            ProviderFailure::Status { code, detail } => write!(f, "status {code}: {detail}"),
            ProviderFailure::Empty => write!(f, "empty completion"),
        }
    }
}

/// A single-turn completion call: fixed system prompt plus one user message
/// in, assistant text out.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_message: &str)
        -> Result<String, ProviderFailure>;
}

/// Construct the configured backend. Only the OpenAI-compatible REST shape
/// exists today, which covers OpenAI, OpenRouter, Azure and local servers
/// speaking the same dialect via `base_url`.
pub fn build_backend(settings: &ProviderSettings) -> Arc<dyn CompletionBackend> {
    Arc::new(OpenAiBackend::new(settings.clone()))
}
