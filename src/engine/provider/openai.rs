// Driftchat Gateway — OpenAI-Compatible Backend
// Handles: OpenAI, OpenRouter, Azure-style gateways, and any server speaking
// the `/chat/completions` REST dialect. Non-streaming: one request, one
// parsed completion, one classified outcome.

use crate::atoms::constants::CREDENTIAL_ENV;
use crate::engine::config::ProviderSettings;
use crate::engine::provider::{CompletionBackend, ProviderFailure};
use async_trait::async_trait;
use log::{debug, error, info};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

pub struct OpenAiBackend {
    client: Client,
    settings: ProviderSettings,
}

impl OpenAiBackend {
    pub fn new(settings: ProviderSettings) -> Self {
        OpenAiBackend {
            client: Client::builder()
                .connect_timeout(Duration::from_secs(10))
                .timeout(Duration::from_secs(120))
                .build()
                .unwrap_or_default(),
            settings,
        }
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.settings.base_url.trim_end_matches('/'))
    }
}

// ── Completion response shape ──────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    #[serde(default)]
    message: CompletionMessage,
}

#[derive(Debug, Default, Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Pull the assistant text out of a parsed completion. Absent choices,
/// absent content, and empty content all count as "no content".
fn extract_content(completion: &ChatCompletion) -> Option<String> {
    completion
        .choices
        .first()
        .and_then(|c| c.message.content.clone())
        .filter(|text| !text.is_empty())
}

/// Truncate to a character boundary for log lines; provider error bodies
/// can be arbitrarily large and are not ours to replay in full.
fn truncate_utf8(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

// ── CompletionBackend implementation ───────────────────────────────────────

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    async fn complete(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> Result<String, ProviderFailure> {
        // Credential is resolved per request so a key exported after startup
        // is picked up without a restart.
        let Some(api_key) = self.settings.resolve_credential() else {
            error!("[provider] No credential in config or ${CREDENTIAL_ENV}");
            return Err(ProviderFailure::Transport("missing provider credential".into()));
        };

        let url = self.url();
        let body = json!({
            "model": self.settings.model,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_message },
            ],
            "temperature": self.settings.temperature,
            "max_tokens": self.settings.max_tokens,
        });

        info!("[provider] Request to {} model={}", url, self.settings.model);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("[provider] HTTP request failed: {}", e);
                ProviderFailure::Transport(format!("HTTP request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            error!(
                "[provider] API error {}: {}",
                status.as_u16(),
                truncate_utf8(&body_text, 500)
            );
            return Err(ProviderFailure::Status {
                code: status.as_u16(),
                detail: truncate_utf8(&body_text, 200).to_string(),
            });
        }

        // A success status with an undecodable body is a transport-class
        // failure; a decodable body with nothing in it is "no content".
        let completion: ChatCompletion = response.json().await.map_err(|e| {
            error!("[provider] Undecodable success body: {}", e);
            ProviderFailure::Transport(format!("decode response: {e}"))
        })?;

        match extract_content(&completion) {
            Some(content) => {
                debug!("[provider] Completion of {} chars", content.len());
                Ok(content)
            }
            None => Err(ProviderFailure::Empty),
        }
    }
}
