// Driftchat Gateway — Configuration
//
// One TOML file drives the daemon: listener address, optional TLS, provider
// settings, persona file paths, and the widget theme baked into the demo
// page and embed snippet. Every field has a default so a missing file means
// "run with defaults", not an error. Environment variables override the
// handful of values that differ between deploys of the same file.

use crate::atoms::constants::{
    CREDENTIAL_ENV, DEFAULT_BASE_URL, DEFAULT_BIND, DEFAULT_MAX_TOKENS, DEFAULT_MODEL,
    DEFAULT_PORT, DEFAULT_TEMPERATURE,
};
use crate::atoms::error::{GatewayError, GatewayResult};
use driftchat_core::WidgetTheme;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ── Provider settings ──────────────────────────────────────────────────

/// Connection and generation settings for the completion provider.
/// Generation parameters are part of the gateway contract. They are never
/// read from the request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// OpenAI-compatible API root, without the trailing `/chat/completions`.
    pub base_url: String,
    /// Bearer credential. Empty means "read the environment at request time".
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        ProviderSettings {
            base_url: DEFAULT_BASE_URL.into(),
            api_key: String::new(),
            model: DEFAULT_MODEL.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl ProviderSettings {
    /// Resolve the credential at request time: config value first, then the
    /// process environment. `None` is a configuration error the caller maps
    /// to the generic failure reply.
    pub fn resolve_credential(&self) -> Option<String> {
        if !self.api_key.trim().is_empty() {
            return Some(self.api_key.trim().to_string());
        }
        std::env::var(CREDENTIAL_ENV).ok().filter(|v| !v.trim().is_empty())
    }
}

// ── Gateway config ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Address to bind — "127.0.0.1" (local only) or "0.0.0.0" (public).
    pub bind_address: String,
    pub port: u16,
    /// Path to TLS certificate PEM file (enables HTTPS when set with tls_key_path).
    pub tls_cert_path: Option<String>,
    /// Path to TLS private key PEM file.
    pub tls_key_path: Option<String>,
    /// Externally reachable base URL, used when rendering the embed snippet.
    /// Defaults to the bind address when unset.
    pub public_url: Option<String>,
    /// Directory holding the built widget bundle (`driftchat_widget.js` and
    /// `driftchat_widget_bg.wasm`). Unset disables the /pkg routes.
    pub widget_dir: Option<String>,
    /// Persona text file injected as the system prompt. Unset falls back to
    /// the built-in minimal persona.
    pub persona_path: Option<String>,
    /// Optional knowledge text appended to the persona.
    pub knowledge_path: Option<String>,
    pub provider: ProviderSettings,
    pub theme: WidgetTheme,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        GatewayConfig {
            bind_address: DEFAULT_BIND.into(),
            port: DEFAULT_PORT,
            tls_cert_path: None,
            tls_key_path: None,
            public_url: None,
            widget_dir: None,
            persona_path: None,
            knowledge_path: None,
            provider: ProviderSettings::default(),
            theme: WidgetTheme::default(),
        }
    }
}

impl GatewayConfig {
    /// Default config file location: `<config dir>/driftchat/driftchat.toml`.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("driftchat")
            .join("driftchat.toml")
    }

    /// Load from `path`, or from the default location when `None`. A missing
    /// file yields defaults; a present-but-broken file is an error (silently
    /// ignoring a typo'd config is worse than refusing to start).
    pub fn load(path: Option<&Path>) -> GatewayResult<Self> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::default_path);
        if !path.exists() {
            info!("[config] No config at {} — using defaults", path.display());
            let mut config = GatewayConfig::default();
            config.apply_env();
            return Ok(config);
        }
        let raw = std::fs::read_to_string(&path)?;
        let mut config: GatewayConfig = toml::from_str(&raw)
            .map_err(|e| GatewayError::Config(format!("{}: {}", path.display(), e)))?;
        info!("[config] Loaded {}", path.display());
        config.apply_env();
        Ok(config)
    }

    /// Write the config as TOML, creating parent directories. Used to seed a
    /// commented starting point on first run.
    pub fn save(&self, path: &Path) -> GatewayResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let body = toml::to_string_pretty(self)
            .map_err(|e| GatewayError::Config(format!("serialize config: {e}")))?;
        std::fs::write(path, body)?;
        info!("[config] Wrote {}", path.display());
        Ok(())
    }

    /// Overlay the `DRIFTCHAT_*` environment on top of the file values.
    fn apply_env(&mut self) {
        if let Ok(bind) = std::env::var("DRIFTCHAT_BIND") {
            self.bind_address = bind;
        }
        if let Ok(port) = std::env::var("DRIFTCHAT_PORT") {
            match port.parse() {
                Ok(p) => self.port = p,
                Err(_) => warn!("[config] Ignoring non-numeric DRIFTCHAT_PORT={}", port),
            }
        }
        if let Ok(url) = std::env::var("DRIFTCHAT_PUBLIC_URL") {
            self.public_url = Some(url);
        }
    }

    /// Base URL embeds and snippets should point at.
    pub fn effective_public_url(&self) -> String {
        match &self.public_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => {
                let scheme = if self.tls_cert_path.is_some() { "https" } else { "http" };
                format!("{}://{}:{}", scheme, self.bind_address, self.port)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_wire_contract() {
        let config = GatewayConfig::default();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.provider.model, "gpt-3.5-turbo");
        assert_eq!(config.provider.temperature, 0.3);
        assert_eq!(config.provider.max_tokens, 600);
        assert!(config.tls_cert_path.is_none());
    }

    #[test]
    fn partial_toml_keeps_defaults_for_unnamed_fields() {
        let config: GatewayConfig = toml::from_str(
            r#"
            port = 9000
            [provider]
            model = "gpt-4o-mini"
            "#,
        )
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.provider.model, "gpt-4o-mini");
        assert_eq!(config.provider.max_tokens, 600, "unnamed provider fields keep defaults");
        assert_eq!(config.bind_address, DEFAULT_BIND);
    }

    #[test]
    fn config_round_trips_through_toml() {
        let mut config = GatewayConfig::default();
        config.port = 4242;
        config.theme.button_color = "#ff0000".into();
        let raw = toml::to_string_pretty(&config).unwrap();
        let back: GatewayConfig = toml::from_str(&raw).unwrap();
        assert_eq!(back.port, 4242);
        assert_eq!(back.theme.button_color, "#ff0000");
    }

    #[test]
    fn public_url_falls_back_to_bind_address() {
        let mut config = GatewayConfig::default();
        config.bind_address = "127.0.0.1".into();
        config.port = 8080;
        assert_eq!(config.effective_public_url(), "http://127.0.0.1:8080");
        config.public_url = Some("https://chat.example.com/".into());
        assert_eq!(config.effective_public_url(), "https://chat.example.com");
    }

    #[test]
    fn credential_prefers_config_over_env() {
        let mut settings = ProviderSettings::default();
        settings.api_key = "sk-config".into();
        assert_eq!(settings.resolve_credential().as_deref(), Some("sk-config"));
    }
}
