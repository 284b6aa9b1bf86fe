// Driftchat Gateway — Persona Source
//
// The system prompt is injected configuration, not code. The gateway core
// only knows the `PersonaSource` interface; content comes from operator
// files (persona text plus an optional knowledge snapshot) or from the
// built-in minimal fallback when nothing is configured.

use crate::atoms::error::GatewayResult;
use crate::engine::config::GatewayConfig;
use log::{info, warn};
use std::sync::Arc;

/// Separator between composed prompt sections.
const SECTION_SEPARATOR: &str = "\n\n---\n\n";

/// Fallback persona when no file is configured. Deliberately generic; real
/// deployments point `persona_path` at their own content.
const DEFAULT_PERSONA: &str = "You are a helpful assistant embedded in a website chat widget. \
Answer concisely and in plain language. If you do not know something, say so \
instead of guessing. Stay on the site's topic and keep replies short enough \
to read in a small chat panel.";

/// Supplies the system prompt injected as the first message of every
/// provider call.
pub trait PersonaSource: Send + Sync {
    fn system_prompt(&self) -> String;
}

/// A fixed prompt, composed once. The only implementation the daemon needs;
/// the trait exists so embedders can inject dynamic sources.
pub struct StaticPersona {
    prompt: String,
}

impl StaticPersona {
    pub fn new(prompt: impl Into<String>) -> Self {
        StaticPersona { prompt: prompt.into() }
    }
}

impl Default for StaticPersona {
    fn default() -> Self {
        StaticPersona::new(DEFAULT_PERSONA)
    }
}

impl PersonaSource for StaticPersona {
    fn system_prompt(&self) -> String {
        self.prompt.clone()
    }
}

/// Join non-empty sections with the separator. Empty or whitespace-only
/// sections are dropped so a blank knowledge file adds nothing.
pub fn compose_system_prompt(sections: &[&str]) -> String {
    sections
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(SECTION_SEPARATOR)
}

/// Build the persona from config: read the persona file and optional
/// knowledge file, or fall back to the built-in default. A configured path
/// that cannot be read is an error; a missing option is not.
pub fn load_persona(config: &GatewayConfig) -> GatewayResult<Arc<dyn PersonaSource>> {
    let mut sections: Vec<String> = Vec::new();

    if let Some(path) = &config.persona_path {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("read persona {}: {}", path, e))?;
        info!("[persona] Loaded persona from {} ({} chars)", path, text.len());
        sections.push(text);
    }
    if let Some(path) = &config.knowledge_path {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("read knowledge {}: {}", path, e))?;
        info!("[persona] Loaded knowledge from {} ({} chars)", path, text.len());
        sections.push(text);
    }

    if sections.is_empty() {
        warn!("[persona] No persona configured — using the built-in default");
        return Ok(Arc::new(StaticPersona::default()));
    }

    let refs: Vec<&str> = sections.iter().map(String::as_str).collect();
    Ok(Arc::new(StaticPersona::new(compose_system_prompt(&refs))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_joins_nonempty_sections() {
        let prompt = compose_system_prompt(&["persona text", "knowledge text"]);
        assert_eq!(prompt, "persona text\n\n---\n\nknowledge text");
    }

    #[test]
    fn compose_drops_blank_sections() {
        let prompt = compose_system_prompt(&["persona", "   ", "", "\n"]);
        assert_eq!(prompt, "persona");
    }

    #[test]
    fn compose_trims_section_edges() {
        let prompt = compose_system_prompt(&["  a  ", "b\n"]);
        assert_eq!(prompt, "a\n\n---\n\nb");
    }

    #[test]
    fn default_persona_is_fixed() {
        let persona = StaticPersona::default();
        let first = persona.system_prompt();
        assert_eq!(persona.system_prompt(), first);
        assert!(first.contains("chat widget"));
    }

    #[test]
    fn unconfigured_load_falls_back_to_default() {
        let config = GatewayConfig::default();
        let persona = load_persona(&config).unwrap();
        assert_eq!(persona.system_prompt(), StaticPersona::default().system_prompt());
    }

    #[test]
    fn configured_but_unreadable_persona_is_an_error() {
        let mut config = GatewayConfig::default();
        config.persona_path = Some("/nonexistent/driftchat-persona.md".into());
        assert!(load_persona(&config).is_err());
    }
}
