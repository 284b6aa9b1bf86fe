// Driftchat Core — Widget Theme & Mount Options
//
// One widget, parameterized by configuration. Styling variants are data,
// not separate components: every knob here is optional and defaulted.

use serde::{Deserialize, Serialize};

/// Visual configuration for the widget. All fields default sensibly so an
/// embedder can override any subset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetTheme {
    /// Fill color of the floating trigger button (any CSS color).
    pub button_color: String,
    /// CSS background of the panel header (color or gradient).
    pub header_gradient: String,
    /// Title shown in the panel header.
    pub title: String,
    /// First bot-styled bubble shown before any conversation.
    pub welcome_message: String,
    /// Placeholder text of the message input.
    pub input_placeholder: String,
}

impl Default for WidgetTheme {
    fn default() -> Self {
        WidgetTheme {
            button_color: "#2563eb".into(),
            header_gradient: "linear-gradient(135deg, #2563eb 0%, #4f46e5 100%)".into(),
            title: "AI Assistant".into(),
            welcome_message: "Hi! Ask me anything.".into(),
            input_placeholder: "Type a message...".into(),
        }
    }
}

/// Everything needed to mount the widget on a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetOptions {
    /// Absolute or same-origin URL of the gateway chat endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub theme: WidgetTheme,
}

fn default_endpoint() -> String {
    "/api/chat".into()
}

impl Default for WidgetOptions {
    fn default() -> Self {
        WidgetOptions {
            endpoint: default_endpoint(),
            theme: WidgetTheme::default(),
        }
    }
}
