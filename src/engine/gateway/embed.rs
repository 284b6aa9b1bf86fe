// Driftchat Gateway — Demo Page
//
// A self-contained page served at GET / that mounts the widget through the
// same loader module real embedders use, and shows the copy-paste snippet.
// No secrets are embedded; everything here is public configuration.

use crate::engine::config::GatewayConfig;
use driftchat_core::embed::{inline_snippet, script_src_snippet};
use driftchat_core::WidgetOptions;

/// Mount options derived from server config: absolute endpoint plus the
/// configured theme.
pub(crate) fn widget_options(config: &GatewayConfig) -> WidgetOptions {
    WidgetOptions {
        endpoint: format!("{}/api/chat", config.effective_public_url()),
        theme: config.theme.clone(),
    }
}

/// The loader module body served at GET /embed.js.
pub(crate) fn build_embed_js(config: &GatewayConfig) -> String {
    driftchat_core::embed::loader_module_js(
        &config.effective_public_url(),
        &widget_options(config),
    )
}

/// The demo / instructions page served at GET /.
pub(crate) fn build_demo_page(config: &GatewayConfig) -> String {
    let base = config.effective_public_url();
    let options = widget_options(config);
    let src_tag = escape_html(&script_src_snippet(&base));
    let inline_tag = escape_html(&inline_snippet(&base, &options));
    let title = &config.theme.title;

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} — driftchat demo</title>
<style>
  body {{ font-family: -apple-system, 'Segoe UI', Roboto, sans-serif;
         max-width: 720px; margin: 40px auto; padding: 0 16px;
         color: #1f2937; background: #f9fafb; }}
  h1 {{ font-size: 1.4em; }}
  pre {{ background: #111827; color: #e5e7eb; padding: 12px;
         border-radius: 8px; overflow-x: auto; font-size: 0.85em; }}
  .hint {{ color: #6b7280; font-size: 0.9em; }}
</style>
</head>
<body>
<h1>{title}</h1>
<p>This page embeds the chat widget exactly the way your site would.
Drag the round button anywhere; click it to open the panel.</p>
<h2>Embed on your site</h2>
<p>One line, loader served by this gateway:</p>
<pre>{src_tag}</pre>
<p>Or self-contained, no extra fetch:</p>
<pre>{inline_tag}</pre>
<p class="hint">The widget bundle is served from {base}/pkg/. Responses come
from {base}/api/chat.</p>
<script type="module" src="{base}/embed.js"></script>
</body>
</html>
"##,
        title = title,
        src_tag = src_tag,
        inline_tag = inline_tag,
        base = base,
    )
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GatewayConfig {
        let mut config = GatewayConfig::default();
        config.public_url = Some("https://chat.example.com".into());
        config.theme.title = "Acme Assistant".into();
        config
    }

    #[test]
    fn demo_page_mounts_via_the_served_loader() {
        let page = build_demo_page(&config());
        assert!(page.contains(r#"<script type="module" src="https://chat.example.com/embed.js">"#));
        assert!(page.contains("Acme Assistant"));
    }

    #[test]
    fn demo_page_shows_escaped_snippets() {
        let page = build_demo_page(&config());
        assert!(page.contains("&lt;script type=\"module\""));
        assert!(!page.contains("<pre><script"), "snippet must be escaped inside pre blocks");
    }

    #[test]
    fn embed_js_targets_the_public_endpoint() {
        let js = build_embed_js(&config());
        assert!(js.contains(r#""endpoint":"https://chat.example.com/api/chat""#));
        assert!(js.contains("https://chat.example.com/pkg/driftchat_widget.js"));
    }
}
