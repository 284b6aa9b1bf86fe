// Driftchat Core — Embed Loader Builders
//
// The script-snippet side of the embedding surface: tiny JS loaders that
// import the built widget bundle and mount it with a baked-in config. Pure
// string building, shared by the gateway (serving /embed.js) and the CLI
// (printing copy-paste snippets).

use crate::theme::WidgetOptions;

/// Serialized mount options. Falls back to `{}` (all defaults) if the
/// options somehow fail to serialize, which keeps the loader valid JS.
pub fn options_json(options: &WidgetOptions) -> String {
    serde_json::to_string(options).unwrap_or_else(|_| "{}".into())
}

/// The ES module body served at `{base}/embed.js`: load the wasm bundle,
/// then mount with the configured endpoint and theme. URLs are absolute so
/// the module works when fetched cross-origin from an embedding page.
pub fn loader_module_js(public_base: &str, options: &WidgetOptions) -> String {
    let base = public_base.trim_end_matches('/');
    format!(
        "import init, {{ mount }} from '{base}/pkg/driftchat_widget.js';\n\
         await init();\n\
         mount({options});\n",
        base = base,
        options = options_json(options),
    )
}

/// One-line embed: reference the gateway-served loader module.
pub fn script_src_snippet(public_base: &str) -> String {
    let base = public_base.trim_end_matches('/');
    format!(r#"<script type="module" src="{base}/embed.js"></script>"#)
}

/// Self-contained inline embed: the loader module body inside a script tag,
/// for pages that prefer not to fetch an extra file.
pub fn inline_snippet(public_base: &str, options: &WidgetOptions) -> String {
    format!(
        "<script type=\"module\">\n{}</script>",
        loader_module_js(public_base, options)
    )
}
