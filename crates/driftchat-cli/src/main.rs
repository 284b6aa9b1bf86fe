// Driftchat CLI — Terminal companion for the gateway
//
// Three small verbs: print the embed snippets for a deployed gateway, send
// one smoke-test message through /api/chat, and probe /api/status. Talks
// only to the public HTTP surface, never to gateway internals.

use clap::{Parser, Subcommand};
use driftchat_core::embed::{inline_snippet, script_src_snippet};
use driftchat_core::{ChatRequest, ChatResponse, WidgetOptions, WidgetTheme};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "driftchat-cli")]
#[command(version = "0.1.0")]
#[command(about = "Embed snippets, smoke-test messages, and status probes for a driftchat gateway")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print copy-paste embed snippets for a gateway
    Snippet {
        /// Public base URL of the gateway, e.g. https://chat.example.com
        url: String,

        /// Chat endpoint baked into the inline snippet (defaults to <url>/api/chat)
        #[arg(long)]
        endpoint: Option<String>,

        /// Trigger button color (any CSS color)
        #[arg(long)]
        button_color: Option<String>,

        /// Panel title
        #[arg(long)]
        title: Option<String>,
    },

    /// Send one message and print the reply
    Ask {
        message: String,

        /// Gateway base URL
        #[arg(long, env = "DRIFTCHAT_URL", default_value = "http://127.0.0.1:8787")]
        url: String,
    },

    /// Probe the gateway status endpoint
    Check {
        /// Gateway base URL
        #[arg(long, env = "DRIFTCHAT_URL", default_value = "http://127.0.0.1:8787")]
        url: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Snippet { url, endpoint, button_color, title } => {
            print_snippets(&url, endpoint, button_color, title);
            ExitCode::SUCCESS
        }
        Commands::Ask { message, url } => ask(&url, &message).await,
        Commands::Check { url } => check(&url).await,
    }
}

fn print_snippets(
    url: &str,
    endpoint: Option<String>,
    button_color: Option<String>,
    title: Option<String>,
) {
    let base = url.trim_end_matches('/').to_string();
    let mut options = WidgetOptions {
        endpoint: endpoint.unwrap_or_else(|| format!("{base}/api/chat")),
        theme: WidgetTheme::default(),
    };
    if let Some(color) = button_color {
        options.theme.button_color = color;
    }
    if let Some(title) = title {
        options.theme.title = title;
    }

    println!("Hosted loader (theme comes from the gateway config):\n");
    println!("  {}", script_src_snippet(&base));
    println!("\nSelf-contained (options baked into the page):\n");
    for line in inline_snippet(&base, &options).lines() {
        println!("  {line}");
    }
}

/// POST one message. The reply prints either way; the exit code says
/// whether the gateway reported success.
async fn ask(url: &str, message: &str) -> ExitCode {
    let endpoint = format!("{}/api/chat", url.trim_end_matches('/'));
    let request = ChatRequest::new(message);

    let response = match reqwest::Client::new().post(&endpoint).json(&request).send().await {
        Ok(response) => response,
        Err(e) => {
            eprintln!("request to {endpoint} failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    let status = response.status();
    match response.json::<ChatResponse>().await {
        Ok(parsed) => {
            println!("{}", parsed.reply);
            if status.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            eprintln!("unusable response ({status}): {e}");
            ExitCode::FAILURE
        }
    }
}

async fn check(url: &str) -> ExitCode {
    let endpoint = format!("{}/api/status", url.trim_end_matches('/'));
    match reqwest::Client::new().get(&endpoint).send().await {
        Ok(response) if response.status().is_success() => {
            match response.json::<serde_json::Value>().await {
                Ok(status) => {
                    println!("{}", serde_json::to_string_pretty(&status).unwrap_or_default());
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("unusable status body: {e}");
                    ExitCode::FAILURE
                }
            }
        }
        Ok(response) => {
            eprintln!("gateway answered {}", response.status());
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("gateway unreachable: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
