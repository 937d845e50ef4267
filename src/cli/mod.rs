//! Subcommand handlers.
//!
//! Keeps `main.rs` slim: clap parsing stays there, the logic lives here.

use anyhow::Context;
use tracing::{info, warn};

use crate::assistant::Assistant;
use crate::config::{self, Config};
use crate::gateway::{self, AppState};
use crate::models::GeminiProvider;

/// Build the assistant, or `None` (with a warning) when the credential is
/// missing.  The rest of the service runs either way.
pub fn try_build_assistant(cfg: &Config) -> Option<Assistant> {
    match Assistant::from_config(cfg) {
        Ok(assistant) => {
            info!(status = assistant.status_label(), "AI assistant constructed");
            Some(assistant)
        }
        Err(e) => {
            warn!(error = %e, "AI assistant not initialized, AI endpoints will answer 503");
            None
        }
    }
}

/// Shared handler state for `cfg`.
pub fn build_state(cfg: &Config) -> AppState {
    AppState::new(try_build_assistant(cfg)).with_allowed_origins(cfg.allowed_origins.clone())
}

/// Run the HTTP server until Ctrl-C.
pub async fn serve(cfg: &Config) -> anyhow::Result<()> {
    let state = build_state(cfg);
    let ai = match &state.assistant {
        Some(a) if a.is_degraded() => "mock mode",
        Some(_) => "ready",
        None => "not configured",
    };

    let gw = gateway::start_gateway(cfg.bind, state)
        .await
        .with_context(|| format!("failed to bind {}", cfg.bind))?;

    println!();
    println!("  Portfolio AI Assistant v{}", env!("CARGO_PKG_VERSION"));
    println!("  API:       http://{}", gw.addr);
    println!("  Health:    http://{}/health", gw.addr);
    println!("  Assistant: {ai}");
    println!();

    tokio::signal::ctrl_c().await?;
    info!("received Ctrl-C, shutting down");
    gw.handle.abort();
    Ok(())
}

fn require_assistant(cfg: &Config) -> anyhow::Result<Assistant> {
    Assistant::from_config(cfg).context("cannot start the assistant")
}

/// Send one message to the assistant and print the reply.
pub async fn chat(cfg: &Config, message: &str) -> anyhow::Result<()> {
    let assistant = require_assistant(cfg)?;
    let reply = assistant.get_response(message, None).await;
    println!("{reply}");
    Ok(())
}

/// Print project suggestions for `description` as JSON.
pub async fn suggest(cfg: &Config, description: &str) -> anyhow::Result<()> {
    let assistant = require_assistant(cfg)?;
    let out = assistant.generate_project_suggestions(description).await;
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

/// Print the models available to the configured key that support
/// `generateContent`.
pub async fn models(cfg: &Config) -> anyhow::Result<()> {
    let api_key = config::api_key_from_env().context("cannot list models")?;
    let provider = GeminiProvider::new(
        api_key,
        cfg.gemini.endpoint.as_str(),
        cfg.gemini.model.as_str(),
    )?;

    let models = provider.list_models().await?;
    if models.is_empty() {
        println!("No models support generateContent for this key.");
        return Ok(());
    }
    for m in &models {
        let id = m.name.strip_prefix("models/").unwrap_or(&m.name);
        let marker = if id == cfg.gemini.model { " (configured)" } else { "" };
        match &m.display_name {
            Some(display) => println!("{id}  {display}{marker}"),
            None => println!("{id}{marker}"),
        }
    }
    Ok(())
}
