//! Picmatch · Picture Quiz Backend
//!
//! - Axum HTTP API for a picture/word (and picture/sentence) matching game
//! - Per-session rounds kept in memory behind a session cookie
//! - One global highscore persisted to a text file
//! - Static SPA + content served from the front-end directory
//! - Offline content helpers (TTS text lists, UI strings, transliteration)
//!
//! Important env variables:
//!   PORT             : u16 (default 5000)
//!   QUIZ_CONFIG_PATH : path to TOML config (paths, round limit, sentence languages)
//!   LOG_LEVEL        : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT       : "pretty" (default) or "json"

mod telemetry;
mod util;
mod error;
mod domain;
mod config;
mod catalog;
mod round;
mod session;
mod score;
mod state;
mod protocol;
mod logic;
mod routes;
mod content;

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::load_app_config;
use crate::routes::build_router;
use crate::state::AppState;

#[derive(Parser, Debug)]
#[command(name = "picmatch-backend")]
#[command(about = "Picture quiz backend and content tools")]
#[command(version)]
struct Cli {
  /// TOML config file (falls back to QUIZ_CONFIG_PATH, then defaults)
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  /// HTTP port for `serve`
  #[arg(short, long, global = true, default_value_t = 5000, env = "PORT")]
  port: u16,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Run the HTTP server (default)
  Serve,
  /// Write tts_<lang>.txt for every locale file
  TtsText {
    /// Output directory for the text lists
    #[arg(long, default_value = "./tts")]
    out: PathBuf,
  },
  /// Extract UI strings of en.json for translation
  UiStrings {
    #[arg(long, default_value = "./translation_input.txt")]
    out: PathBuf,
  },
  /// Fold language-specific letters to ASCII in asset names and keys
  Transliterate {
    /// Directory holding tts_<lang>.txt
    #[arg(long, default_value = "./tts")]
    tts_dir: PathBuf,
    #[arg(required = true)]
    langs: Vec<String>,
  },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  let cli = Cli::parse();
  let cfg = load_app_config(cli.config.as_deref());

  match cli.command.unwrap_or(Command::Serve) {
    Command::Serve => serve(cfg, cli.port).await?,
    Command::TtsText { out } => {
      content::write_tts_files(&cfg.locales_dir(), &out)?;
    }
    Command::UiStrings { out } => {
      content::write_ui_strings(&cfg.locales_dir().join("en.json"), &out)?;
    }
    Command::Transliterate { tts_dir, langs } => {
      for lang in langs {
        match content::transliteration_table(&lang) {
          Some(table) => {
            content::transliterate_language(&cfg.content_root(), &tts_dir, &lang, &table)?;
          }
          None => error!(target: "content", %lang, "No transliteration table for language; skipped"),
        }
      }
    }
  }
  Ok(())
}

async fn serve(cfg: config::AppConfig, port: u16) -> Result<(), Box<dyn std::error::Error>> {
  // Build shared application state (catalog, sessions, highscore).
  let state = Arc::new(AppState::new(cfg).await);

  // Build the HTTP router with routes, sessions, CORS and tracing layers.
  let app = build_router(state);

  let addr = SocketAddr::from(([0, 0, 0, 0], port));
  let listener = TcpListener::bind(addr).await?;
  info!(target: "picmatch_backend", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    error!(target: "picmatch_backend", error = %e, "Failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
  info!(target: "picmatch_backend", "Shutdown signal received");
}
