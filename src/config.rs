//! Loading application configuration (content paths, game limits, sessions) from TOML.
//!
//! See `AppConfig` for the expected schema. Every field has a default, so an
//! empty file (or no file at all) yields a working setup rooted at `./frontend`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{error, info};

use crate::error::AppError;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AppConfig {
  /// Front-end root. Content lives under `<static_dir>/static/...`.
  pub static_dir: PathBuf,
  /// Plain-text file holding the single global highscore.
  pub highscore_path: PathBuf,
  /// Rounds per session before the game reports `finished`.
  pub rounds_per_session: usize,
  /// Language used when a session never picked one.
  pub default_language: String,
  /// Languages played with numbered sentence/image triples instead of symbols.
  pub sentence_languages: Vec<String>,
  /// Flag file stem -> language code (e.g. `us.svg` is the flag for `en`).
  pub flag_aliases: HashMap<String, String>,
  pub reset_highscore_on_startup: bool,
  pub session_cookie: String,
  /// Sessions untouched for this many seconds are dropped.
  pub session_idle_secs: u64,
  /// Upper bound on live sessions; the least recently used go first.
  pub max_sessions: usize,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      static_dir: PathBuf::from("./frontend"),
      highscore_path: PathBuf::from("./highscore.txt"),
      rounds_per_session: 10,
      default_language: "en".into(),
      sentence_languages: vec!["pl".into()],
      flag_aliases: HashMap::from([("us".to_string(), "en".to_string())]),
      reset_highscore_on_startup: false,
      session_cookie: "quiz_sid".into(),
      session_idle_secs: 3600,
      max_sessions: 10_000,
    }
  }
}

impl AppConfig {
  /// Config rooted at `static_dir`, everything else default.
  #[cfg(test)]
  pub fn with_static_dir(static_dir: impl Into<PathBuf>) -> Self {
    Self { static_dir: static_dir.into(), ..Self::default() }
  }

  pub fn is_sentence_language(&self, lang: &str) -> bool {
    self.sentence_languages.iter().any(|l| l == lang)
  }

  pub fn session_idle(&self) -> Duration { Duration::from_secs(self.session_idle_secs) }

  pub fn content_root(&self) -> PathBuf { self.static_dir.join("static") }
  pub fn symbols_dir(&self) -> PathBuf { self.content_root().join("symbols") }
  pub fn locales_dir(&self) -> PathBuf { self.content_root().join("locales") }
  pub fn langs_dir(&self) -> PathBuf { self.content_root().join("langs") }
  pub fn index_html(&self) -> PathBuf { self.static_dir.join("index.html") }
}

/// Parse a TOML config file.
pub fn read_app_config(path: &Path) -> Result<AppConfig, AppError> {
  let raw = std::fs::read_to_string(path)?;
  toml::from_str::<AppConfig>(&raw).map_err(|e| AppError::Config(e.to_string()))
}

/// Load config from `explicit` or QUIZ_CONFIG_PATH. On any IO/parse error, logs and returns defaults.
pub fn load_app_config(explicit: Option<&Path>) -> AppConfig {
  let path = match explicit {
    Some(p) => p.to_path_buf(),
    None => match std::env::var("QUIZ_CONFIG_PATH") {
      Ok(p) => PathBuf::from(p),
      Err(_) => {
        info!(target: "picmatch_backend", "No QUIZ_CONFIG_PATH set; using default config");
        return AppConfig::default();
      }
    },
  };

  match read_app_config(&path) {
    Ok(cfg) => {
      info!(target: "picmatch_backend", path = %path.display(), "Loaded app config (TOML)");
      cfg
    }
    Err(e) => {
      error!(target: "picmatch_backend", path = %path.display(), error = %e, "Failed to load TOML config; using defaults");
      AppConfig::default()
    }
  }
}
