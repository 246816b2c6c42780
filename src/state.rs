//! Application state: config, content catalog, round engine, sessions and highscore.
//!
//! Built once at startup and shared by every handler behind an `Arc`.

use std::sync::Arc;

use tracing::{error, info, instrument};

use crate::catalog::{Catalog, FsCatalog};
use crate::config::AppConfig;
use crate::domain::RoundMode;
use crate::round::RoundEngine;
use crate::score::ScoreStore;
use crate::session::SessionStore;

pub struct AppState {
    pub config: AppConfig,
    pub catalog: Arc<dyn Catalog>,
    /// Directory-backed listing of installed languages.
    pub languages: FsCatalog,
    pub engine: RoundEngine,
    pub sessions: SessionStore,
    pub scores: ScoreStore,
}

impl AppState {
    /// Build state from config: filesystem catalog, file-backed highscore.
    #[instrument(level = "info", skip_all)]
    pub async fn new(config: AppConfig) -> Self {
        let fs_catalog = FsCatalog::from_config(&config);
        let scores = ScoreStore::open(&config.highscore_path);
        if config.reset_highscore_on_startup {
            if let Err(e) = scores.reset().await {
                error!(target: "picmatch_backend", error = %e, "Highscore reset on startup failed");
            }
        }

        let languages = fs_catalog.languages();
        info!(
            target: "picmatch_backend",
            static_dir = %config.static_dir.display(),
            languages = ?languages,
            sentence_languages = ?config.sentence_languages,
            rounds = config.rounds_per_session,
            "Content corpus configured"
        );

        Self::with_parts(config, Arc::new(fs_catalog.clone()), fs_catalog, scores)
    }

    pub fn with_parts(config: AppConfig, catalog: Arc<dyn Catalog>, languages: FsCatalog, scores: ScoreStore) -> Self {
        Self {
            engine: RoundEngine::new(config.rounds_per_session),
            sessions: SessionStore::new(config.session_idle(), config.max_sessions),
            config,
            catalog,
            languages,
            scores,
        }
    }

    pub fn round_mode(&self, lang: &str) -> RoundMode {
        if self.config.is_sentence_language(lang) {
            RoundMode::Sentence
        } else {
            RoundMode::Symbol
        }
    }

    /// Session language, or the configured default.
    pub async fn language_for(&self, sid: &str) -> String {
        self.sessions
            .language(sid)
            .await
            .unwrap_or_else(|| self.config.default_language.clone())
    }
}
