//! Session-level operations shared by the HTTP handlers.
//!
//! This includes:
//!   - serving the next round for a session (blocking catalog reads off the runtime)
//!   - quitting a game, picking and reading the session language
//!   - listing installed languages
//!   - highscore read/submit

use tracing::{debug, info, instrument, warn};

use crate::domain::RoundMode;
use crate::error::{AppError, Result};
use crate::protocol::{to_out, RoundOut};
use crate::round::{RoundOutcome, OPTIONS_PER_ROUND};
use crate::state::AppState;

#[instrument(level = "info", skip(state), fields(%sid))]
pub async fn next_round(state: &AppState, sid: &str) -> Result<RoundOut> {
  let handle = state.sessions.handle(sid).await;
  let mut session = handle.lock_owned().await;

  let lang = session
    .language
    .clone()
    .unwrap_or_else(|| state.config.default_language.clone());
  let mode = state.round_mode(&lang);
  let engine = state.engine;
  let catalog = state.catalog.clone();

  // Catalog reads hit the filesystem; the session lock travels with the work.
  let (lang, outcome) = tokio::task::spawn_blocking(move || {
    let outcome = engine.next_round(&mut session.progress, mode, &lang, catalog.as_ref(), &mut rand::thread_rng());
    (lang, outcome)
  })
  .await?;

  match outcome {
    RoundOutcome::Round(r) => {
      info!(target: "round", %sid, %lang, index = r.index, ?mode, "Round served");
      Ok(to_out(&r))
    }
    RoundOutcome::Finished => {
      info!(target: "round", %sid, %lang, "Session finished");
      state.sessions.end_game(sid).await;
      Ok(RoundOut::finished())
    }
    RoundOutcome::InsufficientContent { available } => {
      let required = match mode {
        RoundMode::Symbol => OPTIONS_PER_ROUND,
        RoundMode::Sentence => 1,
      };
      warn!(target: "round", %sid, %lang, available, required, "Insufficient content for a round");
      state.sessions.end_game(sid).await;
      Err(AppError::InsufficientContent { language: lang, available, required })
    }
  }
}

#[instrument(level = "info", skip(state), fields(%sid))]
pub async fn quit(state: &AppState, sid: &str) {
  state.sessions.end_game(sid).await;
}

#[instrument(level = "info", skip(state), fields(%sid, %lang))]
pub async fn set_language(state: &AppState, sid: &str, lang: &str) {
  state.sessions.set_language(sid, lang).await;
  debug!(target: "picmatch_backend", %sid, %lang, "Session language set");
}

pub async fn current_language(state: &AppState, sid: &str) -> String {
  state.language_for(sid).await
}

#[instrument(level = "debug", skip(state))]
pub async fn list_languages(state: &AppState) -> Result<Vec<String>> {
  let languages = state.languages.clone();
  Ok(tokio::task::spawn_blocking(move || languages.languages()).await?)
}

pub async fn highscore(state: &AppState) -> u64 {
  state.scores.current().await
}

#[instrument(level = "info", skip(state))]
pub async fn submit_score(state: &AppState, raw: &serde_json::Value) -> Result<u64> {
  let score = score_from_json(raw);
  state.scores.submit(score).await
}

/// Lenient score reading: integers, floats (truncated) and numeric strings.
/// Anything else counts as 0.
pub fn score_from_json(v: &serde_json::Value) -> i64 {
  match v {
    serde_json::Value::Number(n) => n
      .as_i64()
      .or_else(|| n.as_u64().map(|u| i64::try_from(u).unwrap_or(i64::MAX)))
      .or_else(|| n.as_f64().map(|f| f as i64))
      .unwrap_or(0),
    serde_json::Value::String(s) => s.trim().parse::<i64>().unwrap_or(0),
    _ => 0,
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn scores_are_read_leniently() {
    assert_eq!(score_from_json(&json!(7)), 7);
    assert_eq!(score_from_json(&json!(7.9)), 7);
    assert_eq!(score_from_json(&json!(" 12 ")), 12);
    assert_eq!(score_from_json(&json!(-3)), -3);
    assert_eq!(score_from_json(&json!(null)), 0);
    assert_eq!(score_from_json(&json!("seven")), 0);
    assert_eq!(score_from_json(&json!([1])), 0);
  }
}
