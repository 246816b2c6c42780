//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;

use axum::{
  extract::{Path, Query, State},
  http::StatusCode,
  response::{Html, IntoResponse, Response},
  Extension, Json,
};
use tracing::{info, instrument, warn};

use crate::error::AppError;
use crate::logic::*;
use crate::protocol::*;
use crate::routes::session::SessionId;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

/// `/`, `/language`, `/game`: store `?lang=` if given, then serve the SPA shell.
#[instrument(level = "info", skip(state, sid), fields(sid = %sid.0, lang = ?q.lang))]
pub async fn http_page(
  State(state): State<Arc<AppState>>,
  Extension(sid): Extension<SessionId>,
  Query(q): Query<LangQuery>,
) -> Response {
  if let Some(lang) = q.lang.as_deref().filter(|l| !l.is_empty()) {
    set_language(&state, &sid.0, lang).await;
  }
  let index = state.config.index_html();
  match tokio::fs::read_to_string(&index).await {
    Ok(html) => Html(html).into_response(),
    Err(e) => {
      warn!(target: "picmatch_backend", path = %index.display(), error = %e, "index.html not readable");
      (StatusCode::NOT_FOUND, "index.html not found").into_response()
    }
  }
}

#[instrument(level = "info", skip(state, sid), fields(sid = %sid.0))]
pub async fn http_set_lang(
  State(state): State<Arc<AppState>>,
  Extension(sid): Extension<SessionId>,
  Path(lang): Path<String>,
) -> impl IntoResponse {
  set_language(&state, &sid.0, &lang).await;
  Json(SuccessOut { success: true })
}

#[instrument(level = "info", skip(state, sid), fields(sid = %sid.0))]
pub async fn http_get_lang(
  State(state): State<Arc<AppState>>,
  Extension(sid): Extension<SessionId>,
) -> impl IntoResponse {
  let lang = current_language(&state, &sid.0).await;
  Json(LangOut { lang })
}

#[instrument(level = "info", skip(state))]
pub async fn http_languages(State(state): State<Arc<AppState>>) -> Result<Json<Vec<String>>, AppError> {
  let langs = list_languages(&state).await?;
  info!(target: "picmatch_backend", count = langs.len(), "Languages listed");
  Ok(Json(langs))
}

#[instrument(level = "info", skip(state, sid), fields(sid = %sid.0))]
pub async fn http_next(
  State(state): State<Arc<AppState>>,
  Extension(sid): Extension<SessionId>,
) -> Result<Json<RoundOut>, AppError> {
  Ok(Json(next_round(&state, &sid.0).await?))
}

#[instrument(level = "info", skip(state, sid), fields(sid = %sid.0))]
pub async fn http_quit(
  State(state): State<Arc<AppState>>,
  Extension(sid): Extension<SessionId>,
) -> impl IntoResponse {
  quit(&state, &sid.0).await;
  Json(SuccessOut { success: true })
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_highscore(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HighscoreOut { highscore: highscore(&state).await })
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_submit(
  State(state): State<Arc<AppState>>,
  body: Option<Json<ScoreIn>>,
) -> Result<Json<HighscoreOut>, AppError> {
  let body = body.map(|Json(b)| b).unwrap_or_default();
  let highscore = submit_score(&state, &body.score).await?;
  info!(target: "score", submitted = %body.score, highscore, "Score submitted");
  Ok(Json(HighscoreOut { highscore }))
}
