//! Session cookie middleware: every API request carries an opaque session token.
//!
//! The token is read from the configured cookie; when absent (or implausible)
//! a fresh UUID is issued and returned with `Set-Cookie`. Handlers read it via
//! `Extension<SessionId>`.

use std::sync::Arc;

use axum::{
  extract::{Request, State},
  http::{header, HeaderValue},
  middleware::Next,
  response::Response,
};
use tracing::debug;
use uuid::Uuid;

use crate::state::AppState;
use crate::util::cookie_value;

const MAX_TOKEN_LEN: usize = 64;

#[derive(Clone, Debug)]
pub struct SessionId(pub String);

pub async fn session_cookie(State(state): State<Arc<AppState>>, mut req: Request, next: Next) -> Response {
  let name = state.config.session_cookie.as_str();
  let existing = req
    .headers()
    .get(header::COOKIE)
    .and_then(|v| v.to_str().ok())
    .and_then(|h| cookie_value(h, name))
    .filter(|v| v.len() <= MAX_TOKEN_LEN)
    .map(str::to_string);

  let (sid, fresh) = match existing {
    Some(sid) => (sid, false),
    None => (Uuid::new_v4().to_string(), true),
  };
  req.extensions_mut().insert(SessionId(sid.clone()));

  let mut res = next.run(req).await;
  if fresh {
    debug!(target: "picmatch_backend", %sid, "Issuing session cookie");
    let cookie = format!("{name}={sid}; Path=/; HttpOnly; SameSite=Lax");
    if let Ok(v) = HeaderValue::from_str(&cookie) {
      res.headers_mut().append(header::SET_COOKIE, v);
    }
  }
  res
}
