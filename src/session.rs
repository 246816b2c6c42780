//! In-memory session store keyed by the opaque session token from the cookie.
//!
//! The outer map is only locked to look up, create or drop a handle; each
//! session then has its own mutex, so one player's round never waits on
//! another's. Entries idle past the configured limit are dropped when a new
//! session is created, and the map never holds more than `max_sessions`.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, instrument};

use crate::round::RoundProgress;

#[derive(Clone, Debug, Default)]
pub struct Session {
    /// Language picked by the player; `None` means "use the default".
    pub language: Option<String>,
    pub progress: RoundProgress,
}

pub type SessionHandle = Arc<Mutex<Session>>;

#[derive(Debug)]
struct Entry {
    handle: SessionHandle,
    last_seen: Instant,
}

#[derive(Debug)]
pub struct SessionStore {
    by_id: RwLock<HashMap<String, Entry>>,
    idle: Duration,
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(idle: Duration, max_sessions: usize) -> Self {
        Self {
            by_id: RwLock::new(HashMap::new()),
            idle,
            max_sessions: max_sessions.max(1),
        }
    }

    /// Handle for `sid`, created empty on first use. Marks the session as seen.
    #[instrument(level = "debug", skip(self))]
    pub async fn handle(&self, sid: &str) -> SessionHandle {
        let now = Instant::now();
        let mut by_id = self.by_id.write().await;
        if let Some(entry) = by_id.get_mut(sid) {
            entry.last_seen = now;
            return entry.handle.clone();
        }

        self.evict(&mut by_id, now);
        let handle: SessionHandle = Arc::new(Mutex::new(Session::default()));
        by_id.insert(sid.to_string(), Entry { handle: handle.clone(), last_seen: now });
        debug!(target: "picmatch_backend", %sid, live = by_id.len(), "Session created");
        handle
    }

    /// Make room for one more session: drop idle ones, then the least recently seen.
    fn evict(&self, by_id: &mut HashMap<String, Entry>, now: Instant) {
        let before = by_id.len();
        by_id.retain(|_, e| now.duration_since(e.last_seen) < self.idle);

        if by_id.len() >= self.max_sessions {
            let mut by_age: Vec<(Instant, String)> =
                by_id.iter().map(|(sid, e)| (e.last_seen, sid.clone())).collect();
            by_age.sort();
            let excess = by_id.len() + 1 - self.max_sessions;
            for (_, sid) in by_age.into_iter().take(excess) {
                by_id.remove(&sid);
            }
        }

        let dropped = before - by_id.len();
        if dropped > 0 {
            debug!(target: "picmatch_backend", dropped, live = by_id.len(), "Sessions evicted");
        }
    }

    pub async fn language(&self, sid: &str) -> Option<String> {
        let h = { self.by_id.read().await.get(sid).map(|e| e.handle.clone()) }?;
        let lang = h.lock().await.language.clone();
        lang
    }

    pub async fn set_language(&self, sid: &str, lang: &str) {
        let h = self.handle(sid).await;
        h.lock().await.language = Some(lang.to_string());
    }

    /// Drop round progress, keep the language.
    pub async fn clear_progress(&self, sid: &str) {
        let h = { self.by_id.read().await.get(sid).map(|e| e.handle.clone()) };
        if let Some(h) = h {
            h.lock().await.progress.clear();
        }
    }

    /// End the session's game. A session without a picked language holds
    /// nothing else, so it is removed; a later request starts a fresh one.
    #[instrument(level = "debug", skip(self))]
    pub async fn end_game(&self, sid: &str) {
        self.clear_progress(sid).await;

        let mut by_id = self.by_id.write().await;
        let removable = by_id.get(sid).is_some_and(|e| match e.handle.try_lock() {
            Ok(s) => s.language.is_none() && s.progress.is_idle(),
            // Another request is using it right now.
            Err(_) => false,
        });
        if removable {
            by_id.remove(sid);
            debug!(target: "picmatch_backend", %sid, "Session dropped after game end");
        }
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.by_id.read().await.len()
    }
}
