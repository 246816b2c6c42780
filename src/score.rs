//! Highscore store: one global best score, persisted as a plain integer in a text file.
//!
//! Every read-compare-write runs under a single async mutex, so concurrent
//! submissions are serialized and the stored value only ever grows.

use std::path::PathBuf;

use tokio::sync::Mutex;
use tracing::{error, info, instrument, warn};

use crate::error::Result;

#[derive(Debug)]
pub struct ScoreStore {
    path: Option<PathBuf>,
    best: Mutex<u64>,
}

impl ScoreStore {
    /// Open a file-backed store. An absent or unparsable file reads as 0.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let best = match std::fs::read_to_string(&path) {
            Ok(s) => s.trim().parse::<u64>().unwrap_or_else(|e| {
                warn!(target: "score", path = %path.display(), error = %e, "Unparsable highscore file; starting at 0");
                0
            }),
            Err(_) => 0,
        };
        info!(target: "score", path = %path.display(), best, "Highscore store opened");
        Self { path: Some(path), best: Mutex::new(best) }
    }

    /// Memory-only store (nothing persisted).
    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self { path: None, best: Mutex::new(0) }
    }

    pub async fn current(&self) -> u64 {
        *self.best.lock().await
    }

    /// Keep the larger of `score` and the stored best; return the resulting best.
    /// Negative scores count as 0.
    #[instrument(level = "info", skip(self))]
    pub async fn submit(&self, score: i64) -> Result<u64> {
        let score = u64::try_from(score).unwrap_or(0);
        let mut best = self.best.lock().await;
        if score > *best {
            self.persist(score).await?;
            info!(target: "score", previous = *best, new = score, "New highscore");
            *best = score;
        }
        Ok(*best)
    }

    #[instrument(level = "info", skip(self))]
    pub async fn reset(&self) -> Result<()> {
        let mut best = self.best.lock().await;
        self.persist(0).await?;
        *best = 0;
        info!(target: "score", "Highscore reset");
        Ok(())
    }

    async fn persist(&self, value: u64) -> Result<()> {
        let Some(path) = &self.path else { return Ok(()) };
        // Write a sibling file and rename so readers never see a half-written number.
        let tmp = path.with_extension("tmp");
        let res = async {
            tokio::fs::write(&tmp, value.to_string()).await?;
            tokio::fs::rename(&tmp, path).await
        }
        .await;
        if let Err(e) = &res {
            error!(target: "score", path = %path.display(), error = %e, "Failed to persist highscore");
        }
        Ok(res?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn stored_value_is_running_maximum() {
        let store = ScoreStore::in_memory();
        let mut max = 0u64;
        for s in [3i64, 1, 7, 7, 2, 9, 0, 4] {
            max = max.max(s as u64);
            assert_eq!(store.submit(s).await.expect("submit"), max);
        }
        assert_eq!(store.current().await, 9);
    }

    #[tokio::test]
    async fn negative_scores_count_as_zero() {
        let store = ScoreStore::in_memory();
        assert_eq!(store.submit(-5).await.expect("submit"), 0);
        store.submit(4).await.expect("submit");
        assert_eq!(store.submit(-100).await.expect("submit"), 4);
    }

    #[tokio::test]
    async fn concurrent_submissions_keep_the_larger_score() {
        for _ in 0..50 {
            let store = Arc::new(ScoreStore::in_memory());
            let a = tokio::spawn({
                let s = store.clone();
                async move { s.submit(50).await }
            });
            let b = tokio::spawn({
                let s = store.clone();
                async move { s.submit(70).await }
            });
            a.await.expect("join").expect("submit");
            b.await.expect("join").expect("submit");
            assert_eq!(store.current().await, 70);
        }
    }

    #[tokio::test]
    async fn file_backed_store_persists_and_reloads() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("highscore.txt");
        {
            let store = ScoreStore::open(&path);
            assert_eq!(store.current().await, 0);
            store.submit(8).await.expect("submit");
            store.submit(5).await.expect("submit");
        }
        assert_eq!(std::fs::read_to_string(&path).expect("read").trim(), "8");
        let reopened = ScoreStore::open(&path);
        assert_eq!(reopened.current().await, 8);

        reopened.reset().await.expect("reset");
        assert_eq!(reopened.current().await, 0);
        assert_eq!(std::fs::read_to_string(&path).expect("read").trim(), "0");
    }

    #[tokio::test]
    async fn garbage_file_reads_as_zero() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("highscore.txt");
        std::fs::write(&path, "not a number").expect("write");
        assert_eq!(ScoreStore::open(&path).current().await, 0);
    }
}
