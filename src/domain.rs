//! Domain models used by the backend: candidates, round modes and round payloads.

use serde::{Deserialize, Serialize};

/// How a language is played.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundMode {
  /// Show a word, pick its picture among random distractors.
  Symbol,
  /// Show a sentence, pick the matching picture among its two authored wrong pictures.
  Sentence,
}

/// One image asset that can be a round's target or distractor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolCandidate {
  /// Lowercased file stem, e.g. `apple` for `Apple.png`.
  pub key: String,
  /// Public URL of the image, e.g. `/static/symbols/common/Apple.png`.
  pub image: String,
}

/// One numbered sentence with its three pictures.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceCandidate {
  /// `sentence_<N>`; also the locale key and the audio clip name.
  pub key: String,
  pub text: String,
  pub correct: String,
  pub wrong_a: String,
  pub wrong_b: String,
}

impl SentenceCandidate {
  pub fn options(&self) -> Vec<String> {
    vec![self.correct.clone(), self.wrong_a.clone(), self.wrong_b.clone()]
  }
}

/// What the player is asked to match.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoundTarget {
  Symbol { symbol: String },
  Sentence { sentence_key: String, sentence: String },
}

/// One round: target, three shuffled picture options, the right one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Round {
  /// 0-based position inside the session.
  pub index: usize,
  pub target: RoundTarget,
  pub options: Vec<String>,
  pub correct: String,
}
