//! Public protocol structs for the HTTP endpoints (serde ready).
//! Field names match what the game front end reads, so keep them stable.

use serde::{Deserialize, Serialize};

use crate::domain::{Round, RoundTarget};

/// Reply of `/api/next`: a symbol round, a sentence round, or the end of the session.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RoundOut {
    Symbol {
        symbol: String,
        round: usize,
        options: Vec<String>,
        correct: String,
        finished: bool,
    },
    Sentence {
        sentence_key: String,
        sentence: String,
        round: usize,
        options: Vec<String>,
        correct: String,
        finished: bool,
    },
    Finished {
        finished: bool,
    },
}

impl RoundOut {
    pub fn finished() -> Self {
        RoundOut::Finished { finished: true }
    }
}

/// Convert an engine `Round` to the public DTO.
pub fn to_out(r: &Round) -> RoundOut {
    match &r.target {
        RoundTarget::Symbol { symbol } => RoundOut::Symbol {
            symbol: symbol.clone(),
            round: r.index,
            options: r.options.clone(),
            correct: r.correct.clone(),
            finished: false,
        },
        RoundTarget::Sentence { sentence_key, sentence } => RoundOut::Sentence {
            sentence_key: sentence_key.clone(),
            sentence: sentence.clone(),
            round: r.index,
            options: r.options.clone(),
            correct: r.correct.clone(),
            finished: false,
        },
    }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct LangQuery {
    pub lang: Option<String>,
}

#[derive(Serialize)]
pub struct LangOut {
    pub lang: String,
}

#[derive(Serialize)]
pub struct SuccessOut {
    pub success: bool,
}

/// Score submission. Accepts any JSON scalar; see `logic::score_from_json`.
#[derive(Debug, Deserialize, Default)]
pub struct ScoreIn {
    #[serde(default)]
    pub score: serde_json::Value,
}

#[derive(Serialize)]
pub struct HighscoreOut {
    pub highscore: u64,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn round_payloads_serialize_flat() {
        let r = Round {
            index: 2,
            target: RoundTarget::Symbol { symbol: "apple".into() },
            options: vec!["a".into(), "b".into(), "c".into()],
            correct: "b".into(),
        };
        let v = serde_json::to_value(to_out(&r)).expect("json");
        assert_eq!(
            v,
            json!({"symbol": "apple", "round": 2, "options": ["a", "b", "c"], "correct": "b", "finished": false})
        );
        assert_eq!(serde_json::to_value(RoundOut::finished()).expect("json"), json!({"finished": true}));
    }

    #[test]
    fn sentence_payload_carries_key_and_text() {
        let r = Round {
            index: 0,
            target: RoundTarget::Sentence { sentence_key: "sentence_4".into(), sentence: "Kot śpi.".into() },
            options: vec!["x".into(), "y".into(), "z".into()],
            correct: "z".into(),
        };
        let v = serde_json::to_value(to_out(&r)).expect("json");
        assert_eq!(v["sentence_key"], "sentence_4");
        assert_eq!(v["sentence"], "Kot śpi.");
        assert_eq!(v["finished"], false);
    }
}
