//! Round engine: the per-session quiz state machine.
//!
//! A session is `Idle` (round 0, no deck), then `InRound(n)` while
//! `0 < n < rounds_per_session`, then `Finished`, which clears the progress
//! so the next request starts over from round 0.
//!
//! Two content shortfall policies coexist on purpose:
//!   - symbol mode with fewer than 3 candidates reports `InsufficientContent`;
//!   - sentence mode whose deck runs out before the round limit just finishes early.

use std::collections::HashSet;

use rand::seq::{index, SliceRandom};
use rand::Rng;
use tracing::{debug, info, instrument, warn};

use crate::catalog::Catalog;
use crate::domain::{Round, RoundMode, RoundTarget, SentenceCandidate, SymbolCandidate};
use crate::util::trunc_for_log;

/// Pictures shown per round: the target plus two distractors.
pub const OPTIONS_PER_ROUND: usize = 3;

/// Round state owned by one session.
#[derive(Clone, Debug, Default)]
pub struct RoundProgress {
    /// Index of the next round to serve.
    pub round: usize,
    /// Sentence mode only: the session's shuffled deck, loaded on first use.
    pub deck: Option<Vec<SentenceCandidate>>,
}

impl RoundProgress {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_idle(&self) -> bool {
        self.round == 0 && self.deck.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoundOutcome {
    Round(Round),
    Finished,
    InsufficientContent { available: usize },
}

#[derive(Clone, Copy, Debug)]
pub struct RoundEngine {
    rounds_per_session: usize,
}

impl RoundEngine {
    pub fn new(rounds_per_session: usize) -> Self {
        Self { rounds_per_session }
    }

    /// Advance `progress` by one round, or finish/clear it.
    #[instrument(level = "debug", skip(self, progress, catalog, rng), fields(round = progress.round))]
    pub fn next_round<R: Rng + ?Sized>(
        &self,
        progress: &mut RoundProgress,
        mode: RoundMode,
        lang: &str,
        catalog: &dyn Catalog,
        rng: &mut R,
    ) -> RoundOutcome {
        if progress.round >= self.rounds_per_session {
            info!(target: "round", %lang, rounds = progress.round, "Session reached round limit");
            progress.clear();
            return RoundOutcome::Finished;
        }
        if progress.is_idle() {
            debug!(target: "round", %lang, ?mode, "Starting new session");
        }

        match mode {
            RoundMode::Symbol => self.symbol_round(progress, lang, catalog, rng),
            RoundMode::Sentence => self.sentence_round(progress, lang, catalog, rng),
        }
    }

    fn symbol_round<R: Rng + ?Sized>(
        &self,
        progress: &mut RoundProgress,
        lang: &str,
        catalog: &dyn Catalog,
        rng: &mut R,
    ) -> RoundOutcome {
        // Reloaded every round; the pool is static per language.
        // Options are pictures, so two entries sharing an image count once.
        let mut seen = HashSet::new();
        let pool: Vec<SymbolCandidate> =
            catalog.symbols(lang).into_iter().filter(|c| seen.insert(c.image.clone())).collect();
        if pool.len() < OPTIONS_PER_ROUND {
            warn!(target: "round", %lang, available = pool.len(), "Not enough symbols for a round");
            progress.clear();
            return RoundOutcome::InsufficientContent { available: pool.len() };
        }

        // Distinct positions in random order: the first is a uniform target,
        // the rest are uniform distractors drawn without replacement.
        let picks = index::sample(rng, pool.len(), OPTIONS_PER_ROUND);
        let target = &pool[picks.index(0)];
        let mut options: Vec<String> = picks.iter().map(|i| pool[i].image.clone()).collect();
        options.shuffle(rng);

        let round = Round {
            index: progress.round,
            target: RoundTarget::Symbol { symbol: target.key.clone() },
            options,
            correct: target.image.clone(),
        };
        progress.round += 1;
        debug!(target: "round", %lang, index = round.index, symbol = %target.key, "Symbol round built");
        RoundOutcome::Round(round)
    }

    fn sentence_round<R: Rng + ?Sized>(
        &self,
        progress: &mut RoundProgress,
        lang: &str,
        catalog: &dyn Catalog,
        rng: &mut R,
    ) -> RoundOutcome {
        if progress.deck.is_none() {
            let mut deck = catalog.sentences(lang);
            if deck.is_empty() {
                warn!(target: "round", %lang, "No sentence content for language");
                progress.clear();
                return RoundOutcome::InsufficientContent { available: 0 };
            }
            deck.shuffle(rng);
            info!(target: "round", %lang, deck = deck.len(), "Sentence deck shuffled for session");
            progress.deck = Some(deck);
        }

        let candidate = match progress.deck.as_ref().and_then(|d| d.get(progress.round)) {
            Some(c) => c.clone(),
            None => {
                info!(target: "round", %lang, rounds = progress.round, "Sentence deck exhausted");
                progress.clear();
                return RoundOutcome::Finished;
            }
        };

        let mut options = candidate.options();
        options.shuffle(rng);

        let round = Round {
            index: progress.round,
            target: RoundTarget::Sentence {
                sentence_key: candidate.key.clone(),
                sentence: candidate.text.clone(),
            },
            options,
            correct: candidate.correct.clone(),
        };
        progress.round += 1;
        debug!(target: "round", %lang, index = round.index, key = %candidate.key, text = %trunc_for_log(&candidate.text, 40), "Sentence round built");
        RoundOutcome::Round(round)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::catalog::StaticCatalog;

    fn sym(key: &str, image: &str) -> SymbolCandidate {
        SymbolCandidate { key: key.into(), image: image.into() }
    }

    fn sentence(n: usize) -> SentenceCandidate {
        SentenceCandidate {
            key: format!("sentence_{n}"),
            text: format!("Zdanie {n}."),
            correct: format!("/s/{n}_right.png"),
            wrong_a: format!("/s/{n}_wrong_a.png"),
            wrong_b: format!("/s/{n}_wrong_b.png"),
        }
    }

    fn catalog() -> StaticCatalog {
        let mut c = StaticCatalog::default();
        c.symbols.insert(
            "en".into(),
            vec![sym("apple", "img1"), sym("bike", "img2"), sym("cat", "img3")],
        );
        c.symbols.insert("tiny".into(), vec![sym("apple", "img1"), sym("bike", "img2")]);
        c.sentences.insert("pl".into(), vec![sentence(1), sentence(2)]);
        c.sentences.insert("big".into(), (1..=15).map(sentence).collect());
        c
    }

    fn expect_round(outcome: RoundOutcome) -> Round {
        match outcome {
            RoundOutcome::Round(r) => r,
            other => panic!("expected a round, got {other:?}"),
        }
    }

    #[test]
    fn symbol_round_has_three_distinct_options_and_one_correct() {
        let engine = RoundEngine::new(10);
        let cat = catalog();
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let mut p = RoundProgress::default();
            let r = expect_round(engine.next_round(&mut p, RoundMode::Symbol, "en", &cat, &mut rng));
            let set: HashSet<&str> = r.options.iter().map(String::as_str).collect();
            let all: HashSet<&str> = ["img1", "img2", "img3"].into_iter().collect();
            assert_eq!(r.options.len(), 3);
            assert_eq!(set, all);
            assert_eq!(r.options.iter().filter(|o| **o == r.correct).count(), 1);
            let RoundTarget::Symbol { symbol } = &r.target else { panic!("symbol target") };
            let expected = match symbol.as_str() {
                "apple" => "img1",
                "bike" => "img2",
                "cat" => "img3",
                other => panic!("unknown symbol {other}"),
            };
            assert_eq!(r.correct, expected);
        }
    }

    #[test]
    fn round_index_advances_until_limit_then_finishes_and_resets() {
        let engine = RoundEngine::new(10);
        let cat = catalog();
        let mut rng = StdRng::seed_from_u64(7);
        let mut p = RoundProgress::default();
        for i in 0..10 {
            let r = expect_round(engine.next_round(&mut p, RoundMode::Symbol, "en", &cat, &mut rng));
            assert_eq!(r.index, i);
            assert_eq!(p.round, i + 1);
        }
        assert_eq!(engine.next_round(&mut p, RoundMode::Symbol, "en", &cat, &mut rng), RoundOutcome::Finished);
        assert!(p.is_idle());
        // A fresh session starts over at 0.
        let r = expect_round(engine.next_round(&mut p, RoundMode::Symbol, "en", &cat, &mut rng));
        assert_eq!(r.index, 0);
    }

    #[test]
    fn too_few_symbols_is_insufficient_content_and_clears() {
        let engine = RoundEngine::new(10);
        let cat = catalog();
        let mut rng = rand::thread_rng();
        let mut p = RoundProgress { round: 4, deck: None };
        assert_eq!(
            engine.next_round(&mut p, RoundMode::Symbol, "tiny", &cat, &mut rng),
            RoundOutcome::InsufficientContent { available: 2 }
        );
        assert!(p.is_idle());
        assert_eq!(
            engine.next_round(&mut p, RoundMode::Symbol, "nope", &cat, &mut rng),
            RoundOutcome::InsufficientContent { available: 0 }
        );
    }

    #[test]
    fn targets_are_roughly_uniform() {
        let engine = RoundEngine::new(usize::MAX);
        let cat = catalog();
        let mut rng = StdRng::seed_from_u64(42);
        let mut p = RoundProgress::default();
        let mut hits: HashMap<String, usize> = HashMap::new();
        let trials = 6000;
        for _ in 0..trials {
            let r = expect_round(engine.next_round(&mut p, RoundMode::Symbol, "en", &cat, &mut rng));
            *hits.entry(r.correct).or_default() += 1;
        }
        assert_eq!(hits.len(), 3);
        for (img, n) in hits {
            assert!((1700..=2300).contains(&n), "{img} chosen {n} times out of {trials}");
        }
    }

    #[test]
    fn duplicate_keys_are_distinct_candidates() {
        let engine = RoundEngine::new(10);
        let mut cat = StaticCatalog::default();
        cat.symbols.insert(
            "de".into(),
            vec![sym("apple", "/common/apple.png"), sym("apple", "/de/apple.png"), sym("cat", "/common/cat.png")],
        );
        let mut rng = rand::thread_rng();
        let mut p = RoundProgress::default();
        let r = expect_round(engine.next_round(&mut p, RoundMode::Symbol, "de", &cat, &mut rng));
        assert_eq!(r.options.iter().collect::<HashSet<_>>().len(), 3);
    }

    #[test]
    fn repeated_pictures_never_fill_two_option_slots() {
        let engine = RoundEngine::new(10);
        let mut cat = StaticCatalog::default();
        let shared = vec![sym("apple", "/common/apple.png"), sym("bike", "/common/bike.png"), sym("cat", "/common/cat.png")];
        cat.symbols.insert("common".into(), shared.iter().chain(shared.iter()).cloned().collect());
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..100 {
            let mut p = RoundProgress::default();
            let r = expect_round(engine.next_round(&mut p, RoundMode::Symbol, "common", &cat, &mut rng));
            assert_eq!(r.options.iter().collect::<HashSet<_>>().len(), 3);
            assert_eq!(r.options.iter().filter(|o| **o == r.correct).count(), 1);
        }

        // Four entries but only two pictures is not enough for a round.
        cat.symbols.insert("xx".into(), vec![sym("a", "/x.png"), sym("b", "/x.png"), sym("c", "/y.png"), sym("d", "/y.png")]);
        let mut p = RoundProgress::default();
        assert_eq!(
            engine.next_round(&mut p, RoundMode::Symbol, "xx", &cat, &mut rng),
            RoundOutcome::InsufficientContent { available: 2 }
        );
    }

    #[test]
    fn sentence_session_finishes_when_deck_runs_out() {
        let engine = RoundEngine::new(10);
        let cat = catalog();
        let mut rng = rand::thread_rng();
        let mut p = RoundProgress::default();
        let first = expect_round(engine.next_round(&mut p, RoundMode::Sentence, "pl", &cat, &mut rng));
        let second = expect_round(engine.next_round(&mut p, RoundMode::Sentence, "pl", &cat, &mut rng));
        assert_eq!((first.index, second.index), (0, 1));
        assert_ne!(first.target, second.target);
        assert_eq!(engine.next_round(&mut p, RoundMode::Sentence, "pl", &cat, &mut rng), RoundOutcome::Finished);
        assert!(p.is_idle());
    }

    #[test]
    fn sentence_session_respects_round_limit_with_large_deck() {
        let engine = RoundEngine::new(10);
        let cat = catalog();
        let mut rng = rand::thread_rng();
        let mut p = RoundProgress::default();
        let mut seen = HashSet::new();
        for _ in 0..10 {
            let r = expect_round(engine.next_round(&mut p, RoundMode::Sentence, "big", &cat, &mut rng));
            assert!(seen.insert(r.correct.clone()), "sentence repeated inside a session");
        }
        assert_eq!(engine.next_round(&mut p, RoundMode::Sentence, "big", &cat, &mut rng), RoundOutcome::Finished);
    }

    #[test]
    fn sentence_options_are_the_candidates_own_pictures() {
        let engine = RoundEngine::new(10);
        let cat = catalog();
        let mut rng = rand::thread_rng();
        let mut p = RoundProgress::default();
        let r = expect_round(engine.next_round(&mut p, RoundMode::Sentence, "pl", &cat, &mut rng));
        let RoundTarget::Sentence { sentence_key, sentence } = &r.target else { panic!("sentence target") };
        let n = sentence_key.trim_start_matches("sentence_");
        assert_eq!(sentence, &format!("Zdanie {n}."));
        let mut got = r.options.clone();
        got.sort();
        let mut want = vec![format!("/s/{n}_right.png"), format!("/s/{n}_wrong_a.png"), format!("/s/{n}_wrong_b.png")];
        want.sort();
        assert_eq!(got, want);
        assert_eq!(r.correct, format!("/s/{n}_right.png"));
    }

    #[test]
    fn sentence_option_order_is_reshuffled_per_new_round() {
        let engine = RoundEngine::new(10);
        let mut cat = StaticCatalog::default();
        cat.sentences.insert("one".into(), vec![sentence(1)]);
        let mut rng = StdRng::seed_from_u64(3);
        let mut positions = HashSet::new();
        for _ in 0..100 {
            let mut p = RoundProgress::default();
            let r = expect_round(engine.next_round(&mut p, RoundMode::Sentence, "one", &cat, &mut rng));
            positions.insert(r.options.iter().position(|o| *o == r.correct));
        }
        assert_eq!(positions.len(), 3);
    }

    #[test]
    fn sentence_language_without_corpus_is_insufficient_content() {
        let engine = RoundEngine::new(10);
        let cat = catalog();
        let mut rng = rand::thread_rng();
        let mut p = RoundProgress::default();
        assert_eq!(
            engine.next_round(&mut p, RoundMode::Sentence, "xx", &cat, &mut rng),
            RoundOutcome::InsufficientContent { available: 0 }
        );
        assert!(p.deck.is_none());
    }
}
