//! Catalog loading: turns the on-disk content corpus into round candidates.
//!
//! Layout under `<static_dir>/static`:
//!   symbols/common/*.png        shared pictures, one symbol each
//!   symbols/<lang>/*.png        language pictures; `sentence<N>_<kind>` for sentence languages
//!   locales/<lang>.json         display strings, including `sentence_<N>` texts
//!   langs/<flag>.svg            one flag per installed language
//!
//! Missing directories or files are the normal "no content" case and yield
//! empty results; nothing here fails a request.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use tracing::{debug, instrument, warn};

use crate::config::AppConfig;
use crate::domain::{SentenceCandidate, SymbolCandidate};
use crate::util::{is_image_file, split_sentence_image_stem};

const COMMON_POOL: &str = "common";

/// Read side of the content corpus, as seen by the round engine.
pub trait Catalog: Send + Sync {
  /// Shared pool plus the language pool. Keys may repeat across pools.
  fn symbols(&self, lang: &str) -> Vec<SymbolCandidate>;
  /// Complete sentence groups only, ordered by sentence number.
  fn sentences(&self, lang: &str) -> Vec<SentenceCandidate>;
}

/// Catalog backed by the front-end directory tree.
#[derive(Clone, Debug)]
pub struct FsCatalog {
  symbols_dir: PathBuf,
  locales_dir: PathBuf,
  langs_dir: PathBuf,
  flag_aliases: HashMap<String, String>,
}

impl FsCatalog {
  pub fn from_config(cfg: &AppConfig) -> Self {
    Self {
      symbols_dir: cfg.symbols_dir(),
      locales_dir: cfg.locales_dir(),
      langs_dir: cfg.langs_dir(),
      flag_aliases: cfg.flag_aliases.clone(),
    }
  }

  /// Installed language codes (one per flag icon), aliased and sorted.
  #[instrument(level = "debug", skip(self))]
  pub fn languages(&self) -> Vec<String> {
    let mut out: Vec<String> = read_dir_sorted(&self.langs_dir)
      .into_iter()
      .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("svg"))
      .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(str::to_string))
      .map(|flag| self.flag_aliases.get(&flag).cloned().unwrap_or(flag))
      .collect();
    out.sort();
    out
  }

  fn pool(&self, pool: &str) -> Vec<SymbolCandidate> {
    read_dir_sorted(&self.symbols_dir.join(pool))
      .into_iter()
      .filter(|p| is_image_file(p))
      .filter_map(|p| {
        let name = p.file_name()?.to_str()?;
        let stem = p.file_stem()?.to_str()?;
        Some(SymbolCandidate { key: stem.to_lowercase(), image: image_url(pool, name) })
      })
      .collect()
  }

  fn locale(&self, lang: &str) -> Option<serde_json::Map<String, serde_json::Value>> {
    let path = self.locales_dir.join(format!("{lang}.json"));
    let raw = match std::fs::read_to_string(&path) {
      Ok(s) => s,
      Err(e) => {
        debug!(target: "catalog", path = %path.display(), error = %e, "Locale file not readable");
        return None;
      }
    };
    match serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(&raw) {
      Ok(map) => Some(map),
      Err(e) => {
        warn!(target: "catalog", path = %path.display(), error = %e, "Malformed locale file; treating as empty");
        None
      }
    }
  }
}

impl Catalog for FsCatalog {
  #[instrument(level = "debug", skip(self))]
  fn symbols(&self, lang: &str) -> Vec<SymbolCandidate> {
    let mut out = self.pool(COMMON_POOL);
    if lang == COMMON_POOL {
      // The shared pool is already in; reading it again would repeat every image.
    } else if is_safe_code(lang) {
      out.extend(self.pool(lang));
    } else {
      warn!(target: "catalog", %lang, "Rejected language code; using shared pool only");
    }
    debug!(target: "catalog", %lang, count = out.len(), "Symbol candidates loaded");
    out
  }

  #[instrument(level = "debug", skip(self))]
  fn sentences(&self, lang: &str) -> Vec<SentenceCandidate> {
    if !is_safe_code(lang) {
      warn!(target: "catalog", %lang, "Rejected language code");
      return Vec::new();
    }
    let Some(locale) = self.locale(lang) else { return Vec::new() };

    let lang_dir = self.symbols_dir.join(lang);
    if !lang_dir.is_dir() {
      return Vec::new();
    }

    // sentence number -> (picture kind -> url)
    let mut groups: BTreeMap<String, HashMap<String, String>> = BTreeMap::new();
    for p in read_dir_sorted(&lang_dir).into_iter().filter(|p| is_image_file(p)) {
      let (Some(stem), Some(name)) = (
        p.file_stem().and_then(|s| s.to_str()),
        p.file_name().and_then(|s| s.to_str()),
      ) else {
        continue;
      };
      if let Some((num, kind)) = split_sentence_image_stem(stem) {
        groups
          .entry(num.to_string())
          .or_default()
          .insert(kind.to_string(), image_url(lang, name));
      }
    }

    let mut out = Vec::new();
    for (num, pics) in groups {
      let key = format!("sentence_{num}");
      let text = locale.get(&key).and_then(|v| v.as_str());
      match (text, pics.get("right"), pics.get("wrong_a"), pics.get("wrong_b")) {
        (Some(text), Some(right), Some(a), Some(b)) => out.push(SentenceCandidate {
          key,
          text: text.to_string(),
          correct: right.clone(),
          wrong_a: a.clone(),
          wrong_b: b.clone(),
        }),
        _ => debug!(target: "catalog", %lang, %key, "Incomplete sentence group skipped"),
      }
    }
    debug!(target: "catalog", %lang, count = out.len(), "Sentence candidates loaded");
    out
  }
}

fn image_url(pool: &str, file_name: &str) -> String {
  format!("/static/symbols/{pool}/{file_name}")
}

/// Language codes end up in paths; keep them to a single plain segment.
fn is_safe_code(lang: &str) -> bool {
  !lang.is_empty() && lang.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Directory entries sorted by path; missing directories read as empty.
fn read_dir_sorted(dir: &Path) -> Vec<PathBuf> {
  let mut out: Vec<PathBuf> = match std::fs::read_dir(dir) {
    Ok(rd) => rd.filter_map(|e| e.ok().map(|e| e.path())).collect(),
    Err(_) => Vec::new(),
  };
  out.sort();
  out
}

/// In-memory catalog for engine and handler tests.
#[cfg(test)]
#[derive(Clone, Debug, Default)]
pub struct StaticCatalog {
  pub symbols: HashMap<String, Vec<SymbolCandidate>>,
  pub sentences: HashMap<String, Vec<SentenceCandidate>>,
}

#[cfg(test)]
impl Catalog for StaticCatalog {
  fn symbols(&self, lang: &str) -> Vec<SymbolCandidate> {
    self.symbols.get(lang).cloned().unwrap_or_default()
  }
  fn sentences(&self, lang: &str) -> Vec<SentenceCandidate> {
    self.sentences.get(lang).cloned().unwrap_or_default()
  }
}


#[cfg(test)]
mod tests {
  use super::fixtures::corpus;
  use super::*;

  #[test]
  fn symbols_merge_common_and_language_pools() {
    let (_dir, cfg) = corpus();
    let cat = FsCatalog::from_config(&cfg);

    let en = cat.symbols("en");
    let keys: Vec<&str> = en.iter().map(|c| c.key.as_str()).collect();
    assert_eq!(keys, vec!["apple", "bike", "cat"]);
    assert_eq!(en[0].image, "/static/symbols/common/Apple.png");

    // Same key in both pools is kept twice.
    let de = cat.symbols("de");
    assert_eq!(de.iter().filter(|c| c.key == "apple").count(), 2);
    assert!(de.iter().any(|c| c.image == "/static/symbols/de/apple.png"));
  }

  #[test]
  fn sentences_require_all_three_pictures_and_text() {
    let (_dir, cfg) = corpus();
    let cat = FsCatalog::from_config(&cfg);
    let pl = cat.sentences("pl");
    assert_eq!(pl.len(), 2);
    assert_eq!(pl[0].key, "sentence_1");
    assert_eq!(pl[0].text, "Kot śpi.");
    assert_eq!(pl[0].correct, "/static/symbols/pl/sentence1_right.png");
    assert_eq!(pl[1].wrong_b, "/static/symbols/pl/sentence2_wrong_b.png");
  }

  #[test]
  fn missing_corpus_is_empty_not_an_error() {
    let (_dir, cfg) = corpus();
    let cat = FsCatalog::from_config(&cfg);
    assert!(cat.sentences("xx").is_empty());
    assert!(cat.sentences("de").is_empty()); // pictures but no locale file

    let nothing = FsCatalog::from_config(&AppConfig::with_static_dir("/no/such/dir"));
    assert!(nothing.symbols("en").is_empty());
    assert!(nothing.languages().is_empty());
  }

  #[test]
  fn malformed_locale_degrades_to_empty() {
    let (dir, cfg) = corpus();
    std::fs::write(dir.path().join("static/locales/pl.json"), "{ not json").expect("write");
    assert!(FsCatalog::from_config(&cfg).sentences("pl").is_empty());
  }

  #[test]
  fn path_like_language_codes_are_rejected() {
    let (_dir, cfg) = corpus();
    let cat = FsCatalog::from_config(&cfg);
    assert_eq!(cat.symbols("../pl").len(), 3);
    assert!(cat.sentences("../pl").is_empty());
  }

  #[test]
  fn shared_pool_named_as_language_is_read_once() {
    let (_dir, cfg) = corpus();
    let cat = FsCatalog::from_config(&cfg);
    let common = cat.symbols(COMMON_POOL);
    let images: std::collections::HashSet<&str> = common.iter().map(|c| c.image.as_str()).collect();
    assert_eq!(common.len(), 3);
    assert_eq!(images.len(), 3);
  }

  #[test]
  fn languages_are_aliased_and_sorted() {
    let (_dir, cfg) = corpus();
    let cat = FsCatalog::from_config(&cfg);
    assert_eq!(cat.languages(), vec!["de", "en", "pl"]);
  }
}
