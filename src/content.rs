//! Offline content helpers for preparing a language before it goes live.
//!
//! - `tts-text`: locale sentence arrays -> `tts_<lang>.txt` lines (`<symbol>_<i> "<sentence>"`)
//! - `ui-strings`: UI strings of `en.json` -> one line each, ready for translation
//! - `transliterate`: fold language-specific letters to ASCII in asset file
//!   names, locale keys and TTS line keys, so URLs stay plain
//!
//! Speech synthesis itself runs elsewhere; these only shape its inputs and outputs.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{info, instrument, warn};

use crate::error::Result;
use crate::util::{is_image_file, trunc_for_log};

const SENTENCES_SUFFIX: &str = "_sentences";

const MK: &[(char, &str)] = &[
  ('а', "a"), ('б', "b"), ('в', "v"), ('г', "g"), ('д', "d"), ('е', "e"), ('ж', "z"), ('з', "z"),
  ('и', "i"), ('ј', "j"), ('к', "k"), ('л', "l"), ('м', "m"), ('н', "n"), ('о', "o"), ('п', "p"),
  ('р', "r"), ('с', "s"), ('т', "t"), ('у', "u"), ('ф', "f"), ('х', "h"), ('ц', "c"), ('ч', "c"),
  ('ш', "s"), ('ѓ', "g"), ('ќ', "k"), ('ѕ', "z"), ('џ', "dz"), ('љ', "lj"), ('њ', "nj"),
  ('А', "A"), ('Б', "B"), ('В', "V"), ('Г', "G"), ('Д', "D"), ('Е', "E"), ('Ж', "Z"), ('З', "Z"),
  ('И', "I"), ('Ј', "J"), ('К', "K"), ('Л', "L"), ('М', "M"), ('Н', "N"), ('О', "O"), ('П', "P"),
  ('Р', "R"), ('С', "S"), ('Т', "T"), ('У', "U"), ('Ф', "F"), ('Х', "H"), ('Ц', "C"), ('Ч', "C"),
  ('Ш', "S"), ('Ѓ', "G"), ('Ќ', "K"), ('Ѕ', "Z"), ('Џ', "Dz"), ('Љ', "Lj"), ('Њ', "Nj"),
];

const SR: &[(char, &str)] = &[
  ('а', "a"), ('б', "b"), ('в', "v"), ('г', "g"), ('д', "d"), ('ђ', "dj"), ('е', "e"), ('ж', "z"),
  ('з', "z"), ('и', "i"), ('ј', "j"), ('к', "k"), ('л', "l"), ('љ', "lj"), ('м', "m"), ('н', "n"),
  ('њ', "nj"), ('о', "o"), ('п', "p"), ('р', "r"), ('с', "s"), ('т', "t"), ('ћ', "c"), ('у', "u"),
  ('ф', "f"), ('х', "h"), ('ц', "c"), ('ч', "c"), ('џ', "dz"), ('ш', "s"),
  ('А', "A"), ('Б', "B"), ('В', "V"), ('Г', "G"), ('Д', "D"), ('Ђ', "Dj"), ('Е', "E"), ('Ж', "Z"),
  ('З', "Z"), ('И', "I"), ('Ј', "J"), ('К', "K"), ('Л', "L"), ('Љ', "Lj"), ('М', "M"), ('Н', "N"),
  ('Њ', "Nj"), ('О', "O"), ('П', "P"), ('Р', "R"), ('С', "S"), ('Т', "T"), ('Ћ', "C"), ('У', "U"),
  ('Ф', "F"), ('Х', "H"), ('Ц', "C"), ('Ч', "C"), ('Џ', "Dz"), ('Ш', "S"),
];

const SK: &[(char, &str)] = &[
  ('á', "a"), ('ä', "a"), ('č', "c"), ('ď', "d"), ('é', "e"), ('í', "i"), ('ľ', "l"), ('ĺ', "l"),
  ('ň', "n"), ('ó', "o"), ('ô', "o"), ('ŕ', "r"), ('š', "s"), ('ť', "t"), ('ú', "u"), ('ý', "y"),
  ('ž', "z"),
  ('Á', "A"), ('Ä', "A"), ('Č', "C"), ('Ď', "D"), ('É', "E"), ('Í', "I"), ('Ľ', "L"), ('Ĺ', "L"),
  ('Ň', "N"), ('Ó', "O"), ('Ô', "O"), ('Ŕ', "R"), ('Š', "S"), ('Ť', "T"), ('Ú', "U"), ('Ý', "Y"),
  ('Ž', "Z"),
];

const PL: &[(char, &str)] = &[
  ('ą', "a"), ('ć', "c"), ('ę', "e"), ('ł', "l"), ('ń', "n"), ('ó', "o"), ('ś', "s"), ('ź', "z"),
  ('ż', "z"),
  ('Ą', "A"), ('Ć', "C"), ('Ę', "E"), ('Ł', "L"), ('Ń', "N"), ('Ó', "O"), ('Ś', "S"), ('Ź', "Z"),
  ('Ż', "Z"),
];

const HU: &[(char, &str)] = &[
  ('á', "a"), ('é', "e"), ('í', "i"), ('ó', "o"), ('ö', "o"), ('ő', "o"), ('ú', "u"), ('ü', "u"),
  ('ű', "u"),
  ('Á', "A"), ('É', "E"), ('Í', "I"), ('Ó', "O"), ('Ö', "O"), ('Ő', "O"), ('Ú', "U"), ('Ü', "U"),
  ('Ű', "U"),
];

/// Letter table for a language code, if one is defined.
pub fn transliteration_table(lang: &str) -> Option<HashMap<char, &'static str>> {
  let table = match lang {
    "mk" => MK,
    "sr" => SR,
    "sk" => SK,
    "pl" => PL,
    "hu" => HU,
    _ => return None,
  };
  Some(table.iter().copied().collect())
}

/// Replace every mapped letter; everything else (digits, `_`, punctuation) is kept.
pub fn transliterate(text: &str, table: &HashMap<char, &str>) -> String {
  let mut out = String::with_capacity(text.len());
  for ch in text.chars() {
    match table.get(&ch) {
      Some(rep) => out.push_str(rep),
      None => out.push(ch),
    }
  }
  out
}

/// `tts_<lang>.txt` body lines for one locale: `<symbol>_<i> "<sentence>"`, 1-based.
pub fn tts_lines(locale: &Map<String, Value>) -> Vec<String> {
  let mut out = Vec::new();
  for (key, value) in locale {
    let (Some(symbol), Some(sentences)) = (key.strip_suffix(SENTENCES_SUFFIX), value.as_array()) else {
      continue;
    };
    for (i, sentence) in sentences.iter().filter_map(Value::as_str).enumerate() {
      out.push(format!("{}_{} \"{}\"", symbol.to_lowercase(), i + 1, sentence));
    }
  }
  out
}

/// UI strings to translate: string values of keys starting with a lowercase letter.
pub fn ui_strings(locale: &Map<String, Value>) -> Vec<String> {
  locale
    .iter()
    .filter(|(k, _)| k.chars().next().map(char::is_lowercase).unwrap_or(false))
    .filter_map(|(_, v)| v.as_str().map(str::to_string))
    .collect()
}

fn read_locale(path: &Path) -> Result<Map<String, Value>> {
  let raw = std::fs::read_to_string(path)?;
  Ok(serde_json::from_str(&raw)?)
}

/// Write `tts_<lang>.txt` into `out_dir` for every `*.json` in `locales_dir`.
#[instrument(level = "info")]
pub fn write_tts_files(locales_dir: &Path, out_dir: &Path) -> Result<Vec<PathBuf>> {
  std::fs::create_dir_all(out_dir)?;
  let mut locales: Vec<PathBuf> = std::fs::read_dir(locales_dir)?
    .filter_map(|e| e.ok().map(|e| e.path()))
    .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("json"))
    .collect();
  locales.sort();

  let mut written = Vec::new();
  for path in locales {
    let Some(lang) = path.file_stem().and_then(|s| s.to_str()) else { continue };
    let lines = tts_lines(&read_locale(&path)?);
    let out = out_dir.join(format!("tts_{lang}.txt"));
    std::fs::write(&out, lines.join("\n"))?;
    info!(target: "content", %lang, lines = lines.len(), out = %out.display(), "TTS text written");
    written.push(out);
  }
  Ok(written)
}

/// Extract UI strings of `en_json` into `out`, one per line. Returns the count.
#[instrument(level = "info")]
pub fn write_ui_strings(en_json: &Path, out: &Path) -> Result<usize> {
  let strings = ui_strings(&read_locale(en_json)?);
  std::fs::write(out, strings.join("\n"))?;
  info!(target: "content", count = strings.len(), out = %out.display(), "UI strings extracted");
  Ok(strings.len())
}

/// What a transliteration pass changed.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TransliterationReport {
  pub images_renamed: usize,
  pub audio_renamed: usize,
  pub locale_keys_changed: usize,
  pub tts_lines_changed: usize,
}

/// Transliterate one language's assets in place.
///
/// `content_root` is `<static_dir>/static` (holding `symbols/`, `mp3s/`, `locales/`);
/// `tts_dir` holds `tts_<lang>.txt`. Missing pieces are skipped.
#[instrument(level = "info", skip(table))]
pub fn transliterate_language(
  content_root: &Path,
  tts_dir: &Path,
  lang: &str,
  table: &HashMap<char, &str>,
) -> Result<TransliterationReport> {
  let mut report = TransliterationReport {
    images_renamed: rename_files(&content_root.join("symbols").join(lang), table, is_image_file)?,
    audio_renamed: rename_files(&content_root.join("mp3s").join(lang), table, |p| {
      p.extension().and_then(|e| e.to_str()).map(|e| e.eq_ignore_ascii_case("mp3")).unwrap_or(false)
    })?,
    ..TransliterationReport::default()
  };

  let locale_path = content_root.join("locales").join(format!("{lang}.json"));
  if locale_path.is_file() {
    let locale = read_locale(&locale_path)?;
    let mut rekeyed = Map::new();
    for (key, value) in locale {
      let new_key = transliterate(&key, table);
      if new_key != key {
        report.locale_keys_changed += 1;
      }
      if rekeyed.insert(new_key.clone(), value).is_some() {
        warn!(target: "content", %lang, key = %new_key, "Transliterated locale key collides; later entry wins");
      }
    }
    std::fs::write(&locale_path, serde_json::to_string_pretty(&Value::Object(rekeyed))?)?;
  }

  let tts_path = tts_dir.join(format!("tts_{lang}.txt"));
  if tts_path.is_file() {
    let raw = std::fs::read_to_string(&tts_path)?;
    let mut lines = Vec::new();
    for line in raw.lines() {
      let new_line = match line.split_once(' ') {
        Some((key, rest)) => format!("{} {}", transliterate(key, table), rest),
        None => line.to_string(),
      };
      if new_line != line {
        report.tts_lines_changed += 1;
      }
      lines.push(new_line);
    }
    let mut body = lines.join("\n");
    if raw.ends_with('\n') {
      body.push('\n');
    }
    std::fs::write(&tts_path, body)?;
  }

  info!(target: "content", %lang, ?report, "Transliteration done");
  Ok(report)
}

fn rename_files(dir: &Path, table: &HashMap<char, &str>, wanted: impl Fn(&Path) -> bool) -> Result<usize> {
  if !dir.is_dir() {
    return Ok(0);
  }
  let mut renamed = 0;
  for entry in std::fs::read_dir(dir)? {
    let path = entry?.path();
    if !wanted(&path) {
      continue;
    }
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else { continue };
    let new_name = transliterate(name, table);
    if new_name == name {
      continue;
    }
    let target = dir.join(&new_name);
    if target.exists() {
      warn!(target: "content", from = %name, to = %new_name, "Target exists; not renaming");
      continue;
    }
    std::fs::rename(&path, &target)?;
    info!(target: "content", from = %trunc_for_log(name, 60), to = %new_name, "Renamed");
    renamed += 1;
  }
  Ok(renamed)
}
