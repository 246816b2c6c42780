//! Small utility helpers used across modules.

use std::path::Path;

/// Picture formats the game front end can display.
pub const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

/// True if the path has one of the supported image extensions (case-insensitive).
pub fn is_image_file(path: &Path) -> bool {
  path
    .extension()
    .and_then(|e| e.to_str())
    .map(|e| IMAGE_EXTENSIONS.iter().any(|ok| e.eq_ignore_ascii_case(ok)))
    .unwrap_or(false)
}

/// Split a sentence image stem like `sentence12_wrong_a` into (`"12"`, `"wrong_a"`).
///
/// The part after the number is the leading run of word characters, so
/// `sentence3_right-v2` still reads as a `right` picture.
pub fn split_sentence_image_stem(stem: &str) -> Option<(&str, &str)> {
  let rest = stem.strip_prefix("sentence")?;
  let digits = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
  if digits == 0 {
    return None;
  }
  let (num, tail) = rest.split_at(digits);
  let tail = tail.strip_prefix('_')?;
  let kind_len: usize = tail
    .chars()
    .take_while(|c| c.is_alphanumeric() || *c == '_')
    .map(char::len_utf8)
    .sum();
  if kind_len == 0 {
    return None;
  }
  Some((num, &tail[..kind_len]))
}

/// Value of cookie `name` from a raw `Cookie` header.
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
  header
    .split(';')
    .filter_map(|pair| pair.trim().split_once('='))
    .find(|(k, _)| *k == name)
    .map(|(_, v)| v.trim())
    .filter(|v| !v.is_empty())
}

/// Log-safe truncation for large strings.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.chars().count() <= max {
    s.to_string()
  } else {
    let head: String = s.chars().take(max).collect();
    format!("{}… ({} bytes total)", head, s.len())
  }
}
