//! TOML keys: bare, quoted and dotted.
//!
//! A raw key such as `a."b.c".'d'` is split on every `.` that is not inside
//! quotes, giving one [`KeyPart`] per path segment. Bare parts are limited to
//! `[A-Za-z0-9_-]`; anything else has to be quoted.
//!
//! ```rust
//! use serde_toml_tree::Key;
//!
//! let key = Key::parse(r#"site."google.com".port"#, 1).unwrap();
//! assert!(key.is_dotted());
//! assert_eq!(key.name(), "port");
//! assert_eq!(key.prefixes(), vec!["site", r#"site."google.com""#, r#"site."google.com".port"#]);
//! ```

use crate::scan::{split_top_level, QuoteState};
use crate::value::{escape_basic, unescape_basic};
use crate::{Error, Result};
use std::fmt;

/// One segment of a (possibly dotted) key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyPart {
    /// `name`, restricted to `[A-Za-z0-9_-]`
    Bare(String),
    /// `"name"` with escapes already expanded
    Basic(String),
    /// `'name'`, taken verbatim
    Literal(String),
}

impl KeyPart {
    /// Chooses the simplest quoting that can express `name`.
    ///
    /// Bare when possible; literal quotes when the name holds an unescaped `"`
    /// and neither `'` nor a control character; basic quotes otherwise.
    ///
    /// ```rust
    /// use serde_toml_tree::KeyPart;
    ///
    /// assert_eq!(KeyPart::from_name("port"), KeyPart::Bare("port".into()));
    /// assert_eq!(KeyPart::from_name("a.b"), KeyPart::Basic("a.b".into()));
    /// assert_eq!(KeyPart::from_name(r#"say "hi""#), KeyPart::Literal(r#"say "hi""#.into()));
    /// ```
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        if is_bare_key(name) {
            KeyPart::Bare(name.to_string())
        } else if is_literal_key_candidate(name) {
            KeyPart::Literal(name.to_string())
        } else {
            KeyPart::Basic(name.to_string())
        }
    }

    /// The unquoted name of this part.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            KeyPart::Bare(s) | KeyPart::Basic(s) | KeyPart::Literal(s) => s,
        }
    }

    /// The canonical spelling: quoting is re-derived from the name, so
    /// `"port"` and `port` both canonicalize to `port`.
    #[must_use]
    pub fn canonical(&self) -> String {
        KeyPart::from_name(self.name()).to_string()
    }

    fn parse(raw: &str, line: usize, full: &str) -> Result<Self> {
        let part = raw.trim();
        if part.is_empty() {
            return Err(Error::parse(
                line,
                format!("Not able to parse the key: [{full}] as it has an empty part"),
            ));
        }

        let quoted = |quote: char| part.len() >= 2 && part.starts_with(quote) && part.ends_with(quote);

        if part.starts_with('"') {
            if !quoted('"') || !closes_at_end(part) {
                return Err(invalid_symbols(full, line));
            }
            Ok(KeyPart::Basic(unescape_basic(&part[1..part.len() - 1], line)?))
        } else if part.starts_with('\'') {
            if !quoted('\'') || part[1..part.len() - 1].contains('\'') {
                return Err(invalid_symbols(full, line));
            }
            Ok(KeyPart::Literal(part[1..part.len() - 1].to_string()))
        } else if is_bare_key(part) {
            Ok(KeyPart::Bare(part.to_string()))
        } else {
            Err(invalid_symbols(full, line))
        }
    }
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPart::Bare(s) => write!(f, "{s}"),
            KeyPart::Basic(s) => write!(f, "\"{}\"", escape_basic(s)),
            KeyPart::Literal(s) => write!(f, "'{s}'"),
        }
    }
}

/// A parsed key with its source line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Key {
    parts: Vec<KeyPart>,
    line: usize,
}

impl Key {
    /// Parses raw key text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] when a quote is not closed, when a part is
    /// empty, or when a bare part contains a symbol outside `[A-Za-z0-9_-]`.
    pub fn parse(raw: &str, line: usize) -> Result<Self> {
        let trimmed = raw.trim();
        validate_quotes(trimmed, line)?;

        let parts = split_top_level(trimmed, '.', false)
            .into_iter()
            .map(|part| KeyPart::parse(part, line, trimmed))
            .collect::<Result<Vec<_>>>()?;

        Ok(Key { parts, line })
    }

    /// Builds a single-part key, quoting `name` as needed.
    #[must_use]
    pub fn from_name(name: &str, line: usize) -> Self {
        Key {
            parts: vec![KeyPart::from_name(name)],
            line,
        }
    }

    pub(crate) fn from_parts(parts: Vec<KeyPart>, line: usize) -> Self {
        Key { parts, line }
    }

    #[must_use]
    pub fn parts(&self) -> &[KeyPart] {
        &self.parts
    }

    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// `true` for keys with more than one part (`a.b.c`).
    #[must_use]
    pub fn is_dotted(&self) -> bool {
        self.parts.len() > 1
    }

    /// The unquoted name of the last part; this is the field name used while decoding.
    #[must_use]
    pub fn name(&self) -> &str {
        self.parts.last().map(KeyPart::name).unwrap_or_default()
    }

    /// A key made of the last part only.
    #[must_use]
    pub fn last(&self) -> Key {
        Key {
            parts: self.parts.last().cloned().into_iter().collect(),
            line: self.line,
        }
    }

    /// All parts except the last one.
    #[must_use]
    pub fn parent_parts(&self) -> &[KeyPart] {
        &self.parts[..self.parts.len().saturating_sub(1)]
    }

    /// Canonical dotted form of the whole key.
    #[must_use]
    pub fn canonical(&self) -> String {
        join_canonical(&self.parts)
    }

    /// Canonical names of every prefix: `a.b.c` gives `[a, a.b, a.b.c]`.
    #[must_use]
    pub fn prefixes(&self) -> Vec<String> {
        (1..=self.parts.len())
            .map(|end| join_canonical(&self.parts[..end]))
            .collect()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{part}")?;
        }
        Ok(())
    }
}

pub(crate) fn join_canonical(parts: &[KeyPart]) -> String {
    parts
        .iter()
        .map(KeyPart::canonical)
        .collect::<Vec<_>>()
        .join(".")
}

/// `true` if `key` is non-empty and only contains `[A-Za-z0-9_-]`.
#[must_use]
pub fn is_bare_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
}

/// `true` if `key` contains an unescaped double quote, no single quote and no
/// control character, so it reads best as a literal key.
fn is_literal_key_candidate(key: &str) -> bool {
    if key.chars().any(char::is_control) {
        return false;
    }
    let mut prev = None;
    for ch in key.chars() {
        if ch == '\'' {
            return false;
        }
        if ch == '"' && prev != Some('\\') {
            return true;
        }
        prev = Some(ch);
    }
    false
}

fn validate_quotes(raw: &str, line: usize) -> Result<()> {
    let mut state = QuoteState::new(false);
    raw.chars().for_each(|ch| {
        state.advance(ch);
    });
    if state.is_closed() {
        Ok(())
    } else {
        Err(Error::parse(
            line,
            format!(
                "Not able to parse the key: [{raw}] as it does not have a closing quote. \
                 Please note that escaped quotes cannot be used in bare keys"
            ),
        ))
    }
}

/// `true` if the basic string starting at index 0 closes exactly at the last char.
fn closes_at_end(part: &str) -> bool {
    let mut state = QuoteState::new(false);
    let last = part.char_indices().last().map(|(i, _)| i).unwrap_or(0);
    for (i, ch) in part.char_indices() {
        state.advance(ch);
        if state.is_closed() && i > 0 {
            return i == last;
        }
    }
    false
}

fn invalid_symbols(raw: &str, line: usize) -> Error {
    Error::parse(
        line,
        format!(
            "Not able to parse the key: [{raw}] as it contains invalid symbols. \
             In case you would like to use special symbols - use quotes"
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_key() {
        let key = Key::parse("  my-key_1 ", 1).unwrap();
        assert!(!key.is_dotted());
        assert_eq!(key.name(), "my-key_1");
        assert_eq!(key.parts(), &[KeyPart::Bare("my-key_1".to_string())]);
    }

    #[test]
    fn test_dotted_key_with_quoted_dot() {
        let key = Key::parse(r#"a."b.c".'d'"#, 3).unwrap();
        assert!(key.is_dotted());
        assert_eq!(
            key.parts(),
            &[
                KeyPart::Bare("a".to_string()),
                KeyPart::Basic("b.c".to_string()),
                KeyPart::Literal("d".to_string()),
            ]
        );
        assert_eq!(key.name(), "d");
        assert_eq!(key.canonical(), r#"a."b.c".d"#);
    }

    #[test]
    fn test_quoted_dot_only_is_not_dotted() {
        let key = Key::parse(r#""akuleshov7.com""#, 1).unwrap();
        assert!(!key.is_dotted());
        assert_eq!(key.name(), "akuleshov7.com");
    }

    #[test]
    fn test_spaces_around_dots() {
        let key = Key::parse("a . b", 1).unwrap();
        assert_eq!(key.prefixes(), vec!["a", "a.b"]);
    }

    #[test]
    fn test_unbalanced_quotes_fail() {
        let err = Key::parse(r#""abc"#, 7).unwrap_err();
        assert_eq!(err.line(), Some(7));
        assert!(Key::parse("'abc", 1).is_err());
    }

    #[test]
    fn test_invalid_bare_symbols_fail() {
        assert!(Key::parse("a b", 1).is_err());
        assert!(Key::parse("ключ", 1).is_err());
        assert!(Key::parse("a$", 1).is_err());
        assert!(Key::parse("a..b", 1).is_err());
        assert!(Key::parse("", 1).is_err());
        assert!(Key::parse(r#""a"b"#, 1).is_err());
    }

    #[test]
    fn test_quoted_special_symbols_pass() {
        let key = Key::parse(r#""ʎǝʞ""#, 1).unwrap();
        assert_eq!(key.name(), "ʎǝʞ");
        let key = Key::parse(r#""tab\there""#, 1).unwrap();
        assert_eq!(key.name(), "tab\there");
    }

    #[test]
    fn test_canonical_form_unquotes_bare_names() {
        let quoted = Key::parse(r#""a"."b""#, 1).unwrap();
        let bare = Key::parse("a.b", 1).unwrap();
        assert_eq!(quoted.canonical(), bare.canonical());
    }

    #[test]
    fn test_control_characters_force_basic_quotes() {
        let part = KeyPart::from_name("\"\n");
        assert_eq!(part, KeyPart::Basic("\"\n".into()));

        let key = Key::from_name("a\"b\tc", 1);
        assert_eq!(key.to_string(), r#""a\"b\tc""#);
        assert_eq!(Key::parse(&key.to_string(), 1).unwrap().name(), "a\"b\tc");
    }

    #[test]
    fn test_display_round_trips() {
        let key = Key::parse(r#"a."b c".'d"e'"#, 1).unwrap();
        assert_eq!(key.to_string(), r#"a."b c".'d"e'"#);
        assert_eq!(Key::parse(&key.to_string(), 1).unwrap(), key);
    }
}
