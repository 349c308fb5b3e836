//! Typed leaf values of the TOML tree.
//!
//! This module provides the [`TomlValue`] enum stored in every key-value node,
//! together with the value parser that turns the right-hand side of
//! `key = value` into one.
//!
//! ## Core Types
//!
//! - [`TomlValue`]: strings (basic and literal), integers, floats, booleans,
//!   null, arrays, and the four TOML date/time flavours
//!
//! ## Parsing
//!
//! ```rust
//! use serde_toml_tree::{TomlConfig, TomlValue};
//!
//! let config = TomlConfig::default();
//! assert_eq!(TomlValue::parse("0x_ff", 1, &config).unwrap_err().line(), Some(1));
//! assert_eq!(TomlValue::parse("0xff", 1, &config).unwrap(), TomlValue::Integer(255));
//! assert_eq!(
//!     TomlValue::parse(r#"[ "a", 'b' ]"#, 1, &config).unwrap(),
//!     TomlValue::Array(vec![
//!         TomlValue::BasicString("a".into()),
//!         TomlValue::LiteralString("b".into()),
//!     ])
//! );
//! ```
//!
//! ### Writing values back
//!
//! `Display` renders the TOML spelling, so a parsed value prints as valid TOML:
//!
//! ```rust
//! use serde_toml_tree::TomlValue;
//!
//! assert_eq!(TomlValue::Float(1.0).to_string(), "1.0");
//! assert_eq!(TomlValue::BasicString("a\"b".into()).to_string(), r#""a\"b""#);
//! assert_eq!(TomlValue::Array(vec![]).to_string(), "[]");
//! ```

use crate::config::TomlConfig;
use crate::scan::{bracket_depth, quotes_balanced, split_top_level};
use crate::{Error, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat};
use std::fmt;

/// A value on the right-hand side of a key-value pair.
///
/// # Examples
///
/// ```rust
/// use serde_toml_tree::TomlValue;
///
/// let text = TomlValue::from("hello");
/// assert!(text.is_string());
/// assert_eq!(text.as_str(), Some("hello"));
///
/// let number = TomlValue::from(42);
/// assert_eq!(number.as_i64(), Some(42));
/// assert!(!number.is_null());
/// ```
#[derive(Clone, Debug, PartialEq, Default)]
pub enum TomlValue {
    #[default]
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    /// `"..."`, escapes already expanded
    BasicString(String),
    /// `'...'`, taken verbatim
    LiteralString(String),
    Array(Vec<TomlValue>),
    OffsetDateTime(DateTime<FixedOffset>),
    LocalDateTime(NaiveDateTime),
    LocalDate(NaiveDate),
    LocalTime(NaiveTime),
}

impl TomlValue {
    /// Parses the raw right-hand side of a key-value pair.
    ///
    /// `raw` must already be stripped of its trailing comment. Dispatch goes by
    /// the leading character; anything that matches no TOML shape fails with
    /// [`Error::Parse`] carrying `line`.
    ///
    /// # Errors
    ///
    /// Unclosed strings, unknown escapes, unbalanced arrays, integers that do
    /// not fit into `i64`, empty values when they are disabled in `config`,
    /// and values of no recognizable type.
    pub fn parse(raw: &str, line: usize, config: &TomlConfig) -> Result<Self> {
        let raw = raw.trim();

        if raw.starts_with("\"\"\"") || raw.starts_with("'''") {
            return parse_multiline_string(raw, line);
        }

        match raw.chars().next() {
            Some('"') => parse_basic_string(raw, line),
            Some('\'') => parse_literal_string(raw, line, config),
            Some('[') => parse_array(raw, line, config),
            Some('{') => Err(Error::parse(
                line,
                format!("Inline tables are not supported inside arrays: <{raw}>"),
            )),
            _ => parse_scalar(raw, line, config),
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, TomlValue::Null)
    }

    /// Returns `true` for both basic and literal strings.
    #[inline]
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, TomlValue::BasicString(_) | TomlValue::LiteralString(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self, TomlValue::Array(_))
    }

    /// Returns `true` for any of the four date/time flavours.
    #[inline]
    #[must_use]
    pub const fn is_datetime(&self) -> bool {
        matches!(
            self,
            TomlValue::OffsetDateTime(_)
                | TomlValue::LocalDateTime(_)
                | TomlValue::LocalDate(_)
                | TomlValue::LocalTime(_)
        )
    }

    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TomlValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            TomlValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TomlValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// If the value is a string of either kind, returns its content.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TomlValue::BasicString(s) | TomlValue::LiteralString(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_array(&self) -> Option<&[TomlValue]> {
        match self {
            TomlValue::Array(values) => Some(values),
            _ => None,
        }
    }

    /// The TOML type name, used in error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            TomlValue::Null => "null",
            TomlValue::Boolean(_) => "Boolean",
            TomlValue::Integer(_) => "Long",
            TomlValue::Float(_) => "Double",
            TomlValue::BasicString(_) | TomlValue::LiteralString(_) => "String",
            TomlValue::Array(_) => "Array",
            TomlValue::OffsetDateTime(_) => "OffsetDateTime",
            TomlValue::LocalDateTime(_) => "LocalDateTime",
            TomlValue::LocalDate(_) => "LocalDate",
            TomlValue::LocalTime(_) => "LocalTime",
        }
    }

    /// RFC 3339 text for date/time values, `None` for everything else.
    #[must_use]
    pub fn datetime_string(&self) -> Option<String> {
        match self {
            TomlValue::OffsetDateTime(dt) => Some(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            TomlValue::LocalDateTime(dt) => Some(dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
            TomlValue::LocalDate(d) => Some(d.format("%Y-%m-%d").to_string()),
            TomlValue::LocalTime(t) => Some(t.format("%H:%M:%S%.f").to_string()),
            _ => None,
        }
    }
}

impl fmt::Display for TomlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TomlValue::Null => f.write_str("null"),
            TomlValue::Boolean(b) => write!(f, "{b}"),
            TomlValue::Integer(i) => write!(f, "{i}"),
            TomlValue::Float(fl) => f.write_str(&format_float(*fl)),
            TomlValue::BasicString(s) => write!(f, "\"{}\"", escape_basic(s)),
            // literal strings cannot hold a newline or a single quote
            TomlValue::LiteralString(s) if s.contains(['\'', '\n', '\r']) => {
                write!(f, "\"{}\"", escape_basic(s))
            }
            TomlValue::LiteralString(s) => write!(f, "'{s}'"),
            TomlValue::Array(values) if values.is_empty() => f.write_str("[]"),
            TomlValue::Array(values) => {
                f.write_str("[ ")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str(" ]")
            }
            other => match other.datetime_string() {
                Some(text) => f.write_str(&text),
                None => Ok(()),
            },
        }
    }
}

impl From<bool> for TomlValue {
    fn from(value: bool) -> Self {
        TomlValue::Boolean(value)
    }
}

impl From<i64> for TomlValue {
    fn from(value: i64) -> Self {
        TomlValue::Integer(value)
    }
}

impl From<i32> for TomlValue {
    fn from(value: i32) -> Self {
        TomlValue::Integer(i64::from(value))
    }
}

impl From<f64> for TomlValue {
    fn from(value: f64) -> Self {
        TomlValue::Float(value)
    }
}

impl From<&str> for TomlValue {
    fn from(value: &str) -> Self {
        TomlValue::BasicString(value.to_string())
    }
}

impl From<String> for TomlValue {
    fn from(value: String) -> Self {
        TomlValue::BasicString(value)
    }
}

impl From<Vec<TomlValue>> for TomlValue {
    fn from(value: Vec<TomlValue>) -> Self {
        TomlValue::Array(value)
    }
}

fn format_float(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else if value.is_infinite() {
        let text = if value > 0.0 { "inf" } else { "-inf" };
        text.to_string()
    } else {
        // Debug keeps the fractional part: `1.0`, `1e20`
        format!("{value:?}")
    }
}

/// Escapes `s` for use between double quotes.
#[must_use]
pub fn escape_basic(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

/// Expands the escape sequences of basic-string content.
///
/// # Errors
///
/// [`Error::Parse`] on an unknown escape or a malformed `\u`/`\U` code point.
pub fn unescape_basic(content: &str, line: usize) -> Result<String> {
    let mut out = String::with_capacity(content.len());
    let mut chars = content.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('b') => out.push('\u{8}'),
            Some('r') => out.push('\r'),
            Some('n') => out.push('\n'),
            Some('f') => out.push('\u{c}'),
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some(kind @ ('u' | 'U')) => {
                let width = if kind == 'u' { 4 } else { 8 };
                let hex: String = chars.by_ref().take(width).collect();
                let decoded = (hex.len() == width)
                    .then(|| u32::from_str_radix(&hex, 16).ok())
                    .flatten()
                    .and_then(char::from_u32)
                    .ok_or_else(|| {
                        Error::parse(line, format!("Invalid unicode escape <\\{kind}{hex}> in <{content}>"))
                    })?;
                out.push(decoded);
            }
            Some(other) => {
                return Err(Error::parse(
                    line,
                    format!("According to the TOML specification, the escape <\\{other}> is not supported: <{content}>"),
                ))
            }
            None => {
                return Err(Error::parse(
                    line,
                    format!("A trailing backslash is not allowed in a basic string: <{content}>"),
                ))
            }
        }
    }

    Ok(out)
}

fn parse_basic_string(raw: &str, line: usize) -> Result<TomlValue> {
    if raw.len() < 2 || !raw.ends_with('"') {
        return Err(Error::parse(line, format!("Not able to find the closing quote in <{raw}>")));
    }
    let content = &raw[1..raw.len() - 1];

    let mut escaped = false;
    for ch in content.chars() {
        match ch {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => {
                return Err(Error::parse(
                    line,
                    format!("Found an unescaped double quote inside the basic string <{raw}>"),
                ))
            }
            _ => {}
        }
    }
    if escaped {
        return Err(Error::parse(line, format!("Not able to find the closing quote in <{raw}>")));
    }

    Ok(TomlValue::BasicString(unescape_basic(content, line)?))
}

fn parse_literal_string(raw: &str, line: usize, config: &TomlConfig) -> Result<TomlValue> {
    if raw.len() < 2 || !raw.ends_with('\'') {
        return Err(Error::parse(line, format!("Not able to find the closing quote in <{raw}>")));
    }
    let content = &raw[1..raw.len() - 1];

    let content = if config.escaped_quotes_in_literal_strings_allowed {
        content.replace("\\'", "'")
    } else {
        content.to_string()
    };
    if !config.escaped_quotes_in_literal_strings_allowed && content.contains('\'') {
        return Err(Error::parse(
            line,
            format!("Single quotes are not allowed inside the literal string <{raw}>"),
        ));
    }

    Ok(TomlValue::LiteralString(content))
}

fn parse_multiline_string(raw: &str, line: usize) -> Result<TomlValue> {
    let delimiter = &raw[..3];
    let body = &raw[3..];
    let Some(content) = body.strip_suffix(delimiter) else {
        return Err(Error::parse(
            line,
            format!("Not able to find the closing {delimiter} of the multi-line string"),
        ));
    };
    // a newline right after the opening delimiter is trimmed
    let content = content
        .strip_prefix("\r\n")
        .or_else(|| content.strip_prefix('\n'))
        .unwrap_or(content);

    if delimiter == "'''" {
        return Ok(TomlValue::LiteralString(content.to_string()));
    }

    Ok(TomlValue::BasicString(unescape_basic(
        &join_line_continuations(content),
        line,
    )?))
}

/// Removes every `\` that ends a line together with the whitespace that follows it.
fn join_line_continuations(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut rest = content;

    while let Some(pos) = rest.find('\\') {
        let (before, after) = rest.split_at(pos);
        out.push_str(before);

        let backslashes = after.chars().take_while(|&c| c == '\\').count();
        let tail = &after[backslashes..];
        let is_continuation = backslashes % 2 == 1
            && tail
                .chars()
                .take_while(|c| *c != '\n')
                .all(char::is_whitespace)
            && tail.contains('\n');

        if is_continuation {
            out.push_str(&after[..backslashes - 1]);
            rest = tail.trim_start();
        } else {
            out.push_str(&after[..backslashes]);
            rest = tail;
        }
    }
    out.push_str(rest);
    out
}

fn parse_array(raw: &str, line: usize, config: &TomlConfig) -> Result<TomlValue> {
    let literal_escapes = config.escaped_quotes_in_literal_strings_allowed;
    if !raw.ends_with(']') || bracket_depth(raw, literal_escapes) != 0 {
        return Err(Error::parse(
            line,
            format!("Not able to parse the array <{raw}>: brackets are not balanced"),
        ));
    }
    if !quotes_balanced(raw, literal_escapes) {
        return Err(Error::parse(
            line,
            format!("Not able to parse the array <{raw}>: quotes are not balanced"),
        ));
    }

    let inner = raw[1..raw.len() - 1].trim();
    if inner.is_empty() {
        return Ok(TomlValue::Array(Vec::new()));
    }

    let elements = split_top_level(inner, ',', literal_escapes);
    let last = elements.len() - 1;
    let mut values = Vec::with_capacity(elements.len());

    for (i, element) in elements.into_iter().enumerate() {
        let element = element.trim();
        if element.is_empty() {
            if i == last {
                break;
            }
            return Err(Error::parse(line, format!("Empty element in the array <{raw}>")));
        }
        values.push(TomlValue::parse(element, line, config)?);
    }

    Ok(TomlValue::Array(values))
}

fn parse_scalar(raw: &str, line: usize, config: &TomlConfig) -> Result<TomlValue> {
    match raw {
        "true" => return Ok(TomlValue::Boolean(true)),
        "false" => return Ok(TomlValue::Boolean(false)),
        "inf" | "+inf" => return Ok(TomlValue::Float(f64::INFINITY)),
        "-inf" => return Ok(TomlValue::Float(f64::NEG_INFINITY)),
        "nan" | "+nan" | "-nan" => return Ok(TomlValue::Float(f64::NAN)),
        _ => {}
    }

    if raw.is_empty() || raw.eq_ignore_ascii_case("null") || raw.eq_ignore_ascii_case("nil") {
        return if config.empty_values_allowed {
            Ok(TomlValue::Null)
        } else {
            Err(Error::parse(
                line,
                "Empty values are not allowed, set `empty_values_allowed` to accept them",
            ))
        };
    }

    if let Some(value) = parse_datetime(raw) {
        return Ok(value);
    }

    let starts_numeric = raw
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || c == '+' || c == '-');
    if !starts_numeric {
        return Err(Error::parse(
            line,
            format!("Unknown value type <{raw}>: strings must be wrapped in quotes"),
        ));
    }

    let is_radix = raw.starts_with("0x") || raw.starts_with("0o") || raw.starts_with("0b");
    if !is_radix && raw.contains(['.', 'e', 'E']) {
        parse_float(raw, line)
    } else {
        parse_integer(raw, line)
    }
}

fn strip_underscores(digits: &str, raw: &str, line: usize) -> Result<String> {
    let valid = !digits.starts_with('_') && !digits.ends_with('_') && !digits.contains("__");
    if valid {
        Ok(digits.replace('_', ""))
    } else {
        Err(Error::parse(
            line,
            format!("Underscores must sit between digits in the number <{raw}>"),
        ))
    }
}

fn parse_integer(raw: &str, line: usize) -> Result<TomlValue> {
    let (radix, digits) = match raw.get(..2) {
        Some("0x") => (16, &raw[2..]),
        Some("0o") => (8, &raw[2..]),
        Some("0b") => (2, &raw[2..]),
        _ => (10, raw),
    };
    let cleaned = strip_underscores(digits, raw, line)?;
    let cleaned = cleaned.strip_prefix('+').unwrap_or(&cleaned);

    i64::from_str_radix(cleaned, radix)
        .map(TomlValue::Integer)
        .map_err(|e| Error::parse(line, format!("Not able to parse the integer <{raw}>: {e}")))
}

fn parse_float(raw: &str, line: usize) -> Result<TomlValue> {
    let cleaned = strip_underscores(raw, raw, line)?;
    cleaned
        .parse::<f64>()
        .map(TomlValue::Float)
        .map_err(|e| Error::parse(line, format!("Not able to parse the float <{raw}>: {e}")))
}

fn parse_datetime(raw: &str) -> Option<TomlValue> {
    let bytes = raw.as_bytes();
    let looks_like_date = bytes.len() >= 10
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[4] == b'-'
        && bytes[7] == b'-';
    let looks_like_time = bytes.len() >= 8 && bytes[2] == b':' && bytes[5] == b':';

    if looks_like_date {
        if raw.len() == 10 {
            return NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(TomlValue::LocalDate);
        }
        // RFC 3339 allows a space instead of `T`
        let normalized = format!("{}T{}", raw.get(..10)?, raw.get(11..)?);
        if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
            return Some(TomlValue::OffsetDateTime(dt));
        }
        return NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(TomlValue::LocalDateTime);
    }

    if looks_like_time {
        return NaiveTime::parse_from_str(raw, "%H:%M:%S%.f")
            .ok()
            .map(TomlValue::LocalTime);
    }

    None
}
