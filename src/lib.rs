//! # serde_toml_tree
//!
//! A TOML library built around an explicit syntax tree, with Serde support on
//! both sides.
//!
//! Text is parsed line by line into a [`TomlFile`]: an arena of nodes for
//! tables, arrays of tables, key-value pairs and inline tables, each carrying
//! the line it came from. Typed values are decoded out of that tree through a
//! Serde [`Deserializer`], and encoded into a fresh tree by [`to_tree`] before
//! the emitter writes it back as text.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! serde_toml_tree = "0.1"
//! serde = { version = "1.0", features = ["derive"] }
//! ```
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_toml_tree::{from_str, to_string};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Server {
//!     host: String,
//!     port: u16,
//! }
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Config {
//!     name: String,
//!     server: Server,
//! }
//!
//! let text = "name = \"demo\"\n\n[server]\n    host = \"localhost\"\n    port = 8080\n";
//! let config: Config = from_str(text).unwrap();
//! assert_eq!(config.server.port, 8080);
//! assert_eq!(to_string(&config).unwrap(), text);
//! ```
//!
//! ## Working with the tree
//!
//! ```rust
//! use serde_toml_tree::parse_str;
//!
//! let file = parse_str("[a.b]\nc = 1").unwrap();
//! print!("{}", file.pretty_str());
//! ```
//!
//! ## Errors
//!
//! Every failure is an [`Error`] carrying the line it happened on when one is
//! known: malformed text, a value of the wrong type, an unknown key, a `null`
//! in a non-optional field, a missing field or an unknown enum member.
//!
//! ## Logging
//!
//! The crate logs through [`tracing`]; nothing is printed unless the
//! application installs a subscriber.

pub mod config;
pub mod de;
pub mod emitter;
pub mod error;
pub mod key;
pub mod map;
pub mod parser;
pub(crate) mod scan;
pub mod ser;
pub mod tree;
pub mod value;

pub use config::{Indentation, TomlConfig, TomlOutputConfig};
pub use de::Deserializer;
pub use emitter::{IoSink, TomlEmitter, TomlSink};
pub use error::{Error, Result};
pub use key::{Key, KeyPart};
pub use map::{Item, TomlMap};
pub use parser::TomlParser;
pub use ser::{to_tree, Inline};
pub use tree::{KeyValue, Node, NodeId, NodeKind, TomlFile, TomlTable};
pub use value::TomlValue;

use serde::{Deserialize, Serialize};
use std::io;

/// Parses TOML text into a tree with the default [`TomlConfig`].
///
/// # Examples
///
/// ```rust
/// use serde_toml_tree::{parse_str, NodeKind};
///
/// let file = parse_str("[server]\nport = 80").unwrap();
/// let server = file.children(file.root())[0];
/// assert!(matches!(file.kind(server), NodeKind::Table(_)));
/// ```
///
/// # Errors
///
/// [`Error::Parse`] with the offending line.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse_str(toml: &str) -> Result<TomlFile> {
    parse_str_with_config(toml, &TomlConfig::default())
}

/// Parses TOML text into a tree.
///
/// # Errors
///
/// [`Error::Parse`] with the offending line.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse_str_with_config(toml: &str, config: &TomlConfig) -> Result<TomlFile> {
    TomlParser::new(config.clone()).parse_str(toml)
}

/// Parses a document that has already been split into lines.
///
/// # Examples
///
/// ```rust
/// use serde_toml_tree::{parse_lines, TomlConfig};
///
/// let file = parse_lines(&["a = 1", "b = 2"], &TomlConfig::default()).unwrap();
/// assert_eq!(file.children(file.root()).len(), 2);
/// ```
///
/// # Errors
///
/// [`Error::Parse`] with the offending line.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse_lines<S: AsRef<str>>(lines: &[S], config: &TomlConfig) -> Result<TomlFile> {
    TomlParser::new(config.clone()).parse_lines(lines)
}

/// Deserializes `T` out of an already parsed tree.
///
/// # Errors
///
/// Any decoding error: type mismatches, unknown keys, `null` in a
/// non-optional field, missing fields or unknown enum members.
#[must_use = "this returns the result of the operation, errors must be handled"]
#[tracing::instrument(level = "debug", skip_all, fields(nodes = file.len()))]
pub fn from_tree<'de, T>(file: &TomlFile, config: &TomlConfig) -> Result<T>
where
    T: Deserialize<'de>,
{
    T::deserialize(Deserializer::new(file, config))
}

/// Deserializes `T` from TOML text.
///
/// # Examples
///
/// ```rust
/// use serde_toml_tree::from_str;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_str("x = 1\ny = 2").unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// A parse error for malformed text, or any decoding error.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<'de, T>(toml: &str) -> Result<T>
where
    T: Deserialize<'de>,
{
    from_str_with_config(toml, &TomlConfig::default())
}

/// Deserializes `T` from TOML text with a custom [`TomlConfig`].
///
/// # Examples
///
/// ```rust
/// use serde_toml_tree::{from_str_with_config, TomlConfig};
/// use serde::Deserialize;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32 }
///
/// let config = TomlConfig::new().with_ignore_unknown_names(true);
/// let point: Point = from_str_with_config("x = 1\nlabel = 'p'", &config).unwrap();
/// assert_eq!(point, Point { x: 1 });
/// ```
///
/// # Errors
///
/// A parse error for malformed text, or any decoding error.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str_with_config<'de, T>(toml: &str, config: &TomlConfig) -> Result<T>
where
    T: Deserialize<'de>,
{
    let file = parse_str_with_config(toml, config)?;
    from_tree(&file, config)
}

/// Deserializes `T` from UTF-8 bytes of TOML text.
///
/// # Errors
///
/// [`Error::Custom`] when the bytes are not UTF-8, otherwise as [`from_str`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice<'de, T>(bytes: &[u8]) -> Result<T>
where
    T: Deserialize<'de>,
{
    let toml = std::str::from_utf8(bytes).map_err(|e| Error::custom(e.to_string()))?;
    from_str(toml)
}

/// Deserializes `T` from a reader of TOML text.
///
/// # Examples
///
/// ```rust
/// use serde_toml_tree::from_reader;
/// use serde::Deserialize;
/// use std::io::Cursor;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_reader(Cursor::new(b"x = 1\ny = 2")).unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// [`Error::Io`] when reading fails, otherwise as [`from_str`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(mut reader: R) -> Result<T>
where
    R: io::Read,
    T: for<'de> Deserialize<'de>,
{
    let mut toml = String::new();
    reader
        .read_to_string(&mut toml)
        .map_err(|e| Error::io(&e.to_string()))?;
    from_str(&toml)
}

/// Serializes `value` to TOML text with the default [`TomlOutputConfig`].
///
/// # Examples
///
/// ```rust
/// use serde_toml_tree::to_string;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// assert_eq!(to_string(&Point { x: 1, y: 2 }).unwrap(), "x = 1\ny = 2\n");
/// ```
///
/// # Errors
///
/// [`Error::UnsupportedFeature`] for values TOML cannot hold at that place.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_config(value, &TomlOutputConfig::default())
}

/// Serializes `value` to TOML text.
///
/// # Examples
///
/// ```rust
/// use serde_toml_tree::{to_string_with_config, TomlOutputConfig};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Entry { name: String, alias: Option<String> }
///
/// let entry = Entry { name: "a".into(), alias: None };
/// let config = TomlOutputConfig::new().with_ignore_null_values(true);
/// assert_eq!(to_string_with_config(&entry, &config).unwrap(), "name = \"a\"\n");
/// ```
///
/// # Errors
///
/// [`Error::UnsupportedFeature`] for values TOML cannot hold at that place.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_config<T>(value: &T, config: &TomlOutputConfig) -> Result<String>
where
    T: ?Sized + Serialize,
{
    Ok(to_tree(value, config)?.emit(config))
}

/// Serializes `value` as TOML text into `writer`.
///
/// # Errors
///
/// [`Error::Io`] when writing fails, otherwise as [`to_string`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    let config = TomlOutputConfig::default();
    to_tree(value, &config)?.emit_to_writer(writer, &config)
}
