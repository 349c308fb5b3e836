//! Configuration for TOML parsing, decoding and emission.
//!
//! - [`TomlConfig`]: input options consulted by the parser and decoder
//! - [`TomlOutputConfig`]: output options consulted by the encoder and emitter
//! - [`Indentation`]: the indentation unit used per table depth
//!
//! ## Examples
//!
//! ```rust
//! use serde_toml_tree::{from_str_with_config, TomlConfig};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Data { x: i64 }
//!
//! // Skip keys that `Data` does not declare
//! let config = TomlConfig::new().with_ignore_unknown_names(true);
//! let data: Data = from_str_with_config("x = 1\ny = 2", &config).unwrap();
//! assert_eq!(data.x, 1);
//! ```

use serde::{Deserialize, Serialize};

/// Indentation unit written once per table depth.
///
/// # Examples
///
/// ```rust
/// use serde_toml_tree::Indentation;
///
/// assert_eq!(Indentation::FourSpaces.as_str(), "    ");
/// assert_eq!(Indentation::TwoSpaces.as_str(), "  ");
/// assert_eq!(Indentation::Tab.as_str(), "\t");
/// assert_eq!(Indentation::None.as_str(), "");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Indentation {
    #[default]
    FourSpaces,
    TwoSpaces,
    Tab,
    None,
}

impl Indentation {
    /// Returns the string written for one level of this indentation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Indentation::FourSpaces => "    ",
            Indentation::TwoSpaces => "  ",
            Indentation::Tab => "\t",
            Indentation::None => "",
        }
    }
}

/// Options that control how TOML text is read and decoded.
///
/// # Examples
///
/// ```rust
/// use serde_toml_tree::TomlConfig;
///
/// let config = TomlConfig::new()
///     .with_ignore_unknown_names(true)
///     .with_empty_values_allowed(false);
/// assert!(config.ignore_unknown_names);
/// assert!(!config.empty_values_allowed);
/// assert!(config.escaped_quotes_in_literal_strings_allowed);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Skip keys the target type does not declare instead of failing.
    pub ignore_unknown_names: bool,
    /// Accept `a = ` (an empty right-hand side) as null.
    pub empty_values_allowed: bool,
    /// Honor `\'` inside literal strings, which TOML itself forbids.
    pub escaped_quotes_in_literal_strings_allowed: bool,
}

impl Default for TomlConfig {
    fn default() -> Self {
        TomlConfig {
            ignore_unknown_names: false,
            empty_values_allowed: true,
            escaped_quotes_in_literal_strings_allowed: true,
        }
    }
}

impl TomlConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_ignore_unknown_names(mut self, ignore: bool) -> Self {
        self.ignore_unknown_names = ignore;
        self
    }

    #[must_use]
    pub fn with_empty_values_allowed(mut self, allowed: bool) -> Self {
        self.empty_values_allowed = allowed;
        self
    }

    #[must_use]
    pub fn with_escaped_quotes_in_literal_strings_allowed(mut self, allowed: bool) -> Self {
        self.escaped_quotes_in_literal_strings_allowed = allowed;
        self
    }
}

/// Options that control how values are encoded and how TOML text is written.
///
/// # Examples
///
/// ```rust
/// use serde_toml_tree::{Indentation, TomlOutputConfig};
///
/// let config = TomlOutputConfig::new()
///     .with_indentation(Indentation::TwoSpaces)
///     .with_ignore_null_values(true);
/// assert_eq!(config.indentation, Indentation::TwoSpaces);
/// assert!(config.ignore_null_values);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TomlOutputConfig {
    pub indentation: Indentation,
    /// Omit `None` fields instead of writing `key = null`.
    pub ignore_null_values: bool,
}

impl TomlOutputConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_indentation(mut self, indentation: Indentation) -> Self {
        self.indentation = indentation;
        self
    }

    #[must_use]
    pub fn with_ignore_null_values(mut self, ignore: bool) -> Self {
        self.ignore_null_values = ignore;
        self
    }
}
