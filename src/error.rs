//! Error types for TOML parsing, decoding and encoding.
//!
//! Every failure is raised at the point of detection and travels unchanged to
//! the public entry point ([`crate::from_str`], [`crate::to_string`],
//! [`crate::parse_str`], ...). There is no partial-result recovery: a failed
//! call returns exactly one error and discards whatever tree it had built.
//!
//! ## Error Categories
//!
//! - **Parse errors**: malformed headers, blank table names, unbalanced quotes
//!   or brackets, unknown escape sequences, invalid key symbols
//! - **Type errors**: [`Error::IllegalType`] when the requested host type is
//!   narrower than what TOML stores, [`Error::Cast`] when the stored value has
//!   a different TOML type altogether
//! - **Structure errors**: unknown keys, nulls in non-nullable fields, missing
//!   required fields, invalid enum members
//! - **Internal errors**: violated tree-shape invariants; these indicate a bug
//!   in this crate rather than a problem with the input
//!
//! ## Examples
//!
//! ```rust
//! use serde_toml_tree::{parse_str, Error};
//!
//! let err = parse_str("[table").unwrap_err();
//! assert!(matches!(err, Error::Parse { line: 1, .. }));
//! assert_eq!(err.line(), Some(1));
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors that can occur while working with TOML.
///
/// Variants carry the originating line number wherever the input position is
/// known, so messages can be mapped straight back to the source text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// The input text does not follow the TOML grammar
    #[error("Line {line}: {msg}")]
    Parse { line: usize, msg: String },

    /// The requested host type cannot hold the TOML type stored in the input
    #[error(
        "Line {line}: <{requested}> type is not allowed for this value by the TOML specification, \
         use <{required}> instead (field = {key}; value = {value})"
    )]
    IllegalType {
        line: usize,
        key: String,
        value: String,
        requested: String,
        required: String,
    },

    /// The stored value is present but cannot be converted to the requested type
    #[error(
        "Line {line}: cannot decode the key [{key}] with the value [{value}] \
         with the provided type [{requested}]. Please check the type of the target field"
    )]
    Cast {
        line: usize,
        key: String,
        value: String,
        requested: String,
    },

    /// A key in the input has no matching field in the target type
    #[error(
        "Line {line}: unknown key received: <{key}> in scope <{table}>. \
         Switch the configuration option `ignore_unknown_names` to true to skip unknown keys"
    )]
    UnknownName {
        key: String,
        table: String,
        line: usize,
    },

    /// A null value targets a field that cannot hold null
    #[error("Line {line}: non-null value is expected for the field <{field}>, but null was provided")]
    NonNullableValue { field: String, line: usize },

    /// A non-optional field is absent from the input
    #[error("Missing required field <{field}> from type <{type_name}> in the input")]
    MissingRequiredField { field: String, type_name: String },

    /// A string value does not name any member of the target enum
    #[error("Line {line}: value <{value}> is not a valid enum option. Permitted choices are: {choices}")]
    InvalidEnumValue {
        value: String,
        choices: String,
        line: usize,
    },

    /// The decoder met a tree shape that the parser never produces
    #[error("Internal decoding error: {0}")]
    InternalDecoding(String),

    /// A tree-building invariant was violated
    #[error("Internal AST error: {0}")]
    InternalAst(String),

    /// The encoder was asked for a shape the tree cannot represent yet
    #[error("Unsupported encoding feature: {0}")]
    UnsupportedFeature(String),

    /// Custom error raised by a `Serialize`/`Deserialize` implementation
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a parse error for the given source line.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_toml_tree::Error;
    ///
    /// let err = Error::parse(10, "missing closing bracket");
    /// assert!(err.to_string().contains("Line 10"));
    /// ```
    pub fn parse(line: usize, msg: impl Into<String>) -> Self {
        Error::Parse {
            line,
            msg: msg.into(),
        }
    }

    /// Creates an illegal-type error: the host type is narrower than the stored TOML type.
    pub fn illegal_type(
        line: usize,
        key: &str,
        value: impl fmt::Display,
        requested: &str,
        required: &str,
    ) -> Self {
        Error::IllegalType {
            line,
            key: key.to_string(),
            value: value.to_string(),
            requested: requested.to_string(),
            required: required.to_string(),
        }
    }

    /// Creates a cast error: the stored value cannot become the requested host type.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_toml_tree::Error;
    ///
    /// let err = Error::cast(3, "a", "true", "String");
    /// assert!(err.to_string().contains("[String]"));
    /// ```
    pub fn cast(line: usize, key: &str, value: impl fmt::Display, requested: &str) -> Self {
        Error::Cast {
            line,
            key: key.to_string(),
            value: value.to_string(),
            requested: requested.to_string(),
        }
    }

    /// Creates an unknown-name error for `key` found inside `table`.
    pub fn unknown_name(key: &str, table: &str, line: usize) -> Self {
        Error::UnknownName {
            key: key.to_string(),
            table: table.to_string(),
            line,
        }
    }

    /// Creates a non-nullable error for a null assigned to `field`.
    pub fn non_nullable(field: &str, line: usize) -> Self {
        Error::NonNullableValue {
            field: field.to_string(),
            line,
        }
    }

    pub fn invalid_enum_value(value: &str, choices: &[&str], line: usize) -> Self {
        let mut sorted = choices.to_vec();
        sorted.sort_unstable();
        Error::InvalidEnumValue {
            value: value.to_string(),
            choices: sorted.join(", "),
            line,
        }
    }

    pub fn internal_decoding(msg: impl Into<String>) -> Self {
        Error::InternalDecoding(msg.into())
    }

    pub fn internal_ast(msg: impl Into<String>) -> Self {
        Error::InternalAst(msg.into())
    }

    /// Creates an unsupported-feature error for shapes the encoder cannot build.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Error::UnsupportedFeature(msg.into())
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for reading/writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns the source line this error points at, if it is known.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::Parse { line, .. }
            | Error::IllegalType { line, .. }
            | Error::Cast { line, .. }
            | Error::UnknownName { line, .. }
            | Error::NonNullableValue { line, .. }
            | Error::InvalidEnumValue { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// Attaches the name of the struct being decoded to a
    /// [`Error::MissingRequiredField`] raised by serde's generated code.
    ///
    /// The innermost struct wins: a name that is already set is kept.
    pub(crate) fn in_struct(self, type_name: &str) -> Self {
        match self {
            Error::MissingRequiredField { field, type_name: t } if t.is_empty() => {
                Error::MissingRequiredField {
                    field,
                    type_name: type_name.to_string(),
                }
            }
            other => other,
        }
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    fn missing_field(field: &'static str) -> Self {
        Error::MissingRequiredField {
            field: field.to_string(),
            type_name: String::new(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_is_reported_where_known() {
        assert_eq!(Error::parse(4, "x").line(), Some(4));
        assert_eq!(Error::non_nullable("a", 2).line(), Some(2));
        assert_eq!(Error::unsupported("x").line(), None);
    }

    #[test]
    fn test_enum_choices_are_sorted() {
        let err = Error::invalid_enum_value("Purple", &["Red", "Blue", "Green"], 1);
        match err {
            Error::InvalidEnumValue { choices, .. } => assert_eq!(choices, "Blue, Green, Red"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_field_keeps_innermost_struct() {
        let err = <Error as serde::de::Error>::missing_field("port");
        let err = err.in_struct("Server").in_struct("Config");
        assert_eq!(
            err,
            Error::MissingRequiredField {
                field: "port".to_string(),
                type_name: "Server".to_string(),
            }
        );
    }
}
