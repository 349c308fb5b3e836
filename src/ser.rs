//! Encoding Rust values into a [`TomlFile`].
//!
//! Encoding runs in two passes. A serde `Serializer` first turns the value
//! into a small intermediate form (scalars, arrays, tables and inline tables);
//! the tree builder then lays that form out as TOML nodes:
//!
//! - **Scalars** and `None` become key-value leaves (`None` is written as
//!   `null`, or skipped with `ignore_null_values`)
//! - **Sequences** of scalars or arrays become inline arrays; sequences of
//!   structs or maps become an array of tables
//! - **Nested structs and maps** become `[dotted.name]` tables, or inline
//!   tables when wrapped in [`Inline`]
//!
//! ## Usage
//!
//! ```rust
//! use serde_toml_tree::{to_tree, NodeKind, TomlOutputConfig};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Owner { name: String }
//!
//! #[derive(Serialize)]
//! struct Doc { title: String, owner: Owner }
//!
//! let doc = Doc { title: "demo".into(), owner: Owner { name: "Tom".into() } };
//! let file = to_tree(&doc, &TomlOutputConfig::default()).unwrap();
//! let root = file.children(file.root());
//! assert!(matches!(file.kind(root[0]), NodeKind::KeyValuePrimitive(_)));
//! assert!(matches!(file.kind(root[1]), NodeKind::Table(_)));
//! ```

use crate::config::TomlOutputConfig;
use crate::key::{Key, KeyPart};
use crate::tree::{NodeId, NodeKind, TomlFile, TomlTable};
use crate::value::TomlValue;
use crate::{Error, Result};
use serde::{ser, Deserialize, Deserializer, Serialize, Serializer};
use std::ops::{Deref, DerefMut};

/// Reserved newtype name that marks a value as an inline table.
pub(crate) const INLINE_TOKEN: &str = "$__serde_toml_tree_private_Inline";

const INLINE_IN_ARRAY: &str = "Inline tables are not yet supported as array elements.";

/// Wraps a struct or map field so that it is written as an inline table
/// (`point = { x = 1, y = 2 }`) instead of a `[point]` section.
///
/// Decoding is transparent: a table or an inline table both decode into it.
///
/// # Examples
///
/// ```rust
/// use serde_toml_tree::{to_string, Inline};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i64, y: i64 }
///
/// #[derive(Serialize)]
/// struct Shape { origin: Inline<Point> }
///
/// let shape = Shape { origin: Inline(Point { x: 1, y: 2 }) };
/// assert_eq!(to_string(&shape).unwrap(), "origin = { x = 1, y = 2 }\n");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Inline<T>(pub T);

impl<T> Inline<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Inline<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for Inline<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<T> From<T> for Inline<T> {
    fn from(value: T) -> Self {
        Inline(value)
    }
}

impl<T: Serialize> Serialize for Inline<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_newtype_struct(INLINE_TOKEN, &self.0)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Inline<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        T::deserialize(deserializer).map(Inline)
    }
}

/// Encodes `value` into a TOML tree.
///
/// # Errors
///
/// [`Error::UnsupportedFeature`] when the root is not a struct or map, when an
/// inline table appears inside an array, or when an unsigned integer exceeds
/// `i64::MAX`.
#[tracing::instrument(level = "debug", skip(value, config))]
pub fn to_tree<T>(value: &T, config: &TomlOutputConfig) -> Result<TomlFile>
where
    T: ?Sized + Serialize,
{
    let entries = match value.serialize(EncodedSerializer)? {
        Encoded::Table(entries) | Encoded::Inline(entries) => entries,
        _ => {
            return Err(Error::unsupported(
                "only structs and maps can be encoded at the root of a TOML document",
            ))
        }
    };

    let mut builder = TreeBuilder {
        file: TomlFile::new(),
        config,
        line: 0,
    };
    let root = builder.file.root();
    builder.encode_table(root, &[], entries)?;
    Ok(builder.file)
}

/// Intermediate form produced by [`EncodedSerializer`].
#[derive(Debug, Clone, PartialEq)]
enum Encoded {
    Value(TomlValue),
    Array(Vec<Encoded>),
    Table(Vec<(String, Encoded)>),
    Inline(Vec<(String, Encoded)>),
}

impl Encoded {
    fn is_table(&self) -> bool {
        matches!(self, Encoded::Table(_) | Encoded::Inline(_))
    }

    /// Flattens scalars and nested arrays into one array value.
    fn into_value(self) -> Result<TomlValue> {
        match self {
            Encoded::Value(value) => Ok(value),
            Encoded::Array(items) => items
                .into_iter()
                .map(Encoded::into_value)
                .collect::<Result<Vec<_>>>()
                .map(TomlValue::Array),
            Encoded::Table(_) | Encoded::Inline(_) => Err(Error::unsupported(INLINE_IN_ARRAY)),
        }
    }
}

struct TreeBuilder<'c> {
    file: TomlFile,
    config: &'c TomlOutputConfig,
    line: usize,
}

impl TreeBuilder<'_> {
    fn next_line(&mut self) -> usize {
        self.line += 1;
        self.line
    }

    fn encode_table(&mut self, parent: NodeId, parts: &[KeyPart], entries: Vec<(String, Encoded)>) -> Result<()> {
        for (name, value) in entries {
            self.encode_entry(parent, parts, &name, value)?;
        }
        Ok(())
    }

    fn encode_entry(&mut self, parent: NodeId, parts: &[KeyPart], name: &str, value: Encoded) -> Result<()> {
        let mut child_parts = parts.to_vec();
        child_parts.push(KeyPart::from_name(name));

        match value {
            Encoded::Value(TomlValue::Null) if self.config.ignore_null_values => {}
            Encoded::Value(value) => {
                let line = self.next_line();
                self.file
                    .append_child(parent, NodeKind::key_value(Key::from_name(name, line), value), line);
            }
            Encoded::Inline(entries) => {
                let line = self.next_line();
                let table = self
                    .file
                    .append_child(parent, NodeKind::InlineTable(Key::from_name(name, line)), line);
                self.encode_inline(table, entries, line)?;
            }
            Encoded::Table(entries) => {
                let line = self.next_line();
                let table = TomlTable::from_parts(&child_parts, line, false);
                let id = self.file.append_child(parent, NodeKind::Table(table), line);
                self.encode_table(id, &child_parts, entries)?;
                self.stub_if_empty(id);
            }
            Encoded::Array(items) if !items.is_empty() && items.iter().all(|i| matches!(i, Encoded::Table(_))) => {
                let line = self.next_line();
                let table = TomlTable::from_parts(&child_parts, line, false);
                let array = self.file.append_child(parent, NodeKind::ArrayOfTables(table), line);
                for item in items {
                    let Encoded::Table(entries) = item else { continue };
                    let line = self.next_line();
                    let element = self.file.append_child(array, NodeKind::ArrayOfTablesElement, line);
                    self.encode_table(element, &child_parts, entries)?;
                    self.stub_if_empty(element);
                }
            }
            Encoded::Array(items) => {
                if items.iter().any(Encoded::is_table) {
                    return Err(Error::unsupported(INLINE_IN_ARRAY));
                }
                let value = Encoded::Array(items).into_value()?;
                let line = self.next_line();
                self.file
                    .append_child(parent, NodeKind::key_value(Key::from_name(name, line), value), line);
            }
        }
        Ok(())
    }

    /// Everything below an inline table stays inline and on the same line.
    fn encode_inline(&mut self, parent: NodeId, entries: Vec<(String, Encoded)>, line: usize) -> Result<()> {
        for (name, value) in entries {
            let key = Key::from_name(&name, line);
            match value {
                Encoded::Value(TomlValue::Null) if self.config.ignore_null_values => {}
                Encoded::Value(value) => {
                    self.file.append_child(parent, NodeKind::key_value(key, value), line);
                }
                Encoded::Table(entries) | Encoded::Inline(entries) => {
                    let table = self.file.append_child(parent, NodeKind::InlineTable(key), line);
                    self.encode_inline(table, entries, line)?;
                }
                array @ Encoded::Array(_) => {
                    let value = array.into_value()?;
                    self.file.append_child(parent, NodeKind::key_value(key, value), line);
                }
            }
        }
        self.stub_if_empty(parent);
        Ok(())
    }

    fn stub_if_empty(&mut self, id: NodeId) {
        if self.file.children(id).is_empty() {
            let line = self.file.line(id);
            self.file.append_child(id, NodeKind::StubEmpty, line);
        }
    }
}

/// Serializes any value into the intermediate [`Encoded`] form.
struct EncodedSerializer;

fn encode<T: ?Sized + Serialize>(value: &T) -> Result<Encoded> {
    value.serialize(EncodedSerializer)
}

fn integer<N>(value: N) -> Result<Encoded>
where
    N: Copy + std::fmt::Display,
    i64: TryFrom<N>,
{
    i64::try_from(value)
        .map(|i| Encoded::Value(TomlValue::Integer(i)))
        .map_err(|_| Error::unsupported(format!("the integer {value} does not fit into a TOML integer (i64)")))
}

impl ser::Serializer for EncodedSerializer {
    type Ok = Encoded;
    type Error = Error;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = SerializeVec;
    type SerializeMap = SerializeTable;
    type SerializeStruct = SerializeTable;
    type SerializeStructVariant = SerializeTable;

    fn serialize_bool(self, v: bool) -> Result<Encoded> {
        Ok(Encoded::Value(TomlValue::Boolean(v)))
    }

    fn serialize_i8(self, v: i8) -> Result<Encoded> {
        integer(v)
    }

    fn serialize_i16(self, v: i16) -> Result<Encoded> {
        integer(v)
    }

    fn serialize_i32(self, v: i32) -> Result<Encoded> {
        integer(v)
    }

    fn serialize_i64(self, v: i64) -> Result<Encoded> {
        integer(v)
    }

    fn serialize_i128(self, v: i128) -> Result<Encoded> {
        integer(v)
    }

    fn serialize_u8(self, v: u8) -> Result<Encoded> {
        integer(v)
    }

    fn serialize_u16(self, v: u16) -> Result<Encoded> {
        integer(v)
    }

    fn serialize_u32(self, v: u32) -> Result<Encoded> {
        integer(v)
    }

    fn serialize_u64(self, v: u64) -> Result<Encoded> {
        integer(v)
    }

    fn serialize_u128(self, v: u128) -> Result<Encoded> {
        integer(v)
    }

    fn serialize_f32(self, v: f32) -> Result<Encoded> {
        Ok(Encoded::Value(TomlValue::Float(f64::from(v))))
    }

    fn serialize_f64(self, v: f64) -> Result<Encoded> {
        Ok(Encoded::Value(TomlValue::Float(v)))
    }

    fn serialize_char(self, v: char) -> Result<Encoded> {
        Ok(Encoded::Value(TomlValue::BasicString(v.to_string())))
    }

    fn serialize_str(self, v: &str) -> Result<Encoded> {
        Ok(Encoded::Value(TomlValue::BasicString(v.to_string())))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Encoded> {
        let items = v
            .iter()
            .map(|&b| Encoded::Value(TomlValue::Integer(i64::from(b))))
            .collect();
        Ok(Encoded::Array(items))
    }

    fn serialize_none(self) -> Result<Encoded> {
        Ok(Encoded::Value(TomlValue::Null))
    }

    fn serialize_some<T>(self, value: &T) -> Result<Encoded>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Encoded> {
        Ok(Encoded::Value(TomlValue::Null))
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Encoded> {
        Ok(Encoded::Value(TomlValue::Null))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Encoded> {
        Ok(Encoded::Value(TomlValue::BasicString(variant.to_string())))
    }

    fn serialize_newtype_struct<T>(self, name: &'static str, value: &T) -> Result<Encoded>
    where
        T: ?Sized + Serialize,
    {
        match value.serialize(self)? {
            Encoded::Table(entries) if name == INLINE_TOKEN => Ok(Encoded::Inline(entries)),
            other => Ok(other),
        }
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Encoded>
    where
        T: ?Sized + Serialize,
    {
        Ok(Encoded::Table(vec![(variant.to_string(), encode(value)?)]))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec> {
        Ok(SerializeVec::new(None, len.unwrap_or(0)))
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(None, len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(None, len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeVec> {
        Ok(SerializeVec::new(Some(variant), len))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<SerializeTable> {
        Ok(SerializeTable::new(None))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<SerializeTable> {
        Ok(SerializeTable::new(None))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<SerializeTable> {
        Ok(SerializeTable::new(Some(variant)))
    }
}

/// Collects sequence items; tuple variants are wrapped as `{ variant = [...] }`.
struct SerializeVec {
    variant: Option<&'static str>,
    items: Vec<Encoded>,
}

impl SerializeVec {
    fn new(variant: Option<&'static str>, capacity: usize) -> Self {
        SerializeVec {
            variant,
            items: Vec::with_capacity(capacity),
        }
    }

    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.items.push(encode(value)?);
        Ok(())
    }

    fn finish(self) -> Encoded {
        let array = Encoded::Array(self.items);
        match self.variant {
            Some(variant) => Encoded::Table(vec![(variant.to_string(), array)]),
            None => array,
        }
    }
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = Encoded;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Encoded> {
        Ok(self.finish())
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = Encoded;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Encoded> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = Encoded;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Encoded> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleVariant for SerializeVec {
    type Ok = Encoded;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Encoded> {
        Ok(self.finish())
    }
}

/// Collects struct fields and map entries in insertion order.
struct SerializeTable {
    variant: Option<&'static str>,
    entries: Vec<(String, Encoded)>,
    current_key: Option<String>,
}

impl SerializeTable {
    fn new(variant: Option<&'static str>) -> Self {
        SerializeTable {
            variant,
            entries: Vec::new(),
            current_key: None,
        }
    }

    fn finish(self) -> Encoded {
        let table = Encoded::Table(self.entries);
        match self.variant {
            Some(variant) => Encoded::Table(vec![(variant.to_string(), table)]),
            None => table,
        }
    }
}

impl ser::SerializeMap for SerializeTable {
    type Ok = Encoded;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let name = match encode(key)? {
            Encoded::Value(TomlValue::BasicString(s)) => s,
            Encoded::Value(value @ (TomlValue::Integer(_) | TomlValue::Boolean(_))) => value.to_string(),
            _ => return Err(Error::custom("TOML keys must be strings, integers or booleans")),
        };
        self.current_key = Some(name);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        self.entries.push((key, encode(value)?));
        Ok(())
    }

    fn end(self) -> Result<Encoded> {
        Ok(self.finish())
    }
}

impl ser::SerializeStruct for SerializeTable {
    type Ok = Encoded;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.entries.push((key.to_string(), encode(value)?));
        Ok(())
    }

    fn end(self) -> Result<Encoded> {
        Ok(self.finish())
    }
}

impl ser::SerializeStructVariant for SerializeTable {
    type Ok = Encoded;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.entries.push((key.to_string(), encode(value)?));
        Ok(())
    }

    fn end(self) -> Result<Encoded> {
        Ok(self.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    struct Item {
        id: i64,
    }

    #[derive(Serialize)]
    struct Doc {
        name: Option<String>,
        tags: Vec<&'static str>,
        items: Vec<Item>,
        nested: BTreeMap<String, BTreeMap<String, u8>>,
    }

    fn doc() -> Doc {
        let mut inner = BTreeMap::new();
        inner.insert("level".to_string(), 3);
        let mut nested = BTreeMap::new();
        nested.insert("deep".to_string(), inner);
        Doc {
            name: None,
            tags: vec!["a", "b"],
            items: vec![Item { id: 1 }, Item { id: 2 }],
            nested,
        }
    }

    #[test]
    fn test_tree_shape() {
        let file = to_tree(&doc(), &TomlOutputConfig::default()).unwrap();
        let root = file.children(file.root()).to_vec();
        assert_eq!(root.len(), 4);
        assert!(matches!(
            file.kind(root[0]),
            NodeKind::KeyValuePrimitive(kv) if kv.value.is_null()
        ));
        assert!(matches!(file.kind(root[1]), NodeKind::KeyValueArray(_)));
        assert!(matches!(file.kind(root[2]), NodeKind::ArrayOfTables(_)));
        assert_eq!(file.children(root[2]).len(), 2);

        let deep = file.children(root[3])[0];
        match file.kind(deep) {
            NodeKind::Table(table) => assert_eq!(table.full_name(), "nested.deep"),
            other => panic!("unexpected node: {other:?}"),
        }
    }

    #[test]
    fn test_ignore_null_values() {
        let config = TomlOutputConfig::new().with_ignore_null_values(true);
        let file = to_tree(&doc(), &config).unwrap();
        assert_eq!(file.children(file.root()).len(), 3);
    }

    #[test]
    fn test_root_must_be_a_table() {
        assert!(matches!(
            to_tree(&42, &TomlOutputConfig::default()),
            Err(Error::UnsupportedFeature(_))
        ));
    }

    #[test]
    fn test_inline_tables_in_arrays_are_unsupported() {
        #[derive(Serialize)]
        struct Holder {
            points: Vec<Inline<Item>>,
        }

        let holder = Holder {
            points: vec![Inline(Item { id: 1 })],
        };
        assert_eq!(
            to_tree(&holder, &TomlOutputConfig::default()).unwrap_err(),
            Error::UnsupportedFeature(INLINE_IN_ARRAY.to_string())
        );
    }

    #[test]
    fn test_large_unsigned_is_rejected() {
        let mut map = BTreeMap::new();
        map.insert("big", u64::MAX);
        assert!(to_tree(&map, &TomlOutputConfig::default()).is_err());
    }

    #[test]
    fn test_empty_struct_gets_stub() {
        #[derive(Serialize)]
        struct Empty {}

        #[derive(Serialize)]
        struct Outer {
            empty: Empty,
        }

        let file = to_tree(&Outer { empty: Empty {} }, &TomlOutputConfig::default()).unwrap();
        let empty = file.children(file.root())[0];
        assert!(matches!(file.kind(file.children(empty)[0]), NodeKind::StubEmpty));
    }
}
