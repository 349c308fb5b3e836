//! Decoding a [`TomlFile`] into Rust values.
//!
//! This module provides the [`Deserializer`] that walks a parsed tree and
//! drives serde's `Deserialize` implementations. The derive output plays the
//! role of a structure descriptor: field names arrive through
//! `deserialize_struct`, enum members through `deserialize_enum`, and
//! nullability through `deserialize_option`.
//!
//! ## Overview
//!
//! - **Tables** (primitive, inline, array-of-tables elements and the root)
//!   decode as maps, visiting their children in document order
//! - **Unknown keys** fail with [`Error::UnknownName`] unless
//!   `ignore_unknown_names` is set
//! - **Null** only decodes into `Option` (or unit); anything else fails with
//!   [`Error::NonNullableValue`]
//! - **Integers** narrower than `i64` are range-checked, otherwise
//!   [`Error::IllegalType`]
//!
//! ## Usage
//!
//! Most users should use the high-level functions in the crate root:
//!
//! ```rust
//! use serde_toml_tree::from_str;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Data { x: i32, y: Option<String> }
//!
//! let data: Data = from_str("x = 1\ny = null").unwrap();
//! assert_eq!(data, Data { x: 1, y: None });
//! ```
//!
//! Working with the tree directly:
//!
//! ```rust
//! use serde_toml_tree::{parse_str, Deserializer, TomlConfig};
//! use serde::Deserialize;
//! use std::collections::BTreeMap;
//!
//! let file = parse_str("[a]\nx = 1\n[b]\nx = 2").unwrap();
//! let config = TomlConfig::default();
//! let tables = BTreeMap::<String, BTreeMap<String, i64>>::deserialize(
//!     Deserializer::new(&file, &config),
//! ).unwrap();
//! assert_eq!(tables["b"]["x"], 2);
//! ```

use crate::config::TomlConfig;
use crate::tree::{NodeId, NodeKind, TomlFile};
use crate::value::TomlValue;
use crate::{Error, Result};
use serde::de::{self, IntoDeserializer};

/// Deserializes Rust values out of one table scope of a [`TomlFile`].
///
/// Created at the root via [`Deserializer::new`]; nested tables get a
/// deserializer of their own scoped to that subtree.
pub struct Deserializer<'a> {
    file: &'a TomlFile,
    config: &'a TomlConfig,
    node: NodeId,
}

impl<'a> Deserializer<'a> {
    /// Creates a deserializer for the root of `file`.
    #[must_use]
    pub fn new(file: &'a TomlFile, config: &'a TomlConfig) -> Self {
        Deserializer {
            file,
            config,
            node: file.root(),
        }
    }

    fn scoped(&self, node: NodeId) -> Self {
        Deserializer {
            file: self.file,
            config: self.config,
            node,
        }
    }

    fn mismatch(&self, requested: &str) -> Error {
        Error::cast(
            self.file.line(self.node),
            self.file.name(self.node),
            format!("[{}]", self.file.scope_name(self.node)),
            requested,
        )
    }

    /// Feeds the child node to `seed` with the deserializer matching its kind.
    fn deserialize_child<'de, T>(&self, child: NodeId, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.file.kind(child) {
            NodeKind::KeyValuePrimitive(kv) | NodeKind::KeyValueArray(kv) => seed.deserialize(
                ValueDeserializer::new(&kv.value, kv.key.name(), self.file.line(child)),
            ),
            NodeKind::Table(_) | NodeKind::InlineTable(_) | NodeKind::ArrayOfTablesElement => {
                seed.deserialize(self.scoped(child))
            }
            NodeKind::ArrayOfTables(_) => seed.deserialize(ArrayOfTablesDeserializer {
                de: self.scoped(child),
            }),
            NodeKind::File | NodeKind::StubEmpty => Err(Error::internal_decoding(format!(
                "node <{}> at line {} cannot be decoded as a value",
                self.file.name(child),
                self.file.line(child)
            ))),
        }
    }
}

macro_rules! reject_table {
    ($($method:ident => $requested:literal),* $(,)?) => {$(
        fn $method<V>(self, _visitor: V) -> Result<V::Value>
        where
            V: de::Visitor<'de>,
        {
            Err(self.mismatch($requested))
        }
    )*};
}

impl<'de, 'a> de::Deserializer<'de> for Deserializer<'a> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_map(TableAccess::new(self, None))
    }

    reject_table! {
        deserialize_bool => "bool",
        deserialize_i8 => "i8",
        deserialize_i16 => "i16",
        deserialize_i32 => "i32",
        deserialize_i64 => "i64",
        deserialize_i128 => "i128",
        deserialize_u8 => "u8",
        deserialize_u16 => "u16",
        deserialize_u32 => "u32",
        deserialize_u64 => "u64",
        deserialize_u128 => "u128",
        deserialize_f32 => "f32",
        deserialize_f64 => "f64",
        deserialize_char => "char",
        deserialize_str => "String",
        deserialize_string => "String",
        deserialize_bytes => "bytes",
        deserialize_byte_buf => "bytes",
        deserialize_seq => "Array",
        deserialize_identifier => "String",
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_tuple<V>(self, _len: usize, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(self.mismatch("Array"))
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        _visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(self.mismatch("Array"))
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_map(TableAccess::new(self, None))
    }

    fn deserialize_struct<V>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor
            .visit_map(TableAccess::new(self, Some(fields)))
            .map_err(|e| e.in_struct(name))
    }

    /// A table holding exactly one key decodes as the variant of that name.
    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let file = self.file;
        let mut children = file.real_children(self.node);
        let only_child = match (children.next(), children.next()) {
            (Some(child), None) => Some(child),
            _ => None,
        };
        match only_child {
            Some(child) => visitor.visit_enum(TableEnumAccess { de: self, child }),
            None => Err(self.mismatch("enum")),
        }
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }
}

/// Visits the children of one table scope as map entries.
struct TableAccess<'a> {
    de: Deserializer<'a>,
    children: Vec<NodeId>,
    index: usize,
    fields: Option<&'static [&'static str]>,
    pending: Option<NodeId>,
}

impl<'a> TableAccess<'a> {
    fn new(de: Deserializer<'a>, fields: Option<&'static [&'static str]>) -> Self {
        let children = de.file.real_children(de.node).collect();
        TableAccess {
            de,
            children,
            index: 0,
            fields,
            pending: None,
        }
    }
}

impl<'de, 'a> de::MapAccess<'de> for TableAccess<'a> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        let file = self.de.file;
        while let Some(&child) = self.children.get(self.index) {
            self.index += 1;
            let name = file.name(child);

            if let Some(fields) = self.fields {
                if !fields.contains(&name) {
                    if self.de.config.ignore_unknown_names {
                        continue;
                    }
                    return Err(Error::unknown_name(
                        name,
                        &file.scope_name(self.de.node),
                        file.line(child),
                    ));
                }
            }

            self.pending = Some(child);
            return seed.deserialize(name.into_deserializer()).map(Some);
        }
        Ok(None)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.pending.take() {
            Some(child) => self.de.deserialize_child(child, seed),
            None => Err(Error::internal_decoding(
                "next_value_seed called before next_key_seed",
            )),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.children.len() - self.index)
    }
}

/// `[[name]]` sections decode as a sequence of their elements.
struct ArrayOfTablesDeserializer<'a> {
    de: Deserializer<'a>,
}

impl<'de, 'a> de::Deserializer<'de> for ArrayOfTablesDeserializer<'a> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let elements = self.de.file.children(self.de.node).to_vec();
        visitor.visit_seq(ElementsAccess {
            de: self.de,
            elements: elements.into_iter(),
        })
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_map<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(self.de.mismatch("table"))
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(self.de.mismatch("table"))
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct enum identifier
    }
}

struct ElementsAccess<'a> {
    de: Deserializer<'a>,
    elements: std::vec::IntoIter<NodeId>,
}

impl<'de, 'a> de::SeqAccess<'de> for ElementsAccess<'a> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.elements.next() {
            Some(element) => seed.deserialize(self.de.scoped(element)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.elements.len())
    }
}

struct TableEnumAccess<'a> {
    de: Deserializer<'a>,
    child: NodeId,
}

impl<'de, 'a> de::EnumAccess<'de> for TableEnumAccess<'a> {
    type Error = Error;
    type Variant = Self;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let name = self.de.file.name(self.child);
        let variant = seed.deserialize(name.into_deserializer())?;
        Ok((variant, self))
    }
}

impl<'de, 'a> de::VariantAccess<'de> for TableEnumAccess<'a> {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        Ok(())
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        self.de.deserialize_child(self.child, seed)
    }

    fn tuple_variant<V>(self, len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.de.file.kind(self.child) {
            NodeKind::KeyValueArray(kv) => de::Deserializer::deserialize_tuple(
                ValueDeserializer::new(&kv.value, kv.key.name(), self.de.file.line(self.child)),
                len,
                visitor,
            ),
            _ => Err(self.de.scoped(self.child).mismatch("Array")),
        }
    }

    fn struct_variant<V>(self, fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.de.file.kind(self.child) {
            NodeKind::Table(_) | NodeKind::InlineTable(_) => {
                visitor.visit_map(TableAccess::new(self.de.scoped(self.child), Some(fields)))
            }
            _ => Err(Error::cast(
                self.de.file.line(self.child),
                self.de.file.name(self.child),
                "<value>",
                "table",
            )),
        }
    }
}

/// Deserializes one leaf value; `key` and `line` are kept for error messages.
struct ValueDeserializer<'a> {
    value: &'a TomlValue,
    key: &'a str,
    line: usize,
}

impl<'a> ValueDeserializer<'a> {
    fn new(value: &'a TomlValue, key: &'a str, line: usize) -> Self {
        ValueDeserializer { value, key, line }
    }

    fn reject_null(&self) -> Result<()> {
        if self.value.is_null() {
            Err(Error::non_nullable(self.key, self.line))
        } else {
            Ok(())
        }
    }

    fn cast(&self, requested: &str) -> Error {
        Error::cast(self.line, self.key, self.value, requested)
    }

    fn illegal(&self, requested: &str, required: &str) -> Error {
        Error::illegal_type(self.line, self.key, self.value, requested, required)
    }
}

macro_rules! narrow_integer {
    ($($method:ident => $visit:ident: $ty:ty),* $(,)?) => {$(
        fn $method<V>(self, visitor: V) -> Result<V::Value>
        where
            V: de::Visitor<'de>,
        {
            self.reject_null()?;
            match self.value {
                TomlValue::Integer(i) => match <$ty>::try_from(*i) {
                    Ok(n) => visitor.$visit(n),
                    Err(_) => Err(self.illegal(stringify!($ty), "i64")),
                },
                _ => Err(self.illegal(stringify!($ty), "i64")),
            }
        }
    )*};
}

impl<'de, 'a> de::Deserializer<'de> for ValueDeserializer<'a> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            TomlValue::Null => visitor.visit_unit(),
            TomlValue::Boolean(b) => visitor.visit_bool(*b),
            TomlValue::Integer(i) => visitor.visit_i64(*i),
            TomlValue::Float(f) => visitor.visit_f64(*f),
            TomlValue::BasicString(s) | TomlValue::LiteralString(s) => visitor.visit_str(s),
            TomlValue::Array(values) => visitor.visit_seq(ArrayAccess::new(values, self.key, self.line)),
            datetime => match datetime.datetime_string() {
                Some(text) => visitor.visit_string(text),
                None => Err(Error::internal_decoding(format!(
                    "unexpected value <{datetime}> for the key <{}>",
                    self.key
                ))),
            },
        }
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.reject_null()?;
        match self.value {
            TomlValue::Boolean(b) => visitor.visit_bool(*b),
            _ => Err(self.cast("bool")),
        }
    }

    narrow_integer! {
        deserialize_i8 => visit_i8: i8,
        deserialize_i16 => visit_i16: i16,
        deserialize_i32 => visit_i32: i32,
        deserialize_u8 => visit_u8: u8,
        deserialize_u16 => visit_u16: u16,
        deserialize_u32 => visit_u32: u32,
        deserialize_u64 => visit_u64: u64,
    }

    fn deserialize_i64<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.reject_null()?;
        match self.value {
            TomlValue::Integer(i) => visitor.visit_i64(*i),
            _ => Err(self.cast("i64")),
        }
    }

    fn deserialize_i128<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.reject_null()?;
        match self.value {
            TomlValue::Integer(i) => visitor.visit_i128(i128::from(*i)),
            _ => Err(self.cast("i128")),
        }
    }

    fn deserialize_u128<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.reject_null()?;
        match self.value {
            TomlValue::Integer(i) => match u128::try_from(*i) {
                Ok(n) => visitor.visit_u128(n),
                Err(_) => Err(self.illegal("u128", "i64")),
            },
            _ => Err(self.cast("u128")),
        }
    }

    fn deserialize_f32<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.reject_null()?;
        match self.value {
            TomlValue::Float(f) => visitor.visit_f32(*f as f32),
            _ => Err(self.illegal("f32", "f64")),
        }
    }

    fn deserialize_f64<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.reject_null()?;
        match self.value {
            TomlValue::Float(f) => visitor.visit_f64(*f),
            _ => Err(self.cast("f64")),
        }
    }

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.reject_null()?;
        let mut chars = self.value.as_str().unwrap_or_default().chars();
        match (self.value.is_string(), chars.next(), chars.next()) {
            (true, Some(ch), None) => visitor.visit_char(ch),
            _ => Err(self.illegal("char", "String")),
        }
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.reject_null()?;
        match self.value {
            TomlValue::BasicString(s) | TomlValue::LiteralString(s) => visitor.visit_str(s),
            other => match other.datetime_string() {
                Some(text) => visitor.visit_string(text),
                None => Err(self.cast("String")),
            },
        }
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.reject_null()?;
        match self.value {
            TomlValue::BasicString(s) | TomlValue::LiteralString(s) => visitor.visit_bytes(s.as_bytes()),
            TomlValue::Array(values) => visitor.visit_seq(ArrayAccess::new(values, self.key, self.line)),
            _ => Err(self.cast("bytes")),
        }
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if self.value.is_null() {
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            TomlValue::Null => visitor.visit_unit(),
            _ => Err(self.cast("unit")),
        }
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.reject_null()?;
        match self.value {
            TomlValue::Array(values) => visitor.visit_seq(ArrayAccess::new(values, self.key, self.line)),
            _ => Err(self.cast("Array")),
        }
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.reject_null()?;
        Err(self.cast("table"))
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    /// Unit variants are written as their name.
    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.reject_null()?;
        match self.value.as_str() {
            Some(name) if variants.contains(&name) => visitor.visit_enum(name.into_deserializer()),
            Some(name) => Err(Error::invalid_enum_value(name, variants, self.line)),
            None => Err(self.cast("enum")),
        }
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }
}

struct ArrayAccess<'a> {
    iter: std::slice::Iter<'a, TomlValue>,
    key: &'a str,
    line: usize,
}

impl<'a> ArrayAccess<'a> {
    fn new(values: &'a [TomlValue], key: &'a str, line: usize) -> Self {
        ArrayAccess {
            iter: values.iter(),
            key,
            line,
        }
    }
}

impl<'de, 'a> de::SeqAccess<'de> for ArrayAccess<'a> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed
                .deserialize(ValueDeserializer::new(value, self.key, self.line))
                .map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

#[cfg(test)]
mod tests {
    use crate::{from_str, from_str_with_config, Error, TomlConfig};
    use serde::Deserialize;
    use std::collections::BTreeMap;

    #[derive(Deserialize, Debug, PartialEq)]
    struct Server {
        host: String,
        port: u16,
    }

    #[derive(Deserialize, Debug, PartialEq)]
    struct Config {
        name: String,
        server: Server,
    }

    #[test]
    fn test_nested_struct() {
        let config: Config =
            from_str("name = \"app\"\n[server]\nhost = 'localhost'\nport = 8080").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "localhost");
    }

    #[test]
    fn test_unknown_name() {
        let err = from_str::<Server>("host = \"h\"\nport = 1\nz = 1").unwrap_err();
        assert_eq!(
            err,
            Error::UnknownName {
                key: "z".to_string(),
                table: "rootNode".to_string(),
                line: 3,
            }
        );

        let config = TomlConfig::new().with_ignore_unknown_names(true);
        let server: Server = from_str_with_config("host = \"h\"\nz = 1\nport = 1", &config).unwrap();
        assert_eq!(server.port, 1);
    }

    #[test]
    fn test_unknown_name_reports_enclosing_table() {
        let err = from_str::<Config>("name = \"a\"\n[server]\nhost = \"h\"\nport = 1\nextra = 2")
            .unwrap_err();
        assert!(matches!(err, Error::UnknownName { ref table, line: 5, .. } if table == "server"));
    }

    #[test]
    fn test_null_into_non_nullable_field() {
        let err = from_str::<Server>("host = null\nport = 1").unwrap_err();
        assert_eq!(err, Error::non_nullable("host", 1));
    }

    #[test]
    fn test_missing_required_field_names_the_type() {
        let err = from_str::<Config>("name = \"a\"\n[server]\nhost = \"h\"").unwrap_err();
        assert_eq!(
            err,
            Error::MissingRequiredField {
                field: "port".to_string(),
                type_name: "Server".to_string(),
            }
        );
    }

    #[test]
    fn test_first_failure_in_document_order_wins() {
        // children are checked as they are visited, missing fields only once the table is done
        assert_eq!(
            from_str::<Server>("host = null").unwrap_err(),
            Error::non_nullable("host", 1)
        );
        assert!(matches!(
            from_str::<Server>("z = 1").unwrap_err(),
            Error::UnknownName { ref key, line: 1, .. } if key == "z"
        ));
        assert_eq!(
            from_str::<Server>("host = \"h\"").unwrap_err(),
            Error::MissingRequiredField {
                field: "port".to_string(),
                type_name: "Server".to_string(),
            }
        );
    }

    #[test]
    fn test_integer_narrowing() {
        #[derive(Deserialize, Debug)]
        struct Small {
            #[allow(dead_code)]
            b: u8,
        }

        assert!(from_str::<Small>("b = 255").is_ok());
        assert!(matches!(
            from_str::<Small>("b = 256").unwrap_err(),
            Error::IllegalType { ref requested, ref required, .. } if requested == "u8" && required == "i64"
        ));
        assert!(matches!(
            from_str::<Small>("b = 1.5").unwrap_err(),
            Error::IllegalType { .. }
        ));
    }

    #[test]
    fn test_cast_errors() {
        #[derive(Deserialize, Debug)]
        struct Typed {
            #[allow(dead_code)]
            v: i64,
        }

        let err = from_str::<Typed>("v = \"1\"").unwrap_err();
        assert!(matches!(err, Error::Cast { line: 1, ref requested, .. } if requested == "i64"));
        assert!(matches!(from_str::<Typed>("v = 1.0").unwrap_err(), Error::Cast { .. }));
    }

    #[test]
    fn test_enum_members() {
        #[derive(Deserialize, Debug, PartialEq)]
        enum Color {
            Red,
            Green,
            Blue,
        }

        #[derive(Deserialize, Debug, PartialEq)]
        struct Paint {
            color: Color,
        }

        let paint: Paint = from_str("color = \"Green\"").unwrap();
        assert_eq!(paint.color, Color::Green);

        match from_str::<Paint>("color = \"Purple\"").unwrap_err() {
            Error::InvalidEnumValue { value, choices, line } => {
                assert_eq!(value, "Purple");
                assert_eq!(choices, "Blue, Green, Red");
                assert_eq!(line, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_data_enum_from_single_key_table() {
        #[derive(Deserialize, Debug, PartialEq)]
        enum Shape {
            Circle { r: f64 },
            Square(i64),
        }

        #[derive(Deserialize, Debug, PartialEq)]
        struct Drawing {
            a: Shape,
            b: Shape,
        }

        let drawing: Drawing = from_str("[a.Circle]\nr = 1.5\n[b]\nSquare = 2").unwrap();
        assert_eq!(drawing.a, Shape::Circle { r: 1.5 });
        assert_eq!(drawing.b, Shape::Square(2));

        let inline: Drawing = from_str("a = { Circle = { r = 0.5 } }\nb = { Square = 3 }").unwrap();
        assert_eq!(inline.a, Shape::Circle { r: 0.5 });
        assert_eq!(inline.b, Shape::Square(3));

        let err = from_str::<Drawing>("[a.Circle]\nr = 1.5\nd = 2\n[b]\nSquare = 2").unwrap_err();
        assert!(matches!(err, Error::UnknownName { ref key, line: 3, .. } if key == "d"));
    }

    #[test]
    fn test_array_of_tables_and_maps() {
        #[derive(Deserialize, Debug, PartialEq)]
        struct Product {
            name: String,
            sku: Option<i64>,
        }

        #[derive(Deserialize, Debug, PartialEq)]
        struct Store {
            products: Vec<Product>,
            prices: BTreeMap<String, f64>,
        }

        let store: Store = from_str(
            "[[products]]\nname = \"Hammer\"\nsku = 738594937\n\n[[products]]\nname = \"Nail\"\n\n[prices]\nhammer = 9.5\nnail = 0.25",
        )
        .unwrap();
        assert_eq!(store.products.len(), 2);
        assert_eq!(store.products[1], Product { name: "Nail".to_string(), sku: None });
        assert_eq!(store.prices["nail"], 0.25);
    }

    #[test]
    fn test_inline_table_and_nested_arrays() {
        #[derive(Deserialize, Debug, PartialEq)]
        struct Point {
            x: i64,
            y: i64,
        }

        #[derive(Deserialize, Debug, PartialEq)]
        struct Shape {
            origin: Point,
            matrix: Vec<Vec<i32>>,
            tag: char,
        }

        let shape: Shape =
            from_str("origin = { x = 1, y = -2 }\nmatrix = [[1, 2], [3]]\ntag = 'x'").unwrap();
        assert_eq!(shape.origin, Point { x: 1, y: -2 });
        assert_eq!(shape.matrix, vec![vec![1, 2], vec![3]]);
        assert_eq!(shape.tag, 'x');
    }

    #[test]
    fn test_dates_decode_as_strings() {
        #[derive(Deserialize, Debug)]
        struct Event {
            at: chrono::DateTime<chrono::FixedOffset>,
            day: String,
        }

        let event: Event = from_str("at = 1979-05-27T07:32:00-08:00\nday = 1979-05-27").unwrap();
        assert_eq!(event.at.to_rfc3339(), "1979-05-27T07:32:00-08:00");
        assert_eq!(event.day, "1979-05-27");
    }
}
