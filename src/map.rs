//! Untyped document model.
//!
//! [`Item`] and [`TomlMap`] decode any document without a typed target and
//! encode back through the same tree. [`TomlMap`] wraps an [`IndexMap`] so
//! keys come back out in document order.
//!
//! ## Examples
//!
//! ```rust
//! use serde_toml_tree::{from_str, Item, TomlMap};
//!
//! let doc: TomlMap = from_str("title = 'x'\n[owner]\nname = 'Tom'").unwrap();
//! let keys: Vec<_> = doc.keys().cloned().collect();
//! assert_eq!(keys, vec!["title", "owner"]);
//! assert_eq!(
//!     doc.get("owner").and_then(|o| o.get("name")).and_then(Item::as_str),
//!     Some("Tom")
//! );
//! ```

use indexmap::IndexMap;
use serde::de::{self, Deserialize, Deserializer, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::collections::HashMap;
use std::fmt;

/// Any decoded TOML value.
///
/// Date/time values arrive as RFC 3339 strings.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Item {
    #[default]
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Array(Vec<Item>),
    Table(TomlMap),
}

impl Item {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Item::Null)
    }

    #[must_use]
    pub fn is_table(&self) -> bool {
        matches!(self, Item::Table(_))
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Item::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Item::Integer(i) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Item::Float(f) => Some(*f),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Item::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&[Item]> {
        match self {
            Item::Array(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_table(&self) -> Option<&TomlMap> {
        match self {
            Item::Table(map) => Some(map),
            _ => None,
        }
    }

    /// Looks up `key` when this item is a table.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Item> {
        self.as_table().and_then(|map| map.get(key))
    }
}

impl From<bool> for Item {
    fn from(b: bool) -> Self {
        Item::Boolean(b)
    }
}

impl From<i64> for Item {
    fn from(i: i64) -> Self {
        Item::Integer(i)
    }
}

impl From<i32> for Item {
    fn from(i: i32) -> Self {
        Item::Integer(i64::from(i))
    }
}

impl From<f64> for Item {
    fn from(f: f64) -> Self {
        Item::Float(f)
    }
}

impl From<&str> for Item {
    fn from(s: &str) -> Self {
        Item::String(s.to_string())
    }
}

impl From<String> for Item {
    fn from(s: String) -> Self {
        Item::String(s)
    }
}

impl<T: Into<Item>> From<Vec<T>> for Item {
    fn from(items: Vec<T>) -> Self {
        Item::Array(items.into_iter().map(Into::into).collect())
    }
}

impl From<TomlMap> for Item {
    fn from(map: TomlMap) -> Self {
        Item::Table(map)
    }
}

impl Serialize for Item {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Item::Null => serializer.serialize_unit(),
            Item::Boolean(b) => serializer.serialize_bool(*b),
            Item::Integer(i) => serializer.serialize_i64(*i),
            Item::Float(f) => serializer.serialize_f64(*f),
            Item::String(s) => serializer.serialize_str(s),
            Item::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Item::Table(map) => map.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Item {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ItemVisitor;

        impl<'de> Visitor<'de> for ItemVisitor {
            type Value = Item;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any valid TOML value")
            }

            fn visit_bool<E>(self, value: bool) -> Result<Item, E> {
                Ok(Item::Boolean(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Item, E> {
                Ok(Item::Integer(value))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Item, E> {
                i64::try_from(value)
                    .map(Item::Integer)
                    .map_err(|_| E::custom(format!("integer {value} does not fit in i64")))
            }

            fn visit_f64<E>(self, value: f64) -> Result<Item, E> {
                Ok(Item::Float(value))
            }

            fn visit_str<E>(self, value: &str) -> Result<Item, E> {
                Ok(Item::String(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> Result<Item, E> {
                Ok(Item::String(value))
            }

            fn visit_unit<E>(self) -> Result<Item, E> {
                Ok(Item::Null)
            }

            fn visit_none<E>(self) -> Result<Item, E> {
                Ok(Item::Null)
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Item, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Item, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(item) = seq.next_element()? {
                    items.push(item);
                }
                Ok(Item::Array(items))
            }

            fn visit_map<A>(self, map: A) -> Result<Item, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                TomlMapVisitor.visit_map(map).map(Item::Table)
            }
        }

        deserializer.deserialize_any(ItemVisitor)
    }
}

/// Insertion-ordered table of [`Item`]s.
///
/// ```rust
/// use serde_toml_tree::{to_string, Item, TomlMap};
///
/// let mut map = TomlMap::new();
/// map.insert("b".to_string(), Item::from(1));
/// map.insert("a".to_string(), Item::from("x"));
/// assert_eq!(to_string(&map).unwrap(), "b = 1\na = \"x\"\n");
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TomlMap(IndexMap<String, Item>);

impl TomlMap {
    #[must_use]
    pub fn new() -> Self {
        TomlMap(IndexMap::new())
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        TomlMap(IndexMap::with_capacity(capacity))
    }

    /// Inserts a pair, returning the previous item under `key`.
    pub fn insert(&mut self, key: String, item: Item) -> Option<Item> {
        self.0.insert(key, item)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Item> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Item> {
        self.0.get_mut(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Removes `key`, keeping the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Item> {
        self.0.shift_remove(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Item> {
        self.0.keys()
    }

    pub fn values(&self) -> indexmap::map::Values<'_, String, Item> {
        self.0.values()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Item> {
        self.0.iter()
    }
}

impl From<HashMap<String, Item>> for TomlMap {
    fn from(map: HashMap<String, Item>) -> Self {
        TomlMap(map.into_iter().collect())
    }
}

impl IntoIterator for TomlMap {
    type Item = (String, Item);
    type IntoIter = indexmap::map::IntoIter<String, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a TomlMap {
    type Item = (&'a String, &'a Item);
    type IntoIter = indexmap::map::Iter<'a, String, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, Item)> for TomlMap {
    fn from_iter<T: IntoIterator<Item = (String, Item)>>(iter: T) -> Self {
        TomlMap(IndexMap::from_iter(iter))
    }
}

impl Serialize for TomlMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, item) in &self.0 {
            map.serialize_entry(key, item)?;
        }
        map.end()
    }
}

struct TomlMapVisitor;

impl<'de> Visitor<'de> for TomlMapVisitor {
    type Value = TomlMap;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a TOML table")
    }

    fn visit_map<A>(self, mut access: A) -> Result<TomlMap, A::Error>
    where
        A: de::MapAccess<'de>,
    {
        let mut map = TomlMap::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, item)) = access.next_entry()? {
            map.insert(key, item);
        }
        Ok(map)
    }
}

impl<'de> Deserialize<'de> for TomlMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(TomlMapVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{from_str, to_string};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_decode_every_kind() {
        let doc: TomlMap = from_str(
            "n = null\nb = true\ni = -3\nf = 0.5\ns = 'x'\na = [1, 'two']\nd = 1979-05-27\n[t]\nk = 1",
        )
        .unwrap();
        assert!(doc.get("n").is_some_and(Item::is_null));
        assert_eq!(doc.get("b"), Some(&Item::Boolean(true)));
        assert_eq!(doc.get("i"), Some(&Item::Integer(-3)));
        assert_eq!(doc.get("f"), Some(&Item::Float(0.5)));
        assert_eq!(doc.get("s").and_then(Item::as_str), Some("x"));
        assert_eq!(
            doc.get("a"),
            Some(&Item::Array(vec![Item::Integer(1), Item::from("two")]))
        );
        assert_eq!(doc.get("d").and_then(Item::as_str), Some("1979-05-27"));
        assert_eq!(doc.get("t").and_then(|t| t.get("k")), Some(&Item::Integer(1)));
    }

    #[test]
    fn test_array_of_tables_decodes_to_array() {
        let doc: TomlMap = from_str("[[p]]\nx = 1\n[[p]]\nx = 2").unwrap();
        let items = doc.get("p").and_then(Item::as_array).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].get("x"), Some(&Item::Integer(2)));
    }

    #[test]
    fn test_round_trip_keeps_order() {
        let text = "z = 1\na = [ 1, 2 ]\n\n[m]\n    k = \"v\"\n";
        let doc: TomlMap = from_str(text).unwrap();
        assert_eq!(to_string(&doc).unwrap(), text);
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut map: TomlMap = vec![
            ("a".to_string(), Item::from(1)),
            ("b".to_string(), Item::from(2)),
            ("c".to_string(), Item::from(3)),
        ]
        .into_iter()
        .collect();
        assert_eq!(map.remove("b"), Some(Item::Integer(2)));
        assert_eq!(map.keys().cloned().collect::<Vec<_>>(), vec!["a", "c"]);
    }
}
