//! The TOML syntax tree.
//!
//! A [`TomlFile`] owns every node of one document in an arena; nodes refer to
//! each other through [`NodeId`] indices, so the parent link is a plain index
//! and never a second owner. The root is always [`TomlFile::root`].
//!
//! ## Node kinds
//!
//! - `File`: the root
//! - `Table`: a `[a.b]` section, possibly synthetic
//! - `ArrayOfTables` / `ArrayOfTablesElement`: a `[[a.b]]` section and one
//!   element per declaration
//! - `KeyValuePrimitive` / `KeyValueArray`: `key = value` leaves
//! - `InlineTable`: `key = { ... }`
//! - `StubEmpty`: the only child of an otherwise empty table
//!
//! ## Examples
//!
//! ```rust
//! use serde_toml_tree::{parse_str, NodeKind};
//!
//! let file = parse_str("[a]\nx = 1\n[a]\ny = 2").unwrap();
//! let tables = file.children(file.root());
//! assert_eq!(tables.len(), 1);
//! assert!(matches!(file.kind(tables[0]), NodeKind::Table(_)));
//! assert_eq!(file.children(tables[0]).len(), 2);
//! ```

use crate::key::{join_canonical, Key, KeyPart};
use crate::value::TomlValue;
use crate::{Error, Result};
use std::fmt::Write as _;
use tracing::debug;

/// Index of a node inside its [`TomlFile`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Header data of a `[table]` or `[[array of tables]]` section.
#[derive(Clone, Debug, PartialEq)]
pub struct TomlTable {
    key: Key,
    /// Canonical dotted names of every ancestor, ending with this table.
    tables_list: Vec<String>,
    is_synthetic: bool,
}

impl TomlTable {
    /// Builds a table from the text between the header brackets.
    ///
    /// # Errors
    ///
    /// [`Error::Parse`] for a blank name or an invalid key.
    pub fn from_header(content: &str, line: usize) -> Result<Self> {
        if content.trim().is_empty() {
            return Err(Error::parse(
                line,
                "Table name should not be blank. Please check the table header",
            ));
        }
        Ok(TomlTable::new(Key::parse(content, line)?, false))
    }

    pub(crate) fn new(key: Key, is_synthetic: bool) -> Self {
        TomlTable {
            tables_list: key.prefixes(),
            key,
            is_synthetic,
        }
    }

    pub(crate) fn from_parts(parts: &[KeyPart], line: usize, is_synthetic: bool) -> Self {
        TomlTable::new(Key::from_parts(parts.to_vec(), line), is_synthetic)
    }

    /// The last part of the name, unquoted.
    #[must_use]
    pub fn name(&self) -> &str {
        self.key.name()
    }

    /// The canonical dotted name, for example `a."b.c"`.
    #[must_use]
    pub fn full_name(&self) -> String {
        self.key.canonical()
    }

    #[must_use]
    pub fn key(&self) -> &Key {
        &self.key
    }

    #[must_use]
    pub fn tables_list(&self) -> &[String] {
        &self.tables_list
    }

    /// `true` when the table was created implicitly by a dotted key or as an
    /// undeclared intermediate segment.
    #[must_use]
    pub fn is_synthetic(&self) -> bool {
        self.is_synthetic
    }
}

/// A `key = value` pair.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyValue {
    pub key: Key,
    pub value: TomlValue,
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    File,
    Table(TomlTable),
    ArrayOfTables(TomlTable),
    ArrayOfTablesElement,
    KeyValuePrimitive(KeyValue),
    KeyValueArray(KeyValue),
    InlineTable(Key),
    StubEmpty,
}

impl NodeKind {
    /// Wraps a pair in the primitive or array leaf kind, depending on the value.
    #[must_use]
    pub fn key_value(key: Key, value: TomlValue) -> Self {
        if value.is_array() {
            NodeKind::KeyValueArray(KeyValue { key, value })
        } else {
            NodeKind::KeyValuePrimitive(KeyValue { key, value })
        }
    }

    /// `true` for kinds rendered under a `[header]` of their own.
    #[must_use]
    pub fn is_table(&self) -> bool {
        matches!(self, NodeKind::Table(_) | NodeKind::ArrayOfTables(_))
    }

    #[must_use]
    pub fn as_key_value(&self) -> Option<&KeyValue> {
        match self {
            NodeKind::KeyValuePrimitive(kv) | NodeKind::KeyValueArray(kv) => Some(kv),
            _ => None,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            NodeKind::File => "file",
            NodeKind::Table(_) => "table",
            NodeKind::ArrayOfTables(_) => "array_of_tables",
            NodeKind::ArrayOfTablesElement => "array_of_tables_element",
            NodeKind::KeyValuePrimitive(_) => "key_value",
            NodeKind::KeyValueArray(_) => "key_value_array",
            NodeKind::InlineTable(_) => "inline_table",
            NodeKind::StubEmpty => "stub",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub line: usize,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// One parsed (or encoded) TOML document.
#[derive(Clone, Debug, PartialEq)]
pub struct TomlFile {
    nodes: Vec<Node>,
}

impl Default for TomlFile {
    fn default() -> Self {
        Self::new()
    }
}

impl TomlFile {
    /// Creates a document holding only the root node.
    #[must_use]
    pub fn new() -> Self {
        TomlFile {
            nodes: vec![Node {
                kind: NodeKind::File,
                line: 0,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// The node behind `id`.
    ///
    /// `node`, `kind`, `line`, `parent` and `children` index the arena directly.
    ///
    /// # Panics
    ///
    /// If `id` was not handed out by this file. Use [`TomlFile::get`] for
    /// ids of unknown origin.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// The node behind `id`, or `None` if this file has no such node.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    #[must_use]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    #[must_use]
    pub fn line(&self, id: NodeId) -> usize {
        self.nodes[id.0].line
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Children without the `StubEmpty` placeholder.
    pub fn real_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|&child| !matches!(self.kind(child), NodeKind::StubEmpty))
    }

    /// Total number of nodes, the root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes[0].children.is_empty()
    }

    /// The name a node is addressed by while decoding.
    #[must_use]
    pub fn name(&self, id: NodeId) -> &str {
        match self.kind(id) {
            NodeKind::File => "rootNode",
            NodeKind::Table(table) | NodeKind::ArrayOfTables(table) => table.name(),
            NodeKind::KeyValuePrimitive(kv) | NodeKind::KeyValueArray(kv) => kv.key.name(),
            NodeKind::InlineTable(key) => key.name(),
            NodeKind::ArrayOfTablesElement | NodeKind::StubEmpty => "technical_node",
        }
    }

    /// The dotted name of the table scope `id` stands for, `rootNode` for the root.
    #[must_use]
    pub fn scope_name(&self, id: NodeId) -> String {
        match self.kind(id) {
            NodeKind::Table(table) | NodeKind::ArrayOfTables(table) => table.full_name(),
            NodeKind::InlineTable(key) => key.canonical(),
            NodeKind::ArrayOfTablesElement => self
                .parent(id)
                .map_or_else(|| "technical_node".to_string(), |p| self.scope_name(p)),
            NodeKind::File => "rootNode".to_string(),
            _ => self.name(id).to_string(),
        }
    }

    /// Key parts of the table scope `id`; empty for the root.
    pub(crate) fn scope_parts(&self, id: NodeId) -> Vec<KeyPart> {
        match self.kind(id) {
            NodeKind::Table(table) | NodeKind::ArrayOfTables(table) => table.key().parts().to_vec(),
            NodeKind::ArrayOfTablesElement => self
                .parent(id)
                .map(|p| self.scope_parts(p))
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    pub(crate) fn append_child(&mut self, parent: NodeId, kind: NodeKind, line: usize) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            line,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    fn find_child_table(&self, parent: NodeId, full_name: &str) -> Option<NodeId> {
        self.children(parent).iter().copied().find(|&child| {
            matches!(
                self.kind(child),
                NodeKind::Table(t) | NodeKind::ArrayOfTables(t) if t.full_name() == full_name
            )
        })
    }

    /// Places `table` into the tree and returns the new insertion point.
    ///
    /// Walks `table.tables_list()` from the root. Undeclared ancestors become
    /// synthetic tables; passing through an array of tables descends into its
    /// latest element. A redeclared primitive table is reopened, and a repeated
    /// `[[name]]` appends a fresh element which is returned instead of the array.
    ///
    /// # Errors
    ///
    /// [`Error::Parse`] when a name is declared both as a table and as an
    /// array of tables.
    pub fn insert_table(&mut self, table: TomlTable, is_array: bool) -> Result<NodeId> {
        let line = table.key().line();
        let parts = table.key().parts().to_vec();
        let last = parts.len().saturating_sub(1);
        let mut current = self.root();

        let prefixes = table.tables_list().to_vec();
        for (depth, prefix) in prefixes.iter().enumerate() {
            let is_last = depth == last;

            let Some(found) = self.find_child_table(current, prefix) else {
                if !is_last {
                    let synthetic = TomlTable::from_parts(&parts[..=depth], line, true);
                    debug!(table = %prefix, line, "creating synthetic table");
                    current = self.append_child(current, NodeKind::Table(synthetic), line);
                    continue;
                }
                if is_array {
                    let array = self.append_child(current, NodeKind::ArrayOfTables(table), line);
                    return Ok(self.append_child(array, NodeKind::ArrayOfTablesElement, line));
                }
                return Ok(self.append_child(current, NodeKind::Table(table), line));
            };

            let found_is_array = matches!(self.kind(found), NodeKind::ArrayOfTables(_));
            match (found_is_array, is_last) {
                (true, true) if is_array => {
                    debug!(table = %prefix, line, "appending array of tables element");
                    return Ok(self.append_child(found, NodeKind::ArrayOfTablesElement, line));
                }
                (true, false) => {
                    current = self.children(found).last().copied().ok_or_else(|| {
                        Error::internal_ast(format!("array of tables <{prefix}> has no elements"))
                    })?;
                }
                (false, true) if !is_array => {
                    if let NodeKind::Table(existing) = &mut self.nodes[found.0].kind {
                        existing.is_synthetic &= table.is_synthetic();
                    }
                    debug!(table = %prefix, line, "reopening table");
                    return Ok(found);
                }
                (false, false) => current = found,
                (true, true) => {
                    return Err(Error::parse(
                        line,
                        format!("<{prefix}> is already declared as an array of tables"),
                    ))
                }
                (false, true) => {
                    return Err(Error::parse(
                        line,
                        format!("<{prefix}> is already declared as a table, it cannot become an array of tables"),
                    ))
                }
            }
        }

        Err(Error::internal_ast("a table header must have at least one name part"))
    }

    /// Creates (or reuses) the synthetic tables a dotted key `a.b.c` implies
    /// when it appears inside `scope`, returning the table that owns `c`.
    pub(crate) fn insert_dotted_key_tables(&mut self, scope: NodeId, key: &Key) -> Result<NodeId> {
        let mut parts = self.scope_parts(scope);
        parts.extend_from_slice(key.parent_parts());
        debug!(table = %join_canonical(&parts), line = key.line(), "dotted key implies table");
        self.insert_table(TomlTable::from_parts(&parts, key.line(), true), false)
    }

    /// Gives every childless table, element and inline table a `StubEmpty` child.
    pub(crate) fn add_stubs(&mut self) {
        let empty: Vec<NodeId> = (0..self.nodes.len())
            .map(NodeId)
            .filter(|&id| {
                matches!(
                    self.kind(id),
                    NodeKind::Table(_) | NodeKind::ArrayOfTablesElement | NodeKind::InlineTable(_)
                ) && self.children(id).is_empty()
            })
            .collect();
        for id in empty {
            let line = self.line(id);
            self.append_child(id, NodeKind::StubEmpty, line);
        }
    }

    /// Renders the tree one node per line, indented by depth.
    ///
    /// ```rust
    /// use serde_toml_tree::parse_str;
    ///
    /// let file = parse_str("a.b = 1").unwrap();
    /// assert_eq!(
    ///     file.pretty_str(),
    ///     "- file (rootNode)\n  - table [a] synthetic, line 1\n    - key_value b = 1, line 1\n"
    /// );
    /// ```
    #[must_use]
    pub fn pretty_str(&self) -> String {
        let mut out = String::new();
        self.pretty_node(self.root(), 0, &mut out);
        out
    }

    fn pretty_node(&self, id: NodeId, depth: usize, out: &mut String) {
        let node = self.node(id);
        let indent = "  ".repeat(depth);
        let detail = match &node.kind {
            NodeKind::File => "(rootNode)".to_string(),
            NodeKind::Table(t) if t.is_synthetic() => format!("[{}] synthetic", t.full_name()),
            NodeKind::Table(t) => format!("[{}]", t.full_name()),
            NodeKind::ArrayOfTables(t) => format!("[[{}]]", t.full_name()),
            NodeKind::KeyValuePrimitive(kv) | NodeKind::KeyValueArray(kv) => {
                format!("{} = {}", kv.key, kv.value)
            }
            NodeKind::InlineTable(key) => key.to_string(),
            NodeKind::ArrayOfTablesElement | NodeKind::StubEmpty => "(technical_node)".to_string(),
        };
        let _ = if matches!(node.kind, NodeKind::File) {
            writeln!(out, "{indent}- {} {detail}", node.kind.label())
        } else {
            writeln!(out, "{indent}- {} {detail}, line {}", node.kind.label(), node.line)
        };
        for &child in &node.children {
            self.pretty_node(child, depth + 1, out);
        }
    }
}
