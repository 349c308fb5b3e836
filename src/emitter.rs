//! Writing a [`TomlFile`] back to TOML text.
//!
//! [`TomlEmitter`] walks the tree and appends text fragments to a
//! [`TomlSink`]. Layout rules:
//!
//! - nested tables are indented one level per depth
//! - the root and array-of-tables elements write their pairs before their
//!   sub-tables; a primitive table that gets a pair after a sub-table re-opens
//!   its own `[header]` first, so the pair cannot land in the sub-table
//! - a table whose first child is a table omits its header, and a table with
//!   only a stub child writes the header alone
//! - primitive pairs are separated by one newline, anything else (or a pair
//!   followed by a table) by a blank line
//!
//! ## Examples
//!
//! ```rust
//! use serde_toml_tree::{parse_str, TomlOutputConfig};
//!
//! let file = parse_str("[a]\nx = 1\n[a.b]\ny = 2\n[a]\nz = 3").unwrap();
//! assert_eq!(
//!     file.emit(&TomlOutputConfig::default()),
//!     "[a]\n    x = 1\n\n    [a.b]\n        y = 2\n\n[a]\n    z = 3\n"
//! );
//! ```

use crate::config::TomlOutputConfig;
use crate::tree::{NodeId, NodeKind, TomlFile, TomlTable};
use crate::{Error, Result};
use std::convert::Infallible;
use std::io;

/// Append-only destination for emitted text.
pub trait TomlSink {
    type Error;

    fn emit_str(&mut self, text: &str) -> std::result::Result<(), Self::Error>;

    fn emit_char(&mut self, ch: char) -> std::result::Result<(), Self::Error> {
        let mut buf = [0u8; 4];
        self.emit_str(ch.encode_utf8(&mut buf))
    }
}

impl TomlSink for String {
    type Error = Infallible;

    fn emit_str(&mut self, text: &str) -> std::result::Result<(), Infallible> {
        self.push_str(text);
        Ok(())
    }

    fn emit_char(&mut self, ch: char) -> std::result::Result<(), Infallible> {
        self.push(ch);
        Ok(())
    }
}

/// Adapts any [`io::Write`] into a [`TomlSink`] writing UTF-8 bytes.
pub struct IoSink<W: io::Write> {
    writer: W,
}

impl<W: io::Write> IoSink<W> {
    pub fn new(writer: W) -> Self {
        IoSink { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: io::Write> TomlSink for IoSink<W> {
    type Error = io::Error;

    fn emit_str(&mut self, text: &str) -> io::Result<()> {
        self.writer.write_all(text.as_bytes())
    }
}

/// Renders a tree into a [`TomlSink`].
pub struct TomlEmitter<'c, S: TomlSink> {
    sink: S,
    config: &'c TomlOutputConfig,
}

impl<'c, S: TomlSink> TomlEmitter<'c, S> {
    pub fn new(sink: S, config: &'c TomlOutputConfig) -> Self {
        TomlEmitter { sink, config }
    }

    pub fn into_inner(self) -> S {
        self.sink
    }

    /// Writes the whole document, ending with a newline unless it is empty.
    #[tracing::instrument(level = "debug", skip_all, fields(nodes = file.len()))]
    pub fn emit_file(&mut self, file: &TomlFile) -> std::result::Result<(), S::Error> {
        let children = pairs_first(file, file.root());
        if children.is_empty() {
            return Ok(());
        }
        self.write_children(file, &children, 0, None)?;
        self.sink.emit_char('\n')
    }

    fn indent(&mut self, depth: usize) -> std::result::Result<(), S::Error> {
        let unit = self.config.indentation.as_str();
        for _ in 0..depth {
            self.sink.emit_str(unit)?;
        }
        Ok(())
    }

    /// `reopen` is the table to re-declare when a pair follows a sub-table.
    fn write_children(
        &mut self,
        file: &TomlFile,
        children: &[NodeId],
        depth: usize,
        reopen: Option<(&TomlTable, usize)>,
    ) -> std::result::Result<(), S::Error> {
        let mut depth = depth;
        let mut prev_is_table = false;

        for (i, &child) in children.iter().enumerate() {
            let kind = file.kind(child);

            if prev_is_table && !kind.is_table() {
                if let Some((table, header_depth)) = reopen {
                    self.indent(header_depth)?;
                    self.write_header(table, false)?;
                    self.sink.emit_char('\n')?;
                    depth = header_depth + 1;
                }
            }

            self.write_node(file, child, depth)?;

            if let Some(&next) = children.get(i + 1) {
                self.sink.emit_char('\n')?;
                let primitive = matches!(kind, NodeKind::KeyValuePrimitive(_));
                if !primitive || file.kind(next).is_table() {
                    self.sink.emit_char('\n')?;
                }
            }
            prev_is_table = kind.is_table();
        }
        Ok(())
    }

    fn write_node(&mut self, file: &TomlFile, id: NodeId, depth: usize) -> std::result::Result<(), S::Error> {
        match file.kind(id) {
            NodeKind::KeyValuePrimitive(_) | NodeKind::KeyValueArray(_) | NodeKind::InlineTable(_) => {
                self.indent(depth)?;
                self.write_pair(file, id)
            }
            NodeKind::Table(table) => self.write_table(file, id, table, depth),
            NodeKind::ArrayOfTables(table) => self.write_array_of_tables(file, id, table, depth),
            NodeKind::File | NodeKind::ArrayOfTablesElement | NodeKind::StubEmpty => Ok(()),
        }
    }

    fn write_table(
        &mut self,
        file: &TomlFile,
        id: NodeId,
        table: &TomlTable,
        depth: usize,
    ) -> std::result::Result<(), S::Error> {
        let children: Vec<NodeId> = file.real_children(id).collect();
        let first_is_table = children.first().is_some_and(|&c| file.kind(c).is_table());

        if first_is_table {
            // the sub-table header implies this one
            return self.write_children(file, &children, depth, Some((table, depth)));
        }

        self.indent(depth)?;
        self.write_header(table, false)?;
        if children.is_empty() {
            return Ok(());
        }
        self.sink.emit_char('\n')?;
        self.write_children(file, &children, depth + 1, Some((table, depth)))
    }

    fn write_array_of_tables(
        &mut self,
        file: &TomlFile,
        id: NodeId,
        table: &TomlTable,
        depth: usize,
    ) -> std::result::Result<(), S::Error> {
        for (i, &element) in file.children(id).iter().enumerate() {
            if i > 0 {
                self.sink.emit_str("\n\n")?;
            }
            self.indent(depth)?;
            self.write_header(table, true)?;

            let children = pairs_first(file, element);
            if !children.is_empty() {
                self.sink.emit_char('\n')?;
                self.write_children(file, &children, depth + 1, None)?;
            }
        }
        Ok(())
    }

    fn write_header(&mut self, table: &TomlTable, is_array: bool) -> std::result::Result<(), S::Error> {
        let (open, close) = if is_array { ("[[", "]]") } else { ("[", "]") };
        self.sink.emit_str(open)?;
        self.sink.emit_str(&table.key().to_string())?;
        self.sink.emit_str(close)
    }

    /// `key = value` or `key = { ... }`, without indentation or newline.
    fn write_pair(&mut self, file: &TomlFile, id: NodeId) -> std::result::Result<(), S::Error> {
        match file.kind(id) {
            NodeKind::KeyValuePrimitive(kv) | NodeKind::KeyValueArray(kv) => {
                self.sink.emit_str(&kv.key.to_string())?;
                self.sink.emit_str(" = ")?;
                self.sink.emit_str(&kv.value.to_string())
            }
            NodeKind::InlineTable(key) => {
                self.sink.emit_str(&key.to_string())?;
                self.sink.emit_str(" = {")?;
                let children: Vec<NodeId> = file.real_children(id).collect();
                for (i, &child) in children.iter().enumerate() {
                    self.sink.emit_str(if i == 0 { " " } else { ", " })?;
                    self.write_pair(file, child)?;
                }
                if !children.is_empty() {
                    self.sink.emit_char(' ')?;
                }
                self.sink.emit_char('}')
            }
            _ => Ok(()),
        }
    }
}

/// Children of a scope that cannot be re-declared, pairs before tables.
fn pairs_first(file: &TomlFile, id: NodeId) -> Vec<NodeId> {
    let (tables, pairs): (Vec<NodeId>, Vec<NodeId>) =
        file.real_children(id).partition(|&c| file.kind(c).is_table());
    pairs.into_iter().chain(tables).collect()
}

impl TomlFile {
    /// Renders the document as TOML text.
    ///
    /// ```rust
    /// use serde_toml_tree::{parse_str, Indentation, TomlOutputConfig};
    ///
    /// let file = parse_str("[[fruit]]\nname = 'apple'\n[[fruit]]\nname = 'pear'").unwrap();
    /// let config = TomlOutputConfig::new().with_indentation(Indentation::None);
    /// assert_eq!(
    ///     file.emit(&config),
    ///     "[[fruit]]\nname = 'apple'\n\n[[fruit]]\nname = 'pear'\n"
    /// );
    /// ```
    #[must_use]
    pub fn emit(&self, config: &TomlOutputConfig) -> String {
        let mut emitter = TomlEmitter::new(String::new(), config);
        match emitter.emit_file(self) {
            Ok(()) => emitter.into_inner(),
            Err(never) => match never {},
        }
    }

    /// Writes the document into `writer`.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] when the writer fails.
    pub fn emit_to_writer<W: io::Write>(&self, writer: W, config: &TomlOutputConfig) -> Result<()> {
        let mut emitter = TomlEmitter::new(IoSink::new(writer), config);
        emitter
            .emit_file(self)
            .map_err(|e| Error::io(&e.to_string()))
    }
}
