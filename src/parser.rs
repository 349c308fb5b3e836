//! Line-oriented TOML document parser.
//!
//! [`TomlParser`] reads a document line by line. Every line is classified as
//! blank, comment, table header or key-value pair; headers move the current
//! insertion point through [`TomlFile::insert_table`], and pairs are attached
//! below it. Multi-line arrays, multi-line strings and inline tables are folded
//! into one logical line that keeps the number of its first physical line.
//!
//! ## Examples
//!
//! ```rust
//! use serde_toml_tree::{TomlConfig, TomlParser};
//!
//! let parser = TomlParser::new(TomlConfig::default());
//! let file = parser.parse_str("title = \"demo\"\n\n[owner]\nname = \"Tom\"").unwrap();
//! assert_eq!(file.children(file.root()).len(), 2);
//! ```

use crate::config::TomlConfig;
use crate::key::{Key, KeyPart};
use crate::scan::{bracket_depth, find_unquoted, split_top_level};
use crate::tree::{NodeId, NodeKind, TomlFile, TomlTable};
use crate::value::TomlValue;
use crate::{Error, Result};
use tracing::trace;

/// Parses TOML text into a [`TomlFile`].
#[derive(Clone, Debug, Default)]
pub struct TomlParser {
    config: TomlConfig,
}

impl TomlParser {
    #[must_use]
    pub fn new(config: TomlConfig) -> Self {
        TomlParser { config }
    }

    #[must_use]
    pub fn config(&self) -> &TomlConfig {
        &self.config
    }

    /// Parses a whole document; `\r\n` line endings are normalized first.
    ///
    /// # Errors
    ///
    /// The first [`Error::Parse`] met in the document, with its line number.
    #[tracing::instrument(level = "debug", skip(self, toml), fields(len = toml.len()))]
    pub fn parse_str(&self, toml: &str) -> Result<TomlFile> {
        let normalized = toml.replace("\r\n", "\n");
        let lines: Vec<&str> = normalized.split('\n').collect();
        self.parse_lines(&lines)
    }

    /// Parses a document that has already been split into lines.
    ///
    /// # Errors
    ///
    /// The first [`Error::Parse`] met in the document, with its line number.
    pub fn parse_lines<S: AsRef<str>>(&self, lines: &[S]) -> Result<TomlFile> {
        let mut file = TomlFile::new();
        let mut current = file.root();

        // trailing blank lines carry nothing
        let end = lines
            .iter()
            .rposition(|line| !line.as_ref().trim().is_empty())
            .map_or(0, |last| last + 1);

        let mut index = 0;
        while index < end {
            let line_no = index + 1;
            let line = lines[index].as_ref().trim();
            index += 1;

            if line.is_empty() || line.starts_with('#') {
                trace!(line = line_no, "skipping blank or comment line");
                continue;
            }

            if line.starts_with('[') {
                trace!(line = line_no, "table header");
                let (table, is_array) = self.parse_header(line, line_no)?;
                current = file.insert_table(table, is_array)?;
                continue;
            }

            trace!(line = line_no, "key-value pair");
            let (key_raw, first_value) = split_key_value(line, line_no)?;
            let (value_raw, consumed) = self.collect_value(first_value, &lines[index..end], line_no)?;
            index += consumed;

            let key = Key::parse(key_raw, line_no)?;
            let owner = if key.is_dotted() {
                file.insert_dotted_key_tables(current, &key)?
            } else {
                current
            };
            self.append_value(&mut file, owner, key.last(), &value_raw, line_no)?;
        }

        file.add_stubs();
        Ok(file)
    }

    fn literal_escapes(&self) -> bool {
        self.config.escaped_quotes_in_literal_strings_allowed
    }

    fn parse_header(&self, line: &str, line_no: usize) -> Result<(TomlTable, bool)> {
        let header = match find_unquoted(line, '#', self.literal_escapes()) {
            Some(pos) => line[..pos].trim_end(),
            None => line,
        };
        let is_array = header.starts_with("[[");
        let (open, close) = if is_array { ("[[", "]]") } else { ("[", "]") };

        let content = header
            .strip_prefix(open)
            .and_then(|rest| rest.strip_suffix(close))
            .ok_or_else(|| {
                Error::parse(
                    line_no,
                    format!("Invalid table header <{line}>: missing closing bracket <{close}>"),
                )
            })?;
        Ok((TomlTable::from_header(content, line_no)?, is_array))
    }

    /// Returns the full value text and the number of extra lines it spans.
    fn collect_value(&self, first: &str, rest: &[impl AsRef<str>], line_no: usize) -> Result<(String, usize)> {
        let first = first.trim();

        if let Some(delimiter) = ["\"\"\"", "'''"].into_iter().find(|d| first.starts_with(d)) {
            return collect_multiline_string(first, delimiter, rest, line_no);
        }

        let mut value = self.strip_comment(first).to_string();
        let mut consumed = 0;
        while value.starts_with(['[', '{']) && bracket_depth(&value, self.literal_escapes()) > 0 {
            let Some(next) = rest.get(consumed) else {
                return Err(Error::parse(
                    line_no,
                    format!("Brackets are not balanced in the value <{value}>"),
                ));
            };
            consumed += 1;
            let next = self.strip_comment(next.as_ref().trim());
            if !next.is_empty() {
                value.push(' ');
                value.push_str(next);
            }
        }
        Ok((value, consumed))
    }

    fn strip_comment<'a>(&self, text: &'a str) -> &'a str {
        match find_unquoted(text, '#', self.literal_escapes()) {
            Some(pos) => text[..pos].trim_end(),
            None => text,
        }
    }

    fn append_value(&self, file: &mut TomlFile, owner: NodeId, key: Key, raw: &str, line: usize) -> Result<()> {
        if raw.starts_with('{') {
            let table = file.append_child(owner, NodeKind::InlineTable(key), line);
            return self.parse_inline_table(file, table, raw, line);
        }
        let value = TomlValue::parse(raw, line, &self.config)?;
        file.append_child(owner, NodeKind::key_value(key, value), line);
        Ok(())
    }

    fn parse_inline_table(&self, file: &mut TomlFile, table: NodeId, raw: &str, line: usize) -> Result<()> {
        let inner = raw
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
            .filter(|_| bracket_depth(raw, self.literal_escapes()) == 0)
            .ok_or_else(|| Error::parse(line, format!("Inline table <{raw}> is not closed properly")))?
            .trim();
        if inner.is_empty() {
            return Ok(());
        }

        for pair in split_top_level(inner, ',', self.literal_escapes()) {
            let (key_raw, value_raw) = split_key_value(pair.trim(), line)?;
            let key = Key::parse(key_raw, line)?;

            let mut owner = table;
            for part in key.parent_parts() {
                owner = find_or_create_inline(file, owner, part, line);
            }
            self.append_value(file, owner, key.last(), value_raw.trim(), line)?;
        }
        Ok(())
    }
}

fn find_or_create_inline(file: &mut TomlFile, parent: NodeId, part: &KeyPart, line: usize) -> NodeId {
    let existing = file.children(parent).iter().copied().find(|&child| {
        matches!(file.kind(child), NodeKind::InlineTable(key) if key.name() == part.name())
    });
    existing.unwrap_or_else(|| {
        let key = Key::from_parts(vec![part.clone()], line);
        file.append_child(parent, NodeKind::InlineTable(key), line)
    })
}

/// Splits `key = value` at the first `=` outside of quotes.
fn split_key_value(line: &str, line_no: usize) -> Result<(&str, &str)> {
    let pos = find_unquoted(line, '=', false).ok_or_else(|| {
        Error::parse(
            line_no,
            format!("Incorrect format of Key-Value pair <{line}>. It should be <key = value>"),
        )
    })?;
    let key = line[..pos].trim();
    if key.is_empty() {
        return Err(Error::parse(
            line_no,
            format!("Incorrect format of Key-Value pair <{line}>. The key is empty"),
        ));
    }
    Ok((key, &line[pos + 1..]))
}

fn collect_multiline_string(
    first: &str,
    delimiter: &str,
    rest: &[impl AsRef<str>],
    line_no: usize,
) -> Result<(String, usize)> {
    let mut text = first.to_string();
    let mut consumed = 0;

    loop {
        if let Some(end) = find_closing(&text, delimiter) {
            let trailing = text[end..].trim();
            if !trailing.is_empty() && !trailing.starts_with('#') {
                return Err(Error::parse(
                    line_no,
                    format!("Unexpected characters <{trailing}> after the multi-line string"),
                ));
            }
            text.truncate(end);
            return Ok((text, consumed));
        }
        let Some(next) = rest.get(consumed) else {
            return Err(Error::parse(
                line_no,
                format!("Not able to find the closing {delimiter} of the multi-line string"),
            ));
        };
        consumed += 1;
        text.push('\n');
        text.push_str(next.as_ref());
    }
}

/// Byte offset just past the closing delimiter of a multi-line string.
fn find_closing(text: &str, delimiter: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let quote = delimiter.as_bytes()[0];
    let mut i = 3;
    while i + 3 <= bytes.len() {
        if quote == b'"' && bytes[i] == b'\\' {
            i += 2;
            continue;
        }
        if &bytes[i..i + 3] == delimiter.as_bytes() {
            // up to two quotes right before the delimiter belong to the content
            let mut end = i + 3;
            while end < bytes.len() && bytes[end] == quote && end < i + 5 {
                end += 1;
            }
            return Some(end);
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::KeyValue;

    fn parse(toml: &str) -> TomlFile {
        TomlParser::default().parse_str(toml).unwrap()
    }

    fn kv(file: &TomlFile, id: NodeId) -> &KeyValue {
        file.kind(id).as_key_value().unwrap()
    }

    #[test]
    fn test_comments_and_blank_lines_are_skipped() {
        let file = parse("# header\n\na = 1 # trailing\n  # indented\nb = \"#not a comment\"\n\n\n");
        let children = file.children(file.root());
        assert_eq!(children.len(), 2);
        assert_eq!(kv(&file, children[0]).value, TomlValue::Integer(1));
        assert_eq!(
            kv(&file, children[1]).value,
            TomlValue::BasicString("#not a comment".to_string())
        );
        assert_eq!(file.line(children[1]), 5);
    }

    #[test]
    fn test_keys_after_header_attach_to_it() {
        let file = parse("a = 1\n[t]\nb = 2\n[[arr]]\nc = 3");
        let root = file.children(file.root());
        assert_eq!(root.len(), 3);
        assert_eq!(file.name(file.children(root[1])[0]), "b");

        let element = file.children(root[2])[0];
        assert!(matches!(file.kind(element), NodeKind::ArrayOfTablesElement));
        assert_eq!(file.name(file.children(element)[0]), "c");
    }

    #[test]
    fn test_dotted_key_builds_synthetic_tables() {
        let file = parse("[fruit]\napple.color = \"red\"");
        let fruit = file.children(file.root())[0];
        let apple = file.children(fruit)[0];
        match file.kind(apple) {
            NodeKind::Table(table) => {
                assert!(table.is_synthetic());
                assert_eq!(table.full_name(), "fruit.apple");
            }
            other => panic!("unexpected node: {other:?}"),
        }
        assert_eq!(file.name(file.children(apple)[0]), "color");
    }

    #[test]
    fn test_dotted_key_inside_array_element() {
        let file = parse("[[a]]\nx.y = 1\n[[a]]\nx.y = 2");
        let array = file.children(file.root())[0];
        let elements = file.children(array);
        assert_eq!(elements.len(), 2);
        for (element, expected) in elements.iter().zip([1, 2]) {
            let x = file.children(*element)[0];
            let y = kv(&file, file.children(x)[0]);
            assert_eq!(y.value, TomlValue::Integer(expected));
        }
    }

    #[test]
    fn test_multiline_array() {
        let file = parse("a = [\n  1, # one\n  2,\n]\nb = 3");
        let root = file.children(file.root());
        assert_eq!(
            kv(&file, root[0]).value,
            TomlValue::Array(vec![TomlValue::Integer(1), TomlValue::Integer(2)])
        );
        assert_eq!(file.line(root[1]), 5);
    }

    #[test]
    fn test_multiline_string() {
        let file = parse("s = \"\"\"\nfirst\nsecond\"\"\" # done\nnext = 1");
        let root = file.children(file.root());
        assert_eq!(
            kv(&file, root[0]).value,
            TomlValue::BasicString("first\nsecond".to_string())
        );
        assert_eq!(file.line(root[1]), 4);
    }

    #[test]
    fn test_inline_tables_nest() {
        let file = parse("point = { x = 1, y.z = 2, w = { v = 3 } }");
        let point = file.children(file.root())[0];
        assert!(matches!(file.kind(point), NodeKind::InlineTable(_)));
        let names: Vec<_> = file.children(point).iter().map(|&c| file.name(c)).collect();
        assert_eq!(names, vec!["x", "y", "w"]);
        assert!(matches!(file.kind(file.children(point)[1]), NodeKind::InlineTable(_)));
    }

    #[test]
    fn test_header_errors() {
        let parser = TomlParser::default();
        let err = parser.parse_str("a = 1\n[table").unwrap_err();
        assert_eq!(err.line(), Some(2));
        assert!(parser.parse_str("[]").is_err());
        assert!(parser.parse_str("[ ]").is_err());
        assert!(parser.parse_str("[[a]").is_err());
    }

    #[test]
    fn test_key_value_errors() {
        let parser = TomlParser::default();
        assert_eq!(parser.parse_str("a 1").unwrap_err().line(), Some(1));
        assert_eq!(parser.parse_str("\n\n= 1").unwrap_err().line(), Some(3));
        assert_eq!(parser.parse_str("a = [1,\n2").unwrap_err().line(), Some(1));
        assert!(parser.parse_str("a = \"\"\"never closed").is_err());
    }

    #[test]
    fn test_header_comment_is_stripped() {
        let file = parse("[a] # the a table\nx = 1");
        let a = file.children(file.root())[0];
        assert_eq!(file.name(a), "a");
    }

    #[test]
    fn test_crlf_input() {
        let file = parse("a = 1\r\n[t]\r\nb = 2\r\n");
        assert_eq!(file.children(file.root()).len(), 2);
    }
}
