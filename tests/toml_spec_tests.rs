//! Behaviour of the parser, decoder and emitter on small TOML documents.

use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};
use serde_toml_tree::{
    from_str, from_str_with_config, parse_str, parse_str_with_config, to_string, Error, Item,
    NodeKind, TomlConfig, TomlFile, TomlMap, TomlOutputConfig, TomlValue,
};

/// `pretty_str` without line numbers or synthetic markers.
fn shape(file: &TomlFile) -> Vec<String> {
    file.pretty_str()
        .lines()
        .map(|line| {
            let line = line.split(", line ").next().unwrap_or(line);
            line.replace(" synthetic", "")
        })
        .collect()
}

fn ints(file: &TomlFile, parent: serde_toml_tree::NodeId) -> Vec<(String, i64)> {
    file.real_children(parent)
        .filter_map(|child| file.kind(child).as_key_value())
        .filter_map(|kv| kv.value.as_i64().map(|v| (kv.key.name().to_string(), v)))
        .collect()
}

#[test]
fn test_redeclared_table_merges() {
    let file = parse_str("[a]\nx=1\n[a]\ny=2").unwrap();
    let root = file.children(file.root());
    assert_eq!(root.len(), 1);
    assert!(matches!(file.kind(root[0]), NodeKind::Table(t) if t.full_name() == "a"));
    assert_eq!(
        ints(&file, root[0]),
        vec![("x".to_string(), 1), ("y".to_string(), 2)]
    );
}

#[test]
fn test_array_of_tables_elements_are_scoped() {
    let file = parse_str("[[a]]\nx=1\n[[a]]\nx=2").unwrap();
    let root = file.children(file.root());
    assert_eq!(root.len(), 1);
    assert!(matches!(file.kind(root[0]), NodeKind::ArrayOfTables(_)));

    let elements = file.children(root[0]);
    assert_eq!(elements.len(), 2);
    assert_eq!(ints(&file, elements[0]), vec![("x".to_string(), 1)]);
    assert_eq!(ints(&file, elements[1]), vec![("x".to_string(), 2)]);
}

#[test]
fn test_sub_table_of_array_element_attaches_to_last_element() {
    let file = parse_str("[[fruit]]\nname = 'apple'\n[fruit.physical]\ncolor = 'red'\n[[fruit]]\nname = 'pear'")
        .unwrap();
    let fruit = file.children(file.root())[0];
    let elements = file.children(fruit);
    assert_eq!(elements.len(), 2);

    let first: Vec<_> = file.real_children(elements[0]).collect();
    assert_eq!(first.len(), 2);
    assert!(matches!(file.kind(first[1]), NodeKind::Table(t) if t.full_name() == "fruit.physical"));
    assert_eq!(file.real_children(elements[1]).count(), 1);
}

#[test]
fn test_dotted_key_equivalent_to_header() {
    let dotted = parse_str("a.b.c = 1").unwrap();
    let header = parse_str("[a.b]\nc = 1").unwrap();
    assert_eq!(shape(&dotted), shape(&header));
    assert_eq!(
        shape(&dotted),
        vec![
            "- file (rootNode)",
            "  - table [a]",
            "    - table [a.b]",
            "      - key_value c = 1",
        ]
    );
}

#[test]
fn test_unknown_key_policy() {
    #[derive(Deserialize, Debug, PartialEq)]
    struct OnlyA {
        a: i64,
    }

    let err = from_str::<OnlyA>("a = 1\nz = 1").unwrap_err();
    assert_eq!(
        err,
        Error::UnknownName {
            key: "z".to_string(),
            table: "rootNode".to_string(),
            line: 2,
        }
    );

    let lenient = TomlConfig::new().with_ignore_unknown_names(true);
    let value: OnlyA = from_str_with_config("a = 1\nz = 1\n[extra]\nq = 2", &lenient).unwrap();
    assert_eq!(value, OnlyA { a: 1 });
}

#[test]
fn test_literal_and_basic_strings() {
    let doc: TomlMap = from_str("lit = 'line1\\nline2'\nbasic = \"line1\\nline2\"").unwrap();
    assert_eq!(doc.get("lit").and_then(Item::as_str), Some("line1\\nline2"));
    assert_eq!(doc.get("basic").and_then(Item::as_str), Some("line1\nline2"));
}

#[test]
fn test_end_to_end_example() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct T {
        v: i64,
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Doc {
        name: String,
        t: T,
    }

    let doc: Doc = from_str("name = \"x\"\n[t]\nv = 1").unwrap();
    assert_eq!(
        doc,
        Doc {
            name: "x".to_string(),
            t: T { v: 1 },
        }
    );
    let emitted = to_string(&doc).unwrap();
    assert_eq!(emitted, "name = \"x\"\n\n[t]\n    v = 1\n");
    assert_eq!(from_str::<Doc>(&emitted).unwrap(), doc);
}

#[test]
fn test_pair_after_sub_table_reopens_header() {
    let file = parse_str("[a]\nx = 1\n[a.b]\ny = 2\n[a]\nz = 3").unwrap();
    let text = file.emit(&TomlOutputConfig::default());
    assert_eq!(
        text,
        "[a]\n    x = 1\n\n    [a.b]\n        y = 2\n\n[a]\n    z = 3\n"
    );

    let reparsed = parse_str(&text).unwrap();
    let a = reparsed.children(reparsed.root())[0];
    assert_eq!(
        ints(&reparsed, a),
        vec![("x".to_string(), 1), ("z".to_string(), 3)]
    );
}

#[test]
fn test_empty_table_gets_stub() {
    let file = parse_str("[empty]\n[full]\nk = 1").unwrap();
    let empty = file.children(file.root())[0];
    let children = file.children(empty);
    assert_eq!(children.len(), 1);
    assert!(matches!(file.kind(children[0]), NodeKind::StubEmpty));
    assert_eq!(file.real_children(empty).count(), 0);
}

#[test]
fn test_value_shapes() {
    let file = parse_str(
        "hex = 0xff\noct = 0o17\nbin = 0b101\nbig = 1_000_000\nexp = 6.02e23\nneg = -inf\n\
         nested = [[1, 2], ['a']]\nempty =",
    )
    .unwrap();
    let values: Vec<TomlValue> = file
        .children(file.root())
        .iter()
        .filter_map(|&c| file.kind(c).as_key_value())
        .map(|kv| kv.value.clone())
        .collect();
    assert_eq!(values[0], TomlValue::Integer(255));
    assert_eq!(values[1], TomlValue::Integer(15));
    assert_eq!(values[2], TomlValue::Integer(5));
    assert_eq!(values[3], TomlValue::Integer(1_000_000));
    assert_eq!(values[4], TomlValue::Float(6.02e23));
    assert_eq!(values[5], TomlValue::Float(f64::NEG_INFINITY));
    assert_eq!(
        values[6],
        TomlValue::Array(vec![
            TomlValue::Array(vec![TomlValue::Integer(1), TomlValue::Integer(2)]),
            TomlValue::Array(vec![TomlValue::LiteralString("a".to_string())]),
        ])
    );
    assert_eq!(values[7], TomlValue::Null);
}

#[test]
fn test_empty_values_can_be_rejected() {
    let strict = TomlConfig::new().with_empty_values_allowed(false);
    assert!(matches!(
        parse_str_with_config("a = 1\nb =", &strict),
        Err(Error::Parse { line: 2, .. })
    ));
}

#[test]
fn test_multiline_strings() {
    let doc: TomlMap = from_str("a = \"\"\"\nfirst\nsecond\"\"\"\nb = '''\nraw \\n'''\nc = 1").unwrap();
    assert_eq!(doc.get("a").and_then(Item::as_str), Some("first\nsecond"));
    assert_eq!(doc.get("b").and_then(Item::as_str), Some("raw \\n"));
    assert_eq!(doc.get("c"), Some(&Item::Integer(1)));
}

#[test]
fn test_parse_failures_carry_lines() {
    let cases = [
        ("a = 1\n[]", 2),
        ("a = 1\n[tbl", 2),
        ("a = \"open", 1),
        ("a = [1, 2", 1),
        ("bad key = 1", 1),
        ("a = \"\\q\"", 1),
        ("a = [1,,2]", 1),
    ];
    for (toml, line) in cases {
        match parse_str(toml) {
            Err(err @ Error::Parse { .. }) => assert_eq!(err.line(), Some(line), "{toml}"),
            other => panic!("expected a parse error for {toml:?}, got {other:?}"),
        }
    }
}

#[test]
fn test_crlf_input() {
    let doc: TomlMap = from_str("a = 1\r\n[t]\r\nb = 'x'\r\n").unwrap();
    assert_eq!(doc.get("t").and_then(|t| t.get("b")).and_then(Item::as_str), Some("x"));
}
