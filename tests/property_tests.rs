//! Property-based tests for the encode, emit, parse and decode round trip.

use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use serde_toml_tree::{from_str, parse_str, to_string, TomlOutputConfig};
use std::collections::BTreeMap;

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
struct Leaf {
    id: i64,
    label: String,
    ratio: f64,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
struct Branch {
    flag: bool,
    small: u8,
    note: Option<String>,
    numbers: Vec<i32>,
    grid: Vec<Vec<i64>>,
    leaf: Leaf,
    leaves: Vec<Leaf>,
}

fn roundtrip<T: Serialize + for<'de> Deserialize<'de> + PartialEq + std::fmt::Debug>(
    value: &T,
) -> bool {
    match to_string(value) {
        Ok(serialized) => match from_str::<T>(&serialized) {
            Ok(deserialized) => *value == deserialized,
            Err(e) => {
                eprintln!("Deserialize failed: {}", e);
                eprintln!("Serialized was: {}", serialized);
                false
            }
        },
        Err(e) => {
            eprintln!("Serialize failed: {}", e);
            false
        }
    }
}

// quotes, escapes, comment and bracket characters, control characters and non-ASCII
fn text() -> impl Strategy<Value = String> {
    prop_oneof![
        any::<String>(),
        "\\PC{0,24}",
        r#"["'\\#=\[\]{}. \x00-\x1f\x7f\u{85}a-zé€😀]{0,16}"#,
    ]
}

fn leaf() -> impl Strategy<Value = Leaf> {
    (any::<i64>(), text(), -1.0e6..1.0e6_f64).prop_map(|(id, label, ratio)| Leaf { id, label, ratio })
}

fn branch() -> impl Strategy<Value = Branch> {
    (
        any::<bool>(),
        any::<u8>(),
        proptest::option::of(text()),
        prop::collection::vec(any::<i32>(), 0..8),
        prop::collection::vec(prop::collection::vec(any::<i64>(), 0..4), 0..4),
        leaf(),
        prop::collection::vec(leaf(), 0..4),
    )
        .prop_map(|(flag, small, note, numbers, grid, leaf, leaves)| Branch {
            flag,
            small,
            note,
            numbers,
            grid,
            leaf,
            leaves,
        })
}

proptest! {
    #[test]
    fn prop_leaf(value in leaf()) {
        prop_assert!(roundtrip(&value));
    }

    #[test]
    fn prop_map_with_arbitrary_keys(
        value in prop::collection::btree_map(text(), any::<i64>(), 0..6)
    ) {
        prop_assert!(roundtrip(&value));
    }

    #[test]
    fn prop_map_with_string_values(
        value in prop::collection::btree_map(text(), text(), 0..6)
    ) {
        prop_assert!(roundtrip(&value));
    }

    #[test]
    fn prop_branch(value in branch()) {
        prop_assert!(roundtrip(&value));
    }

    // emitting a parsed tree and parsing it again is stable
    #[test]
    fn prop_emit_is_a_fixed_point(value in branch()) {
        let config = TomlOutputConfig::default();
        let first = to_string(&value).unwrap();
        let second = parse_str(&first).unwrap().emit(&config);
        prop_assert_eq!(first, second);
    }
}
