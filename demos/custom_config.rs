//! Tuning decoding with TomlConfig and encoding with TomlOutputConfig.
//!
//! Run with: cargo run --example custom_config

use serde::{Deserialize, Serialize};
use serde_toml_tree::{
    from_str, from_str_with_config, to_string_with_config, Indentation, Inline, TomlConfig,
    TomlOutputConfig,
};
use std::error::Error;

#[derive(Debug, Serialize, Deserialize)]
struct Point {
    x: i64,
    y: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct Database {
    url: String,
    replica: Option<String>,
    pool: u8,
}

#[derive(Debug, Serialize, Deserialize)]
struct Settings {
    name: String,
    origin: Inline<Point>,
    database: Database,
}

const INPUT: &str = r#"
name = "MyApp"
origin = { x = 0, y = 0 }
legacy_flag = true   # no longer read by this version

[database]
url = 'postgres://localhost/app'
pool = 8
"#;

fn main() -> Result<(), Box<dyn Error>> {
    // Unknown keys are rejected by default
    match from_str::<Settings>(INPUT) {
        Ok(_) => println!("unexpected success"),
        Err(e) => println!("Default config: {}\n", e),
    }

    // ...and skipped when asked to
    let lenient = TomlConfig::new().with_ignore_unknown_names(true);
    let settings: Settings = from_str_with_config(INPUT, &lenient)?;
    println!("Lenient config: {:?}\n", settings);

    // Default output: four-space indentation, nulls written out
    println!("Default output:");
    println!("{}", to_string_with_config(&settings, &TomlOutputConfig::default())?);

    // Two-space indentation, null values left out
    println!("Two spaces, no nulls:");
    let compact = TomlOutputConfig::new()
        .with_indentation(Indentation::TwoSpaces)
        .with_ignore_null_values(true);
    println!("{}", to_string_with_config(&settings, &compact)?);

    Ok(())
}
