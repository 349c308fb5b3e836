//! Basic TOML serialization and deserialization.
//!
//! Run with: cargo run --example simple

use serde::{Deserialize, Serialize};
use serde_toml_tree::{from_str, parse_str, to_string};
use std::error::Error;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Owner {
    name: String,
    email: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Service {
    name: String,
    port: u16,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Manifest {
    title: String,
    owner: Owner,
    services: Vec<Service>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let manifest = Manifest {
        title: "deployment".to_string(),
        owner: Owner {
            name: "Alice Johnson".to_string(),
            email: "alice@example.com".to_string(),
        },
        services: vec![
            Service {
                name: "api".to_string(),
                port: 8080,
            },
            Service {
                name: "metrics".to_string(),
                port: 9100,
            },
        ],
    };

    // Serialize to TOML
    let toml = to_string(&manifest)?;
    println!("TOML output:\n{}", toml);

    // The syntax tree behind it
    println!("Tree:\n{}", parse_str(&toml)?.pretty_str());

    // Deserialize back to struct
    let manifest_back: Manifest = from_str(&toml)?;
    assert_eq!(manifest, manifest_back);
    println!("✓ Round-trip successful");

    Ok(())
}
