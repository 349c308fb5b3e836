use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde::{Deserialize, Serialize};
use serde_toml_tree::{from_str, parse_str, to_string, TomlOutputConfig};

#[derive(Serialize, Deserialize, Clone)]
struct Server {
    host: String,
    port: u16,
    tls: bool,
}

#[derive(Serialize, Deserialize, Clone)]
struct Product {
    sku: String,
    name: String,
    price: f64,
    quantity: u32,
}

#[derive(Serialize, Deserialize, Clone)]
struct Catalog {
    title: String,
    server: Server,
    products: Vec<Product>,
}

fn catalog(size: u32) -> Catalog {
    Catalog {
        title: "inventory".to_string(),
        server: Server {
            host: "localhost".to_string(),
            port: 8080,
            tls: false,
        },
        products: (0..size)
            .map(|i| Product {
                sku: format!("SKU{}", i),
                name: format!("Product {}", i),
                price: 9.99 + f64::from(i),
                quantity: i,
            })
            .collect(),
    }
}

fn benchmark_serialize_simple(c: &mut Criterion) {
    let server = Server {
        host: "localhost".to_string(),
        port: 8080,
        tls: true,
    };

    c.bench_function("serialize_simple_struct", |b| {
        b.iter(|| to_string(black_box(&server)))
    });
}

fn benchmark_deserialize_simple(c: &mut Criterion) {
    let toml = "host = \"localhost\"\nport = 8080\ntls = true";

    c.bench_function("deserialize_simple_struct", |b| {
        b.iter(|| from_str::<Server>(black_box(toml)))
    });
}

fn benchmark_array_of_tables(c: &mut Criterion) {
    let mut group = c.benchmark_group("array_of_tables");

    for size in [10, 50, 100, 500].iter() {
        let data = catalog(*size);
        let toml = to_string(&data).unwrap();

        group.bench_with_input(BenchmarkId::new("serialize", size), &data, |b, data| {
            b.iter(|| to_string(black_box(data)))
        });
        group.bench_with_input(BenchmarkId::new("deserialize", size), &toml, |b, toml| {
            b.iter(|| from_str::<Catalog>(black_box(toml)))
        });
    }
    group.finish();
}

fn benchmark_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree");
    let toml = to_string(&catalog(100)).unwrap();
    let file = parse_str(&toml).unwrap();
    let config = TomlOutputConfig::default();

    group.bench_function("parse", |b| b.iter(|| parse_str(black_box(&toml))));
    group.bench_function("emit", |b| b.iter(|| black_box(&file).emit(&config)));
    group.finish();
}

fn benchmark_values(c: &mut Criterion) {
    let mut group = c.benchmark_group("values");

    let numbers = "values = [ ".to_string()
        + &(0..100).map(|i| i.to_string()).collect::<Vec<_>>().join(", ")
        + " ]";
    let strings = "values = [ ".to_string()
        + &(0..100)
            .map(|i| format!("\"item \\t {}\"", i))
            .collect::<Vec<_>>()
            .join(", ")
        + " ]";
    let multiline = "text = \"\"\"\n".to_string() + &"a line of text\n".repeat(50) + "\"\"\"";

    group.bench_function("integer_array", |b| b.iter(|| parse_str(black_box(&numbers))));
    group.bench_function("string_array", |b| b.iter(|| parse_str(black_box(&strings))));
    group.bench_function("multiline_string", |b| {
        b.iter(|| parse_str(black_box(&multiline)))
    });
    group.finish();
}

criterion_group!(
    benches,
    benchmark_serialize_simple,
    benchmark_deserialize_simple,
    benchmark_array_of_tables,
    benchmark_tree,
    benchmark_values
);
criterion_main!(benches);
