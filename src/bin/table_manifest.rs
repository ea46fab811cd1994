use salesdash::schema::{analyze_csv, default_manifest_path, table_for_file};
use std::env;
use std::fs;
use std::path::PathBuf;

fn main() {
    let path = env::args()
        .nth(1)
        .unwrap_or_else(|| "data/orders.csv".to_string());
    let path = PathBuf::from(path);

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let table = match table_for_file(stem) {
        Some(t) => t,
        None => {
            eprintln!("unknown table file: {} (expected one of the five source tables)", stem);
            std::process::exit(1);
        }
    };

    let manifest = match analyze_csv(table, &path) {
        Ok(m) => m,
        Err(err) => {
            eprintln!("analysis failed: {}", err);
            std::process::exit(2);
        }
    };

    let out_path = default_manifest_path(&path);
    let payload = match serde_json::to_string_pretty(&manifest) {
        Ok(p) => p,
        Err(err) => {
            eprintln!("serialization failed: {}", err);
            std::process::exit(3);
        }
    };
    if let Err(err) = fs::write(&out_path, payload) {
        eprintln!("failed to write {}: {}", out_path.display(), err);
        std::process::exit(4);
    }
    println!("{}", out_path.display());
}
