use std::env;
use std::path::PathBuf;

use bft_core::load_manifest;
use bft_estimate::{estimate_table_rows, render_table_estimate};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("manifests/university.toml"));

    let manifest = load_manifest(&path)?;
    for table in &manifest.tables {
        let estimate = estimate_table_rows(&manifest, table);
        println!("{}\n", render_table_estimate(&estimate));
    }

    Ok(())
}
