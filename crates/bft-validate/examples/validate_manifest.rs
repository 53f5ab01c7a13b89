use std::env;
use std::path::PathBuf;

use bft_core::load_manifest;
use bft_validate::{ValidationReport, validate_manifest};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("manifests/university.toml"));

    let manifest = load_manifest(&path)?;
    let report = validate_manifest(&manifest);

    if report.is_ok() {
        println!("manifest validated successfully");
    } else {
        eprintln!("manifest validation failed");
        print_report(&report);
        std::process::exit(1);
    }

    Ok(())
}

fn print_report(report: &ValidationReport) {
    for error in &report.errors {
        let path = error.path.as_deref().unwrap_or("/");
        eprintln!("error {} {}: {}", error.rule, path, error.message);
        if let Some(hint) = &error.hint {
            eprintln!("  hint: {hint}");
        }
    }
}
