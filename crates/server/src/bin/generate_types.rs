//! Run with: cargo run --package server --bin generate-types --features typescript

use std::fs;
use std::path::Path;

#[cfg(feature = "typescript")]
const EXPORTED: [&str; 7] = [
    "College",
    "ComparisonEntry",
    "ComparisonAnalysis",
    "StoreSnapshot",
    "SearchForm",
    "EventEnvelope",
    "Event",
];

fn main() {
    println!("Generating TypeScript types...");

    let out_dir = Path::new("web/src/types/generated");

    if let Err(e) = fs::create_dir_all(out_dir) {
        eprintln!("Failed to create output directory: {}", e);
        std::process::exit(1);
    }

    #[cfg(feature = "typescript")]
    {
        use ts_rs::TS;

        compass_core::College::export_all_to(out_dir).expect("Failed to export College");
        compass_core::ComparisonEntry::export_all_to(out_dir)
            .expect("Failed to export ComparisonEntry");
        compass_core::ComparisonAnalysis::export_all_to(out_dir)
            .expect("Failed to export ComparisonAnalysis");

        orchestrator::StoreSnapshot::export_all_to(out_dir)
            .expect("Failed to export StoreSnapshot");
        orchestrator::SearchForm::export_all_to(out_dir).expect("Failed to export SearchForm");

        events::EventEnvelope::export_all_to(out_dir).expect("Failed to export EventEnvelope");
        events::Event::export_all_to(out_dir).expect("Failed to export Event");

        println!("Types exported to {}", out_dir.display());

        generate_index(out_dir);
    }

    #[cfg(not(feature = "typescript"))]
    {
        eprintln!("Error: typescript feature is not enabled");
        eprintln!("Run with: cargo run --package server --bin generate-types --features typescript");
        std::process::exit(1);
    }
}

#[cfg(feature = "typescript")]
fn generate_index(out_dir: &Path) {
    let index_path = out_dir.join("index.ts");

    let mut exports = String::from(
        "// Auto-generated - regenerate with: cargo run --package server --bin generate-types --features typescript\n\n",
    );
    for name in EXPORTED {
        exports.push_str(&format!("export * from './{}';\n", name));
    }

    fs::write(&index_path, exports).expect("Failed to write index.ts");

    println!("Generated {}", index_path.display());
}
