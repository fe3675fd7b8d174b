//! Error handling example for provstat-rs
//!
//! This example demonstrates proper error handling and edge cases

use provstat_rs::prelude::*;

fn main() -> Result<()> {
    println!("=== provstat-rs Error Handling Example ===\n");

    // Example 1: A missing source file aborts the load
    println!("--- Example 1: Loading from a directory without sources ---");
    let empty = SourceConfig::with_data_dir("/nonexistent");
    match Dataset::load(&empty) {
        Ok(_) => println!("✓ Unexpectedly loaded"),
        Err(StatError::NotFound(msg)) => println!("  Not found: {msg}"),
        Err(e) => {
            eprintln!("✗ Failed to load dataset: {e}");
            return Err(e);
        }
    }
    println!();

    let data_dir = std::env::args().nth(1).unwrap_or_else(|| ".".to_string());
    let ds = Dataset::load(&SourceConfig::with_data_dir(data_dir))?;

    // Example 2: Unknown provinces resolve to nothing
    println!("--- Example 2: Searching for non-existent provinces ---");
    for name in ["PAPUA TENGAH", "ATLANTIS", ""] {
        match ds.province(name) {
            Some(p) => println!("  Found: {}", p.name),
            None => println!("  Not found: {name:?}"),
        }
    }
    println!();

    // Example 3: Parsing caller input
    println!("--- Example 3: Parsing regions and metrics ---");
    for input in ["sumatra", "Bali & Nusa Tenggara", "Atlantis"] {
        match input.parse::<Region>() {
            Ok(r) => println!("  Region: {r}"),
            Err(e) => println!("  {e}"),
        }
    }
    for input in ["gini", "weather"] {
        match input.parse::<Metric>() {
            Ok(m) => println!("  Metric: {m}"),
            Err(e) => println!("  {e}"),
        }
    }
    println!();

    // Example 4: Missing values are not errors
    println!("--- Example 4: Safe access to optional values ---");
    for p in &ds.records {
        match p.crime_rate(2023) {
            Some(v) => println!("  {}: {v:.2}", p.name),
            None => println!("  {}: N/A", p.name),
        }
    }

    Ok(())
}
