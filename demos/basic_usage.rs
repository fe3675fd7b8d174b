//! Basic usage example for provstat-rs
//!
//! This example demonstrates how to:
//! - Load and harmonize the provincial dataset
//! - List regions and provinces
//! - Filter by region and rank provinces
//! - Use the caching mechanism
//!
//! Run from a directory holding `dataset/` and `map/`, or pass one:
//!   cargo run --example basic_usage -- ./data

use provstat_rs::prelude::*;
use std::sync::Arc;

fn main() -> Result<()> {
    println!("=== provstat-rs Basic Usage Example ===\n");

    let data_dir = std::env::args().nth(1).unwrap_or_else(|| ".".to_string());
    let config = SourceConfig::with_data_dir(&data_dir);

    // Load the dataset
    println!("Loading dataset from {data_dir}...");
    let ds = Dataset::load(&config)?;
    println!("✓ Dataset loaded successfully\n");

    // Example 1: Regions and provinces
    println!("--- Example 1: Regions ---");
    for region in ds.regions() {
        println!("{region}: {}", ds.provinces(Some(region)).join(", "));
    }
    println!();

    // Example 2: One province, any spelling
    println!("--- Example 2: Find province by source spelling ---");
    if let Some(p) = ds.province("Metro Jaya") {
        println!("Found: {}", p.name);
        println!("Region: {:?}", p.region);
        println!("Crime rate 2023: {:?}", p.crime_rate(2023));
        println!("Gini ratio: {:?}", p.gini_ratio);
    }
    println!();

    // Example 3: Top crime rates within a region
    println!("--- Example 3: Highest crime rates in Sumatra ---");
    let sumatra = Selection::all().with_region(Region::Sumatra);
    for (i, (p, rate)) in top_provinces(sumatra.apply(&ds.records), 2023, 5).iter().enumerate() {
        println!("{}. {} ({rate:.2})", i + 1, p.name);
    }
    println!();

    // Example 4: National trend
    println!("--- Example 4: National crime trend ---");
    let trend = crime_trend(&ds.crime_series, &Selection::all(), 2012..=2023);
    for point in &trend.points {
        println!("{}: {:.2}", point.year, point.value);
    }
    println!();

    // Example 5: Cached loads
    println!("--- Example 5: Cache ---");
    let again = Dataset::load(&config)?;
    println!("Same instance from cache: {}", Arc::ptr_eq(&ds, &again));
    Dataset::invalidate(&config);
    let fresh = Dataset::load(&config)?;
    println!("Same instance after invalidate: {}", Arc::ptr_eq(&ds, &fresh));

    Ok(())
}
