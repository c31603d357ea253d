//! Headless simulation run
//!
//! Feeds a seeded simulated stream through the tracker and prints the
//! resulting counts and window statistics.
//!
//! Usage:
//!   cargo run -p iot-ids-core --example simulate [-- <ticks> [seed]]
//!
//! Example:
//!   cargo run -p iot-ids-core --example simulate -- 500 7

use chrono::Local;
use iot_ids_core::{Category, EventTracker, GeneratorConfig, SimulatedGenerator, TrackerConfig};
use std::env;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ticks = args.get(1).map(|s| s.parse::<usize>()).transpose()?.unwrap_or(200);
    let seed = args.get(2).map(|s| s.parse::<u64>()).transpose()?.unwrap_or(42);

    let config = TrackerConfig::new();
    let mut tracker = EventTracker::from_config(&config)?;
    let mut generator = SimulatedGenerator::from_seed(&GeneratorConfig::new(), seed)?;

    for _ in 0..ticks {
        let detection = generator.generate();
        tracker.ingest_detection(detection, config.confidence_threshold, Local::now());
    }

    let snapshot = tracker.snapshot();

    println!("=== SIMULATION SUMMARY ===");
    println!("Ticks: {} (seed {})", ticks, seed);
    println!("Total processed: {}", snapshot.total_processed);
    println!("Total attacks detected: {}", snapshot.total_attacks);
    println!("\nCategory counts:");
    for category in Category::ALL {
        println!("  {:<12} {}", category.label(), snapshot.count(category));
    }
    println!(
        "\nWindow ({} of {} kept): {} alerts, {} normal",
        snapshot.entries.len(),
        tracker.capacity(),
        snapshot.window_alerts,
        snapshot.window_normal
    );

    Ok(())
}
