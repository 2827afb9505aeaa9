//! Pattern detection example
//!
//! This example demonstrates:
//! - Loading example pairs from a JSON file
//! - Detecting transformation patterns
//! - Filtering them with each threshold preset

use exforge_core::Example;
use exforge_patterns::{ConfidenceFilter, DetectorConfig, PatternDetector, ThresholdPreset};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Pattern Detection Example ===\n");

    let examples = Example::load_json_file("demos/data/person_examples.json")?;
    println!("Loaded {} examples\n", examples.len());

    let detector = PatternDetector::new(DetectorConfig::default());
    let patterns = detector.detect(&examples);

    println!("Detected patterns:");
    for pattern in &patterns {
        println!(
            "  {:.2}  {} -> {}  ({}, {})",
            pattern.confidence,
            pattern.source_path,
            pattern.target_path,
            pattern.pattern_type,
            pattern.transformation
        );
    }

    for preset in [
        ThresholdPreset::Conservative,
        ThresholdPreset::Balanced,
        ThresholdPreset::Aggressive,
    ] {
        let filtered = ConfidenceFilter::filter_with_preset(&patterns, preset, None)?;
        println!("\n--- {:?} ---", preset);
        print!("{}", ConfidenceFilter::summarize(&filtered));
    }

    Ok(())
}
