//! Exforge Patterns
//!
//! Infers field-level transformation patterns from input/output examples and
//! filters them by confidence before they reach prompt generation.

pub mod detector;
pub mod error;
pub mod filter;

pub use detector::{DetectorConfig, PatternDetector};
pub use error::{FilterError, Result};
pub use filter::{ConfidenceBucket, ConfidenceFilter, FilteredPatternSet, ThresholdPreset};
