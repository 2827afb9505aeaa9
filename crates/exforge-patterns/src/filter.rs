//! Confidence threshold filtering
//!
//! Produces a borrowed, partitioned view over detected patterns. Nothing is
//! cloned; changing the threshold means building a new view.

use crate::error::{FilterError, Result};
use exforge_core::Pattern;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::str::FromStr;

/// Lower bound of the high-confidence bucket
pub const HIGH_CONFIDENCE: f64 = 0.8;

/// Lower bound of the medium-confidence bucket
pub const MEDIUM_CONFIDENCE: f64 = 0.5;

/// Named threshold presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdPreset {
    Conservative,
    Balanced,
    Aggressive,
    Custom,
}

impl ThresholdPreset {
    /// Fixed threshold for the preset; `None` for `Custom`
    pub fn threshold(&self) -> Option<f64> {
        match self {
            ThresholdPreset::Conservative => Some(0.8),
            ThresholdPreset::Balanced => Some(0.5),
            ThresholdPreset::Aggressive => Some(0.2),
            ThresholdPreset::Custom => None,
        }
    }

    /// Resolve the effective threshold, validating custom values
    pub fn resolve(&self, custom: Option<f64>) -> Result<f64> {
        match self.threshold() {
            Some(t) => Ok(t),
            None => {
                let t = custom.ok_or(FilterError::MissingCustomThreshold)?;
                validate_threshold(t)?;
                Ok(t)
            }
        }
    }
}

impl Default for ThresholdPreset {
    fn default() -> Self {
        ThresholdPreset::Balanced
    }
}

impl FromStr for ThresholdPreset {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "conservative" => Ok(ThresholdPreset::Conservative),
            "balanced" => Ok(ThresholdPreset::Balanced),
            "aggressive" => Ok(ThresholdPreset::Aggressive),
            "custom" => Ok(ThresholdPreset::Custom),
            other => Err(FilterError::UnknownPreset(other.to_string())),
        }
    }
}

/// Confidence bucket of an accepted pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceBucket {
    High,
    Medium,
    Low,
}

impl ConfidenceBucket {
    pub fn of(confidence: f64) -> Self {
        if confidence >= HIGH_CONFIDENCE {
            ConfidenceBucket::High
        } else if confidence >= MEDIUM_CONFIDENCE {
            ConfidenceBucket::Medium
        } else {
            ConfidenceBucket::Low
        }
    }
}

/// Patterns partitioned by an applied threshold
#[derive(Debug, Clone)]
pub struct FilteredPatternSet<'a> {
    all: &'a [Pattern],
    threshold: f64,
    accepted: Vec<&'a Pattern>,
    rejected: Vec<&'a Pattern>,
}

impl<'a> FilteredPatternSet<'a> {
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn accepted(&self) -> &[&'a Pattern] {
        &self.accepted
    }

    pub fn rejected(&self) -> &[&'a Pattern] {
        &self.rejected
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// Accepted patterns falling into `bucket`
    pub fn bucket(&self, bucket: ConfidenceBucket) -> Vec<&'a Pattern> {
        self.accepted
            .iter()
            .copied()
            .filter(|p| ConfidenceBucket::of(p.confidence) == bucket)
            .collect()
    }

    pub fn high(&self) -> Vec<&'a Pattern> {
        self.bucket(ConfidenceBucket::High)
    }

    pub fn medium(&self) -> Vec<&'a Pattern> {
        self.bucket(ConfidenceBucket::Medium)
    }

    pub fn low(&self) -> Vec<&'a Pattern> {
        self.bucket(ConfidenceBucket::Low)
    }

    /// Re-partition the same patterns under a different threshold
    pub fn with_threshold(&self, threshold: f64) -> Result<FilteredPatternSet<'a>> {
        ConfidenceFilter::filter(self.all, threshold)
    }
}

/// Applies confidence thresholds to detected patterns
pub struct ConfidenceFilter;

impl ConfidenceFilter {
    /// Accept every pattern whose confidence is at least `threshold`
    pub fn filter(patterns: &[Pattern], threshold: f64) -> Result<FilteredPatternSet<'_>> {
        validate_threshold(threshold)?;

        let (accepted, rejected): (Vec<&Pattern>, Vec<&Pattern>) =
            patterns.iter().partition(|p| p.confidence >= threshold);

        Ok(FilteredPatternSet {
            all: patterns,
            threshold,
            accepted,
            rejected,
        })
    }

    /// Filter with a named preset; `Custom` requires `custom`
    pub fn filter_with_preset(
        patterns: &[Pattern],
        preset: ThresholdPreset,
        custom: Option<f64>,
    ) -> Result<FilteredPatternSet<'_>> {
        let threshold = preset.resolve(custom)?;
        Self::filter(patterns, threshold)
    }

    /// Human-readable summary of a filtered set
    pub fn summarize(set: &FilteredPatternSet<'_>) -> String {
        let mut out = String::new();
        let high = set.high().len();
        let _ = writeln!(out, "Confidence threshold: {:.2}", set.threshold());
        let _ = writeln!(
            out,
            "Accepted: {} / Rejected: {}",
            set.accepted().len(),
            set.rejected().len()
        );
        let _ = writeln!(
            out,
            "High (>= {:.1}): {}, Medium: {}, Low: {}",
            HIGH_CONFIDENCE,
            high,
            set.medium().len(),
            set.low().len()
        );
        if high == 0 {
            let _ = writeln!(
                out,
                "Warning: no high-confidence patterns; consider adding more examples"
            );
        }
        out
    }
}

fn validate_threshold(threshold: f64) -> Result<()> {
    if threshold.is_nan() || !(0.0..=1.0).contains(&threshold) {
        return Err(FilterError::InvalidThreshold(threshold));
    }
    Ok(())
}
