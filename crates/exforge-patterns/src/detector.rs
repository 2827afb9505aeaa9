//! Pattern detection from input/output examples
//!
//! Every output leaf is compared against every input leaf under each
//! single-value transformation, plus space-joined pairs of string inputs.
//! A candidate's confidence is the share of examples it explains among the
//! examples that carry the target field, adjusted for thin support.

use exforge_core::types::record::{depth, flatten};
use exforge_core::{Example, Pattern, PatternType, Record, Transformation};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Separator recognised for concatenation patterns
pub const CONCAT_SEPARATOR: &str = " ";

/// Detector tuning knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Candidates explained by fewer examples than this are scaled down
    pub min_support: usize,

    /// Upper bound on confidence when only one example is available
    pub single_example_cap: f64,

    /// Candidates below this confidence are dropped
    pub min_confidence: f64,

    /// Raw example pairs kept on each pattern
    pub max_examples_per_pattern: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_support: 2,
            single_example_cap: 0.7,
            min_confidence: 0.0,
            max_examples_per_pattern: 3,
        }
    }
}

/// Infers patterns from example pairs
#[derive(Debug, Clone, Default)]
pub struct PatternDetector {
    config: DetectorConfig,
}

/// Flattened view of one example
struct FlatExample<'a> {
    input: BTreeMap<String, &'a Record>,
    output: BTreeMap<String, &'a Record>,
}

/// Evidence gathered for one (sources, target, transformation) candidate
struct Evidence {
    explained: usize,
    samples: Vec<(Record, Record)>,
}

impl PatternDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Detect patterns; the result is sorted by confidence descending, then
    /// by source and target path
    pub fn detect(&self, examples: &[Example]) -> Vec<Pattern> {
        if examples.is_empty() {
            return Vec::new();
        }

        let flat: Vec<FlatExample<'_>> = examples
            .iter()
            .map(|ex| FlatExample {
                input: flatten(ex.input()).into_iter().collect(),
                output: flatten(ex.output()).into_iter().collect(),
            })
            .collect();

        let sources: BTreeSet<&str> = flat
            .iter()
            .flat_map(|f| f.input.keys().map(String::as_str))
            .collect();
        let targets: BTreeSet<&str> = flat
            .iter()
            .flat_map(|f| f.output.keys().map(String::as_str))
            .collect();

        let mut best: BTreeMap<(String, String), Pattern> = BTreeMap::new();

        for target in &targets {
            let total = flat.iter().filter(|f| f.output.contains_key(*target)).count();
            if total == 0 {
                continue;
            }

            for source in &sources {
                for transformation in Transformation::SCALAR_PRIORITY.iter() {
                    let evidence = self.scalar_evidence(&flat, source, target, transformation);
                    self.offer(
                        &mut best,
                        examples.len(),
                        total,
                        source.to_string(),
                        target,
                        transformation.clone(),
                        evidence,
                    );
                }
            }

            for first in &sources {
                for second in &sources {
                    if first == second {
                        continue;
                    }
                    let evidence = self.concat_evidence(&flat, first, second, target);
                    self.offer(
                        &mut best,
                        examples.len(),
                        total,
                        format!("{}+{}", first, second),
                        target,
                        Transformation::Concatenate {
                            separator: CONCAT_SEPARATOR.to_string(),
                        },
                        evidence,
                    );
                }
            }
        }

        let mut patterns: Vec<Pattern> = best
            .into_values()
            .filter(|p| p.confidence >= self.config.min_confidence)
            .collect();
        sort_patterns(&mut patterns);

        tracing::debug!(
            examples = examples.len(),
            patterns = patterns.len(),
            "pattern detection finished"
        );
        patterns
    }

    // =========================================================================
    // EVIDENCE
    // =========================================================================

    fn scalar_evidence(
        &self,
        flat: &[FlatExample<'_>],
        source: &str,
        target: &str,
        transformation: &Transformation,
    ) -> Evidence {
        let mut evidence = Evidence {
            explained: 0,
            samples: Vec::new(),
        };
        for f in flat {
            let (Some(input), Some(output)) = (f.input.get(source), f.output.get(target)) else {
                continue;
            };
            if transformation.apply(input).as_ref() == Some(*output) {
                evidence.explained += 1;
                if evidence.samples.len() < self.config.max_examples_per_pattern {
                    evidence.samples.push(((*input).clone(), (*output).clone()));
                }
            }
        }
        evidence
    }

    fn concat_evidence(
        &self,
        flat: &[FlatExample<'_>],
        first: &str,
        second: &str,
        target: &str,
    ) -> Evidence {
        let joiner = Transformation::Concatenate {
            separator: CONCAT_SEPARATOR.to_string(),
        };
        let mut evidence = Evidence {
            explained: 0,
            samples: Vec::new(),
        };
        for f in flat {
            let (Some(a), Some(b), Some(output)) = (
                f.input.get(first),
                f.input.get(second),
                f.output.get(target),
            ) else {
                continue;
            };
            if joiner.apply_many(&[*a, *b]).as_ref() == Some(*output) {
                evidence.explained += 1;
                if evidence.samples.len() < self.config.max_examples_per_pattern {
                    let raw_in = Record::Array(vec![(*a).clone(), (*b).clone()]);
                    evidence.samples.push((raw_in, (*output).clone()));
                }
            }
        }
        evidence
    }

    /// Score a candidate and keep it if it beats what is already known for
    /// the same source/target pair
    #[allow(clippy::too_many_arguments)]
    fn offer(
        &self,
        best: &mut BTreeMap<(String, String), Pattern>,
        example_count: usize,
        total: usize,
        source_path: String,
        target: &str,
        transformation: Transformation,
        evidence: Evidence,
    ) {
        if evidence.explained == 0 {
            return;
        }

        let confidence = self.score(example_count, total, evidence.explained);
        let pattern_type = classify(&source_path, target, &transformation);
        let key = (source_path, target.to_string());

        // strictly greater: on ties the earlier (simpler) transformation stays
        if let Some(existing) = best.get(&key) {
            if existing.confidence >= confidence {
                return;
            }
        }

        let pattern = Pattern::new(
            pattern_type,
            confidence,
            key.0.clone(),
            key.1.clone(),
            transformation,
        )
        .with_examples(evidence.samples);
        best.insert(key, pattern);
    }

    fn score(&self, example_count: usize, total: usize, explained: usize) -> f64 {
        let mut confidence = explained as f64 / total as f64;
        if example_count == 1 {
            confidence = confidence.min(self.config.single_example_cap);
        } else if explained < self.config.min_support {
            confidence *= explained as f64 / self.config.min_support as f64;
        }
        confidence
    }
}

/// Pattern type for a candidate
fn classify(source_path: &str, target_path: &str, transformation: &Transformation) -> PatternType {
    if matches!(transformation, Transformation::Concatenate { .. }) {
        PatternType::Concatenation
    } else if transformation.is_coercion() {
        PatternType::TypeCoercion
    } else if transformation.is_string_transform() {
        PatternType::StringTransform
    } else {
        let (sd, td) = (depth(source_path), depth(target_path));
        if sd > 1 || td > 1 || sd != td {
            PatternType::NestedPath
        } else {
            PatternType::FieldMapping
        }
    }
}

/// Sort by confidence descending, then source path, then target path
pub fn sort_patterns(patterns: &mut [Pattern]) {
    patterns.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.source_path.cmp(&b.source_path))
            .then_with(|| a.target_path.cmp(&b.target_path))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ex(input: Record, output: Record) -> Example {
        Example::new(input, output).unwrap()
    }

    #[test]
    fn test_empty_input() {
        assert!(PatternDetector::default().detect(&[]).is_empty());
    }

    #[test]
    fn test_single_example_capped() {
        let patterns =
            PatternDetector::default().detect(&[ex(json!({"a": "x"}), json!({"b": "x"}))]);
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].confidence, 0.7);
        assert_eq!(patterns[0].pattern_type, PatternType::FieldMapping);
    }

    #[test]
    fn test_thin_support_scaled() {
        // only one of three examples explains a -> b
        let patterns = PatternDetector::default().detect(&[
            ex(json!({"a": "x"}), json!({"b": "x"})),
            ex(json!({"a": "y"}), json!({"b": "z"})),
            ex(json!({"a": "q"}), json!({"b": "w"})),
        ]);
        assert_eq!(patterns.len(), 1);
        let expected = (1.0 / 3.0) * 0.5;
        assert!((patterns[0].confidence - expected).abs() < 1e-9);
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            classify("user.name", "name", &Transformation::Identity),
            PatternType::NestedPath
        );
        assert_eq!(
            classify("age", "age", &Transformation::ToInteger),
            PatternType::TypeCoercion
        );
        assert_eq!(
            classify("code", "code", &Transformation::Uppercase),
            PatternType::StringTransform
        );
    }

    #[test]
    fn test_tie_keeps_simpler_transformation() {
        // identity and to_string both explain string -> same string
        let patterns = PatternDetector::default().detect(&[
            ex(json!({"a": "x"}), json!({"b": "x"})),
            ex(json!({"a": "y"}), json!({"b": "y"})),
        ]);
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].transformation, Transformation::Identity);
    }
}
