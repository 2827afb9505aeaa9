//! YAML extraction from model output
//!
//! Models wrap YAML in markdown fences or surround it with prose.
//! `locate_yaml` only finds the candidate text so that syntax problems can be
//! reported by validation; `extract_yaml` also requires it to parse.

use crate::error::{LLMError, Result};
use regex::Regex;
use std::sync::OnceLock;

const END_MARKERS: [&str; 4] = [
    "\n\nNote:",
    "\n\nExplanation:",
    "\n\nThis extractor",
    "\n\nThe above",
];

const START_KEYS: [&str; 2] = ["extractor:", "plan:"];

fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?s)```[ \t]*(?:yaml|yml)?[ \t]*\r?\n(.*?)```")
            .expect("fence pattern is a valid regex")
    })
}

/// Locate YAML-looking content in model output without parsing it
pub fn locate_yaml(llm_output: &str) -> Option<String> {
    let cleaned = llm_output.trim();
    if cleaned.is_empty() {
        return None;
    }

    if let Some(caps) = fence_regex().captures(cleaned) {
        let body = caps.get(1).map(|m| m.as_str().trim()).unwrap_or("");
        if is_likely_yaml(body) {
            return Some(body.to_string());
        }
    }

    // a known top-level key at the start of a line
    for key in START_KEYS {
        let found = if cleaned.starts_with(key) {
            Some(0)
        } else {
            cleaned.find(&format!("\n{}", key)).map(|p| p + 1)
        };
        if let Some(start) = found {
            let candidate = &cleaned[start..];
            let end = END_MARKERS
                .iter()
                .filter_map(|m| candidate.find(m))
                .min()
                .unwrap_or(candidate.len());
            return Some(candidate[..end].trim().to_string());
        }
    }

    if is_likely_yaml(cleaned) {
        return Some(cleaned.to_string());
    }
    None
}

/// Extract YAML from model output and check that it parses
pub fn extract_yaml(llm_output: &str) -> Result<String> {
    let yaml = locate_yaml(llm_output).ok_or_else(|| {
        LLMError::InvalidResponse("Content does not appear to contain YAML".to_string())
    })?;

    serde_yaml::from_str::<serde_yaml::Value>(&yaml)
        .map_err(|e| LLMError::InvalidResponse(format!("Invalid YAML: {}", e)))?;

    Ok(yaml)
}

/// Heuristic: first non-comment line is a key or list item
fn is_likely_yaml(content: &str) -> bool {
    let first = content
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty() && !l.starts_with('#'));
    match first {
        Some(line) => {
            line.starts_with("- ")
                || line
                    .split_once(':')
                    .map_or(false, |(key, _)| !key.is_empty() && !key.contains(' '))
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_from_markdown_yaml() {
        let input = "Here's the extractor:\n\n```yaml\nextractor:\n  name: person\noperations: []\n```\n\nThis extractor copies names.";
        let result = extract_yaml(input).unwrap();
        assert!(result.starts_with("extractor:"));
        assert!(!result.contains("copies names"));
    }

    #[test]
    fn test_extract_from_plain_fence() {
        let input = "```\nplan:\n  fields: []\n```";
        assert_eq!(extract_yaml(input).unwrap(), "plan:\n  fields: []");
    }

    #[test]
    fn test_extract_after_prose() {
        let input = "Sure, here it is\nextractor:\n  name: x\n\nNote: uses text.lower";
        let result = extract_yaml(input).unwrap();
        assert_eq!(result, "extractor:\n  name: x");
    }

    #[test]
    fn test_not_yaml() {
        assert!(extract_yaml("This is not YAML at all, just random text.").is_err());
        assert!(extract_yaml("   \n\n  ").is_err());
        assert!(locate_yaml("").is_none());
    }

    #[test]
    fn test_locate_keeps_malformed_yaml() {
        let input = "extractor:\n  name: [unclosed\n";
        assert!(locate_yaml(input).is_some());
        assert!(extract_yaml(input).is_err());
    }
}
