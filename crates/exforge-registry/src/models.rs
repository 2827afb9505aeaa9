//! Registry data models

use crate::error::{RegistryError, RegistryResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Dotted numeric version (`1`, `1.2`, `1.2.0`, ...)
///
/// Trailing zero components are not significant: `1.2` and `1.2.0` compare
/// equal. The original spelling is kept for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    raw: String,
    parts: Vec<u64>,
}

impl Version {
    pub fn parts(&self) -> &[u64] {
        &self.parts
    }

    fn significant(&self) -> &[u64] {
        let end = self
            .parts
            .iter()
            .rposition(|&p| p != 0)
            .map_or(0, |i| i + 1);
        &self.parts[..end]
    }
}

impl FromStr for Version {
    type Err = RegistryError;

    fn from_str(s: &str) -> RegistryResult<Self> {
        let trimmed = s.trim();
        let parts = trimmed
            .split('.')
            .map(|p| p.parse::<u64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| RegistryError::InvalidVersion(s.to_string()))?;
        Ok(Version {
            raw: trimmed.to_string(),
            parts,
        })
    }
}

impl TryFrom<String> for Version {
    type Error = RegistryError;

    fn try_from(value: String) -> RegistryResult<Self> {
        value.parse()
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.raw
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.significant() == other.significant()
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.significant().hash(state);
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.significant().cmp(other.significant())
    }
}

/// Metadata for one registered extractor version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub name: String,
    pub version: Version,

    /// `builtin:<id>` or a path to an extractor document
    pub implementation_path: String,

    /// Mean confidence of the patterns the extractor was synthesized from
    #[serde(default)]
    pub confidence: f64,

    #[serde(default)]
    pub example_count: usize,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl RegistryEntry {
    pub fn new(
        name: impl Into<String>,
        version: Version,
        implementation_path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version,
            implementation_path: implementation_path.into(),
            confidence: 0.0,
            example_count: 0,
            tags: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_example_count(mut self, count: usize) -> Self {
        self.example_count = count;
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Whether the entry carries every tag in `tags`
    pub fn has_all_tags(&self, tags: &[&str]) -> bool {
        tags.iter().all(|t| self.tags.iter().any(|own| own == t))
    }

    pub fn key(&self) -> (String, Version) {
        (self.name.clone(), self.version.clone())
    }

    pub fn validate(&self) -> RegistryResult<()> {
        if self.name.trim().is_empty() {
            return Err(RegistryError::InvalidEntry("name is empty".to_string()));
        }
        if self.implementation_path.trim().is_empty() {
            return Err(RegistryError::InvalidEntry(format!(
                "{}@{}: implementation_path is empty",
                self.name, self.version
            )));
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(RegistryError::InvalidEntry(format!(
                "{}@{}: confidence {} is outside [0, 1]",
                self.name, self.version, self.confidence
            )));
        }
        Ok(())
    }
}

/// Result of `ExtractorRegistry::register`
#[derive(Debug, Clone, PartialEq)]
pub enum RegistrationOutcome {
    Inserted,
    Updated { previous: RegistryEntry },
}

/// On-disk layout of `registry.yaml`
#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct RegistryFile {
    #[serde(default)]
    pub entries: Vec<RegistryEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        s.parse().unwrap()
    }

    #[test]
    fn test_version_ordering() {
        assert!(v("1.10.0") > v("1.9.9"));
        assert!(v("2") > v("1.99"));
        assert_eq!(v("1.2"), v("1.2.0"));
        assert_eq!(v("1.2.0").to_string(), "1.2.0");
    }

    #[test]
    fn test_invalid_versions() {
        for bad in ["", "1..2", "v1.0", "1.0-beta", "1.-1"] {
            assert!(bad.parse::<Version>().is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_entry_validation() {
        let entry = RegistryEntry::new("person", v("1.0.0"), "person.yaml");
        assert!(entry.validate().is_ok());
        assert!(entry.clone().with_confidence(1.5).validate().is_err());
        assert!(entry.clone().with_confidence(f64::NAN).validate().is_err());
        assert!(RegistryEntry::new(" ", v("1"), "x").validate().is_err());
        assert!(RegistryEntry::new("p", v("1"), "").validate().is_err());
    }

    #[test]
    fn test_tag_filter() {
        let entry = RegistryEntry::new("p", v("1"), "x").with_tags(["crm", "pii"]);
        assert!(entry.has_all_tags(&[]));
        assert!(entry.has_all_tags(&["crm", "pii"]));
        assert!(!entry.has_all_tags(&["crm", "billing"]));
    }

    #[test]
    fn test_entry_yaml_round_trip_keeps_version_spelling() {
        let entry = RegistryEntry::new("p", v("1.0"), "x").with_example_count(3);
        let yaml = serde_yaml::to_string(&entry).unwrap();
        let back: RegistryEntry = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back.version.to_string(), "1.0");
        assert_eq!(back, entry);
    }
}
