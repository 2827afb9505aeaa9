//! Extractor capability

use crate::error::Result;
use crate::types::Record;

/// A component that turns one input record into one output record
///
/// Implementations are shared behind `Arc` by the registry, so they must be
/// thread-safe and stateless with respect to individual calls.
pub trait Extractor: Send + Sync {
    /// Extractor name
    fn name(&self) -> &str;

    /// Produce the output record for `input`
    fn extract(&self, input: &Record) -> Result<Record>;
}
