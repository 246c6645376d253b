//! Top-level acquisition errors.

use thiserror::Error;

/// Errors surfaced by [`crate::Mincer::mince`].
///
/// Individual fetch or navigation failures never appear here; they feed tier
/// escalation internally. An `Exhausted` error means every tier failed and
/// the orchestrator has already torn down its browser resources, and the caller
/// must construct a new instance to continue.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    /// The target URL could not be parsed.
    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    /// All acquisition tiers failed for this URL.
    #[error("could not mince URL {url}: all acquisition tiers exhausted")]
    Exhausted { url: String },
}
