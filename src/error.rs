//! Error taxonomy for the alignment engine and the classifier.
//!
//! Every variant is a precondition violation detected at a component boundary
//! (construction or call entry). Nothing here is transient, so callers never
//! retry; the session layer decides what the user sees.

use thiserror::Error;

/// Errors surfaced by trajectory construction, alignment and classification.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LfdError {
    /// A trajectory with zero frames was aligned, stored or built.
    #[error("trajectory contains no frames")]
    EmptyTrajectory,

    /// Classification was requested against a library with no examples.
    #[error("example library is empty; no neighbours to vote")]
    EmptyLibrary,

    /// Channel lengths or joint counts are inconsistent.
    #[error("malformed trajectory: {reason}")]
    MalformedTrajectory { reason: String },

    /// A configuration value is out of range.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    /// Only labeled trajectories can vote, so only labeled ones are stored.
    #[error("trajectory {id} has no label and cannot be stored as an example")]
    UnlabeledExample { id: String },
}

impl LfdError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedTrajectory {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }
}

/// Convenience alias for results carrying an [`LfdError`].
pub type LfdResult<T> = std::result::Result<T, LfdError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            LfdError::EmptyTrajectory.to_string(),
            "trajectory contains no frames"
        );
        assert_eq!(
            LfdError::malformed("joint channel has 3 frames, pose channel has 4").to_string(),
            "malformed trajectory: joint channel has 3 frames, pose channel has 4"
        );
        assert_eq!(
            LfdError::invalid_config("k must be at least 1").to_string(),
            "invalid configuration: k must be at least 1"
        );
    }
}
