//! Error type shared by every stage of the pipeline.

use std::fmt;
use std::path::PathBuf;

/// Errors arising while loading inputs, restoring the policy or preparing plots.
///
/// None of these are recovered from: they propagate to `main` and end the run.
#[derive(Debug)]
pub enum NavfieldError {
    /// A domain document could not be found for the requested id.
    DomainNotFound {
        /// The id passed on the command line.
        id: String,
        /// Every location that was tried.
        searched: Vec<PathBuf>,
    },
    /// A configuration or domain document is unreadable or malformed.
    Config {
        /// File the problem was found in.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },
    /// A fluent required by the grid extractor is absent or badly shaped.
    Fluent {
        /// Fluent name, e.g. `GOAL/1`.
        name: String,
        /// What went wrong.
        reason: String,
    },
    /// Zone centers and zone decays do not pair up one-to-one.
    ZoneCountMismatch { centers: usize, decays: usize },
    /// A zone decay is negative or not finite.
    InvalidDecay { zone: usize, decay: f64 },
    /// The bounding box argument is malformed.
    BoundingBox { input: String, reason: String },
    /// The sampling resolution is not a positive integer.
    Resolution { input: String },
    /// The checkpoint file does not exist or could not be decoded.
    Checkpoint { path: PathBuf, reason: String },
    /// Restored parameters do not fit the configured architecture.
    ShapeMismatch {
        layer: String,
        expected: Vec<usize>,
        found: Vec<usize>,
    },
    /// The policy was evaluated before any checkpoint was restored.
    NotRestored,
    /// The forward pass produced data that could not be read back.
    Inference { reason: String },
    /// The policy returned a different number of actions than it was given states.
    ActionCount { states: usize, actions: usize },
}

impl fmt::Display for NavfieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DomainNotFound { id, searched } => {
                write!(f, "no domain document for '{id}' (searched {searched:?})")
            }
            Self::Config { path, reason } => {
                write!(f, "invalid configuration in {}: {reason}", path.display())
            }
            Self::Fluent { name, reason } => write!(f, "fluent '{name}': {reason}"),
            Self::ZoneCountMismatch { centers, decays } => write!(
                f,
                "deceleration zones are misaligned: {centers} centers but {decays} decays"
            ),
            Self::InvalidDecay { zone, decay } => {
                write!(f, "zone {zone} has invalid decay {decay}")
            }
            Self::BoundingBox { input, reason } => {
                write!(f, "invalid bounding box '{input}': {reason}")
            }
            Self::Resolution { input } => {
                write!(f, "invalid npoints '{input}': expected a positive integer")
            }
            Self::Checkpoint { path, reason } => {
                write!(f, "cannot restore checkpoint {}: {reason}", path.display())
            }
            Self::ShapeMismatch {
                layer,
                expected,
                found,
            } => write!(
                f,
                "checkpoint does not match policy architecture: layer {layer} expected {expected:?}, found {found:?}"
            ),
            Self::NotRestored => write!(f, "policy evaluated before a checkpoint was restored"),
            Self::Inference { reason } => write!(f, "policy inference failed: {reason}"),
            Self::ActionCount { states, actions } => write!(
                f,
                "policy produced {actions} actions for {states} states"
            ),
        }
    }
}

impl std::error::Error for NavfieldError {}

pub type Result<T> = std::result::Result<T, NavfieldError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_the_offending_layer() {
        let err = NavfieldError::ShapeMismatch {
            layer: "hidden.0".to_string(),
            expected: vec![2, 64],
            found: vec![2, 32],
        };
        let msg = err.to_string();
        assert!(msg.contains("hidden.0"));
        assert!(msg.contains("[2, 64]"));
    }

    #[test]
    fn test_zone_mismatch_message() {
        let err = NavfieldError::ZoneCountMismatch {
            centers: 3,
            decays: 2,
        };
        assert_eq!(
            err.to_string(),
            "deceleration zones are misaligned: 3 centers but 2 decays"
        );
    }
}
