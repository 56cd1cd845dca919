//! Trained navigation policy
//!
//! The policy is treated as an opaque state -> action function behind the
//! [`Policy`] trait. The shipped implementation is a Burn feed-forward network
//! restored from a named MessagePack checkpoint:
//!
//! ```text
//! policy-config.json ──► PolicyConfig ──► FeedforwardPolicy (untrained)
//!                                              │
//! checkpoint.mpk ───────────── restore() ──────┤  + shape check
//!                                              ▼
//! StateSample ─────────────── evaluate() ──► ActionSample
//! ```

pub mod config;
pub mod evaluator;
pub mod model;
pub mod restore;

use std::path::Path;

use crate::error::Result;
use crate::sampler::{ActionSample, StateSample};

pub use config::{Activation, PolicyConfig};
pub use evaluator::evaluate;
pub use model::FeedforwardPolicy;
pub use restore::{BurnPolicy, InferenceBackend};

/// A state -> action function with restorable parameters
pub trait Policy {
    /// Load trained parameters, replacing whatever the policy held before
    fn restore(&mut self, checkpoint: &Path) -> Result<()>;

    /// One action per state, in the same order
    fn evaluate(&self, states: &StateSample) -> Result<ActionSample>;
}
