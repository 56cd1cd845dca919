//! Batch evaluation of a policy over sampled states

use std::path::Path;
use std::time::Instant;

use tracing::span::EnteredSpan;

use super::Policy;
use crate::error::{NavfieldError, Result};
use crate::sampler::{ActionSample, StateSample};

/// Scope of one restore + forward pass; closes its span when dropped
struct EvalSession {
    _span: EnteredSpan,
    opened: Instant,
}

impl EvalSession {
    fn open(checkpoint: &Path, states: usize) -> Self {
        let span = tracing::info_span!(
            "evaluate",
            checkpoint = %checkpoint.display(),
            states
        )
        .entered();
        tracing::debug!("Evaluation session opened");
        Self {
            _span: span,
            opened: Instant::now(),
        }
    }
}

impl Drop for EvalSession {
    fn drop(&mut self) {
        tracing::debug!("Evaluation session closed after {:?}", self.opened.elapsed());
    }
}

/// Restore `policy` from `checkpoint` and compute one action per state
pub fn evaluate<P: Policy>(
    policy: &mut P,
    states: &StateSample,
    checkpoint: &Path,
) -> Result<ActionSample> {
    let _session = EvalSession::open(checkpoint, states.len());

    policy.restore(checkpoint)?;
    let actions = policy.evaluate(states)?;

    if actions.len() != states.len() {
        return Err(NavfieldError::ActionCount {
            states: states.len(),
            actions: actions.len(),
        });
    }

    tracing::info!("Evaluated policy on {} states", states.len());
    Ok(actions)
}
