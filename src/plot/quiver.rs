//! Arrow glyphs for the action field

use crate::grid::Point;
use crate::sampler::{ActionSample, StateSample};

/// Arrow head length as a fraction of the arrow length
const HEAD_FRACTION: f64 = 0.3;
/// Half-angle of the arrow head
const HEAD_ANGLE: f64 = 0.45;

/// An arrow in data coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arrow {
    pub tail: Point,
    pub tip: Point,
}

impl Arrow {
    pub fn length(&self) -> f64 {
        (self.tip.0 - self.tail.0).hypot(self.tip.1 - self.tail.1)
    }

    /// The two barbs of the head, each from the tip backwards.
    ///
    /// Head length is `HEAD_FRACTION` of the arrow, capped at `max_head`.
    /// Degenerate arrows have no head.
    pub fn head(&self, max_head: f64) -> Option<[(Point, Point); 2]> {
        let length = self.length();
        if !(length.is_finite() && length > 0.0) {
            return None;
        }

        let head = (HEAD_FRACTION * length).min(max_head);
        let back = (self.tail.0 - self.tip.0, self.tail.1 - self.tip.1);
        let (ux, uy) = (back.0 / length, back.1 / length);

        let barb = |angle: f64| {
            let (s, c) = angle.sin_cos();
            let dir = (ux * c - uy * s, ux * s + uy * c);
            (self.tip, (self.tip.0 + head * dir.0, self.tip.1 + head * dir.1))
        };
        Some([barb(HEAD_ANGLE), barb(-HEAD_ANGLE)])
    }
}

/// One arrow per state, scaled 1:1 in data units
pub fn quiver(states: &StateSample, actions: &ActionSample) -> Vec<Arrow> {
    states
        .points()
        .iter()
        .zip(actions.actions())
        .map(|(&(x, y), &(dx, dy))| Arrow {
            tail: (x, y),
            tip: (x + dx, y + dy),
        })
        .collect()
}
