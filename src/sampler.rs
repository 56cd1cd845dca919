//! Dense state sampling over the bounding box

use std::num::NonZeroUsize;

use crate::error::{NavfieldError, Result};
use crate::grid::{BoundingBox, Point};

/// Sampled states, `npoints * npoints` of them, x varying slowest
#[derive(Debug, Clone, PartialEq)]
pub struct StateSample {
    points: Vec<Point>,
    npoints: usize,
}

impl StateSample {
    /// Sample the cartesian product of two `linspace` axes.
    ///
    /// Index `i * npoints + j` holds `(xs[i], ys[j])`.
    pub fn generate(size: &BoundingBox, npoints: NonZeroUsize) -> Self {
        let n = npoints.get();
        let xs = linspace(size.xmin, size.xmax, n);
        let ys = linspace(size.ymin, size.ymax, n);

        let points = xs
            .iter()
            .flat_map(|&x| ys.iter().map(move |&y| (x, y)))
            .collect();

        Self { points, npoints: n }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Samples per axis
    pub fn npoints(&self) -> usize {
        self.npoints
    }

    /// Row-major `[len, 2]` buffer for the policy input tensor
    pub fn to_flat_f32(&self) -> Vec<f32> {
        self.points
            .iter()
            .flat_map(|&(x, y)| [x as f32, y as f32])
            .collect()
    }
}

/// Policy outputs, positionally aligned with a [`StateSample`]
#[derive(Debug, Clone, PartialEq)]
pub struct ActionSample {
    actions: Vec<Point>,
}

impl ActionSample {
    pub fn new(actions: Vec<Point>) -> Self {
        Self { actions }
    }

    /// Rebuild `(dx, dy)` pairs from a row-major `[len, 2]` buffer
    pub fn from_flat_f32(flat: &[f32]) -> Self {
        let actions = flat
            .chunks_exact(2)
            .map(|c| (c[0] as f64, c[1] as f64))
            .collect();
        Self { actions }
    }

    pub fn actions(&self) -> &[Point] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// `n` evenly spaced values over `[start, stop]`, both ends included
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { stop } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Parse a sampling resolution, refusing anything that isn't a positive integer.
///
/// `"10"` and `"10.0"` are accepted; `"10.5"`, `"0"` and `"-3"` are not, since
/// a fractional resolution would break the square grid the stream plot needs.
pub fn parse_npoints(input: &str) -> Result<NonZeroUsize> {
    let err = || NavfieldError::Resolution {
        input: input.to_string(),
    };

    let trimmed = input.trim();
    if let Ok(n) = trimmed.parse::<usize>() {
        return NonZeroUsize::new(n).ok_or_else(err);
    }

    let value: f64 = trimmed.parse().map_err(|_| err())?;
    if !value.is_finite() || value.fract() != 0.0 || value < 1.0 || value > usize::MAX as f64 {
        return Err(err());
    }
    NonZeroUsize::new(value as usize).ok_or_else(err)
}
