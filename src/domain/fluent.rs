//! Shaped fluent values as reported by the domain description

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{NavfieldError, Result};

/// Fluent name -> evaluated value
pub type Fluents = BTreeMap<String, FluentValue>;

/// A dense row-major array of `f64`
///
/// Values may carry a leading batch dimension. Accessors read the first batch
/// entry in that case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FluentValue {
    pub shape: Vec<usize>,
    pub data: Vec<f64>,
}

impl FluentValue {
    pub fn new(shape: Vec<usize>, data: Vec<f64>) -> Self {
        Self { shape, data }
    }

    pub fn scalars(data: Vec<f64>) -> Self {
        Self::new(vec![data.len()], data)
    }

    pub fn points(points: &[(f64, f64)]) -> Self {
        let data = points.iter().flat_map(|&(x, y)| [x, y]).collect();
        Self::new(vec![points.len(), 2], data)
    }

    /// Check that the declared shape accounts for exactly the stored data
    pub fn validate(&self, name: &str) -> Result<()> {
        let expected: usize = self.shape.iter().product();
        if expected != self.data.len() {
            return Err(NavfieldError::Fluent {
                name: name.to_string(),
                reason: format!(
                    "shape {:?} needs {} values, found {}",
                    self.shape,
                    expected,
                    self.data.len()
                ),
            });
        }
        Ok(())
    }

    /// A single `(x, y)` location, shape `[2]` or `[batch, 2]`
    pub fn as_point(&self, name: &str) -> Result<(f64, f64)> {
        let slice = self.leading_slice(name, 1)?;
        match slice {
            [x, y] => Ok((*x, *y)),
            _ => Err(shape_error(name, &self.shape, "[2]")),
        }
    }

    /// A list of `(x, y)` rows, shape `[n, 2]` or `[batch, n, 2]`
    pub fn as_points(&self, name: &str) -> Result<Vec<(f64, f64)>> {
        if self.shape.last() != Some(&2) {
            return Err(shape_error(name, &self.shape, "[n, 2]"));
        }
        let slice = self.leading_slice(name, 2)?;
        Ok(slice.chunks_exact(2).map(|c| (c[0], c[1])).collect())
    }

    /// A flat list of scalars, shape `[n]` or `[batch, n]`
    pub fn as_scalars(&self, name: &str) -> Result<Vec<f64>> {
        Ok(self.leading_slice(name, 1)?.to_vec())
    }

    /// Data of the first batch entry, keeping the trailing `rank` dimensions
    fn leading_slice(&self, name: &str, rank: usize) -> Result<&[f64]> {
        self.validate(name)?;
        if self.shape.len() < rank {
            return Err(NavfieldError::Fluent {
                name: name.to_string(),
                reason: format!("expected rank >= {rank}, found shape {:?}", self.shape),
            });
        }
        let kept: usize = self.shape[self.shape.len() - rank..].iter().product();
        Ok(&self.data[..kept])
    }
}

fn shape_error(name: &str, shape: &[usize], expected: &str) -> NavfieldError {
    NavfieldError::Fluent {
        name: name.to_string(),
        reason: format!("expected shape {expected}, found {shape:?}"),
    }
}
