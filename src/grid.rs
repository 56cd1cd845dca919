//! Plot parameters extracted from a navigation domain

use std::fmt;
use std::str::FromStr;

use crate::domain::{self, DomainModel, Fluents};
use crate::error::{NavfieldError, Result};

pub type Point = (f64, f64);

/// Axis aligned region `[xmin, xmax] x [ymin, ymax]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl BoundingBox {
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Result<Self> {
        let input = format!("{xmin},{xmax},{ymin},{ymax}");
        if ![xmin, xmax, ymin, ymax].iter().all(|v| v.is_finite()) {
            return Err(NavfieldError::BoundingBox {
                input,
                reason: "all bounds must be finite".to_string(),
            });
        }
        if xmin >= xmax || ymin >= ymax {
            return Err(NavfieldError::BoundingBox {
                input,
                reason: "expected xmin < xmax and ymin < ymax".to_string(),
            });
        }
        Ok(Self {
            xmin,
            xmax,
            ymin,
            ymax,
        })
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// Grow each axis by `fraction` of its own span on both sides
    pub fn padded(&self, fraction: f64) -> Self {
        let dx = fraction * self.width();
        let dy = fraction * self.height();
        Self {
            xmin: self.xmin - dx,
            xmax: self.xmax + dx,
            ymin: self.ymin - dy,
            ymax: self.ymax + dy,
        }
    }

    pub fn contains(&self, (x, y): Point) -> bool {
        (self.xmin..=self.xmax).contains(&x) && (self.ymin..=self.ymax).contains(&y)
    }
}

impl FromStr for BoundingBox {
    type Err = NavfieldError;

    /// Parses `xmin,xmax,ymin,ymax`
    fn from_str(s: &str) -> Result<Self> {
        let values = s
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| NavfieldError::BoundingBox {
                input: s.to_string(),
                reason: e.to_string(),
            })?;

        match values.as_slice() {
            &[xmin, xmax, ymin, ymax] => Self::new(xmin, xmax, ymin, ymax),
            other => Err(NavfieldError::BoundingBox {
                input: s.to_string(),
                reason: format!("expected 4 comma separated values, found {}", other.len()),
            }),
        }
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}] x [{}, {}]", self.xmin, self.xmax, self.ymin, self.ymax)
    }
}

/// Deceleration zone: center and decay rate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zone {
    pub x: f64,
    pub y: f64,
    pub decay: f64,
}

/// Everything the renderer needs to know about the domain
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub start: Point,
    pub end: Point,
    pub zones: Vec<Zone>,
    pub size: BoundingBox,
}

impl Grid {
    pub fn from_domain(domain: &impl DomainModel, size: BoundingBox) -> Result<Self> {
        Self::extract(domain.constants(), domain.initial_state(), size)
    }

    /// Build the grid from evaluated non-fluents and initial state.
    ///
    /// Zone centers and decays are paired by index; the domain carries no key
    /// that ties them together.
    pub fn extract(non_fluents: &Fluents, initial_state: &Fluents, size: BoundingBox) -> Result<Self> {
        let start = lookup(initial_state, domain::LOCATION)?.as_point(domain::LOCATION)?;
        let end = lookup(non_fluents, domain::GOAL)?.as_point(domain::GOAL)?;

        let centers = lookup(non_fluents, domain::ZONE_CENTER)?.as_points(domain::ZONE_CENTER)?;
        let decays = lookup(non_fluents, domain::ZONE_DECAY)?.as_scalars(domain::ZONE_DECAY)?;

        if centers.len() != decays.len() {
            return Err(NavfieldError::ZoneCountMismatch {
                centers: centers.len(),
                decays: decays.len(),
            });
        }

        let zones = centers
            .into_iter()
            .zip(decays)
            .enumerate()
            .map(|(i, ((x, y), decay))| {
                if !decay.is_finite() || decay < 0.0 {
                    return Err(NavfieldError::InvalidDecay { zone: i, decay });
                }
                Ok(Zone { x, y, decay })
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            "Grid: start={:?} goal={:?} zones={} size={}",
            start,
            end,
            zones.len(),
            size
        );

        Ok(Self {
            start,
            end,
            zones,
            size,
        })
    }
}

fn lookup<'a>(fluents: &'a Fluents, name: &str) -> Result<&'a domain::FluentValue> {
    fluents.get(name).ok_or_else(|| NavfieldError::Fluent {
        name: name.to_string(),
        reason: "missing from domain".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FluentValue;

    fn size() -> BoundingBox {
        BoundingBox::new(-5.0, 11.0, -2.0, 11.0).unwrap()
    }

    fn fluents(centers: &[(f64, f64)], decays: Vec<f64>) -> (Fluents, Fluents) {
        let mut non_fluents = Fluents::new();
        non_fluents.insert(
            domain::GOAL.to_string(),
            FluentValue::scalars(vec![8.0, 12.0]),
        );
        non_fluents.insert(domain::ZONE_CENTER.to_string(), FluentValue::points(centers));
        non_fluents.insert(domain::ZONE_DECAY.to_string(), FluentValue::scalars(decays));

        let mut initial_state = Fluents::new();
        initial_state.insert(
            domain::LOCATION.to_string(),
            FluentValue::scalars(vec![0.0, 0.0]),
        );
        (non_fluents, initial_state)
    }

    #[test]
    fn test_extract_start_goal_and_zones() {
        let (nf, init) = fluents(&[(2.0, 2.5), (5.0, 4.5)], vec![2.0, 3.0]);
        let grid = Grid::extract(&nf, &init, size()).unwrap();

        assert_eq!(grid.start, (0.0, 0.0));
        assert_eq!(grid.end, (8.0, 12.0));
        assert_eq!(grid.size, size());
        assert_eq!(grid.zones.len(), 2);
    }

    #[test]
    fn test_zone_pairing_follows_index_order() {
        let centers = [(1.0, 1.0), (2.0, 2.0), (3.0, 3.0)];
        let (nf, init) = fluents(&centers, vec![10.0, 20.0, 30.0]);
        let grid = Grid::extract(&nf, &init, size()).unwrap();

        for (i, zone) in grid.zones.iter().enumerate() {
            assert_eq!((zone.x, zone.y), centers[i]);
            assert_eq!(zone.decay, 10.0 * (i as f64 + 1.0));
        }
    }

    #[test]
    fn test_zone_count_mismatch_fails() {
        let (nf, init) = fluents(&[(1.0, 1.0), (2.0, 2.0)], vec![1.0]);
        let err = Grid::extract(&nf, &init, size()).unwrap_err();
        assert!(matches!(
            err,
            NavfieldError::ZoneCountMismatch {
                centers: 2,
                decays: 1
            }
        ));
    }

    #[test]
    fn test_negative_decay_rejected() {
        let (nf, init) = fluents(&[(1.0, 1.0)], vec![-0.5]);
        assert!(matches!(
            Grid::extract(&nf, &init, size()),
            Err(NavfieldError::InvalidDecay { zone: 0, .. })
        ));
    }

    #[test]
    fn test_missing_goal() {
        let (mut nf, init) = fluents(&[], vec![]);
        nf.remove(domain::GOAL);
        let err = Grid::extract(&nf, &init, size()).unwrap_err();
        assert!(err.to_string().contains("GOAL/1"));
    }

    #[test]
    fn test_no_zones_is_fine() {
        let (nf, init) = fluents(&[], vec![]);
        let grid = Grid::extract(&nf, &init, size()).unwrap();
        assert!(grid.zones.is_empty());
    }

    #[test]
    fn test_bounding_box_parse() {
        let bbox: BoundingBox = "-5.0,11.0,-2.0,11.0".parse().unwrap();
        assert_eq!(bbox, size());

        let spaced: BoundingBox = " -5, 11 , -2,11 ".parse().unwrap();
        assert_eq!(spaced, size());
    }

    #[test]
    fn test_bounding_box_rejects_bad_input() {
        assert!("1,2,3".parse::<BoundingBox>().is_err());
        assert!("a,b,c,d".parse::<BoundingBox>().is_err());
        assert!("5,1,0,1".parse::<BoundingBox>().is_err());
        assert!("0,1,0,inf".parse::<BoundingBox>().is_err());
    }

    #[test]
    fn test_padding_uses_each_axis_span() {
        let padded = size().padded(0.10);
        assert!((padded.xmin - -6.6).abs() < 1e-9);
        assert!((padded.xmax - 12.6).abs() < 1e-9);
        assert!((padded.ymin - -3.3).abs() < 1e-9);
        assert!((padded.ymax - 12.3).abs() < 1e-9);
    }
}
