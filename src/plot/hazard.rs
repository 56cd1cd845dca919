//! Deceleration zone attenuation field
//!
//! Each zone scales velocity by `2 / (1 + exp(-decay * d)) - 1`, where `d` is
//! the distance to the zone center. Zones combine multiplicatively, so a value
//! near 0 means heavy deceleration and 1 means no effect.

use crate::grid::{BoundingBox, Point, Zone};
use crate::sampler::linspace;

/// Number of contour bands between 0 and 1
pub const BANDS: usize = 10;

/// Contour levels `0.0, 0.1, ..., 1.0`
pub fn levels() -> Vec<f64> {
    (0..=BANDS).map(|i| i as f64 / BANDS as f64).collect()
}

/// Attenuation contributed by one zone. A zone with zero decay has no effect.
pub fn zone_attenuation(zone: &Zone, (x, y): Point) -> f64 {
    if zone.decay == 0.0 {
        return 1.0;
    }
    let distance = (x - zone.x).hypot(y - zone.y);
    2.0 / (1.0 + (-zone.decay * distance).exp()) - 1.0
}

/// Product of every zone's attenuation at `p` (1.0 with no zones)
pub fn attenuation(zones: &[Zone], p: Point) -> f64 {
    zones.iter().map(|zone| zone_attenuation(zone, p)).product()
}

/// Attenuation sampled on a square mesh over a region
///
/// `values[row * resolution + col]` holds the value at `(xs[col], ys[row])`.
#[derive(Debug, Clone, PartialEq)]
pub struct HazardField {
    size: BoundingBox,
    xs: Vec<f64>,
    ys: Vec<f64>,
    values: Vec<f64>,
}

impl HazardField {
    pub fn compute(size: &BoundingBox, zones: &[Zone], resolution: usize) -> Self {
        let xs = linspace(size.xmin, size.xmax, resolution);
        let ys = linspace(size.ymin, size.ymax, resolution);

        let values = ys
            .iter()
            .flat_map(|&y| xs.iter().map(move |&x| attenuation(zones, (x, y))))
            .collect();

        Self {
            size: *size,
            xs,
            ys,
            values,
        }
    }

    pub fn size(&self) -> &BoundingBox {
        &self.size
    }

    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    pub fn ys(&self) -> &[f64] {
        &self.ys
    }

    pub fn cols(&self) -> usize {
        self.xs.len()
    }

    pub fn rows(&self) -> usize {
        self.ys.len()
    }

    pub fn value(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.cols() + col]
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// RGBA8 pixels, top row first, for use as a texture
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut pixels = Vec::with_capacity(self.values.len() * 4);
        for row in (0..self.rows()).rev() {
            for col in 0..self.cols() {
                let rgba = match band(self.value(row, col)) {
                    Some(b) => {
                        let [r, g, b] = bone((b as f64 + 0.5) / BANDS as f64);
                        [to_byte(r), to_byte(g), to_byte(b), 255]
                    }
                    None => [0, 0, 0, 0],
                };
                pixels.extend_from_slice(&rgba);
            }
        }
        pixels
    }
}

/// Filled contour band of `value`, `None` outside `[0, 1]`
pub fn band(value: f64) -> Option<usize> {
    if !(0.0..=1.0).contains(&value) {
        return None;
    }
    Some(((value * BANDS as f64).floor() as usize).min(BANDS - 1))
}

/// The "bone" colormap: grayscale with a blue tint
pub fn bone(t: f64) -> [f64; 3] {
    const RED: &[(f64, f64)] = &[(0.0, 0.0), (0.746032, 0.652778), (1.0, 1.0)];
    const GREEN: &[(f64, f64)] = &[
        (0.0, 0.0),
        (0.365079, 0.319444),
        (0.746032, 0.777778),
        (1.0, 1.0),
    ];
    const BLUE: &[(f64, f64)] = &[(0.0, 0.0), (0.365079, 0.444444), (1.0, 1.0)];

    let t = t.clamp(0.0, 1.0);
    [piecewise(RED, t), piecewise(GREEN, t), piecewise(BLUE, t)]
}

fn piecewise(knots: &[(f64, f64)], t: f64) -> f64 {
    for pair in knots.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        if t <= x1 {
            return y0 + (t - x0) / (x1 - x0) * (y1 - y0);
        }
    }
    knots.last().map_or(0.0, |k| k.1)
}

fn to_byte(channel: f64) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn zone(x: f64, y: f64, decay: f64) -> Zone {
        Zone { x, y, decay }
    }

    #[test]
    fn test_zero_decay_has_no_effect() {
        let z = zone(1.0, 1.0, 0.0);
        for p in [(1.0, 1.0), (0.0, 0.0), (100.0, -40.0)] {
            assert_eq!(zone_attenuation(&z, p), 1.0);
        }
    }

    #[test]
    fn test_full_stop_at_center() {
        let z = zone(2.0, 2.5, 2.0);
        assert_eq!(zone_attenuation(&z, (2.0, 2.5)), 0.0);
    }

    #[test]
    fn test_matches_formula() {
        let z = zone(0.0, 0.0, 1.5);
        let d = 5.0f64.hypot(0.0);
        let expected = 2.0 / (1.0 + (-1.5 * d).exp()) - 1.0;
        assert!((zone_attenuation(&z, (5.0, 0.0)) - expected).abs() < 1e-15);
    }

    #[test]
    fn test_no_zones_means_no_attenuation() {
        assert_eq!(attenuation(&[], (3.0, 4.0)), 1.0);
    }

    #[test]
    fn test_tends_to_one_far_away() {
        let zones = [zone(2.0, 2.5, 2.0), zone(5.0, 4.5, 1.0)];
        let far = attenuation(&zones, (1e4, 1e4));
        assert!((far - 1.0).abs() < 1e-12);
        let near = attenuation(&zones, (2.5, 3.0));
        assert!(near < far);
    }

    #[test]
    fn test_field_layout() {
        let size = BoundingBox::new(0.0, 4.0, 0.0, 2.0).unwrap();
        let zones = [zone(0.0, 0.0, 1.0)];
        let field = HazardField::compute(&size, &zones, 5);

        assert_eq!(field.rows(), 5);
        assert_eq!(field.cols(), 5);
        assert_eq!(field.value(0, 0), 0.0);
        let expected = attenuation(&zones, (4.0, 2.0));
        assert_eq!(field.value(4, 4), expected);
        assert_eq!(field.value(0, 2), attenuation(&zones, (2.0, 0.0)));
    }

    #[test]
    fn test_rgba_puts_high_y_first() {
        let size = BoundingBox::new(0.0, 1.0, 0.0, 1.0).unwrap();
        let field = HazardField::compute(&size, &[zone(0.0, 0.0, 5.0)], 2);
        let pixels = field.to_rgba();
        assert_eq!(pixels.len(), 2 * 2 * 4);
        // bottom-left mesh node (the zone center) is the first pixel of the last row
        let bottom_left = &pixels[8..12];
        let expected = bone(0.05);
        assert_eq!(bottom_left[0], to_byte(expected[0]));
        assert_eq!(bottom_left[3], 255);
    }

    #[test]
    fn test_bands() {
        assert_eq!(band(0.0), Some(0));
        assert_eq!(band(0.05), Some(0));
        assert_eq!(band(0.55), Some(5));
        assert_eq!(band(1.0), Some(9));
        assert_eq!(band(-0.1), None);
        assert_eq!(band(f64::NAN), None);
    }

    #[test]
    fn test_bone_endpoints() {
        assert_eq!(bone(0.0), [0.0, 0.0, 0.0]);
        assert_eq!(bone(1.0), [1.0, 1.0, 1.0]);
        let mid = bone(0.5);
        assert!(mid[2] > mid[0]);
    }

    #[test]
    fn test_levels() {
        let levels = levels();
        assert_eq!(levels.len(), 11);
        assert_eq!(levels[0], 0.0);
        assert_eq!(levels[10], 1.0);
    }

    proptest! {
        #[test]
        fn prop_attenuation_in_range(
            x in -1e3f64..1e3,
            y in -1e3f64..1e3,
            zones in prop::collection::vec((-20f64..20.0, -20f64..20.0, 0f64..50.0), 0..6),
        ) {
            let zones: Vec<Zone> = zones.into_iter().map(|(x, y, decay)| zone(x, y, decay)).collect();
            let value = attenuation(&zones, (x, y));
            prop_assert!(value > -1.0 && value <= 1.0);
        }

        #[test]
        fn prop_zero_decay_is_identity(x in -50f64..50.0, y in -50f64..50.0, cx in -5f64..5.0, cy in -5f64..5.0) {
            prop_assert_eq!(zone_attenuation(&zone(cx, cy, 0.0), (x, y)), 1.0);
        }

        #[test]
        fn prop_fades_with_distance(decay in 0.1f64..10.0, angle in 0f64..std::f64::consts::TAU) {
            let z = zone(1.0, -2.0, decay);
            let far = 1e3;
            let p = (1.0 + far * angle.cos(), -2.0 + far * angle.sin());
            prop_assert!((zone_attenuation(&z, p) - 1.0).abs() < 1e-9);
        }
    }
}
