//! Axis limits, tick placement and the data -> screen transform of a panel

use crate::grid::{BoundingBox, Point};

/// Fraction of each axis span added around the sampled region
pub const AXIS_PADDING: f64 = 0.10;

/// Limits and ticks of one panel
#[derive(Debug, Clone, PartialEq)]
pub struct Axes {
    pub limits: BoundingBox,
    pub x_ticks: Vec<f64>,
    pub y_ticks: Vec<f64>,
    pub x_label: &'static str,
    pub y_label: &'static str,
}

impl Axes {
    pub fn new(size: &BoundingBox) -> Self {
        let limits = size.padded(AXIS_PADDING);
        Self {
            x_ticks: nice_ticks(limits.xmin, limits.xmax, 8),
            y_ticks: nice_ticks(limits.ymin, limits.ymax, 8),
            limits,
            x_label: "x coordinate",
            y_label: "y coordinate",
        }
    }
}

/// Round tick positions (steps of 1, 2, 2.5 or 5 times a power of ten) inside `[min, max]`
pub fn nice_ticks(min: f64, max: f64, target: usize) -> Vec<f64> {
    let span = max - min;
    if !(span.is_finite() && span > 0.0) || target == 0 {
        return Vec::new();
    }

    let raw = span / target as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = [1.0, 2.0, 2.5, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|&s| s >= raw)
        .unwrap_or(10.0 * magnitude);

    let first = (min / step).ceil() as i64;
    let last = (max / step).floor() as i64;
    (first..=last)
        .map(|k| {
            let tick = (k as f64 * step * 1e9).round() / 1e9;
            // avoid "-0" labels
            if tick == 0.0 { 0.0 } else { tick }
        })
        .collect()
}

pub fn tick_label(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.0}")
    } else {
        let text = format!("{rounded:.3}");
        text.trim_end_matches('0').to_string()
    }
}

/// Screen rectangle, center and size in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub cx: f64,
    pub cy: f64,
    pub width: f64,
    pub height: f64,
}

/// Equal-aspect mapping of data limits into a screen rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelTransform {
    limits: BoundingBox,
    rect: Rect,
    scale: f64,
}

impl PanelTransform {
    pub fn new(limits: BoundingBox, rect: Rect) -> Self {
        let scale = (rect.width / limits.width()).min(rect.height / limits.height());
        Self {
            limits,
            rect,
            scale,
        }
    }

    /// Pixels per data unit, identical on both axes
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn map(&self, (x, y): Point) -> Point {
        let xmid = 0.5 * (self.limits.xmin + self.limits.xmax);
        let ymid = 0.5 * (self.limits.ymin + self.limits.ymax);
        (
            self.rect.cx + (x - xmid) * self.scale,
            self.rect.cy + (y - ymid) * self.scale,
        )
    }

    /// Screen rectangle covered by `region`
    pub fn map_box(&self, region: &BoundingBox) -> Rect {
        let (x0, y0) = self.map((region.xmin, region.ymin));
        let (x1, y1) = self.map((region.xmax, region.ymax));
        Rect {
            cx: 0.5 * (x0 + x1),
            cy: 0.5 * (y0 + y1),
            width: x1 - x0,
            height: y1 - y0,
        }
    }
}
