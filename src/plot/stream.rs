//! Streamlines of the sampled action field
//!
//! Samples are reshaped into a square grid, then streamlines are traced
//! through the bilinearly interpolated field. Seeding follows a coarse
//! occupancy mask (30 x 30 cells per unit of density) so lines keep their
//! distance from each other. Lengths are measured in axes units, where the
//! sampled region is 1 x 1.

use crate::grid::Point;
use crate::sampler::{ActionSample, StateSample};
use crate::settings::MAX_STREAM_DENSITY;

/// Longest streamline, in axes units
const MAX_LENGTH: f64 = 4.0;
/// Shorter streamlines are discarded
const MIN_LENGTH: f64 = 0.1;
/// Mask cells per unit of density
const MASK_CELLS: f64 = 30.0;

/// Samples laid out as `side x side` images, row = y index, column = x index
#[derive(Debug, Clone, PartialEq)]
pub struct SquareField {
    side: usize,
    x: Vec<f64>,
    y: Vec<f64>,
    u: Vec<f64>,
    v: Vec<f64>,
}

impl SquareField {
    /// Reshape flat samples (x varying slowest) into a transposed square grid.
    ///
    /// The side is `floor(sqrt(len))`. Surplus samples of a non-square count
    /// are dropped, which misaligns the grid; the sampler never produces one.
    pub fn from_samples(states: &StateSample, actions: &ActionSample) -> Self {
        let count = states.len().min(actions.len());
        let side = integer_sqrt(count);
        if side * side != count {
            tracing::warn!(
                "{} samples do not form a square grid; stream plot uses the first {}",
                count,
                side * side
            );
        }

        let cells = side * side;
        let (mut x, mut y) = (vec![0.0; cells], vec![0.0; cells]);
        let (mut u, mut v) = (vec![0.0; cells], vec![0.0; cells]);

        for i in 0..side {
            for j in 0..side {
                let flat = i * side + j;
                let transposed = j * side + i;
                let (sx, sy) = states.points()[flat];
                let (ax, ay) = actions.actions()[flat];
                x[transposed] = sx;
                y[transposed] = sy;
                u[transposed] = ax;
                v[transposed] = ay;
            }
        }

        Self { side, x, y, u, v }
    }

    pub fn side(&self) -> usize {
        self.side
    }

    /// `(x, y)` at image position `(row, col)`
    pub fn position(&self, row: usize, col: usize) -> Point {
        let k = row * self.side + col;
        (self.x[k], self.y[k])
    }

    /// `(u, v)` at image position `(row, col)`
    pub fn vector(&self, row: usize, col: usize) -> Point {
        let k = row * self.side + col;
        (self.u[k], self.v[k])
    }

    fn x_range(&self) -> (f64, f64) {
        (self.x[0], self.x[self.side - 1])
    }

    fn y_range(&self) -> (f64, f64) {
        (self.y[0], self.y[(self.side - 1) * self.side])
    }

    /// Bilinear interpolation of one component at fractional grid position
    fn interpolate(&self, values: &[f64], gx: f64, gy: f64) -> f64 {
        let last = self.side - 1;
        let col = (gx.floor() as usize).min(last - 1);
        let row = (gy.floor() as usize).min(last - 1);
        let (tx, ty) = (gx - col as f64, gy - row as f64);

        let at = |r: usize, c: usize| values[r * self.side + c];
        let bottom = at(row, col) * (1.0 - tx) + at(row, col + 1) * tx;
        let top = at(row + 1, col) * (1.0 - tx) + at(row + 1, col + 1) * tx;
        bottom * (1.0 - ty) + top * ty
    }
}

/// A traced streamline with an arrow marking its direction halfway along
#[derive(Debug, Clone, PartialEq)]
pub struct Streamline {
    pub points: Vec<Point>,
    /// `(from, to)` of the direction arrow
    pub arrow: Option<(Point, Point)>,
}

/// Occupancy of the coarse seeding grid
struct StreamMask {
    nx: usize,
    ny: usize,
    cells: Vec<bool>,
    current: Vec<usize>,
}

impl StreamMask {
    fn new(density: f64) -> Self {
        let density = density.clamp(0.0, MAX_STREAM_DENSITY);
        let n = ((MASK_CELLS * density) as usize).max(2);
        Self {
            nx: n,
            ny: n,
            cells: vec![false; n * n],
            current: Vec::new(),
        }
    }

    fn occupied(&self, mx: usize, my: usize) -> bool {
        self.cells[my * self.nx + mx]
    }

    /// Mark a cell for the current trajectory; false if someone else owns it
    fn claim(&mut self, mx: usize, my: usize) -> bool {
        let k = my * self.nx + mx;
        if self.cells[k] {
            return self.current.contains(&k);
        }
        self.cells[k] = true;
        self.current.push(k);
        true
    }

    fn commit(&mut self) {
        self.current.clear();
    }

    fn undo(&mut self) {
        for k in self.current.drain(..) {
            self.cells[k] = false;
        }
    }
}

/// Tracer state shared by the forward and backward passes
struct Tracer<'a> {
    field: &'a SquareField,
    mask: StreamMask,
    step: f64,
}

impl Tracer<'_> {
    /// Unit-speed direction in grid units per axes unit
    fn direction(&self, gx: f64, gy: f64, sign: f64) -> Option<(f64, f64)> {
        let last = (self.field.side - 1) as f64;
        let (x0, x1) = self.field.x_range();
        let (y0, y1) = self.field.y_range();
        let dx = (x1 - x0) / last;
        let dy = (y1 - y0) / last;

        // data -> grid units -> axes units
        let ug = self.field.interpolate(&self.field.u, gx, gy) / dx;
        let vg = self.field.interpolate(&self.field.v, gx, gy) / dy;
        let speed = (ug / last).hypot(vg / last);
        if !(speed.is_finite() && speed > 0.0) {
            return None;
        }
        Some((sign * ug / speed, sign * vg / speed))
    }

    fn mask_cell(&self, gx: f64, gy: f64) -> (usize, usize) {
        let last = (self.field.side - 1) as f64;
        let mx = (gx * (self.mask.nx - 1) as f64 / last).round() as usize;
        let my = (gy * (self.mask.ny - 1) as f64 / last).round() as usize;
        (mx.min(self.mask.nx - 1), my.min(self.mask.ny - 1))
    }

    /// Midpoint-rule integration from `(gx, gy)`; returns grid points and axes length
    fn integrate(&mut self, gx: f64, gy: f64, sign: f64) -> (Vec<(f64, f64)>, f64) {
        let last = (self.field.side - 1) as f64;
        let mut points = vec![(gx, gy)];
        let mut length = 0.0;
        let (mut px, mut py) = (gx, gy);
        let mut cell = self.mask_cell(px, py);

        while length < MAX_LENGTH {
            let Some((k1x, k1y)) = self.direction(px, py, sign) else {
                break;
            };
            let (mx, my) = (px + 0.5 * self.step * k1x, py + 0.5 * self.step * k1y);
            if !in_grid(mx, my, last) {
                break;
            }
            let Some((k2x, k2y)) = self.direction(mx, my, sign) else {
                break;
            };
            let (nx, ny) = (px + self.step * k2x, py + self.step * k2y);
            if !in_grid(nx, ny, last) {
                break;
            }

            let next_cell = self.mask_cell(nx, ny);
            if next_cell != cell {
                if !self.mask.claim(next_cell.0, next_cell.1) {
                    break;
                }
                cell = next_cell;
            }

            points.push((nx, ny));
            length += self.step;
            (px, py) = (nx, ny);
        }
        (points, length)
    }
}

fn in_grid(gx: f64, gy: f64, last: f64) -> bool {
    (0.0..=last).contains(&gx) && (0.0..=last).contains(&gy)
}

/// Trace streamlines through `field`. Higher `density` packs them closer.
pub fn streamlines(field: &SquareField, density: f64) -> Vec<Streamline> {
    if field.side < 2 {
        return Vec::new();
    }

    let mask = StreamMask::new(density);
    let step = 0.5 / (mask.nx.max(mask.ny) as f64);
    let mut tracer = Tracer { field, mask, step };

    let last = (field.side - 1) as f64;
    let (x0, x1) = field.x_range();
    let (y0, y1) = field.y_range();
    let to_data = |(gx, gy): (f64, f64)| (x0 + gx / last * (x1 - x0), y0 + gy / last * (y1 - y0));

    let mut lines = Vec::new();
    for (mx, my) in spiral(tracer.mask.nx, tracer.mask.ny) {
        if tracer.mask.occupied(mx, my) {
            continue;
        }

        let gx = mx as f64 * last / (tracer.mask.nx - 1) as f64;
        let gy = my as f64 * last / (tracer.mask.ny - 1) as f64;

        tracer.mask.claim(mx, my);
        let (backward, back_len) = tracer.integrate(gx, gy, -1.0);
        let (forward, fwd_len) = tracer.integrate(gx, gy, 1.0);

        if back_len + fwd_len < MIN_LENGTH {
            tracer.mask.undo();
            continue;
        }
        tracer.mask.commit();

        let grid_points: Vec<(f64, f64)> = backward
            .into_iter()
            .skip(1)
            .rev()
            .chain(forward)
            .collect();
        let points: Vec<Point> = grid_points.into_iter().map(to_data).collect();
        let arrow = midpoint_arrow(&points);
        lines.push(Streamline { points, arrow });
    }
    lines
}

/// Segment where the cumulative length first passes half the total
fn midpoint_arrow(points: &[Point]) -> Option<(Point, Point)> {
    let seg = |w: &[Point]| (w[1].0 - w[0].0).hypot(w[1].1 - w[0].1);
    let total: f64 = points.windows(2).map(seg).sum();
    let mut walked = 0.0;
    for w in points.windows(2) {
        walked += seg(w);
        if walked >= 0.5 * total {
            return Some((w[0], w[1]));
        }
    }
    None
}

/// Mask cells from the outer boundary spiralling inwards
fn spiral(nx: usize, ny: usize) -> Vec<(usize, usize)> {
    #[derive(Clone, Copy)]
    enum Heading {
        Right,
        Up,
        Left,
        Down,
    }

    let (mut xfirst, mut yfirst) = (0usize, 1usize);
    let (mut xlast, mut ylast) = (nx - 1, ny - 1);
    let (mut x, mut y) = (0usize, 0usize);
    let mut heading = Heading::Right;
    let mut cells = Vec::with_capacity(nx * ny);

    for _ in 0..nx * ny {
        cells.push((x, y));
        match heading {
            Heading::Right => {
                x += 1;
                if x >= xlast {
                    xlast = xlast.saturating_sub(1);
                    heading = Heading::Up;
                }
            }
            Heading::Up => {
                y += 1;
                if y >= ylast {
                    ylast = ylast.saturating_sub(1);
                    heading = Heading::Left;
                }
            }
            Heading::Left => {
                x = x.saturating_sub(1);
                if x <= xfirst {
                    xfirst += 1;
                    heading = Heading::Down;
                }
            }
            Heading::Down => {
                y = y.saturating_sub(1);
                if y <= yfirst {
                    yfirst += 1;
                    heading = Heading::Right;
                }
            }
        }
    }
    cells
}

fn integer_sqrt(n: usize) -> usize {
    let mut root = (n as f64).sqrt() as usize;
    while root * root > n {
        root -= 1;
    }
    while (root + 1) * (root + 1) <= n {
        root += 1;
    }
    root
}
