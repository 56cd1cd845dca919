//! Iso-lines of the hazard field by marching squares

use std::collections::HashMap;

use super::hazard::HazardField;
use crate::grid::Point;

/// One connected iso-line at `level`
#[derive(Debug, Clone, PartialEq)]
pub struct ContourLine {
    pub level: f64,
    pub points: Vec<Point>,
}

/// Mesh edge a contour crosses; segments from neighbouring cells meet on the same edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Edge {
    /// Between nodes `(row, col)` and `(row, col + 1)`
    Horizontal(usize, usize),
    /// Between nodes `(row, col)` and `(row + 1, col)`
    Vertical(usize, usize),
}

/// Trace every iso-line of `field` at each of `levels`
pub fn contour_lines(field: &HazardField, levels: &[f64]) -> Vec<ContourLine> {
    levels
        .iter()
        .flat_map(|&level| {
            let segments = cell_segments(field, level);
            chain(&segments)
                .into_iter()
                .map(move |edges| ContourLine {
                    level,
                    points: edges
                        .into_iter()
                        .map(|edge| edge_point(field, edge, level))
                        .collect(),
                })
        })
        .collect()
}

fn cell_segments(field: &HazardField, level: f64) -> Vec<(Edge, Edge)> {
    let mut segments = Vec::new();
    if field.rows() < 2 || field.cols() < 2 {
        return segments;
    }

    for row in 0..field.rows() - 1 {
        for col in 0..field.cols() - 1 {
            let corners = [
                field.value(row, col),
                field.value(row, col + 1),
                field.value(row + 1, col + 1),
                field.value(row + 1, col),
            ];
            let above = corners.map(|v| v > level);

            // bottom, right, top, left; edge k joins corner k and k + 1
            let edges = [
                Edge::Horizontal(row, col),
                Edge::Vertical(row, col + 1),
                Edge::Horizontal(row + 1, col),
                Edge::Vertical(row, col),
            ];
            let crossed: Vec<usize> = (0..4).filter(|&k| above[k] != above[(k + 1) % 4]).collect();

            match crossed.len() {
                2 => segments.push((edges[crossed[0]], edges[crossed[1]])),
                4 => {
                    // saddle: the cell center decides which diagonal is connected
                    let center = corners.iter().sum::<f64>() / 4.0;
                    let [bottom, right, top, left] = edges;
                    if (center > level) == above[0] {
                        // corners 0 and 2 connected through the center
                        segments.push((bottom, right));
                        segments.push((top, left));
                    } else {
                        segments.push((left, bottom));
                        segments.push((right, top));
                    }
                }
                _ => {}
            }
        }
    }
    segments
}

/// Join segments sharing an edge into polylines
fn chain(segments: &[(Edge, Edge)]) -> Vec<Vec<Edge>> {
    let mut by_edge: HashMap<Edge, Vec<usize>> = HashMap::new();
    for (i, &(a, b)) in segments.iter().enumerate() {
        by_edge.entry(a).or_default().push(i);
        by_edge.entry(b).or_default().push(i);
    }

    let mut used = vec![false; segments.len()];
    let mut lines = Vec::new();

    for start in 0..segments.len() {
        if used[start] {
            continue;
        }
        used[start] = true;
        let (a, b) = segments[start];

        let mut forward = vec![a, b];
        extend(&mut forward, &by_edge, segments, &mut used);

        let mut backward = vec![a];
        extend(&mut backward, &by_edge, segments, &mut used);

        let mut line: Vec<Edge> = backward.into_iter().skip(1).rev().collect();
        line.extend(forward);
        lines.push(line);
    }
    lines
}

fn extend(
    line: &mut Vec<Edge>,
    by_edge: &HashMap<Edge, Vec<usize>>,
    segments: &[(Edge, Edge)],
    used: &mut [bool],
) {
    while let Some(&tip) = line.last() {
        let next = by_edge
            .get(&tip)
            .and_then(|candidates| candidates.iter().copied().find(|&i| !used[i]));
        let Some(i) = next else {
            break;
        };
        used[i] = true;
        let (p, q) = segments[i];
        line.push(if p == tip { q } else { p });
    }
}

fn edge_point(field: &HazardField, edge: Edge, level: f64) -> Point {
    let (xs, ys) = (field.xs(), field.ys());
    match edge {
        Edge::Horizontal(row, col) => {
            let t = crossing(field.value(row, col), field.value(row, col + 1), level);
            (xs[col] + t * (xs[col + 1] - xs[col]), ys[row])
        }
        Edge::Vertical(row, col) => {
            let t = crossing(field.value(row, col), field.value(row + 1, col), level);
            (xs[col], ys[row] + t * (ys[row + 1] - ys[row]))
        }
    }
}

fn crossing(a: f64, b: f64, level: f64) -> f64 {
    if a == b {
        0.5
    } else {
        ((level - a) / (b - a)).clamp(0.0, 1.0)
    }
}

/// Split a polyline into dashes of length `on` separated by gaps of length `off`
pub fn dashes(points: &[Point], on: f64, off: f64) -> Vec<Vec<Point>> {
    let mut result = Vec::new();
    if points.len() < 2 || on <= 0.0 || off < 0.0 {
        return result;
    }

    let mut drawing = true;
    let mut remaining = on;
    let mut current: Vec<Point> = vec![points[0]];

    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let length = (b.0 - a.0).hypot(b.1 - a.1);
        let mut walked = 0.0;

        loop {
            let left = length - walked;
            let switches = remaining <= left;
            let step = if switches { remaining } else { left };
            walked += step;
            remaining -= step;

            let t = if length > 0.0 { walked / length } else { 1.0 };
            let p = (a.0 + t * (b.0 - a.0), a.1 + t * (b.1 - a.1));
            if drawing && current.last() != Some(&p) {
                current.push(p);
            }

            if !switches {
                break;
            }
            if drawing {
                if current.len() >= 2 {
                    result.push(std::mem::take(&mut current));
                }
                current.clear();
                remaining = off;
            } else {
                current = vec![p];
                remaining = on;
            }
            drawing = !drawing;
        }
    }

    if drawing && current.len() >= 2 {
        result.push(current);
    }
    result
}
