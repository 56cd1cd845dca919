//! Figure assembly: two panels sharing one hazard layer
//!
//! Everything the viewer draws is computed here, in data coordinates, so the
//! window code only maps and paints.

use std::fmt::Write as _;
use std::sync::Arc;

use super::axes::Axes;
use super::contour::{ContourLine, contour_lines};
use super::hazard::{HazardField, levels};
use super::quiver::{Arrow, quiver};
use super::stream::{SquareField, Streamline, streamlines};
use crate::error::{NavfieldError, Result};
use crate::grid::{Grid, Point};
use crate::sampler::{ActionSample, StateSample};
use crate::settings::{DEFAULT_HAZARD_RESOLUTION, DEFAULT_STREAM_DENSITY, Settings};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelKind {
    /// Arrows and sampled states
    Field,
    /// Streamlines
    Stream,
}

/// Filled bands and dashed iso-lines of the attenuation field
#[derive(Debug, Clone, PartialEq)]
pub struct HazardLayer {
    pub field: HazardField,
    pub contours: Vec<ContourLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub kind: PanelKind,
    pub axes: Axes,
    pub hazard: Arc<HazardLayer>,
    pub arrows: Vec<Arrow>,
    pub points: Vec<Point>,
    pub streamlines: Vec<Streamline>,
    pub start: Point,
    pub goal: Point,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub panels: Vec<Panel>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FigureOptions {
    pub hazard_resolution: usize,
    pub stream_density: f64,
}

impl Default for FigureOptions {
    fn default() -> Self {
        Self {
            hazard_resolution: DEFAULT_HAZARD_RESOLUTION,
            stream_density: DEFAULT_STREAM_DENSITY,
        }
    }
}

impl From<&Settings> for FigureOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            hazard_resolution: settings.hazard_resolution,
            stream_density: settings.stream_density,
        }
    }
}

pub fn build_figure(
    grid: &Grid,
    states: &StateSample,
    actions: &ActionSample,
    options: FigureOptions,
) -> Result<Figure> {
    if states.len() != actions.len() {
        return Err(NavfieldError::ActionCount {
            states: states.len(),
            actions: actions.len(),
        });
    }

    let field = HazardField::compute(&grid.size, &grid.zones, options.hazard_resolution);
    let contours = contour_lines(&field, &levels());
    tracing::debug!(
        "Hazard field {}x{}: {} contour lines",
        field.cols(),
        field.rows(),
        contours.len()
    );
    let hazard = Arc::new(HazardLayer { field, contours });

    let panel = |kind| Panel {
        kind,
        axes: Axes::new(&grid.size),
        hazard: Arc::clone(&hazard),
        arrows: Vec::new(),
        points: Vec::new(),
        streamlines: Vec::new(),
        start: grid.start,
        goal: grid.end,
    };

    let field_panel = Panel {
        arrows: quiver(states, actions),
        points: states.points().to_vec(),
        ..panel(PanelKind::Field)
    };

    let square = SquareField::from_samples(states, actions);
    let stream_panel = Panel {
        streamlines: streamlines(&square, options.stream_density),
        ..panel(PanelKind::Stream)
    };
    tracing::debug!(
        "Stream panel: {}x{} grid, {} streamlines",
        square.side(),
        square.side(),
        stream_panel.streamlines.len()
    );

    Ok(Figure {
        panels: vec![field_panel, stream_panel],
    })
}

impl Figure {
    pub fn panel(&self, kind: PanelKind) -> Option<&Panel> {
        self.panels.iter().find(|p| p.kind == kind)
    }

    /// One line per panel, for runs without a window
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for panel in &self.panels {
            let limits = &panel.axes.limits;
            let _ = writeln!(
                out,
                "{:?} panel: limits [{:.2}, {:.2}] x [{:.2}, {:.2}], {} arrows, {} points, {} streamlines, {} contour lines, start {:?}, goal {:?}",
                panel.kind,
                limits.xmin,
                limits.xmax,
                limits.ymin,
                limits.ymax,
                panel.arrows.len(),
                panel.points.len(),
                panel.streamlines.len(),
                panel.hazard.contours.len(),
                panel.start,
                panel.goal,
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{BoundingBox, Zone};
    use std::num::NonZeroUsize;

    fn grid() -> Grid {
        Grid {
            start: (1.0, 1.0),
            end: (8.0, 12.0),
            zones: vec![
                Zone {
                    x: 2.0,
                    y: 2.5,
                    decay: 2.0,
                },
                Zone {
                    x: 5.0,
                    y: 4.5,
                    decay: 1.0,
                },
            ],
            size: BoundingBox::new(-5.0, 11.0, -2.0, 11.0).unwrap(),
        }
    }

    fn towards_goal(states: &StateSample) -> ActionSample {
        ActionSample::new(
            states
                .points()
                .iter()
                .map(|&(x, y)| ((8.0 - x) * 0.1, (12.0 - y) * 0.1))
                .collect(),
        )
    }

    fn options() -> FigureOptions {
        FigureOptions {
            hazard_resolution: 100,
            stream_density: 1.2,
        }
    }

    #[test]
    fn test_scenario_figure() {
        let grid = grid();
        let states = StateSample::generate(&grid.size, NonZeroUsize::new(10).unwrap());
        let actions = towards_goal(&states);

        let figure = build_figure(&grid, &states, &actions, options()).unwrap();
        assert_eq!(figure.panels.len(), 2);

        let field = figure.panel(PanelKind::Field).unwrap();
        assert_eq!(field.arrows.len(), 100);
        assert_eq!(field.points.len(), 100);
        assert!(field.streamlines.is_empty());
        assert_eq!(field.start, (1.0, 1.0));
        assert_eq!(field.goal, (8.0, 12.0));
        assert!((field.axes.limits.xmin - -6.6).abs() < 1e-9);

        let stream = figure.panel(PanelKind::Stream).unwrap();
        assert!(stream.arrows.is_empty());
        assert!(stream.points.is_empty());
        assert!(!stream.streamlines.is_empty());
        assert_eq!(stream.goal, grid.end);

        assert!(Arc::ptr_eq(&field.hazard, &stream.hazard));
        assert!(!field.hazard.contours.is_empty());
    }

    #[test]
    fn test_action_count_mismatch() {
        let grid = grid();
        let states = StateSample::generate(&grid.size, NonZeroUsize::new(3).unwrap());
        let actions = ActionSample::new(vec![(0.0, 0.0); 8]);
        let err = build_figure(&grid, &states, &actions, options()).unwrap_err();
        assert!(matches!(
            err,
            NavfieldError::ActionCount {
                states: 9,
                actions: 8
            }
        ));
    }

    #[test]
    fn test_summary_mentions_both_panels() {
        let grid = grid();
        let states = StateSample::generate(&grid.size, NonZeroUsize::new(4).unwrap());
        let actions = towards_goal(&states);
        let summary = build_figure(&grid, &states, &actions, options())
            .unwrap()
            .summary();
        assert!(summary.contains("Field panel"));
        assert!(summary.contains("16 arrows"));
        assert!(summary.contains("Stream panel"));
    }

    #[test]
    fn test_options_from_settings() {
        let settings = Settings {
            hazard_resolution: 50,
            stream_density: 2.0,
            ..Settings::default()
        };
        let options = FigureOptions::from(&settings);
        assert_eq!(options.hazard_resolution, 50);
        assert_eq!(options.stream_density, 2.0);
    }
}
