//! Policy figure: a quiver panel and a streamline panel over the hazard field
//!
//! ```text
//!  Grid + StateSample + ActionSample
//!          │
//!          ▼
//!   build_figure ──► HazardField ──► contour_lines      (shared by both panels)
//!          │
//!          ├──► Field panel:  quiver arrows + sampled states
//!          └──► Stream panel: SquareField ──► streamlines
//!          │
//!          ▼
//!    run_viewer (bevy window) or Figure::summary (headless)
//! ```

pub mod axes;
pub mod contour;
pub mod figure;
pub mod hazard;
pub mod quiver;
pub mod stream;
pub mod viewer;

pub use figure::{Figure, FigureOptions, Panel, PanelKind, build_figure};
pub use viewer::run_viewer;
