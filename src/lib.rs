pub mod domain;
pub mod error;
pub mod grid;
pub mod plot;
pub mod policy;
pub mod sampler;
pub mod settings;

// Re-export commonly used types for convenience
pub use error::{NavfieldError, Result};
pub use grid::{BoundingBox, Grid, Point, Zone};
pub use sampler::{ActionSample, StateSample};
