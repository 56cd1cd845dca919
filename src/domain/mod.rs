//! Navigation domain description
//!
//! The domain compiler is an external collaborator. All the rest of the crate
//! sees is a [`DomainModel`]: a bag of evaluated non-fluents and the initial
//! state, keyed by fluent name.

pub mod fluent;
pub mod json;

pub use fluent::{FluentValue, Fluents};
pub use json::{DomainDocument, JsonDomain};

/// Initial agent location
pub const LOCATION: &str = "location/1";
/// Goal location
pub const GOAL: &str = "GOAL/1";
/// Deceleration zone centers, one `(x, y)` row per zone
pub const ZONE_CENTER: &str = "DECELERATION_ZONE_CENTER/2";
/// Deceleration zone decay rates, index aligned with [`ZONE_CENTER`]
pub const ZONE_DECAY: &str = "DECELERATION_ZONE_DECAY/1";

/// Evaluated view of a domain instance
pub trait DomainModel {
    fn name(&self) -> &str;

    /// Non-fluents (constants)
    fn constants(&self) -> &Fluents;

    /// Fluent values of the initial state
    fn initial_state(&self) -> &Fluents;
}
