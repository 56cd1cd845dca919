//! Environment driven settings (`.env` is loaded by `main` before these are read)

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_DOMAIN_DIR: &str = "domains";
pub const DEFAULT_HAZARD_RESOLUTION: usize = 1000;
pub const DEFAULT_STREAM_DENSITY: f64 = 1.2;
/// Largest hazard mesh side accepted from the environment
pub const MAX_HAZARD_RESOLUTION: usize = 4000;
/// Largest streamline density accepted from the environment
pub const MAX_STREAM_DENSITY: f64 = 10.0;

/// Runtime knobs that are not part of the positional command line
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Directory searched for `<domain-id>.json`
    pub domain_dir: PathBuf,
    /// Side of the mesh the hazard field is evaluated on
    pub hazard_resolution: usize,
    /// Streamline density, 1.0 gives a 30x30 seeding grid
    pub stream_density: f64,
    /// Open the interactive window
    pub visualizer: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            domain_dir: PathBuf::from(DEFAULT_DOMAIN_DIR),
            hazard_resolution: DEFAULT_HAZARD_RESOLUTION,
            stream_density: DEFAULT_STREAM_DENSITY,
            visualizer: true,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup so tests don't touch the process env
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let domain_dir = lookup("NAVFIELD_DOMAIN_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.domain_dir);
        let hazard_resolution = parse_or(
            &lookup,
            "NAVFIELD_HAZARD_RESOLUTION",
            defaults.hazard_resolution,
            |v: &usize| (2..=MAX_HAZARD_RESOLUTION).contains(v),
        );
        let stream_density = parse_or(
            &lookup,
            "NAVFIELD_STREAM_DENSITY",
            defaults.stream_density,
            |v: &f64| *v > 0.0 && *v <= MAX_STREAM_DENSITY,
        );
        let visualizer = parse_or(&lookup, "NAVFIELD_VISUALIZER", defaults.visualizer, |_| true);

        Self {
            domain_dir,
            hazard_resolution,
            stream_density,
            visualizer,
        }
    }
}

fn parse_or<T: FromStr + std::fmt::Debug>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
    valid: impl Fn(&T) -> bool,
) -> T {
    let Some(raw) = lookup(key) else {
        return default;
    };

    match raw.trim().parse::<T>() {
        Ok(value) if valid(&value) => value,
        _ => {
            tracing::warn!("Ignoring {}={:?}, using default {:?}", key, raw, default);
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let settings = Settings::from_lookup(|_| None);
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.hazard_resolution, 1000);
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("NAVFIELD_DOMAIN_DIR", "/tmp/domains"),
            ("NAVFIELD_HAZARD_RESOLUTION", "250"),
            ("NAVFIELD_STREAM_DENSITY", "2.0"),
            ("NAVFIELD_VISUALIZER", "false"),
        ]));
        assert_eq!(settings.domain_dir, PathBuf::from("/tmp/domains"));
        assert_eq!(settings.hazard_resolution, 250);
        assert!((settings.stream_density - 2.0).abs() < 1e-12);
        assert!(!settings.visualizer);
    }

    #[test]
    fn test_oversized_values_fall_back() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("NAVFIELD_HAZARD_RESOLUTION", "1000000000"),
            ("NAVFIELD_STREAM_DENSITY", "1e9"),
        ]));
        assert_eq!(settings.hazard_resolution, DEFAULT_HAZARD_RESOLUTION);
        assert!((settings.stream_density - DEFAULT_STREAM_DENSITY).abs() < 1e-12);

        let settings = Settings::from_lookup(lookup_from(&[
            ("NAVFIELD_HAZARD_RESOLUTION", "4000"),
            ("NAVFIELD_STREAM_DENSITY", "inf"),
        ]));
        assert_eq!(settings.hazard_resolution, MAX_HAZARD_RESOLUTION);
        assert!((settings.stream_density - DEFAULT_STREAM_DENSITY).abs() < 1e-12);
    }

    #[test]
    fn test_malformed_values_fall_back() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("NAVFIELD_HAZARD_RESOLUTION", "lots"),
            ("NAVFIELD_STREAM_DENSITY", "-1"),
        ]));
        assert_eq!(settings.hazard_resolution, DEFAULT_HAZARD_RESOLUTION);
        assert!((settings.stream_density - DEFAULT_STREAM_DENSITY).abs() < 1e-12);
    }
}
