//! Feed-forward policy architecture, read from the JSON configuration

use std::fs;
use std::path::Path;

use burn::prelude::*;
use burn::tensor::activation::{relu, sigmoid};
use serde::{Deserialize, Serialize};

use crate::error::NavfieldError;

/// Hidden layer non-linearity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Relu,
    Elu,
    Tanh,
    Sigmoid,
    Linear,
}

impl Activation {
    pub fn apply<B: Backend, const D: usize>(&self, x: Tensor<B, D>) -> Tensor<B, D> {
        match self {
            Self::Relu => relu(x),
            // elu(x) = x for x > 0, exp(x) - 1 otherwise
            Self::Elu => {
                let negative = x.clone().clamp_max(0.0).exp().sub_scalar(1.0);
                x.clamp_min(0.0) + negative
            }
            Self::Tanh => x.tanh(),
            Self::Sigmoid => sigmoid(x),
            Self::Linear => x,
        }
    }
}

/// Configuration for the navigation policy network
#[derive(Debug, Config)]
pub struct PolicyConfig {
    /// Hidden layer widths, input side first
    pub layers: Vec<usize>,
    /// Hidden layer activation
    #[config(default = "Activation::Elu")]
    pub activation: Activation,
    /// Normalize the state before the first layer
    #[config(default = false)]
    pub input_layer_norm: bool,
    /// Size of the state vector
    #[config(default = 2)]
    pub state_dim: usize,
    /// Size of the action vector
    #[config(default = 2)]
    pub action_dim: usize,
    /// Squash outputs into `[-bound, bound]` with tanh
    pub action_bound: Option<f32>,
}

/// On-disk form of [`PolicyConfig`]; every field but `layers` may be omitted
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PolicyFile {
    layers: Vec<usize>,
    #[serde(default = "default_activation")]
    activation: Activation,
    #[serde(default)]
    input_layer_norm: bool,
    #[serde(default = "default_dim")]
    state_dim: usize,
    #[serde(default = "default_dim")]
    action_dim: usize,
    #[serde(default)]
    action_bound: Option<f32>,
}

fn default_activation() -> Activation {
    Activation::Elu
}

fn default_dim() -> usize {
    2
}

impl From<PolicyFile> for PolicyConfig {
    fn from(file: PolicyFile) -> Self {
        PolicyConfig::new(file.layers)
            .with_activation(file.activation)
            .with_input_layer_norm(file.input_layer_norm)
            .with_state_dim(file.state_dim)
            .with_action_dim(file.action_dim)
            .with_action_bound(file.action_bound)
    }
}

impl PolicyConfig {
    /// Load and validate a configuration file.
    ///
    /// The sampler produces planar positions and the renderer expects planar
    /// actions, so both dimensions must be 2.
    pub fn from_file(path: &Path) -> crate::error::Result<Self> {
        let invalid = |reason: String| NavfieldError::Config {
            path: path.to_path_buf(),
            reason,
        };
        let text = fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
        let file: PolicyFile = serde_json::from_str(&text).map_err(|e| invalid(e.to_string()))?;

        let config = PolicyConfig::from(file);
        config.validate(path)?;
        tracing::debug!("Policy config from {}: {}", path.display(), config);
        Ok(config)
    }

    fn validate(&self, path: &Path) -> crate::error::Result<()> {
        let fail = |reason: String| {
            Err(NavfieldError::Config {
                path: path.to_path_buf(),
                reason,
            })
        };

        if self.state_dim != 2 || self.action_dim != 2 {
            return fail(format!(
                "expected 2D states and actions, found state_dim={} action_dim={}",
                self.state_dim, self.action_dim
            ));
        }
        if self.layers.iter().any(|&width| width == 0) {
            return fail(format!("hidden layer widths must be positive: {:?}", self.layers));
        }
        if let Some(bound) = self.action_bound
            && !(bound.is_finite() && bound > 0.0)
        {
            return fail(format!("action_bound must be positive, found {bound}"));
        }
        Ok(())
    }

    /// `(name, [d_input, d_output])` for every linear layer, in forward order
    pub fn linear_shapes(&self) -> Vec<(String, [usize; 2])> {
        let mut shapes = Vec::with_capacity(self.layers.len() + 1);
        let mut width = self.state_dim;
        for (i, &next) in self.layers.iter().enumerate() {
            shapes.push((format!("hidden.{i}"), [width, next]));
            width = next;
        }
        shapes.push(("output".to_string(), [width, self.action_dim]));
        shapes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn write_config(tag: &str, body: &str) -> std::path::PathBuf {
        let path =
            std::env::temp_dir().join(format!("navfield-config-{}-{}.json", tag, std::process::id()));
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_defaults_fill_missing_fields() {
        let path = write_config("defaults", r#"{"layers": [64, 32]}"#);
        let config = PolicyConfig::from_file(&path).unwrap();
        fs::remove_file(path).ok();

        assert_eq!(config.layers, vec![64, 32]);
        assert_eq!(config.activation, Activation::Elu);
        assert!(!config.input_layer_norm);
        assert_eq!(config.state_dim, 2);
        assert_eq!(config.action_dim, 2);
        assert_eq!(config.action_bound, None);
    }

    #[test]
    fn test_full_config() {
        let path = write_config(
            "full",
            r#"{"layers": [16], "activation": "tanh", "input_layer_norm": true, "action_bound": 1.5}"#,
        );
        let config = PolicyConfig::from_file(&path).unwrap();
        fs::remove_file(path).ok();

        assert_eq!(config.activation, Activation::Tanh);
        assert!(config.input_layer_norm);
        assert_eq!(config.action_bound, Some(1.5));
    }

    #[test]
    fn test_malformed_json() {
        let path = write_config("malformed", r#"{"layers": [16"#);
        let err = PolicyConfig::from_file(&path).unwrap_err();
        fs::remove_file(path).ok();
        assert!(matches!(err, NavfieldError::Config { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = PolicyConfig::from_file(Path::new("/nonexistent/policy.json")).unwrap_err();
        assert!(matches!(err, NavfieldError::Config { .. }));
    }

    #[test]
    fn test_non_planar_dims_rejected() {
        let path = write_config("dims", r#"{"layers": [8], "action_dim": 3}"#);
        let err = PolicyConfig::from_file(&path).unwrap_err();
        fs::remove_file(path).ok();
        assert!(err.to_string().contains("action_dim=3"));
    }

    #[test]
    fn test_demo_config_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/policy.config.json");
        let config = PolicyConfig::from_file(&path).unwrap();

        assert_eq!(config.layers, vec![256, 128, 64, 32]);
        assert_eq!(config.activation, Activation::Elu);
        assert!(config.input_layer_norm);
        assert_eq!(config.state_dim, 2);
        assert_eq!(config.action_dim, 2);
        assert_eq!(config.action_bound, Some(1.0));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let path = write_config("unknown", r#"{"layers": [8], "hidden": [4]}"#);
        let err = PolicyConfig::from_file(&path).unwrap_err();
        fs::remove_file(path).ok();
        assert!(err.to_string().contains("hidden"));
    }

    #[test]
    fn test_linear_shapes() {
        let config = PolicyConfig::new(vec![64, 32]);
        let shapes = config.linear_shapes();
        assert_eq!(
            shapes,
            vec![
                ("hidden.0".to_string(), [2, 64]),
                ("hidden.1".to_string(), [64, 32]),
                ("output".to_string(), [32, 2]),
            ]
        );
    }

    #[test]
    fn test_elu_matches_definition() {
        let device = Default::default();
        let x = Tensor::<TestBackend, 1>::from_floats([-1.0, 0.0, 2.0], &device);
        let y: Vec<f32> = Activation::Elu.apply(x).into_data().to_vec().unwrap();
        assert!((y[0] - ((-1.0f32).exp() - 1.0)).abs() < 1e-6);
        assert!(y[1].abs() < 1e-6);
        assert!((y[2] - 2.0).abs() < 1e-6);
    }
}
