//! Feed-forward navigation policy network using Burn

use burn::module::{Ignored, Module};
use burn::nn::{LayerNorm, LayerNormConfig, Linear, LinearConfig};
use burn::prelude::*;

use super::config::{Activation, PolicyConfig};
use crate::error::NavfieldError;

/// Maps a batch of states `[batch, state_dim]` to actions `[batch, action_dim]`
#[derive(Module, Debug)]
pub struct FeedforwardPolicy<B: Backend> {
    /// Optional normalization of the raw state
    norm: Option<LayerNorm<B>>,
    /// Hidden layers
    hidden: Vec<Linear<B>>,
    /// Output layer (action)
    output: Linear<B>,
    activation: Ignored<Activation>,
    action_bound: Ignored<Option<f32>>,
}

impl<B: Backend> FeedforwardPolicy<B> {
    pub fn new(device: &B::Device, config: &PolicyConfig) -> Self {
        let norm = config
            .input_layer_norm
            .then(|| LayerNormConfig::new(config.state_dim).init(device));

        let mut hidden = Vec::with_capacity(config.layers.len());
        let mut width = config.state_dim;
        for &next in &config.layers {
            hidden.push(LinearConfig::new(width, next).init(device));
            width = next;
        }

        let output = LinearConfig::new(width, config.action_dim).init(device);

        Self {
            norm,
            hidden,
            output,
            activation: Ignored(config.activation),
            action_bound: Ignored(config.action_bound),
        }
    }

    pub fn forward(&self, states: Tensor<B, 2>) -> Tensor<B, 2> {
        let mut x = match &self.norm {
            Some(norm) => norm.forward(states),
            None => states,
        };

        for layer in &self.hidden {
            x = self.activation.0.apply(layer.forward(x));
        }

        let x = self.output.forward(x);
        match self.action_bound.0 {
            Some(bound) => x.tanh().mul_scalar(bound),
            None => x,
        }
    }
}

/// `(name, dims)` of every checked parameter in a record, in forward order.
///
/// The input norm is reported by its scale vector, linear layers by their weight.
pub fn record_shapes<B: Backend>(record: &FeedforwardPolicyRecord<B>) -> Vec<(String, Vec<usize>)> {
    let norm = record
        .norm
        .as_ref()
        .map(|norm| ("norm".to_string(), norm.gamma.val().dims().to_vec()));
    let hidden = record
        .hidden
        .iter()
        .enumerate()
        .map(|(i, layer)| (format!("hidden.{i}"), layer.weight.val().dims().to_vec()));
    let output = (
        "output".to_string(),
        record.output.weight.val().dims().to_vec(),
    );

    norm.into_iter()
        .chain(hidden)
        .chain(std::iter::once(output))
        .collect()
}

/// Shapes the configuration calls for, named like [`record_shapes`]
pub fn expected_shapes(config: &PolicyConfig) -> Vec<(String, Vec<usize>)> {
    let norm = config
        .input_layer_norm
        .then(|| ("norm".to_string(), vec![config.state_dim]));
    norm.into_iter()
        .chain(
            config
                .linear_shapes()
                .into_iter()
                .map(|(name, dims)| (name, dims.to_vec())),
        )
        .collect()
}

/// Compare a restored record with the architecture in `config`.
///
/// Layers missing from the record report an empty `found`; layers the
/// configuration has no place for report an empty `expected`.
pub fn check_record<B: Backend>(
    record: &FeedforwardPolicyRecord<B>,
    config: &PolicyConfig,
) -> crate::error::Result<()> {
    let expected = expected_shapes(config);
    let found = record_shapes(record);
    let lookup = |shapes: &[(String, Vec<usize>)], name: &str| {
        shapes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, dims)| dims.clone())
    };

    for (name, want) in &expected {
        match lookup(&found, name) {
            Some(have) if &have == want => {}
            have => {
                return Err(NavfieldError::ShapeMismatch {
                    layer: name.clone(),
                    expected: want.clone(),
                    found: have.unwrap_or_default(),
                });
            }
        }
    }

    if let Some((name, have)) = found
        .iter()
        .find(|(name, _)| lookup(&expected, name).is_none())
    {
        return Err(NavfieldError::ShapeMismatch {
            layer: name.clone(),
            expected: Vec::new(),
            found: have.clone(),
        });
    }

    Ok(())
}
