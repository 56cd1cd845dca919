//! Burn-backed [`Policy`]: restores a checkpoint and runs inference

use std::path::{Path, PathBuf};

use burn::prelude::*;
use burn::record::{FileRecorder, FullPrecisionSettings, NamedMpkFileRecorder, Recorder};

use super::Policy;
use super::config::PolicyConfig;
use super::model::{FeedforwardPolicy, FeedforwardPolicyRecord, check_record, record_shapes};
use crate::error::{NavfieldError, Result};
use crate::sampler::{ActionSample, StateSample};

/// Backend used for inference (CPU, no autodiff so no gradients are tracked)
pub type InferenceBackend = burn::backend::NdArray;

type CheckpointRecorder = NamedMpkFileRecorder<FullPrecisionSettings>;

/// Policy network plus the device it lives on
pub struct BurnPolicy<B: Backend> {
    model: FeedforwardPolicy<B>,
    config: PolicyConfig,
    device: B::Device,
    restored: bool,
}

impl<B: Backend> BurnPolicy<B> {
    /// Build an untrained network for the given architecture
    pub fn new(device: B::Device, config: PolicyConfig) -> Self {
        let model = FeedforwardPolicy::new(&device, &config);
        Self {
            model,
            config,
            device,
            restored: false,
        }
    }

    pub fn from_config_file(device: B::Device, path: &Path) -> Result<Self> {
        let config = PolicyConfig::from_file(path)?;
        tracing::info!(
            "Policy architecture: layers={:?} activation={:?}",
            config.layers,
            config.activation
        );
        Ok(Self::new(device, config))
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    pub fn is_restored(&self) -> bool {
        self.restored
    }

    /// File the recorder actually reads for `checkpoint`
    pub fn checkpoint_file(checkpoint: &Path) -> PathBuf {
        checkpoint.with_extension(<CheckpointRecorder as FileRecorder<B>>::file_extension())
    }
}

impl<B: Backend> Policy for BurnPolicy<B> {
    fn restore(&mut self, checkpoint: &Path) -> Result<()> {
        let file = Self::checkpoint_file(checkpoint);
        if !file.is_file() {
            return Err(NavfieldError::Checkpoint {
                path: file,
                reason: "file not found".to_string(),
            });
        }

        // check the record before handing it to the module, which panics on a depth change
        let recorder = CheckpointRecorder::new();
        let record: FeedforwardPolicyRecord<B> =
            Recorder::<B>::load(&recorder, checkpoint.to_path_buf(), &self.device).map_err(
                |e| NavfieldError::Checkpoint {
                    path: file.clone(),
                    reason: format!("{e:?}"),
                },
            )?;

        for (name, dims) in record_shapes(&record) {
            tracing::debug!("Restored {} {:?}", name, dims);
        }
        check_record(&record, &self.config)?;

        let model = self.model.clone().load_record(record);
        self.model = model;
        self.restored = true;
        tracing::info!("Loaded policy from {}", file.display());
        Ok(())
    }

    fn evaluate(&self, states: &StateSample) -> Result<ActionSample> {
        if !self.restored {
            return Err(NavfieldError::NotRestored);
        }

        let batch = states.len();
        let input = Tensor::<B, 1>::from_floats(states.to_flat_f32().as_slice(), &self.device)
            .reshape([batch, self.config.state_dim]);

        let output = self.model.forward(input);
        let flat: Vec<f32> = output
            .into_data()
            .to_vec()
            .map_err(|e| NavfieldError::Inference {
                reason: format!("{e:?}"),
            })?;

        Ok(ActionSample::from_flat_f32(&flat))
    }
}

/// Write a freshly initialized network to `path`, for tests that need a checkpoint
#[cfg(test)]
pub(crate) fn write_checkpoint(config: &PolicyConfig, path: &Path) -> FeedforwardPolicy<InferenceBackend> {
    let device = Default::default();
    let model = FeedforwardPolicy::<InferenceBackend>::new(&device, config);
    model
        .clone()
        .save_file(path, &CheckpointRecorder::new())
        .expect("Failed to save checkpoint");
    model
}
