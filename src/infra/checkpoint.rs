// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores the note model.
//
// A checkpoint is two artifacts written together, plus a
// small pointer file:
//   1. coefficients.mpk — every learned parameter
//   2. conf.json        — NoteLstmConfig (the topology)
//   3. latest.json      — how far training had got
//
// The topology is needed first when loading: the model is
// rebuilt from conf.json, then the parameters are loaded into
// it. Loading fails if the two do not match.
//
// The recorder uses full precision so a reloaded model
// reproduces the saved one's outputs exactly.
//
// File layout:
//   checkpoints/
//     coefficients.mpk
//     conf.json
//     latest.json
//     train_config.json   ← full run configuration, for reference
//
// Reference: Burn Book §5 (Records and Checkpointing)
//            Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder},
};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::{NoteLstm, NoteLstmConfig};

const COEFFICIENTS: &str = "coefficients";
const TOPOLOGY:     &str = "conf.json";
const LATEST:       &str = "latest.json";
const RUN_CONFIG:   &str = "train_config.json";

/// Progress recorded alongside each checkpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointInfo {
    pub batches_trained: usize,
    pub loss:            f64,
}

/// Manages saving and loading of model checkpoints.
/// All files are stored in the configured directory.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create a new CheckpointManager.
    /// Creates the directory if it doesn't already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        fs::create_dir_all(&dir).ok();
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write parameters, topology and progress for `model`.
    /// An existing checkpoint in the directory is overwritten.
    pub fn save_model<B: Backend>(
        &self,
        model:  &NoteLstm<B>,
        config: &NoteLstmConfig,
        info:   &CheckpointInfo,
    ) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;

        // Recorder adds the file extension
        let path = self.dir.join(COEFFICIENTS);
        recorder()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| {
                format!("Failed to save parameters to '{}'", path.display())
            })?;

        let topology = self.dir.join(TOPOLOGY);
        fs::write(&topology, serde_json::to_string_pretty(config)?)
            .with_context(|| format!("Cannot write topology to '{}'", topology.display()))?;

        let latest = self.dir.join(LATEST);
        fs::write(&latest, serde_json::to_string(info)?)
            .with_context(|| format!("Cannot write '{}'", latest.display()))?;

        tracing::debug!(
            "Saved checkpoint after {} batches to '{}'",
            info.batches_trained,
            self.dir.display()
        );
        Ok(())
    }

    /// Read the topology descriptor.
    pub fn load_model_config(&self) -> Result<NoteLstmConfig> {
        let path = self.dir.join(TOPOLOGY);
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read topology from '{}'. Have you trained the model first?",
                path.display()
            )
        })?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Rebuild the model from its topology, then load its parameters.
    pub fn load_model<B: Backend>(
        &self,
        device: &B::Device,
    ) -> Result<(NoteLstm<B>, NoteLstmConfig)> {
        let config = self.load_model_config()?;
        let model: NoteLstm<B> = config.init(device);

        let path   = self.dir.join(COEFFICIENTS);
        let record = recorder()
            .load(path.clone(), device)
            .with_context(|| {
                format!(
                    "Cannot load parameters '{}'. Have you trained the model first?",
                    path.display()
                )
            })?;

        Ok((model.load_record(record), config))
    }

    /// Progress of the stored checkpoint.
    pub fn latest_info(&self) -> Result<CheckpointInfo> {
        let path = self.dir.join(LATEST);
        let s = fs::read_to_string(&path)
            .with_context(|| format!("Cannot find '{}'", path.display()))?;
        Ok(serde_json::from_str(&s)?)
    }

    /// Save the run configuration next to the checkpoint.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join(RUN_CONFIG);
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }
}

fn recorder() -> NamedMpkFileRecorder<FullPrecisionSettings> {
    NamedMpkFileRecorder::<FullPrecisionSettings>::new()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use tempfile::tempdir;

    type TestBackend = NdArray;

    #[test]
    fn test_round_trip_reproduces_outputs() {
        let dir    = tempdir().unwrap();
        let ckpt   = CheckpointManager::new(dir.path());
        let device = Default::default();

        let config = NoteLstmConfig::new(2, 6, 0.0);
        let model: NoteLstm<TestBackend> = config.init(&device);
        let info = CheckpointInfo { batches_trained: 12, loss: 0.25 };
        ckpt.save_model(&model, &config, &info).unwrap();

        let (loaded, loaded_cfg) = ckpt.load_model::<TestBackend>(&device).unwrap();
        assert_eq!(loaded_cfg.n_features, 2);
        assert_eq!(loaded_cfg.hidden_size, 6);
        assert_eq!(ckpt.latest_info().unwrap(), info);

        let x = Tensor::<TestBackend, 3>::ones([1, 4, 2], &device);
        let (a, _) = model.forward(x.clone(), None);
        let (b, _) = loaded.forward(x, None);
        let a: Vec<f32> = a.into_data().to_vec().unwrap();
        let b: Vec<f32> = b.into_data().to_vec().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_missing_checkpoint_is_error() {
        let dir  = tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path());
        assert!(ckpt.load_model::<TestBackend>(&Default::default()).is_err());
        assert!(ckpt.latest_info().is_err());
    }

    #[test]
    fn test_save_config_writes_json() {
        let dir  = tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path());
        ckpt.save_config(&TrainConfig::default()).unwrap();

        let json = fs::read_to_string(ckpt.dir().join(RUN_CONFIG)).unwrap();
        let back: TrainConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.mini_batch_size, TrainConfig::default().mini_batch_size);
    }
}
