// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Expand inputs into csv files     (Layer 4 - data)
//   Step 2: Build the window sampler         (Layer 4 - data)
//   Step 3: Build model + RMSProp trainer    (Layer 5 - ml)
//   Step 4: Save run config                  (Layer 6 - infra)
//   Step 5: Open the loss log                (Layer 6 - infra)
//   Step 6: Run the epoch loop               (this file)
//
// The epoch loop itself (run_epochs) only sees the domain
// traits, so it is tested here with a scripted fake model.
//
// Reference: Burn Book §5 (Training)

use anyhow::{Context, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::PathBuf;

use crate::data::{loader::discover_sources, sampler::NoteSampler};
use crate::domain::traits::{Persistable, Trainable};
use crate::infra::{checkpoint::CheckpointManager, metrics::LossLog};
use crate::ml::{
    model::NoteLstmConfig,
    trainer::{rmsprop_trainer, TrainerSettings},
    TrainBackend,
};

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run.
// Serialisable so it can be saved next to the checkpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    /// Files or directories of encoded note csv files
    pub inputs:              Vec<PathBuf>,
    pub checkpoint_dir:      PathBuf,
    pub loss_log:            PathBuf,
    pub lstm_layer_size:     usize,
    pub mini_batch_size:     usize,
    pub example_length:      usize,
    pub tbptt_length:        usize,
    pub num_epochs:          usize,
    pub learning_rate:       f64,
    pub dropout:             f64,
    pub rms_decay:           f64,
    pub checkpoint_interval: usize,
    /// Seed for the epoch plans; entropy when absent
    pub seed:                Option<u64>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            inputs:              vec![PathBuf::from("data/encoded")],
            checkpoint_dir:      PathBuf::from("checkpoints"),
            loss_log:            PathBuf::from("loss.csv"),
            lstm_layer_size:     256,
            mini_batch_size:     100,
            example_length:      2000,
            tbptt_length:        250,
            num_epochs:          600,
            learning_rate:       0.1,
            dropout:             0.5,
            rms_decay:           0.95,
            checkpoint_interval: 50,
            seed:                None,
        }
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<TrainingSummary> {
        let cfg = &self.config;
        if cfg.example_length < 2 {
            anyhow::bail!("example_length must be at least 2 to form a next-step window");
        }

        // ── Step 1: Find source files ─────────────────────────────────────────
        let files = discover_sources(&cfg.inputs[..])?;
        tracing::info!("Training on {} source files", files.len());

        // ── Step 2: Build the sampler (loads the first file) ──────────────────
        let mut sampler = match cfg.seed {
            Some(seed) => NoteSampler::seeded(files, cfg.mini_batch_size, cfg.example_length, seed)?,
            None       => NoteSampler::new(files, cfg.mini_batch_size, cfg.example_length)?,
        };
        let n_features = sampler.feature_width();
        tracing::info!(
            "Sampling {}-row windows, {} per minibatch, across {} files",
            sampler.example_length(),
            sampler.mini_batch_size(),
            sampler.file_count()
        );

        // ── Step 3: Build model and optimiser ─────────────────────────────────
        let device       = burn::backend::wgpu::WgpuDevice::default();
        tracing::info!("Using WGPU device: {:?}", device);
        let model_config = NoteLstmConfig::new(n_features, cfg.lstm_layer_size, cfg.dropout);
        let settings     = TrainerSettings {
            learning_rate: cfg.learning_rate,
            rms_decay:     cfg.rms_decay,
            tbptt_length:  cfg.tbptt_length,
        };
        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir);
        tracing::info!("Checkpoints will be written to '{}'", ckpt_manager.dir().display());

        // ── Step 4: Save config for reference ─────────────────────────────────
        ckpt_manager.save_config(cfg)?;

        let mut trainer = rmsprop_trainer::<TrainBackend>(model_config, settings, ckpt_manager, device)?;

        let mut total_params = 0;
        for (i, (name, n)) in trainer.model().layer_param_counts().iter().enumerate() {
            tracing::info!("Number of parameters in layer {} ({}): {}", i, name, n);
            total_params += n;
        }
        tracing::info!("Total number of network parameters: {}", total_params);

        // ── Step 5: Open the loss log ─────────────────────────────────────────
        let mut log = LossLog::create(&cfg.loss_log)?;

        // ── Step 6: Epoch loop ────────────────────────────────────────────────
        let summary = run_epochs(
            &mut sampler,
            &mut trainer,
            &mut log,
            cfg.num_epochs,
            cfg.checkpoint_interval,
        )?;

        tracing::info!(
            "Training complete: {} batches, {} checkpoints",
            summary.batches,
            summary.checkpoints.len()
        );
        Ok(summary)
    }
}

/// What happened during a run of run_epochs.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSummary {
    /// Batches trained across all epochs
    pub batches:     usize,
    /// Loss of the most recent batch (NaN if none ran)
    pub last_loss:   f64,
    /// Zero-based epochs after which a checkpoint was written
    pub checkpoints: Vec<usize>,
}

/// Train for `num_epochs` full passes over the sampler.
///
/// Every batch's loss is appended to `log` as it completes.
/// After each epoch the sampler is rewound; every
/// `checkpoint_interval` epochs the model is persisted unless the
/// latest loss is NaN. A diverged model is never checkpointed.
pub fn run_epochs<M, R, W>(
    sampler:             &mut NoteSampler<R>,
    model:               &mut M,
    log:                 &mut LossLog<W>,
    num_epochs:          usize,
    checkpoint_interval: usize,
) -> Result<TrainingSummary>
where
    M: Trainable + Persistable,
    R: Rng,
    W: Write,
{
    let mut summary = TrainingSummary {
        batches:     0,
        last_loss:   f64::NAN,
        checkpoints: Vec::new(),
    };

    for epoch in 0..num_epochs {
        tracing::info!("Epoch {}", epoch);
        let mut epoch_loss = f64::NAN;

        while sampler.has_next()? {
            let batch = sampler.next()?;
            let loss  = model
                .fit(&batch)
                .with_context(|| format!("Training failed in epoch {epoch}"))?;
            log.record(epoch, loss)?;

            epoch_loss         = loss;
            summary.batches   += 1;
            summary.last_loss  = loss;
        }

        sampler.reset_all()?;

        let at_boundary = checkpoint_interval > 0 && (epoch + 1) % checkpoint_interval == 0;
        if at_boundary {
            if epoch_loss.is_nan() {
                tracing::warn!("Epoch {}: loss is NaN, checkpoint skipped", epoch);
            } else {
                model.persist()?;
                summary.checkpoints.push(epoch);
                tracing::info!("Checkpoint saved after epoch {} (loss {:.6})", epoch, epoch_loss);
            }
        }
    }

    Ok(summary)
}
