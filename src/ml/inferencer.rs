// ============================================================
// Layer 5 — LSTM Generator
// ============================================================
// Loads a trained note model and exposes it as a Steppable:
// rows go in, the prediction for the step after the last row
// comes out, and the recurrent state is handed back to the
// caller instead of being kept here.

use anyhow::{anyhow, bail, Result};
use burn::prelude::*;

use crate::data::batcher::NoteBatcher;
use crate::domain::series::Row;
use crate::domain::traits::Steppable;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::{NoteLstm, NoteLstmConfig, NoteLstmState};

pub struct LstmGenerator<B: Backend> {
    model:   NoteLstm<B>,
    config:  NoteLstmConfig,
    batcher: NoteBatcher<B>,
}

impl<B: Backend> LstmGenerator<B> {
    pub fn new(model: NoteLstm<B>, config: NoteLstmConfig, device: B::Device) -> Self {
        Self { model, config, batcher: NoteBatcher::new(device) }
    }

    /// Rebuild the model stored in `ckpt_manager`.
    pub fn from_checkpoint(ckpt_manager: &CheckpointManager, device: B::Device) -> Result<Self> {
        let (model, config) = ckpt_manager.load_model::<B>(&device)?;
        tracing::info!(
            "Model loaded from checkpoint: {} features, {} hidden units",
            config.n_features,
            config.hidden_size
        );
        Ok(Self::new(model, config, device))
    }

    pub fn n_features(&self) -> usize {
        self.config.n_features
    }
}

impl<B: Backend> Steppable for LstmGenerator<B> {
    type State = Option<NoteLstmState<B>>;

    fn init_state(&self) -> Self::State {
        None
    }

    fn step(&self, inputs: &[Row], state: Self::State) -> Result<(Row, Self::State)> {
        if inputs.is_empty() {
            bail!("step needs at least one input row");
        }
        let features = self.config.n_features;
        let x = self.batcher.sequence(inputs, features);

        let (y, next_state) = self.model.forward(x, state);

        // Keep only the prediction after the final input step
        let last = inputs.len() - 1;
        let values: Vec<f32> = y
            .slice([0..1, last..last + 1, 0..features])
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| anyhow!("Cannot read model output: {e:?}"))?;

        let row = values.into_iter().map(f64::from).collect();
        Ok((row, Some(next_state)))
    }
}
