// ============================================================
// Layer 5 — LSTM Trainer
// ============================================================
// Implements Trainable + Persistable for the note model.
//
// One fit() call = one minibatch, trained with truncated
// backpropagation through time (TBPTT):
//
//   steps:   |---- seg 0 ----|---- seg 1 ----|-- seg 2 --|
//            forward+backward forward+backward  ...
//            state ─detach──▶ state ─detach──▶
//
// Each segment of `tbptt_length` steps gets its own forward
// pass, MSE loss, backward pass and optimiser step. The
// recurrent state flows forward into the next segment but is
// detached, so gradients never reach back past a segment.
//
// The loss returned is that of the final segment, which is
// the score reported after the update.
//
// Reference: Burn Book §5 (Training)
//            Williams & Peng (1990) truncated BPTT

use anyhow::{bail, Result};
use burn::{
    nn::loss::{MseLoss, Reduction},
    optim::{GradientsParams, Optimizer, RmsPropConfig},
    tensor::{backend::AutodiffBackend, ElementConversion},
};

use crate::data::batcher::{NoteBatcher, NoteTensors};
use crate::domain::batch::WindowBatch;
use crate::domain::traits::{Persistable, Trainable};
use crate::infra::checkpoint::{CheckpointInfo, CheckpointManager};
use crate::ml::model::{NoteLstm, NoteLstmConfig, NoteLstmState};

/// Optimiser and BPTT settings for one training run.
#[derive(Debug, Clone)]
pub struct TrainerSettings {
    pub learning_rate: f64,
    /// RMSProp moving-average decay
    pub rms_decay:     f64,
    pub tbptt_length:  usize,
}

pub struct LstmTrainer<B: AutodiffBackend, O> {
    model:        NoteLstm<B>,
    model_config: NoteLstmConfig,
    optim:        O,
    batcher:      NoteBatcher<B>,
    settings:     TrainerSettings,
    checkpoints:  CheckpointManager,

    batches_trained: usize,
    last_loss:       f64,
}

/// Build a freshly initialised model with an RMSProp optimiser.
pub fn rmsprop_trainer<B: AutodiffBackend>(
    model_config: NoteLstmConfig,
    settings:     TrainerSettings,
    checkpoints:  CheckpointManager,
    device:       B::Device,
) -> Result<LstmTrainer<B, impl Optimizer<NoteLstm<B>, B>>> {
    let model = model_config.init::<B>(&device);
    let optim = RmsPropConfig::new()
        .with_alpha(settings.rms_decay as f32)
        .init::<B, NoteLstm<B>>();
    LstmTrainer::new(model, model_config, optim, settings, checkpoints, device)
}

impl<B, O> LstmTrainer<B, O>
where
    B: AutodiffBackend,
    O: Optimizer<NoteLstm<B>, B>,
{
    pub fn new(
        model:        NoteLstm<B>,
        model_config: NoteLstmConfig,
        optim:        O,
        settings:     TrainerSettings,
        checkpoints:  CheckpointManager,
        device:       B::Device,
    ) -> Result<Self> {
        if settings.tbptt_length == 0 {
            bail!("tbptt_length must be > 0");
        }
        Ok(Self {
            model,
            model_config,
            optim,
            batcher: NoteBatcher::new(device),
            settings,
            checkpoints,
            batches_trained: 0,
            last_loss: f64::NAN,
        })
    }

    pub fn model(&self) -> &NoteLstm<B> {
        &self.model
    }

    pub fn batches_trained(&self) -> usize {
        self.batches_trained
    }
}

impl<B, O> Trainable for LstmTrainer<B, O>
where
    B: AutodiffBackend,
    O: Optimizer<NoteLstm<B>, B>,
{
    fn fit(&mut self, batch: &WindowBatch) -> Result<f64> {
        if batch.is_empty() {
            bail!("Cannot train on an empty batch of shape {:?}", batch.shape());
        }

        let NoteTensors { input, target } = self.batcher.batch(batch);
        let [size, steps, features] = input.dims();
        let segment = self.settings.tbptt_length;

        let mut state: Option<NoteLstmState<B>> = None;
        let mut loss_val = f64::NAN;

        for start in (0..steps).step_by(segment) {
            let end = (start + segment).min(steps);
            let x = input.clone().slice([0..size, start..end, 0..features]);
            let y = target.clone().slice([0..size, start..end, 0..features]);

            let (pred, next_state) = self.model.forward(x, state);
            let loss = MseLoss::new().forward(pred, y, Reduction::Mean);
            loss_val = loss.clone().into_scalar().elem::<f64>();

            // Backward pass + RMSProp update
            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &self.model);
            self.model = self.optim.step(self.settings.learning_rate, self.model.clone(), grads);

            state = Some(next_state.detach());
        }

        self.batches_trained += 1;
        self.last_loss = loss_val;
        tracing::debug!(
            "Score at batch {} is {:.6}",
            self.batches_trained,
            loss_val
        );
        Ok(loss_val)
    }
}

impl<B, O> Persistable for LstmTrainer<B, O>
where
    B: AutodiffBackend,
    O: Optimizer<NoteLstm<B>, B>,
{
    fn persist(&self) -> Result<()> {
        let info = CheckpointInfo {
            batches_trained: self.batches_trained,
            loss:            self.last_loss,
        };
        self.checkpoints.save_model(&self.model, &self.model_config, &info)
    }
}
