// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// This layer contains the Burn-specific model code. Other
// layers see it only through the domain traits (Trainable,
// Persistable, Steppable), with two exceptions: the batcher
// in Layer 4 builds tensors and the checkpoint manager in
// Layer 6 records them.
//
// What's in this layer:
//
//   model.rs      — stacked LSTM → dense → linear network
//                   with an explicit recurrent-state value
//
//   trainer.rs    — Trainable + Persistable: RMSProp with
//                   truncated BPTT, checkpoint writing
//
//   inferencer.rs — Steppable: loads a checkpoint and runs
//                   the network one step (or run) at a time
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)

/// Stacked LSTM note model
pub mod model;

/// Truncated-BPTT training loop for one minibatch
pub mod trainer;

/// Autoregressive step interface over a loaded model
pub mod inferencer;

/// Backend used for training (GPU + autodiff)
pub type TrainBackend = burn::backend::Autodiff<burn::backend::Wgpu>;

/// Backend used for synthesis
pub type InferBackend = burn::backend::Wgpu;
