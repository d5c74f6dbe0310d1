// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The drivers in Layer 2 never touch Burn directly. They talk
// to a sequence model only through these three traits:
//
//   Trainable   → fit one minibatch, report its loss
//   Persistable → write parameters + topology to durable storage
//   Steppable   → run inputs through the network with an
//                 explicit recurrent-state handle
//
// The Burn implementations live in Layer 5 (ml/). Unit tests
// for the drivers use small scripted fakes instead, so the
// epoch and synthesis loops are testable without a GPU.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;

use crate::domain::batch::WindowBatch;
use crate::domain::series::Row;

// ─── Trainable ────────────────────────────────────────────────────────────────
/// A model that can take one gradient step on a minibatch.
pub trait Trainable {
    /// Train on `batch` and return the resulting loss.
    /// A diverged model may legitimately return NaN.
    fn fit(&mut self, batch: &WindowBatch) -> Result<f64>;
}

// ─── Persistable ──────────────────────────────────────────────────────────────
/// Any component whose state can be written to disk.
///
/// Implementations write the parameter blob and the topology
/// descriptor together so a later process can rebuild the model.
pub trait Persistable {
    fn persist(&self) -> Result<()>;
}

// ─── Steppable ────────────────────────────────────────────────────────────────
/// Autoregressive access to a recurrent model.
///
/// The recurrent state is an explicit value threaded through
/// every call rather than hidden inside the model:
///
///   let state = model.init_state();
///   let (out, state) = model.step(&seed_rows, state)?;
///   let (out, state) = model.step(&[out], state)?;
pub trait Steppable {
    type State;

    /// A fresh (cleared) recurrent state.
    fn init_state(&self) -> Self::State;

    /// Feed one or more consecutive time-steps of a single sequence.
    /// Returns the prediction after the last step and the new state.
    fn step(&self, inputs: &[Row], state: Self::State) -> Result<(Row, Self::State)>;
}
