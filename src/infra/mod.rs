// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Everything that touches disk on behalf of other layers:
//
//   checkpoint.rs     — model parameters (Burn recorder),
//                       topology and run config as JSON, and
//                       a small "latest" record per save
//
//   metrics.rs        — per-minibatch loss log (CSV)
//
//   series_writer.rs  — synthesized rows in the same CSV
//                       layout the training files use

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Training loss CSV logger
pub mod metrics;

/// Output writer for synthesized series
pub mod series_writer;
