// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// From encoded note csv files to tensor minibatches:
//
//   input paths
//       │
//       ▼
//   discover_sources  → expands directories into .csv files
//       │
//       ▼
//   parse_series      → header + numeric rows, one file
//       │
//       ▼
//   NoteSampler       → shuffled fixed-length windows,
//       │               rotating across files per epoch
//       ▼
//   NoteBatcher       → WindowBatch → Burn tensors
//
// Sampler failures are a typed error (error.rs); the layers
// above turn them into anyhow errors with `?`.

/// Sampler error type
pub mod error;

/// Source discovery and csv parsing
pub mod loader;

/// Randomized window sampler over a list of files
pub mod sampler;

/// Converts window batches into Burn tensors
pub mod batcher;
