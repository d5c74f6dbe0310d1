// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates the other layers to accomplish one
// goal (training or synthesis).
//
// Rules for this layer:
//   - No ML math or model code here
//   - No printing here (that's Layer 1)
//   - Only workflow coordination
//
// The two drivers (run_epochs, synthesize) are written
// against the domain traits, not against Burn.

// The training workflow
pub mod train_use_case;

// Seed-then-generate workflow
pub mod synth_use_case;
