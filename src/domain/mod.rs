// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure Rust structs and traits that define the core concepts:
// a loaded note series, a minibatch of training windows, and
// the capabilities a sequence model must offer.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// A note series loaded from one source file
pub mod series;

// A minibatch of (input, target) windows
pub mod batch;

// Capabilities the drivers require from a sequence model
pub mod traits;
