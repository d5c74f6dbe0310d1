//! Error types for the note sampler

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for sampler operations
pub type SamplerResult<T> = std::result::Result<T, SamplerError>;

/// Errors surfaced by source discovery, parsing and the window sampler.
///
/// Malformed data rows are not an error: they are dropped while
/// loading and only counted in the debug log.
#[derive(Debug, Error)]
pub enum SamplerError {
    /// Bad constructor arguments
    #[error("Invalid sampler configuration: {0}")]
    InvalidConfiguration(String),

    /// A listed source did not exist when the sampler was built
    #[error("Could not access file (does not exist): {}", path.display())]
    SourceUnavailable {
        /// Path that was attempted
        path: PathBuf,
    },

    /// A source could not be read during a load or reload
    #[error("Failed to read '{}': {source}", path.display())]
    SourceReadFailure {
        /// File being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Every file has been visited and every offset consumed
    #[error("No windows left: all source files have been drained")]
    Exhausted,
}
