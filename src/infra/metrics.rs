// ============================================================
// Layer 6 — Loss Logger
// ============================================================
// Records the loss of every training batch to a CSV file.
//
// Output format:
//   Batch,Loss
//   0,0.412345      ← epoch index, loss of one batch
//   0,0.398812
//   1,0.377001
//   ...
//
// The first column holds the EPOCH index of the batch (the
// header name is kept for compatibility with existing plots).
//
// Every row is flushed as soon as it is written, so the log
// survives a crash up to the last completed batch.
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

/// Incremental `Batch,Loss` CSV writer.
pub struct LossLog<W: Write> {
    out:  W,
    rows: usize,
}

impl LossLog<BufWriter<File>> {
    /// Create (or truncate) the log file at `path` and write the header.
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path)
            .with_context(|| format!("Cannot create loss log '{}'", path.display()))?;
        tracing::debug!("Created loss log: '{}'", path.display());
        Self::new(BufWriter::new(file))
    }
}

impl<W: Write> LossLog<W> {
    /// Wrap a writer and emit the header row.
    pub fn new(mut out: W) -> Result<Self> {
        writeln!(out, "Batch,Loss")?;
        out.flush()?;
        Ok(Self { out, rows: 0 })
    }

    /// Append one batch's loss and flush.
    pub fn record(&mut self, epoch: usize, loss: f64) -> Result<()> {
        writeln!(self.out, "{},{:.6}", epoch, loss)?;
        self.out.flush()?;
        self.rows += 1;
        Ok(())
    }

    /// Number of loss rows written so far
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
