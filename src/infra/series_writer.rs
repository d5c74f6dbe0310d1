// ============================================================
// Layer 6 — Series Writer
// ============================================================
// Writes synthesized note rows in the same CSV layout the
// training files use:
//
//   <header copied from the source file>
//   0.02,64.0,0.8,0.25
//   0.03,63.1,0.7,0.25
//
// Each row is flushed immediately so a long synthesis run can
// be inspected (or played) while it is still going.

use anyhow::{Context, Result};
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

pub struct SeriesWriter<W: Write> {
    out: W,
}

impl SeriesWriter<BufWriter<File>> {
    pub fn create(path: &Path, header: &str) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Cannot create output '{}'", path.display()))?;
        Self::new(BufWriter::new(file), header)
    }
}

impl<W: Write> SeriesWriter<W> {
    /// Wrap a writer and copy the header line verbatim.
    pub fn new(mut out: W, header: &str) -> Result<Self> {
        writeln!(out, "{header}")?;
        out.flush()?;
        Ok(Self { out })
    }

    /// Write `timestamp,f1,...,fF` and flush.
    pub fn write_row(&mut self, timestamp: f64, features: &[f64]) -> Result<()> {
        write!(self.out, "{timestamp}")?;
        for value in features {
            write!(self.out, ",{value}")?;
        }
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
