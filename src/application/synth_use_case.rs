// ============================================================
// Layer 2 — SynthUseCase
// ============================================================
// Generates a new note series from a trained model:
//
//   Step 1: Load the source series (sampler, batch size 1)
//   Step 2: Load model topology + parameters
//   Step 3: Copy the first `seed_length` rows to the output
//   Step 4: Warm the model on the whole seed in one pass
//   Step 5: Feed each prediction back in as the next input
//           until the output is as long as the source
//
// Every output row carries a synthetic timestamp that starts
// at `start_time` and grows by `time_gap` per row.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::PathBuf;

use crate::data::{loader::discover_sources, sampler::NoteSampler};
use crate::domain::series::Series;
use crate::domain::traits::Steppable;
use crate::infra::{checkpoint::CheckpointManager, series_writer::SeriesWriter};
use crate::ml::{inferencer::LstmGenerator, InferBackend};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthConfig {
    /// Source of the seed (first file found is used)
    pub inputs:         Vec<PathBuf>,
    pub checkpoint_dir: PathBuf,
    pub output:         PathBuf,
    pub seed_length:    usize,
    pub start_time:     f64,
    pub time_gap:       f64,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            inputs:         vec![PathBuf::from("data/encoded")],
            checkpoint_dir: PathBuf::from("checkpoints"),
            output:         PathBuf::from("synth.csv"),
            seed_length:    500,
            start_time:     0.02,
            time_gap:       0.01,
        }
    }
}

pub struct SynthUseCase {
    config: SynthConfig,
}

impl SynthUseCase {
    pub fn new(config: SynthConfig) -> Self {
        Self { config }
    }

    /// Returns the number of rows written (seed included).
    pub fn execute(&self) -> Result<usize> {
        let cfg = &self.config;

        // ── Step 1: Source series ─────────────────────────────────────────────
        let files   = discover_sources(&cfg.inputs[..])?;
        let sampler = NoteSampler::new(files, 1, cfg.seed_length.max(1))?;
        let series  = sampler.series();

        // ── Step 2: Model ─────────────────────────────────────────────────────
        let device    = burn::backend::wgpu::WgpuDevice::default();
        let ckpt      = CheckpointManager::new(&cfg.checkpoint_dir);
        let generator = LstmGenerator::<InferBackend>::from_checkpoint(&ckpt, device)?;
        if let Ok(info) = ckpt.latest_info() {
            tracing::info!(
                "Checkpoint trained on {} batches, loss {:.6}",
                info.batches_trained,
                info.loss
            );
        }
        if generator.n_features() != series.feature_width() {
            bail!(
                "Model expects {} features but '{}' has {}",
                generator.n_features(),
                series.header(),
                series.feature_width()
            );
        }

        // ── Steps 3-5: Seed and generate ──────────────────────────────────────
        let mut writer = SeriesWriter::create(&cfg.output, series.header())?;
        let written = synthesize(
            series,
            cfg.seed_length,
            &generator,
            &mut writer,
            cfg.start_time,
            cfg.time_gap,
        )?;

        tracing::info!("Done synthesis: {} rows → '{}'", written, cfg.output.display());
        Ok(written)
    }
}

/// Write `series.len()` rows: the first `seed_length` copied from
/// `series`, the rest predicted one step at a time by `model`.
pub fn synthesize<M, W>(
    series:      &Series,
    seed_length: usize,
    model:       &M,
    writer:      &mut SeriesWriter<W>,
    start_time:  f64,
    time_gap:    f64,
) -> Result<usize>
where
    M: Steppable,
    W: Write,
{
    if seed_length == 0 {
        bail!("seed_length must be > 0");
    }
    if seed_length > series.len() {
        bail!(
            "seed_length {} exceeds the {} rows available",
            seed_length,
            series.len()
        );
    }

    let seed = &series.rows()[..seed_length];
    let mut time = start_time;
    for row in seed {
        writer.write_row(time, row)?;
        time += time_gap;
    }

    // Cleared state, then one pass over the whole seed
    let state = model.init_state();
    let (mut prediction, mut state) = model.step(seed, state)?;

    let mut written = seed_length;
    while written < series.len() {
        writer.write_row(time, &prediction)?;
        written += 1;
        time    += time_gap;

        if written < series.len() {
            let (next, next_state) = model.step(std::slice::from_ref(&prediction), state)?;
            prediction = next;
            state      = next_state;
        }
    }

    Ok(written)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::Row;
    use std::cell::RefCell;

    /// Predicts "last input + 1" and counts how many rows it has seen.
    /// The state is the running total of rows consumed.
    struct Echo {
        calls: RefCell<Vec<usize>>,
    }

    impl Steppable for Echo {
        type State = usize;

        fn init_state(&self) -> usize {
            0
        }

        fn step(&self, inputs: &[Row], state: usize) -> Result<(Row, usize)> {
            self.calls.borrow_mut().push(inputs.len());
            let last = inputs.last().unwrap();
            Ok((last.iter().map(|v| v + 1.0).collect(), state + inputs.len()))
        }
    }

    fn series(rows: usize) -> Series {
        let data = (0..rows).map(|i| vec![i as f64 * 10.0, 0.5]).collect();
        Series::new("time,pitch,velocity", 2, data)
    }

    #[test]
    fn test_seed_then_feedback() {
        let model  = Echo { calls: RefCell::new(Vec::new()) };
        let mut w  = SeriesWriter::new(Vec::new(), "time,pitch,velocity").unwrap();

        let written = synthesize(&series(5), 2, &model, &mut w, 0.5, 0.25).unwrap();
        assert_eq!(written, 5);
        // One warm-up pass over the seed, then single steps
        assert_eq!(*model.calls.borrow(), vec![2, 1, 1]);

        let text = String::from_utf8(w.into_inner()).unwrap();
        assert_eq!(
            text,
            "time,pitch,velocity\n\
             0.5,0,0.5\n\
             0.75,10,0.5\n\
             1,11,1.5\n\
             1.25,12,2.5\n\
             1.5,13,3.5\n"
        );
    }

    #[test]
    fn test_seed_covers_whole_series() {
        let model = Echo { calls: RefCell::new(Vec::new()) };
        let mut w = SeriesWriter::new(Vec::new(), "h").unwrap();

        let written = synthesize(&series(3), 3, &model, &mut w, 0.0, 1.0).unwrap();
        assert_eq!(written, 3);
        // The seed pass still runs to warm the state
        assert_eq!(*model.calls.borrow(), vec![3]);
    }

    #[test]
    fn test_bad_seed_length() {
        let model = Echo { calls: RefCell::new(Vec::new()) };
        let mut w = SeriesWriter::new(Vec::new(), "h").unwrap();
        assert!(synthesize(&series(3), 0, &model, &mut w, 0.0, 1.0).is_err());
        assert!(synthesize(&series(3), 4, &model, &mut w, 0.0, 1.0).is_err());
        assert!(model.calls.borrow().is_empty());
    }
}
