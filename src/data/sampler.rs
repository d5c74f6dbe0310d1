// ============================================================
// Layer 4 — Note Window Sampler
// ============================================================
// Turns one or more encoded note files into minibatches of
// next-step prediction windows.
//
// Epoch plan for a loaded series of length L, window length w:
//
//   n       = (L - 1) / w - 1
//   offsets = { i*w + jitter_i : i = -1, 0, .., n - 1 }
//             jitter_i uniform in [0, w)
//   shuffle(offsets)
//
// Negative offsets are clamped to 0 when used. Each offset is
// consumed exactly once; when the plan runs dry the sampler
// moves on to the next file. Files are never revisited until
// reset_all() rewinds to the first one for the next epoch.
//
// Example with L=5, w=3:
//   n = 4/3 - 1 = 0 → one offset in [-3, -1] → start 0
//   window rows 0..3 → 2 steps:
//     input  = rows[0], rows[1]
//     target = rows[1], rows[2]
//
// Reference: Rust Book §8 (Collections), rand crate documentation

use std::collections::VecDeque;
use std::path::PathBuf;

use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

use crate::data::error::{SamplerError, SamplerResult};
use crate::data::loader::parse_series;
use crate::domain::batch::WindowBatch;
use crate::domain::series::Series;

/// Whether the plan still has offsets for the loaded series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// A series is loaded and its plan has offsets left
    SeriesLoaded,
    /// The plan is empty; the next access loads the file at the cursor
    AwaitingReload,
}

pub struct NoteSampler<R: Rng = StdRng> {
    files:           Vec<PathBuf>,
    mini_batch_size: usize,
    example_length:  usize,

    /// Index of the next file to load
    file_cursor: usize,
    series:      Series,
    offsets:     VecDeque<i64>,
    phase:       Phase,
    rng:         R,
}

impl NoteSampler<StdRng> {
    /// Build a sampler whose epoch plans are seeded from OS entropy.
    pub fn new(
        files:           Vec<PathBuf>,
        mini_batch_size: usize,
        example_length:  usize,
    ) -> SamplerResult<Self> {
        Self::with_rng(files, mini_batch_size, example_length, StdRng::from_entropy())
    }

    /// Build a sampler with reproducible epoch plans.
    pub fn seeded(
        files:           Vec<PathBuf>,
        mini_batch_size: usize,
        example_length:  usize,
        seed:            u64,
    ) -> SamplerResult<Self> {
        Self::with_rng(files, mini_batch_size, example_length, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> NoteSampler<R> {
    /// Validate the arguments and load the first file.
    pub fn with_rng(
        files:           Vec<PathBuf>,
        mini_batch_size: usize,
        example_length:  usize,
        rng:             R,
    ) -> SamplerResult<Self> {
        if files.is_empty() {
            return Err(SamplerError::InvalidConfiguration(
                "Must have at least one file".into(),
            ));
        }
        if mini_batch_size == 0 {
            return Err(SamplerError::InvalidConfiguration(
                "Invalid miniBatchSize (must be >0)".into(),
            ));
        }
        if example_length == 0 {
            return Err(SamplerError::InvalidConfiguration(
                "Invalid exampleLength (must be >0)".into(),
            ));
        }
        if let Some(missing) = files.iter().find(|f| !f.exists()) {
            return Err(SamplerError::SourceUnavailable { path: missing.clone() });
        }

        let mut sampler = Self {
            files,
            mini_batch_size,
            example_length,
            file_cursor: 0,
            series:      Series::default(),
            offsets:     VecDeque::new(),
            phase:       Phase::AwaitingReload,
            rng,
        };
        sampler.load_current_file()?;
        Ok(sampler)
    }

    /// True while another batch can be produced.
    ///
    /// An empty plan with files remaining is reloaded here first,
    /// so the answer always reflects the file that would be used.
    pub fn has_next(&mut self) -> SamplerResult<bool> {
        self.reload_if_drained()?;
        Ok(self.file_cursor != self.files.len() || !self.offsets.is_empty())
    }

    /// Next batch of the configured minibatch size.
    pub fn next(&mut self) -> SamplerResult<WindowBatch> {
        self.next_batch(self.mini_batch_size)
    }

    /// Pop up to `n` offsets from the plan and materialize their windows.
    ///
    /// Output shape is (k, feature_width, example_length - 1) with
    /// k = min(n, offsets left). Windows cut short by the end of the
    /// series leave their trailing steps at zero.
    pub fn next_batch(&mut self, n: usize) -> SamplerResult<WindowBatch> {
        self.reload_if_drained()?;
        if self.offsets.is_empty() {
            return Err(SamplerError::Exhausted);
        }

        let k     = n.min(self.offsets.len());
        let steps = self.example_length - 1;
        let mut batch = WindowBatch::zeros(k, self.series.feature_width(), steps);

        let rows = self.series.rows();
        for (i, offset) in self.offsets.drain(..k).enumerate() {
            let start = offset.max(0) as usize;
            let end   = (start + self.example_length).min(rows.len());
            for t in (start + 1)..end {
                batch.set_step(i, t - start - 1, &rows[t - 1], &rows[t]);
            }
        }

        if self.offsets.is_empty() {
            self.phase = Phase::AwaitingReload;
        }
        Ok(batch)
    }

    /// Rewind to the first file and build a fresh plan for it.
    pub fn reset_all(&mut self) -> SamplerResult<()> {
        self.file_cursor = 0;
        self.load_current_file()
    }

    pub fn series(&self) -> &Series { &self.series }

    pub fn header(&self) -> &str { self.series.header() }

    pub fn feature_width(&self) -> usize { self.series.feature_width() }

    pub fn file_cursor(&self) -> usize { self.file_cursor }

    pub fn file_count(&self) -> usize { self.files.len() }

    pub fn remaining_offsets(&self) -> usize { self.offsets.len() }

    pub fn phase(&self) -> Phase { self.phase }

    pub fn mini_batch_size(&self) -> usize { self.mini_batch_size }

    pub fn example_length(&self) -> usize { self.example_length }

    /// Load files from the cursor until one yields a non-empty plan
    /// or the list runs out.
    fn reload_if_drained(&mut self) -> SamplerResult<()> {
        while self.phase == Phase::AwaitingReload && self.file_cursor < self.files.len() {
            self.load_current_file()?;
        }
        Ok(())
    }

    /// Replace the series with the file at the cursor, advance the
    /// cursor, and compute a new shuffled epoch plan.
    fn load_current_file(&mut self) -> SamplerResult<()> {
        let path = &self.files[self.file_cursor];
        tracing::info!("Loading file {}", path.display());

        self.series       = parse_series(path)?;
        self.file_cursor += 1;

        let w = self.example_length as i64;
        let n = (self.series.len() as i64 - 1) / w - 1;
        let mut plan: Vec<i64> = (-1..n)
            .map(|i| i * w + self.rng.gen_range(0..w))
            .collect();
        plan.shuffle(&mut self.rng);

        tracing::debug!(
            "Series of {} rows → {} windows of length {}",
            self.series.len(),
            plan.len(),
            self.example_length,
        );

        self.offsets = plan.into();
        self.phase = if self.offsets.is_empty() {
            Phase::AwaitingReload
        } else {
            Phase::SeriesLoaded
        };
        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::{tempdir, TempDir};

    /// Write a csv with header "t,a,b" and rows [2i+1, 2i+2].
    fn write_pairs(dir: &Path, name: &str, rows: usize) -> PathBuf {
        let mut text = String::from("t,a,b\n");
        for i in 0..rows {
            text.push_str(&format!("{},{},{}\n", i, 2 * i + 1, 2 * i + 2));
        }
        let path = dir.join(name);
        fs::write(&path, text).unwrap();
        path
    }

    fn single_file(rows: usize, mb: usize, len: usize, seed: u64) -> (TempDir, NoteSampler) {
        let dir  = tempdir().unwrap();
        let path = write_pairs(dir.path(), "song.csv", rows);
        let s    = NoteSampler::seeded(vec![path], mb, len, seed).unwrap();
        (dir, s)
    }

    /// Find the series row a batch step was copied from.
    fn source_row(series: &Series, first_feature: f64) -> usize {
        series.rows().iter().position(|r| r[0] == first_feature).unwrap()
    }

    #[test]
    fn test_rejects_bad_configuration() {
        let dir  = tempdir().unwrap();
        let path = write_pairs(dir.path(), "song.csv", 5);

        assert!(matches!(
            NoteSampler::new(vec![], 1, 3),
            Err(SamplerError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            NoteSampler::new(vec![path.clone()], 0, 3),
            Err(SamplerError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            NoteSampler::new(vec![path], 1, 0),
            Err(SamplerError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let dir     = tempdir().unwrap();
        let present = write_pairs(dir.path(), "song.csv", 5);
        let missing = dir.path().join("nope.csv");

        match NoteSampler::new(vec![present, missing.clone()], 1, 3) {
            Err(SamplerError::SourceUnavailable { path }) => assert_eq!(path, missing),
            other => panic!("expected SourceUnavailable, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_single_window_example() {
        // Any seed: the only offset is in [-3, -1] and clamps to 0.
        for seed in 0..10 {
            let (_dir, mut s) = single_file(5, 1, 3, seed);
            assert_eq!(s.remaining_offsets(), 1);

            let b = s.next_batch(1).unwrap();
            assert_eq!(b.shape(), [1, 2, 2]);
            assert_eq!(b.filled_steps(0), 2);
            assert_eq!((b.input_at(0, 0, 0), b.input_at(0, 1, 0)), (1.0, 2.0));
            assert_eq!((b.input_at(0, 0, 1), b.input_at(0, 1, 1)), (3.0, 4.0));
            assert_eq!((b.target_at(0, 0, 0), b.target_at(0, 1, 0)), (3.0, 4.0));
            assert_eq!((b.target_at(0, 0, 1), b.target_at(0, 1, 1)), (5.0, 6.0));
        }
    }

    #[test]
    fn test_next_step_relationship() {
        let (_dir, mut s) = single_file(103, 4, 10, 7);
        let series = s.series().clone();
        let mut seen = 0;

        while s.has_next().unwrap() {
            let b = s.next().unwrap();
            for i in 0..b.size() {
                let filled = b.filled_steps(i);
                assert!(filled <= b.steps());
                for c in 0..filled {
                    let input_row  = source_row(&series, b.input_at(i, 0, c));
                    let target_row = source_row(&series, b.target_at(i, 0, c));
                    assert_eq!(input_row + 1, target_row);
                    assert_eq!(b.input_at(i, 1, c), series.rows()[input_row][1]);
                    assert_eq!(b.target_at(i, 1, c), series.rows()[target_row][1]);
                    // input at step c+1 is the target at step c
                    if c + 1 < filled {
                        assert_eq!(b.input_at(i, 0, c + 1), b.target_at(i, 0, c));
                    }
                }
                seen += 1;
            }
        }
        // n = 102/10 - 1 = 9 → offsets for i = -1..9
        assert_eq!(seen, 10);
    }

    #[test]
    fn test_filled_steps_formula() {
        // filled = min(start + w, L) - start - 1, never more than w - 1
        for (rows, w) in [(5usize, 3usize), (23, 4), (40, 7), (9, 2)] {
            let (_dir, mut s) = single_file(rows, 1, w, rows as u64);
            let series = s.series().clone();
            while s.has_next().unwrap() {
                let b = s.next().unwrap();
                if b.filled_steps(0) == 0 {
                    continue;
                }
                let start    = source_row(&series, b.input_at(0, 0, 0));
                let expected = (start + w).min(rows) - start - 1;
                assert_eq!(b.filled_steps(0), expected);
                assert!(b.filled_steps(0) <= w - 1);
            }
        }
    }

    #[test]
    fn test_batch_size_capped_by_plan() {
        let (_dir, mut s) = single_file(31, 100, 5, 3);
        // n = 30/5 - 1 = 5 → 6 offsets
        assert_eq!(s.remaining_offsets(), 6);
        let b = s.next_batch(4).unwrap();
        assert_eq!(b.shape(), [4, 2, 4]);
        let b = s.next_batch(4).unwrap();
        assert_eq!(b.size(), 2);
        assert_eq!(s.phase(), Phase::AwaitingReload);
    }

    #[test]
    fn test_single_file_exhausts() {
        let (_dir, mut s) = single_file(50, 3, 4, 11);
        let mut batches = 0;
        while s.has_next().unwrap() {
            s.next().unwrap();
            batches += 1;
            assert!(batches < 100, "sampler never drained");
        }
        assert!(batches > 0);
        assert_eq!(s.file_cursor(), 1);
        assert_eq!(s.remaining_offsets(), 0);
        assert!(matches!(s.next(), Err(SamplerError::Exhausted)));
    }

    #[test]
    fn test_rotates_through_files() {
        let dir    = tempdir().unwrap();
        let first  = write_pairs(dir.path(), "a.csv", 5);
        let second = write_pairs(dir.path(), "b.csv", 9);
        let mut s  = NoteSampler::seeded(vec![first, second], 10, 3, 1).unwrap();

        assert_eq!(s.file_cursor(), 1);
        assert_eq!(s.series().len(), 5);
        s.next().unwrap();

        // Plan drained but a file remains
        assert!(s.has_next().unwrap());
        assert_eq!(s.file_cursor(), 2);
        assert_eq!(s.series().len(), 9);

        let b = s.next().unwrap();
        // n = 8/3 - 1 = 1 → 2 offsets
        assert_eq!(b.size(), 2);
        assert!(!s.has_next().unwrap());
    }

    #[test]
    fn test_short_files_are_skipped() {
        let dir    = tempdir().unwrap();
        let tiny   = write_pairs(dir.path(), "tiny.csv", 1);
        let usable = write_pairs(dir.path(), "usable.csv", 5);
        let mut s  = NoteSampler::seeded(vec![tiny, usable], 1, 3, 5).unwrap();

        // The first file yields no windows at all
        assert_eq!(s.remaining_offsets(), 0);
        assert_eq!(s.phase(), Phase::AwaitingReload);

        let b = s.next().unwrap();
        assert_eq!(b.size(), 1);
        assert_eq!(s.series().len(), 5);
    }

    #[test]
    fn test_reset_all_reloads_first_file() {
        let dir    = tempdir().unwrap();
        let first  = write_pairs(dir.path(), "a.csv", 21);
        let second = write_pairs(dir.path(), "b.csv", 5);
        let mut s  = NoteSampler::seeded(vec![first.clone(), second.clone()], 100, 4, 9).unwrap();
        assert_eq!(s.file_count(), 2);
        assert_eq!(s.mini_batch_size(), 100);
        assert_eq!(s.example_length(), 4);

        let first_epoch = s.next().unwrap();
        while s.has_next().unwrap() {
            s.next().unwrap();
        }
        assert_eq!(s.file_cursor(), 2);

        s.reset_all().unwrap();
        assert_eq!(s.file_cursor(), 1);
        assert_eq!(s.series().len(), 21);
        // n = 20/4 - 1 = 4 → 5 offsets
        assert_eq!(s.remaining_offsets(), 5);
        assert_eq!(s.phase(), Phase::SeriesLoaded);

        // Same rng stream, with the first file listed again after the
        // second: its third load must build the same plan as the reset.
        let mut replay = NoteSampler::seeded(vec![first.clone(), second, first], 100, 4, 9).unwrap();
        replay.next().unwrap();
        replay.next().unwrap();
        assert!(replay.has_next().unwrap());
        assert_eq!(replay.file_cursor(), 3);

        let after_reset = s.next().unwrap();
        assert_eq!(after_reset, replay.next().unwrap());
        // A fresh draw, not the drained plan replayed
        assert_ne!(after_reset, first_epoch);
    }

    #[test]
    fn test_reload_failure_is_surfaced() {
        let dir    = tempdir().unwrap();
        let first  = write_pairs(dir.path(), "a.csv", 5);
        let second = write_pairs(dir.path(), "b.csv", 5);
        let mut s  = NoteSampler::seeded(vec![first, second.clone()], 1, 3, 2).unwrap();

        s.next().unwrap();
        fs::remove_file(&second).unwrap();

        match s.next() {
            Err(SamplerError::SourceReadFailure { path, .. }) => assert_eq!(path, second),
            other => panic!("expected SourceReadFailure, got {:?}", other.map(|b| b.shape())),
        }
    }

    #[test]
    fn test_seeded_plans_repeat() {
        let dir  = tempdir().unwrap();
        let path = write_pairs(dir.path(), "song.csv", 200);

        let mut a = NoteSampler::seeded(vec![path.clone()], 50, 8, 42).unwrap();
        let mut b = NoteSampler::seeded(vec![path], 50, 8, 42).unwrap();
        assert_eq!(a.next().unwrap(), b.next().unwrap());
    }
}
