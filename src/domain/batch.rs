// ============================================================
// Layer 3 — WindowBatch Domain Type
// ============================================================
// A minibatch of next-step prediction examples in plain Rust.
//
// Layout follows the classic recurrent-data convention:
//   dimension 0 = example within the minibatch   (k)
//   dimension 1 = feature                        (F)
//   dimension 2 = time-step within the window    (steps)
//
// For every example i and step c that was written:
//   target[i, :, c] == input[i, :, c + 1]
// because both are cut from the same series, one row apart.
//
// Steps that were never written stay zero. Short windows near
// the end of a series therefore leave a zero-padded tail.

use crate::domain::series::Row;

#[derive(Debug, Clone, PartialEq)]
pub struct WindowBatch {
    size:          usize,
    feature_width: usize,
    steps:         usize,
    input:         Vec<f64>,
    target:        Vec<f64>,
    /// How many leading steps of each example were actually written
    filled:        Vec<usize>,
}

impl WindowBatch {
    /// Allocate an all-zero batch of shape (size, feature_width, steps).
    pub fn zeros(size: usize, feature_width: usize, steps: usize) -> Self {
        let len = size * feature_width * steps;
        Self {
            size,
            feature_width,
            steps,
            input:  vec![0.0; len],
            target: vec![0.0; len],
            filled: vec![0; size],
        }
    }

    /// Write one (input row, target row) pair at example `i`, step `c`.
    ///
    /// Rows longer than the feature width are truncated; shorter rows
    /// leave the remaining features at zero.
    pub fn set_step(&mut self, i: usize, c: usize, input: &Row, target: &Row) {
        debug_assert!(i < self.size && c < self.steps);
        for (f, (&x, &y)) in input.iter().zip(target.iter()).take(self.feature_width).enumerate() {
            let idx = self.index(i, f, c);
            self.input[idx]  = x;
            self.target[idx] = y;
        }
        self.filled[i] = self.filled[i].max(c + 1);
    }

    pub fn input_at(&self, i: usize, f: usize, c: usize) -> f64 {
        self.input[self.index(i, f, c)]
    }

    pub fn target_at(&self, i: usize, f: usize, c: usize) -> f64 {
        self.target[self.index(i, f, c)]
    }

    /// Number of time-steps written for example `i`.
    pub fn filled_steps(&self, i: usize) -> usize {
        self.filled[i]
    }

    /// [examples, features, steps]
    pub fn shape(&self) -> [usize; 3] {
        [self.size, self.feature_width, self.steps]
    }

    pub fn size(&self) -> usize { self.size }

    pub fn feature_width(&self) -> usize { self.feature_width }

    pub fn steps(&self) -> usize { self.steps }

    pub fn is_empty(&self) -> bool {
        self.size == 0 || self.steps == 0 || self.feature_width == 0
    }

    fn index(&self, i: usize, f: usize, c: usize) -> usize {
        (i * self.feature_width + f) * self.steps + c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_step_tracks_fill() {
        let mut b = WindowBatch::zeros(2, 2, 3);
        b.set_step(1, 0, &vec![1.0, 2.0], &vec![3.0, 4.0]);
        b.set_step(1, 1, &vec![3.0, 4.0], &vec![5.0, 6.0]);

        assert_eq!(b.shape(), [2, 2, 3]);
        assert_eq!(b.filled_steps(0), 0);
        assert_eq!(b.filled_steps(1), 2);
        assert_eq!(b.input_at(1, 1, 1), 4.0);
        assert_eq!(b.target_at(1, 0, 1), 5.0);
        // Untouched step stays zero
        assert_eq!(b.input_at(1, 0, 2), 0.0);
    }

    #[test]
    fn test_empty_batch() {
        assert!(WindowBatch::zeros(0, 4, 9).is_empty());
        assert!(WindowBatch::zeros(3, 4, 0).is_empty());
        assert!(!WindowBatch::zeros(1, 1, 1).is_empty());
    }
}
