// ============================================================
// Layer 3 — Series Domain Type
// ============================================================
// One encoded music file held fully in memory.
//
// The source file looks like:
//   time,pitch,velocity,duration        ← header (kept verbatim)
//   0.00,64,0.8,0.25                    ← one Row per line
//   0.01,63,0.7,0.25
//
// Column 0 is a timestamp/label and is NOT a feature, so a
// header with N fields describes rows of N - 1 features.

/// One time-step of note features (the label column already removed).
pub type Row = Vec<f64>;

/// An ordered run of rows loaded from one source file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    /// First line of the source file, stored exactly as read
    header: String,

    /// Header field count minus the label column
    feature_width: usize,

    /// Every row that parsed cleanly, in file order
    rows: Vec<Row>,
}

impl Series {
    /// Build a series from an already-parsed header and rows.
    pub fn new(header: impl Into<String>, feature_width: usize, rows: Vec<Row>) -> Self {
        Self {
            header: header.into(),
            feature_width,
            rows,
        }
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn feature_width(&self) -> usize {
        self.feature_width
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let s = Series::new("t,a,b", 2, vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        assert_eq!(s.header(), "t,a,b");
        assert_eq!(s.feature_width(), 2);
        assert_eq!(s.len(), 2);
        assert_eq!(s.row(1), Some(&vec![3.0, 4.0]));
        assert!(s.row(2).is_none());
        assert!(!s.is_empty());
    }
}
