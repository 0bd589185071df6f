use crate::error::{try_zeroed, AncError, Result};

/// Fixed capacity history of the most recent samples.
///
/// Samples are stored in a ring. Index 0 is the newest sample, index `i` is the
/// sample pushed `i` steps earlier. History that has not been filled yet reads
/// as zero.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    /// Ring storage. The newest sample is at `write_pos`.
    x: Box<[f64]>,
    write_pos: usize,
    /// Number of pushed samples, saturating at the capacity.
    filled: usize,
}

impl SampleBuffer {
    /// Creates a zero filled buffer. Panics if `capacity` is 0 or cannot be allocated.
    pub fn new(capacity: usize) -> Self {
        match SampleBuffer::try_new(capacity) {
            Ok(buffer) => buffer,
            Err(error) => panic!("{}", error),
        }
    }

    /// Like [`SampleBuffer::new`], but reports allocation failure as an error.
    pub fn try_new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(AncError::InvalidParameter(
                "sample buffer capacity must be greater than 0".into(),
            ));
        }
        Ok(SampleBuffer {
            x: try_zeroed("sample buffer", capacity)?,
            // The first push advances to index 0.
            write_pos: capacity - 1,
            filled: 0,
        })
    }

    pub fn capacity(&self) -> usize {
        self.x.len()
    }

    /// The number of real (not zero filled) samples in the history.
    pub fn filled(&self) -> usize {
        self.filled
    }

    /// Inserts the newest sample, evicting the oldest one once full.
    pub fn push(&mut self, sample: f64) {
        self.write_pos = if self.write_pos == self.capacity() - 1 {
            0
        } else {
            self.write_pos + 1
        };
        self.x[self.write_pos] = sample;
        if self.filled < self.capacity() {
            self.filled += 1;
        }
    }

    /// The sample pushed `i` steps ago, or 0.0 if there is no such sample.
    pub fn at(&self, i: usize) -> f64 {
        if i >= self.filled {
            return 0.0;
        }
        let idx = if i > self.write_pos {
            (self.capacity() + self.write_pos) - i
        } else {
            self.write_pos - i
        };
        self.x[idx]
    }

    /// Iterates over the full history, newest first, including zero fill.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.capacity()).map(move |i| self.at(i))
    }

    /// Sum of squares over the history.
    pub fn power(&self) -> f64 {
        self.iter().map(|x| x * x).sum()
    }

    pub fn clear(&mut self) {
        for x in self.x.iter_mut() {
            *x = 0.0;
        }
        self.write_pos = self.capacity() - 1;
        self.filled = 0;
    }
}
