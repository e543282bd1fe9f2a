use crate::prelude::{ProcessingError, ProcessingResult, RangeProfile};
use crate::report::export::CaptureExport;
use ndarray::{s, Array2, ArrayView1, ArrayView2};
use num_complex::Complex32;

/// Fixed-size store of background-subtracted profiles, one row per capture.
///
/// Rows are written strictly in order; a full buffer rejects further writes.
pub struct CaptureBuffer {
    frames: Array2<Complex32>,
    populated: usize,
    distances: Vec<f64>,
}

impl CaptureBuffer {
    pub fn new(captures: usize, points: usize) -> Self {
        Self {
            frames: Array2::zeros((captures, points)),
            populated: 0,
            distances: Vec::new(),
        }
    }

    /// Stores `profile` in the next free row and returns that row's index.
    pub fn push(&mut self, profile: &RangeProfile) -> ProcessingResult<usize> {
        let (rows, points) = self.frames.dim();
        if self.populated == rows {
            return Err(ProcessingError::BufferFull(rows));
        }
        if profile.len() != points {
            return Err(ProcessingError::LengthMismatch {
                expected: points,
                actual: profile.len(),
            });
        }

        let index = self.populated;
        self.frames
            .row_mut(index)
            .assign(&ArrayView1::from(profile.samples.as_slice()));
        self.distances.clone_from(&profile.distances);
        self.populated += 1;
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.populated
    }

    pub fn is_empty(&self) -> bool {
        self.populated == 0
    }

    pub fn capacity(&self) -> usize {
        self.frames.nrows()
    }

    pub fn is_full(&self) -> bool {
        self.populated == self.capacity()
    }

    pub fn row(&self, index: usize) -> Option<ArrayView1<'_, Complex32>> {
        (index < self.populated).then(|| self.frames.row(index))
    }

    /// Populated rows only.
    pub fn frames(&self) -> ArrayView2<'_, Complex32> {
        self.frames.slice(s![..self.populated, ..])
    }

    /// Phase (radians) of one distance bin across the populated rows.
    pub fn phase_history(&self, bin: usize) -> Option<Vec<f32>> {
        (bin < self.frames.ncols()).then(|| {
            self.frames()
                .column(bin)
                .iter()
                .map(|sample| sample.arg())
                .collect()
        })
    }

    pub fn to_export(&self) -> CaptureExport {
        let frames = self
            .frames()
            .rows()
            .into_iter()
            .map(|row| row.iter().map(|sample| [sample.re, sample.im]).collect())
            .collect();
        CaptureExport {
            distances: self.distances.clone(),
            frames,
        }
    }
}
