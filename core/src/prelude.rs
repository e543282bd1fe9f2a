use num_complex::Complex32;
use serde::{Deserialize, Serialize};

/// Averaged complex S21 samples together with their stimulus axis (Hz).
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    pub samples: Vec<Complex32>,
    pub frequencies: Vec<f64>,
}

impl Spectrum {
    pub fn new(samples: Vec<Complex32>, frequencies: Vec<f64>) -> Self {
        Self {
            samples,
            frequencies,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Range profile (PDP) and its parallel distance axis in metres.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeProfile {
    pub samples: Vec<Complex32>,
    pub distances: Vec<f64>,
}

impl RangeProfile {
    pub fn new(samples: Vec<Complex32>, distances: Vec<f64>) -> Self {
        Self { samples, distances }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn magnitudes(&self) -> Vec<f32> {
        self.samples.iter().map(|sample| sample.norm()).collect()
    }
}

/// Window applied to the spectrum before the inverse transform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Window {
    #[default]
    Rectangular,
    Hann,
}

/// Common error type for the processing stages.
#[derive(thiserror::Error, Debug)]
pub enum ProcessingError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("length mismatch: expected {expected} bins, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("capture buffer full ({0} rows)")]
    BufferFull(usize),
    #[error("internal failure: {0}")]
    Internal(String),
}

pub type ProcessingResult<T> = Result<T, ProcessingError>;
