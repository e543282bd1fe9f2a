use crate::prelude::RangeProfile;
use crate::report::peak::PeakTable;
use serde::{Deserialize, Serialize};

/// Snapshot published to the live display after each capture.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileFrame {
    pub iteration: usize,
    pub distances: Vec<f64>,
    pub magnitudes: Vec<f32>,
    pub table: PeakTable,
}

impl ProfileFrame {
    pub fn new(iteration: usize, profile: &RangeProfile, table: &PeakTable) -> Self {
        Self {
            iteration,
            distances: profile.distances.clone(),
            magnitudes: profile.magnitudes(),
            table: table.clone(),
        }
    }
}
