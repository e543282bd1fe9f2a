use crate::math::stats::StatsHelper;
use crate::prelude::RangeProfile;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const PEAK_TABLE_COLUMNS: [&str; 4] = ["Distance", "Index", "Power (dB)", "Phase"];

/// One reflective peak of a range profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    pub index: usize,
    pub distance: f64,
    pub power_db: f32,
    pub phase: f32,
}

impl Peak {
    pub fn from_profile(profile: &RangeProfile, index: usize) -> Option<Self> {
        let sample = *profile.samples.get(index)?;
        Some(Self {
            index,
            distance: profile.distances.get(index).copied().unwrap_or_default(),
            power_db: StatsHelper::power_db(sample),
            phase: sample.arg(),
        })
    }
}

/// Table of the strongest peaks as shown next to the live plot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeakTable {
    rows: Vec<Peak>,
}

impl PeakTable {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Rebuilds the rows from `peaks`. An empty peak list leaves the table
    /// untouched; returns whether the rows changed.
    pub fn update(&mut self, peaks: &[usize], profile: &RangeProfile) -> bool {
        if peaks.is_empty() {
            return false;
        }
        self.rows = peaks
            .iter()
            .filter_map(|&index| Peak::from_profile(profile, index))
            .collect();
        true
    }

    pub fn rows(&self) -> &[Peak] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl fmt::Display for PeakTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>10} {:>6} {:>11} {:>8}",
            PEAK_TABLE_COLUMNS[0], PEAK_TABLE_COLUMNS[1], PEAK_TABLE_COLUMNS[2], PEAK_TABLE_COLUMNS[3]
        )?;
        for row in &self.rows {
            writeln!(
                f,
                "{:>10.3} {:>6} {:>11.3} {:>8.3}",
                row.distance, row.index, row.power_db, row.phase
            )?;
        }
        Ok(())
    }
}
