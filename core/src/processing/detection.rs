use crate::math::peaks::find_peaks;
use std::cmp::Ordering;

pub const DEFAULT_PEAK_COUNT: usize = 5;

/// Indices of the `count` strongest local maxima, strongest first.
///
/// The sort is stable, so equal magnitudes keep ascending index order.
pub fn top_peaks(magnitudes: &[f32], count: usize) -> Vec<usize> {
    let mut peaks = find_peaks(magnitudes);
    peaks.sort_by(|&a, &b| {
        magnitudes[b]
            .partial_cmp(&magnitudes[a])
            .unwrap_or(Ordering::Equal)
    });
    peaks.truncate(count);
    peaks
}
