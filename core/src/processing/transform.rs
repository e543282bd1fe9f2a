use crate::math::fft::FftHelper;
use crate::math::stats::StatsHelper;
use crate::prelude::{ProcessingError, ProcessingResult, RangeProfile, Spectrum, Window};
use crate::telemetry::log::LogManager;
use std::f64::consts::PI;

pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Converts an averaged spectrum into a range profile of the same length.
///
/// Implementations are pure with respect to their input: the same spectrum
/// always yields the same profile.
pub trait RangeTransform {
    fn transform(&mut self, spectrum: &Spectrum) -> ProcessingResult<RangeProfile>;
}

impl<F> RangeTransform for F
where
    F: FnMut(&Spectrum) -> ProcessingResult<RangeProfile>,
{
    fn transform(&mut self, spectrum: &Spectrum) -> ProcessingResult<RangeProfile> {
        self(spectrum)
    }
}

/// Windowed inverse FFT with a linear distance axis.
pub struct IfftRangeTransform {
    window: Window,
    round_trip: bool,
    fft: Option<FftHelper>,
    logger: LogManager,
}

impl IfftRangeTransform {
    pub fn new(window: Window, round_trip: bool) -> Self {
        Self {
            window,
            round_trip,
            fft: None,
            logger: LogManager::new(),
        }
    }

    fn helper(&mut self, size: usize) -> &mut FftHelper {
        if self.fft.as_ref().map(FftHelper::size) != Some(size) {
            self.fft = Some(FftHelper::new(size));
        }
        self.fft.get_or_insert_with(|| FftHelper::new(size))
    }
}

impl Default for IfftRangeTransform {
    fn default() -> Self {
        Self::new(Window::Rectangular, false)
    }
}

impl RangeTransform for IfftRangeTransform {
    fn transform(&mut self, spectrum: &Spectrum) -> ProcessingResult<RangeProfile> {
        let points = spectrum.len();
        if points < 2 {
            return Err(ProcessingError::InvalidInput(format!(
                "need at least two sweep points, got {}",
                points
            )));
        }
        if spectrum.frequencies.len() != points {
            return Err(ProcessingError::LengthMismatch {
                expected: points,
                actual: spectrum.frequencies.len(),
            });
        }

        if !spectrum.frequencies.windows(2).all(|pair| pair[1] > pair[0]) {
            return Err(ProcessingError::InvalidInput(
                "frequency axis must be strictly increasing".into(),
            ));
        }
        let first = spectrum.frequencies[0];
        let last = spectrum.frequencies[points - 1];
        let step = (last - first) / (points - 1) as f64;

        let windowed: Vec<_> = match self.window {
            Window::Rectangular => spectrum.samples.clone(),
            Window::Hann => spectrum
                .samples
                .iter()
                .enumerate()
                .map(|(i, &sample)| {
                    let weight = 0.5 - 0.5 * (2.0 * PI * i as f64 / (points - 1) as f64).cos();
                    sample * weight as f32
                })
                .collect(),
        };

        let samples = self.helper(points).inverse(&windowed);

        let mut bin_distance = SPEED_OF_LIGHT / (points as f64 * step);
        if self.round_trip {
            bin_distance /= 2.0;
        }
        let distances = (0..points).map(|i| i as f64 * bin_distance).collect();

        self.logger.record(&format!(
            "range transform {} bins, {:.4} m/bin, RMS {:.4}",
            points,
            bin_distance,
            StatsHelper::rms(&samples)
        ));

        Ok(RangeProfile::new(samples, distances))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex32;

    fn linear_axis(points: usize, start: f64, stop: f64) -> Vec<f64> {
        let step = (stop - start) / (points - 1) as f64;
        (0..points).map(|i| start + i as f64 * step).collect()
    }

    #[test]
    fn profile_length_matches_sweep_points() {
        let points = 1024;
        let spectrum = Spectrum::new(
            vec![Complex32::new(0.5, -0.5); points],
            linear_axis(points, 2e9, 5e9),
        );
        let mut transform = IfftRangeTransform::new(Window::Hann, false);
        let profile = transform.transform(&spectrum).unwrap();
        assert_eq!(profile.samples.len(), points);
        assert_eq!(profile.distances.len(), points);
    }

    #[test]
    fn delayed_reflector_lands_in_expected_bin() {
        let points = 64;
        let frequencies = linear_axis(points, 2e9, 5e9);
        let step = frequencies[1] - frequencies[0];
        let bin_distance = SPEED_OF_LIGHT / (points as f64 * step);
        let distance = 5.0 * bin_distance;
        let samples = frequencies
            .iter()
            .map(|f| {
                let phase = -2.0 * PI * (f - frequencies[0]) * distance / SPEED_OF_LIGHT;
                Complex32::new(phase.cos() as f32, phase.sin() as f32)
            })
            .collect();

        let mut transform = IfftRangeTransform::default();
        let profile = transform
            .transform(&Spectrum::new(samples, frequencies))
            .unwrap();
        let magnitudes = profile.magnitudes();
        let strongest = magnitudes
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(idx, _)| idx)
            .unwrap();
        assert_eq!(strongest, 5);
        assert!((profile.distances[5] - distance).abs() < 1e-6);
    }

    #[test]
    fn round_trip_halves_distance_axis() {
        let points = 16;
        let spectrum = Spectrum::new(
            vec![Complex32::new(1.0, 0.0); points],
            linear_axis(points, 1e9, 2e9),
        );
        let one_way = IfftRangeTransform::new(Window::Rectangular, false)
            .transform(&spectrum)
            .unwrap();
        let two_way = IfftRangeTransform::new(Window::Rectangular, true)
            .transform(&spectrum)
            .unwrap();
        assert!((one_way.distances[3] - 2.0 * two_way.distances[3]).abs() < 1e-9);
    }

    #[test]
    fn rejects_mismatched_axis() {
        let spectrum = Spectrum::new(vec![Complex32::new(1.0, 0.0); 4], vec![1.0, 2.0, 3.0]);
        let result = IfftRangeTransform::default().transform(&spectrum);
        assert!(matches!(
            result,
            Err(ProcessingError::LengthMismatch {
                expected: 4,
                actual: 3
            })
        ));
    }

    #[test]
    fn rejects_flat_axis() {
        let spectrum = Spectrum::new(vec![Complex32::new(1.0, 0.0); 3], vec![1.0; 3]);
        assert!(IfftRangeTransform::default().transform(&spectrum).is_err());
    }

    #[test]
    fn rejects_non_monotonic_axis() {
        let spectrum = Spectrum::new(
            vec![Complex32::new(1.0, 0.0); 4],
            vec![1.0, 5.0, 2.0, 4.0],
        );
        assert!(matches!(
            IfftRangeTransform::default().transform(&spectrum),
            Err(ProcessingError::InvalidInput(_))
        ));
    }
}
