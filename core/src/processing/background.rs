use crate::prelude::{ProcessingError, ProcessingResult, RangeProfile};

/// Static background measurement removed from every later profile.
#[derive(Debug, Default)]
pub struct Background {
    baseline: Option<RangeProfile>,
}

impl Background {
    pub fn new() -> Self {
        Self { baseline: None }
    }

    /// Retains `profile` as the baseline. Only the first call has an effect;
    /// returns whether this call captured it.
    pub fn capture(&mut self, profile: &RangeProfile) -> bool {
        if self.baseline.is_some() {
            return false;
        }
        self.baseline = Some(profile.clone());
        true
    }

    pub fn baseline(&self) -> Option<&RangeProfile> {
        self.baseline.as_ref()
    }

    /// `profile[i] - baseline[i]` for every bin; the distance axis is taken from `profile`.
    pub fn subtract(&self, profile: &RangeProfile) -> ProcessingResult<RangeProfile> {
        let baseline = self
            .baseline
            .as_ref()
            .ok_or_else(|| ProcessingError::Internal("background not captured".into()))?;
        if baseline.len() != profile.len() {
            return Err(ProcessingError::LengthMismatch {
                expected: baseline.len(),
                actual: profile.len(),
            });
        }

        let samples = profile
            .samples
            .iter()
            .zip(&baseline.samples)
            .map(|(current, background)| current - background)
            .collect();
        Ok(RangeProfile::new(samples, profile.distances.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex32;

    fn profile(values: &[(f32, f32)]) -> RangeProfile {
        RangeProfile::new(
            values.iter().map(|&(re, im)| Complex32::new(re, im)).collect(),
            (0..values.len()).map(|i| i as f64 * 0.1).collect(),
        )
    }

    #[test]
    fn subtraction_is_exact_per_bin() {
        let mut background = Background::new();
        let baseline = profile(&[(1.0, 0.5), (2.0, -1.0), (0.25, 0.0)]);
        assert!(background.capture(&baseline));

        let current = profile(&[(3.0, 0.5), (2.0, 1.0), (-0.75, 4.0)]);
        let subtracted = background.subtract(&current).unwrap();
        for i in 0..current.len() {
            assert_eq!(subtracted.samples[i], current.samples[i] - baseline.samples[i]);
        }
        assert_eq!(subtracted.distances, current.distances);
    }

    #[test]
    fn baseline_is_never_replaced() {
        let mut background = Background::new();
        let first = profile(&[(1.0, 0.0)]);
        background.capture(&first);
        assert!(!background.capture(&profile(&[(9.0, 0.0)])));
        assert_eq!(background.baseline(), Some(&first));
    }

    #[test]
    fn subtract_requires_baseline_and_matching_length() {
        let mut background = Background::new();
        assert!(background.subtract(&profile(&[(1.0, 0.0)])).is_err());
        background.capture(&profile(&[(1.0, 0.0), (2.0, 0.0)]));
        assert!(matches!(
            background.subtract(&profile(&[(1.0, 0.0)])),
            Err(ProcessingError::LengthMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }
}
