use num_complex::Complex32;
use rustfft::{num_traits::Zero, Fft, FftPlanner};

/// Helper that wraps a planned `rustfft` inverse transform for reuse.
pub struct FftHelper {
    ifft: std::sync::Arc<dyn Fft<f32>>,
    scratch: Vec<Complex32>,
    size: usize,
}

impl FftHelper {
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let ifft = planner.plan_fft_inverse(size.max(1));
        let scratch = vec![Complex32::zero(); ifft.get_inplace_scratch_len()];
        Self {
            ifft,
            scratch,
            size,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Inverse transform normalised by `1/N`; input is zero-padded or truncated to the plan size.
    pub fn inverse(&mut self, input: &[Complex32]) -> Vec<Complex32> {
        let mut buffer = input.to_vec();
        buffer.resize(self.size, Complex32::zero());
        if self.size == 0 {
            return buffer;
        }

        self.ifft.process_with_scratch(&mut buffer, &mut self.scratch);
        let scale = 1.0 / self.size as f32;
        for sample in buffer.iter_mut() {
            *sample *= scale;
        }
        buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverse_returns_same_length() {
        let mut helper = FftHelper::new(4);
        let output = helper.inverse(&[Complex32::new(1.0, 0.0); 3]);
        assert_eq!(output.len(), 4);
    }

    #[test]
    fn inverse_of_flat_spectrum_is_impulse() {
        let mut helper = FftHelper::new(8);
        let output = helper.inverse(&[Complex32::new(1.0, 0.0); 8]);
        assert!((output[0].re - 1.0).abs() < 1e-6);
        assert!(output[1..].iter().all(|value| value.norm() < 1e-6));
    }
}
