use num_complex::Complex32;

pub struct StatsHelper;

impl StatsHelper {
    pub fn rms(samples: &[Complex32]) -> f32 {
        if samples.is_empty() {
            return 0.0;
        }
        let sum_sq: f32 = samples.iter().map(|v| v.norm_sqr()).sum();
        (sum_sq / samples.len() as f32).sqrt()
    }

    /// Amplitude in dB, `20 log10 |x|`.
    pub fn power_db(sample: Complex32) -> f32 {
        20.0 * sample.norm().log10()
    }
}
