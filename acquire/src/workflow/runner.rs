use crate::gui_bridge::LiveDisplay;
use crate::workflow::config::AcquisitionConfig;
use anyhow::{ensure, Context};
use num_complex::Complex32;
use vnacore::instrument::Instrument;
use vnacore::prelude::{RangeProfile, Spectrum};
use vnacore::processing::{top_peaks, Background, CaptureBuffer, RangeTransform};
use vnacore::report::{PeakTable, ProfileFrame};
use vnacore::telemetry::{LogManager, Metrics, MetricsRecorder};

/// Result of a completed acquisition run.
pub struct AcquisitionResult {
    pub captures: CaptureBuffer,
    pub baseline_peaks: Vec<usize>,
    pub metrics: Metrics,
}

/// Fixed-count acquisition loop over an already configured instrument.
pub struct Runner {
    config: AcquisitionConfig,
    metrics: MetricsRecorder,
    logger: LogManager,
}

impl Runner {
    pub fn new(config: AcquisitionConfig) -> Self {
        Self {
            config,
            metrics: MetricsRecorder::new(),
            logger: LogManager::new(),
        }
    }

    /// Sweeps `averages` times, averages the spectra and transforms the mean.
    pub fn acquire_profile<I, T>(&self, instrument: &mut I, transform: &mut T) -> anyhow::Result<RangeProfile>
    where
        I: Instrument + ?Sized,
        T: RangeTransform + ?Sized,
    {
        let averages = self.config.averages.max(1);
        let mut accumulated: Option<Vec<Complex32>> = None;
        let mut frequencies = Vec::new();

        for sweep in 0..averages {
            instrument
                .trigger_sweep()
                .with_context(|| format!("triggering sweep {}", sweep))?;
            let samples = instrument.read_spectrum().context("reading S21 data")?;
            self.metrics.record_sweep();

            match accumulated.as_mut() {
                None => accumulated = Some(samples),
                Some(sum) => {
                    ensure!(
                        sum.len() == samples.len(),
                        "sweep {} returned {} points, expected {}",
                        sweep,
                        samples.len(),
                        sum.len()
                    );
                    for (total, sample) in sum.iter_mut().zip(samples) {
                        *total += sample;
                    }
                }
            }
            frequencies = instrument
                .read_frequency_axis()
                .context("reading stimulus axis")?;
        }

        let scale = 1.0 / averages as f32;
        let samples = accumulated
            .unwrap_or_default()
            .into_iter()
            .map(|sample| sample * scale)
            .collect();
        transform
            .transform(&Spectrum::new(samples, frequencies))
            .context("transforming spectrum to range profile")
    }

    pub fn run<I, T, D>(
        &self,
        instrument: &mut I,
        transform: &mut T,
        display: &mut D,
    ) -> anyhow::Result<AcquisitionResult>
    where
        I: Instrument + ?Sized,
        T: RangeTransform + ?Sized,
        D: LiveDisplay + ?Sized,
    {
        if !self.config.background_subtract {
            self.logger
                .caution("background_subtract is false but the baseline is always subtracted");
        }

        let mut captures = CaptureBuffer::new(self.config.captures, self.config.points);
        let mut background = Background::new();
        let mut table = PeakTable::new();
        let mut baseline_peaks = Vec::new();

        for iteration in 0..self.config.captures {
            let outcome = self.capture_frame(
                iteration,
                instrument,
                transform,
                display,
                &mut background,
                &mut table,
                &mut captures,
            );
            match outcome {
                Ok(Some(peaks)) => baseline_peaks = peaks,
                Ok(None) => {}
                Err(err) => {
                    self.metrics.record_error();
                    return Err(err.context(format!("capture {}", iteration)));
                }
            }
        }

        let metrics = self.metrics.snapshot();
        self.logger.record(&format!(
            "acquisition finished: {} frames, {} sweeps",
            metrics.frames, metrics.sweeps
        ));

        Ok(AcquisitionResult {
            captures,
            baseline_peaks,
            metrics,
        })
    }

    /// Returns the baseline peaks when this iteration captured the background.
    #[allow(clippy::too_many_arguments)]
    fn capture_frame<I, T, D>(
        &self,
        iteration: usize,
        instrument: &mut I,
        transform: &mut T,
        display: &mut D,
        background: &mut Background,
        table: &mut PeakTable,
        captures: &mut CaptureBuffer,
    ) -> anyhow::Result<Option<Vec<usize>>>
    where
        I: Instrument + ?Sized,
        T: RangeTransform + ?Sized,
        D: LiveDisplay + ?Sized,
    {
        let profile = self.acquire_profile(instrument, transform)?;

        let mut baseline_peaks = None;
        if background.capture(&profile) {
            let peaks = top_peaks(&profile.magnitudes(), self.config.peak_count);
            table.update(&peaks, &profile);
            display
                .publish(&ProfileFrame::new(iteration, &profile, table))
                .context("publishing baseline frame")?;
            baseline_peaks = Some(peaks);
        }

        let subtracted = background
            .subtract(&profile)
            .context("subtracting background")?;
        let peaks = top_peaks(&subtracted.magnitudes(), self.config.peak_count);
        table.update(&peaks, &subtracted);
        display
            .publish(&ProfileFrame::new(iteration, &subtracted, table))
            .context("publishing frame")?;

        captures
            .push(&subtracted)
            .context("storing range profile")?;
        self.metrics.record_frame();
        Ok(baseline_peaks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gui_bridge::NullDisplay;
    use vnacore::instrument::InstrumentResult;
    use vnacore::prelude::ProcessingResult;

    /// Returns the same spectrum for every sweep and counts the calls.
    struct ConstantInstrument {
        spectrum: Vec<Complex32>,
        triggers: usize,
    }

    impl ConstantInstrument {
        fn new(points: usize) -> Self {
            Self {
                spectrum: vec![Complex32::new(1.0, 0.0); points],
                triggers: 0,
            }
        }
    }

    impl Instrument for ConstantInstrument {
        fn configure(&mut self) -> InstrumentResult<()> {
            Ok(())
        }

        fn trigger_sweep(&mut self) -> InstrumentResult<()> {
            self.triggers += 1;
            Ok(())
        }

        fn read_spectrum(&mut self) -> InstrumentResult<Vec<Complex32>> {
            Ok(self.spectrum.clone())
        }

        fn read_frequency_axis(&mut self) -> InstrumentResult<Vec<f64>> {
            Ok((0..self.spectrum.len()).map(|i| 2e9 + i as f64 * 1e6).collect())
        }
    }

    /// Yields the samples for each successive sweep from a script.
    struct ScriptedInstrument {
        sweeps: Vec<Vec<Complex32>>,
        next: usize,
    }

    impl Instrument for ScriptedInstrument {
        fn configure(&mut self) -> InstrumentResult<()> {
            Ok(())
        }

        fn trigger_sweep(&mut self) -> InstrumentResult<()> {
            Ok(())
        }

        fn read_spectrum(&mut self) -> InstrumentResult<Vec<Complex32>> {
            let samples = self.sweeps[self.next % self.sweeps.len()].clone();
            self.next += 1;
            Ok(samples)
        }

        fn read_frequency_axis(&mut self) -> InstrumentResult<Vec<f64>> {
            Ok((0..self.sweeps[0].len()).map(|i| i as f64).collect())
        }
    }

    #[derive(Default)]
    struct RecordingDisplay {
        frames: Vec<ProfileFrame>,
    }

    impl LiveDisplay for RecordingDisplay {
        fn publish(&mut self, frame: &ProfileFrame) -> anyhow::Result<()> {
            self.frames.push(frame.clone());
            Ok(())
        }
    }

    fn real(values: &[f32]) -> Vec<Complex32> {
        values.iter().map(|&v| Complex32::new(v, 0.0)).collect()
    }

    fn config(captures: usize, points: usize) -> AcquisitionConfig {
        AcquisitionConfig {
            captures,
            points,
            ..Default::default()
        }
    }

    fn echo(spectrum: &Spectrum) -> ProcessingResult<RangeProfile> {
        Ok(RangeProfile::new(
            spectrum.samples.clone(),
            spectrum.frequencies.clone(),
        ))
    }

    #[test]
    fn three_captures_store_background_subtracted_rows() {
        let runner = Runner::new(config(3, 3));
        let mut instrument = ConstantInstrument::new(3);
        let mut calls = 0;
        let mut transform = |spectrum: &Spectrum| -> ProcessingResult<RangeProfile> {
            let samples = if calls == 0 {
                real(&[1.0, 2.0, 3.0])
            } else {
                real(&[1.0, 2.0, 5.0])
            };
            calls += 1;
            Ok(RangeProfile::new(samples, spectrum.frequencies.clone()))
        };

        let result = runner
            .run(&mut instrument, &mut transform, &mut NullDisplay)
            .unwrap();

        let captures = &result.captures;
        assert_eq!(captures.len(), 3);
        let rows: Vec<Vec<Complex32>> = captures
            .frames()
            .rows()
            .into_iter()
            .map(|row| row.to_vec())
            .collect();
        assert_eq!(
            rows,
            vec![
                real(&[0.0, 0.0, 0.0]),
                real(&[0.0, 0.0, 2.0]),
                real(&[0.0, 0.0, 2.0]),
            ]
        );
        assert_eq!(instrument.triggers, 3);
        assert_eq!(result.metrics.frames, 3);
    }

    #[test]
    fn buffer_holds_exactly_n_rows_in_order() {
        let sweeps: Vec<Vec<Complex32>> = (0..4)
            .map(|i| real(&[0.0, i as f32, 0.0, 0.0]))
            .collect();
        let mut instrument = ScriptedInstrument { sweeps, next: 0 };
        let runner = Runner::new(config(4, 4));
        let mut transform = echo;

        let result = runner
            .run(&mut instrument, &mut transform, &mut NullDisplay)
            .unwrap();

        assert!(result.captures.is_full());
        for iteration in 0..4 {
            let row = result.captures.row(iteration).unwrap();
            assert_eq!(row[1], Complex32::new(iteration as f32, 0.0));
        }
    }

    #[test]
    fn sweeps_are_averaged_before_transform() {
        let mut instrument = ScriptedInstrument {
            sweeps: vec![real(&[1.0, 4.0]), real(&[3.0, 0.0])],
            next: 0,
        };
        let runner = Runner::new(AcquisitionConfig {
            averages: 2,
            ..config(1, 2)
        });
        let mut transform = echo;

        let profile = runner.acquire_profile(&mut instrument, &mut transform).unwrap();
        assert_eq!(profile.samples, real(&[2.0, 2.0]));
    }

    #[test]
    fn disabled_background_flag_still_subtracts() {
        let mut instrument = ScriptedInstrument {
            sweeps: vec![real(&[1.0, 2.0]), real(&[4.0, 2.0])],
            next: 0,
        };
        let runner = Runner::new(AcquisitionConfig {
            background_subtract: false,
            ..config(2, 2)
        });
        let mut transform = echo;

        let result = runner
            .run(&mut instrument, &mut transform, &mut NullDisplay)
            .unwrap();
        assert_eq!(result.captures.row(1).unwrap().to_vec(), real(&[3.0, 0.0]));
    }

    #[test]
    fn peaks_are_published_strongest_first() {
        let mut instrument = ScriptedInstrument {
            sweeps: vec![
                real(&[0.0; 9]),
                real(&[0.0, 1.0, 0.0, 3.0, 0.0, 2.0, 0.0, 3.0, 0.0]),
            ],
            next: 0,
        };
        let runner = Runner::new(config(2, 9));
        let mut display = RecordingDisplay::default();
        let mut transform = echo;

        let result = runner
            .run(&mut instrument, &mut transform, &mut display)
            .unwrap();

        assert!(result.baseline_peaks.is_empty());
        let last = display.frames.last().unwrap();
        let indices: Vec<usize> = last.table.rows().iter().map(|row| row.index).collect();
        assert_eq!(indices, vec![3, 7, 5, 1]);
        // baseline frame plus one frame per capture
        assert_eq!(display.frames.len(), 3);
    }

    #[test]
    fn profile_length_mismatch_stops_the_run() {
        let mut instrument = ConstantInstrument::new(3);
        let runner = Runner::new(config(2, 8));
        let mut transform = echo;

        let err = runner
            .run(&mut instrument, &mut transform, &mut NullDisplay)
            .err()
            .unwrap();
        assert!(format!("{:#}", err).contains("storing range profile"));
    }
}
