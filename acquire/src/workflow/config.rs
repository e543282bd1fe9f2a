use crate::generator::scenario::SimulationConfig;
use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use vnacore::instrument::{InstrumentSettings, Stimulus};
use vnacore::prelude::Window;
use vnacore::processing::DEFAULT_PEAK_COUNT;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    pub address: String,
    pub calibration_set: String,
    pub low_freq_ghz: f64,
    pub high_freq_ghz: f64,
    pub points: usize,
    pub captures: usize,
    pub averages: usize,
    pub peak_count: usize,
    /// Kept for existing configs; subtraction is always applied.
    pub background_subtract: bool,
    pub show_gui: bool,
    pub program_stimulus: bool,
    pub if_bandwidth_hz: Option<f64>,
    pub source_power_dbm: Option<f64>,
    pub timeout_ms: Option<u64>,
    pub window: Window,
    pub round_trip: bool,
    pub simulation: SimulationConfig,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            address: "TCPIP0::localhost::5025::SOCKET".into(),
            calibration_set: "CalSet_NOV20_fs2G_fe_5G_np1024_if_10k".into(),
            low_freq_ghz: 2.0,
            high_freq_ghz: 5.0,
            points: 1024,
            captures: 100,
            averages: 1,
            peak_count: DEFAULT_PEAK_COUNT,
            background_subtract: true,
            show_gui: false,
            program_stimulus: false,
            if_bandwidth_hz: None,
            source_power_dbm: None,
            timeout_ms: None,
            window: Window::Rectangular,
            round_trip: false,
            simulation: SimulationConfig::default(),
        }
    }
}

impl AcquisitionConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading acquisition config {}", path_ref.display()))?;
        let config: AcquisitionConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing acquisition config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.points >= 2, "points must be at least 2, got {}", self.points);
        ensure!(self.averages >= 1, "averages must be at least 1");
        ensure!(
            self.high_freq_ghz > self.low_freq_ghz,
            "high_freq_ghz ({}) must exceed low_freq_ghz ({})",
            self.high_freq_ghz,
            self.low_freq_ghz
        );
        Ok(())
    }

    pub fn stimulus(&self) -> Stimulus {
        Stimulus {
            start_hz: self.low_freq_ghz * 1e9,
            stop_hz: self.high_freq_ghz * 1e9,
            points: self.points,
        }
    }

    pub fn to_instrument_settings(&self) -> InstrumentSettings {
        InstrumentSettings {
            calibration_set: self.calibration_set.clone(),
            if_bandwidth_hz: self.if_bandwidth_hz,
            stimulus: self.program_stimulus.then(|| self.stimulus()),
            source_power_dbm: self.source_power_dbm,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_match_bench_setup() {
        let cfg = AcquisitionConfig::default();
        assert_eq!(cfg.points, 1024);
        assert_eq!(cfg.captures, 100);
        assert!(cfg.background_subtract);
        assert!(!cfg.show_gui);
        assert!(cfg.to_instrument_settings().stimulus.is_none());
        cfg.validate().unwrap();
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"address: \"10.0.0.5:5025\"\ncaptures: 3\npoints: 64\nwindow: hann\nprogram_stimulus: true\nsimulation:\n  noise: 0.0\n  seed: 4\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = AcquisitionConfig::load(&path).unwrap();
        assert_eq!(cfg.captures, 3);
        assert_eq!(cfg.window, Window::Hann);
        assert_eq!(cfg.simulation.seed, 4);
        assert_eq!(cfg.averages, 1);

        let stimulus = cfg.to_instrument_settings().stimulus.unwrap();
        assert_eq!(stimulus.points, 64);
        assert_eq!(stimulus.start_hz, 2e9);
    }

    #[test]
    fn validate_rejects_inverted_band() {
        let cfg = AcquisitionConfig {
            low_freq_ghz: 5.0,
            high_freq_ghz: 2.0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }
}
