use crate::instrument::{Instrument, InstrumentError, InstrumentResult};
use crate::telemetry::log::LogManager;
use num_complex::Complex32;
use serde::{Deserialize, Serialize};

pub const PRESET: &str = "SYST:FPR";
pub const WINDOW_ON: &str = "DISP:WIND1:STAT ON";
pub const CALSET_CATALOG: &str = "CSET:CAT?";
pub const SWEEP_LINEAR: &str = "SENS1:SWE:TYPE LIN";
pub const DEFINE_S21: &str = "CALC1:MEAS1:DEF 'S21'";
pub const FEED_MEASUREMENT: &str = "DISP:MEAS1:FEED 1";
pub const SELECT_MEASUREMENT: &str = "CALC1:PAR:MNUM 1";
pub const SINGLE_SWEEP: &str = "SENS1:SWE:MODE SING";
pub const OPERATION_COMPLETE: &str = "*OPC?";
pub const IDENTIFY: &str = "*IDN?";
pub const SDATA: &str = "CALC1:MEAS1:DATA:SDATA?";
pub const STIMULUS_AXIS: &str = "CALC1:MEAS1:X:VAL?";

/// Line-oriented text session to an instrument.
pub trait ScpiTransport {
    fn write(&mut self, command: &str) -> InstrumentResult<()>;
    fn read_line(&mut self) -> InstrumentResult<String>;

    fn query(&mut self, command: &str) -> InstrumentResult<String> {
        self.write(command)?;
        self.read_line()
    }
}

impl<T: ScpiTransport + ?Sized> ScpiTransport for Box<T> {
    fn write(&mut self, command: &str) -> InstrumentResult<()> {
        (**self).write(command)
    }

    fn read_line(&mut self) -> InstrumentResult<String> {
        (**self).read_line()
    }
}

/// Explicit stimulus programming; normally the calibration set fixes it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stimulus {
    pub start_hz: f64,
    pub stop_hz: f64,
    pub points: usize,
}

/// Settings consumed by the configuration sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentSettings {
    pub calibration_set: String,
    pub if_bandwidth_hz: Option<f64>,
    pub stimulus: Option<Stimulus>,
    pub source_power_dbm: Option<f64>,
}

impl InstrumentSettings {
    pub fn with_calibration_set(calibration_set: impl Into<String>) -> Self {
        Self {
            calibration_set: calibration_set.into(),
            if_bandwidth_hz: None,
            stimulus: None,
            source_power_dbm: None,
        }
    }
}

/// Adapts a SCPI text session to the [`Instrument`] capability set.
pub struct ScpiInstrument<T> {
    transport: T,
    settings: InstrumentSettings,
    logger: LogManager,
}

impl<T: ScpiTransport> ScpiInstrument<T> {
    pub fn new(transport: T, settings: InstrumentSettings) -> Self {
        Self {
            transport,
            settings,
            logger: LogManager::new(),
        }
    }

    pub fn into_inner(self) -> T {
        self.transport
    }
}

impl<T: ScpiTransport> Instrument for ScpiInstrument<T> {
    fn identify(&mut self) -> InstrumentResult<String> {
        Ok(self.transport.query(IDENTIFY)?.trim().to_string())
    }

    fn configure(&mut self) -> InstrumentResult<()> {
        let calset = self.settings.calibration_set.clone();

        self.transport.write(PRESET)?;
        self.transport.write(WINDOW_ON)?;

        let catalog = self.transport.query(CALSET_CATALOG)?;
        self.logger
            .record(&format!("available cal sets: {}", catalog.trim()));
        let cal_info = self
            .transport
            .query(&format!("CSET:PROP:CAT? \"{}\"", calset))?;
        self.logger
            .record(&format!("cal set {} info: {}", calset, cal_info.trim()));

        if let Some(bandwidth) = self.settings.if_bandwidth_hz {
            self.transport.write(&format!("SENS1:BAND {}", bandwidth))?;
        }

        self.transport.write(SWEEP_LINEAR)?;

        if let Some(stimulus) = self.settings.stimulus {
            self.transport
                .write(&format!("SENS1:FREQ:STAR {}", stimulus.start_hz))?;
            self.transport
                .write(&format!("SENS1:FREQ:STOP {}", stimulus.stop_hz))?;
            self.transport
                .write(&format!("SENS1:SWE:POIN {}", stimulus.points))?;
        }

        if let Some(power) = self.settings.source_power_dbm {
            self.transport.write(&format!("SOUR:POW:LEV {}dBm", power))?;
        }

        self.transport.write(DEFINE_S21)?;
        for channel in [1, 2] {
            self.transport.write(&format!(
                "SENS{}:CORR:CSET:ACT \"{}\",1",
                channel, calset
            ))?;
        }
        self.transport.write(FEED_MEASUREMENT)?;
        self.transport.write(SELECT_MEASUREMENT)?;
        Ok(())
    }

    fn trigger_sweep(&mut self) -> InstrumentResult<()> {
        self.transport.write(SINGLE_SWEEP)?;
        let reply = self.transport.query(OPERATION_COMPLETE)?;
        match reply.trim().trim_start_matches('+') {
            "1" => Ok(()),
            other => Err(InstrumentError::OperationIncomplete(other.to_string())),
        }
    }

    fn read_spectrum(&mut self) -> InstrumentResult<Vec<Complex32>> {
        let reply = self.transport.query(SDATA)?;
        let values = parse_ascii_values(SDATA, &reply)?;
        interleaved_to_complex(SDATA, &values)
    }

    fn read_frequency_axis(&mut self) -> InstrumentResult<Vec<f64>> {
        let reply = self.transport.query(STIMULUS_AXIS)?;
        parse_ascii_values(STIMULUS_AXIS, &reply)
    }
}

/// Parses a comma-separated ASCII number block.
pub fn parse_ascii_values(query: &str, reply: &str) -> InstrumentResult<Vec<f64>> {
    let trimmed = reply.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    trimmed
        .split(',')
        .map(|token| {
            token
                .trim()
                .parse::<f64>()
                .map_err(|err| InstrumentError::MalformedReply {
                    query: query.to_string(),
                    reason: format!("{:?}: {}", token.trim(), err),
                })
        })
        .collect()
}

/// Pairs interleaved `re, im, re, im, ...` values into complex samples.
pub fn interleaved_to_complex(query: &str, values: &[f64]) -> InstrumentResult<Vec<Complex32>> {
    if values.len() % 2 != 0 {
        return Err(InstrumentError::MalformedReply {
            query: query.to_string(),
            reason: format!("odd value count {}", values.len()),
        });
    }
    Ok(values
        .chunks_exact(2)
        .map(|pair| Complex32::new(pair[0] as f32, pair[1] as f32))
        .collect())
}
