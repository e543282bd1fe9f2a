use crate::generator::scenario::SimulationConfig;
use log::debug;
use num_complex::Complex32;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::VecDeque;
use std::f64::consts::PI;
use std::io;
use vnacore::instrument::scpi::{
    CALSET_CATALOG, IDENTIFY, OPERATION_COMPLETE, SDATA, SINGLE_SWEEP, STIMULUS_AXIS,
};
use vnacore::instrument::{InstrumentError, InstrumentResult, ScpiTransport, Stimulus};
use vnacore::processing::SPEED_OF_LIGHT;

/// Synthetic analyzer answering the same SCPI subset as the real instrument.
pub struct SimulatedVna {
    scene: SimulationConfig,
    stimulus: Stimulus,
    sweeps: u64,
    last_sweep: Option<Vec<Complex32>>,
    replies: VecDeque<String>,
    rng: StdRng,
}

impl SimulatedVna {
    pub fn new(scene: SimulationConfig, stimulus: Stimulus) -> Self {
        let rng = StdRng::seed_from_u64(scene.seed);
        Self {
            scene,
            stimulus,
            sweeps: 0,
            last_sweep: None,
            replies: VecDeque::new(),
            rng,
        }
    }

    pub fn sweeps(&self) -> u64 {
        self.sweeps
    }

    fn frequencies(&self) -> Vec<f64> {
        let points = self.stimulus.points;
        if points < 2 {
            return vec![self.stimulus.start_hz; points];
        }
        let step = (self.stimulus.stop_hz - self.stimulus.start_hz) / (points - 1) as f64;
        (0..points)
            .map(|i| self.stimulus.start_hz + i as f64 * step)
            .collect()
    }

    fn sweep(&mut self) -> Vec<Complex32> {
        let noise = self.scene.noise.abs();
        let sweep = self.sweeps;
        let frequencies = self.frequencies();
        let mut samples = Vec::with_capacity(frequencies.len());

        for frequency in frequencies {
            let mut value = Complex32::new(0.0, 0.0);
            for reflector in &self.scene.reflectors {
                let phase = -2.0 * PI * frequency * reflector.distance_at(sweep) / SPEED_OF_LIGHT;
                value += Complex32::from_polar(reflector.amplitude, phase as f32);
            }
            if noise > 0.0 {
                value += Complex32::new(
                    self.rng.gen_range(-noise..noise),
                    self.rng.gen_range(-noise..noise),
                );
            }
            samples.push(value);
        }

        self.sweeps += 1;
        samples
    }

    fn respond(&mut self, command: &str) -> InstrumentResult<()> {
        let upper = command.trim().to_ascii_uppercase();
        match upper.as_str() {
            IDENTIFY => self.replies.push_back("Simulated,VNA,0,1.0".into()),
            OPERATION_COMPLETE => self.replies.push_back("1".into()),
            CALSET_CATALOG => self.replies.push_back("\"SIMULATED\"".into()),
            SINGLE_SWEEP => {
                let samples = self.sweep();
                self.last_sweep = Some(samples);
            }
            SDATA => {
                let samples = match self.last_sweep.clone() {
                    Some(samples) => samples,
                    None => self.sweep(),
                };
                let reply = samples
                    .iter()
                    .flat_map(|sample| [sample.re, sample.im])
                    .map(|value| value.to_string())
                    .collect::<Vec<_>>()
                    .join(",");
                self.replies.push_back(reply);
            }
            STIMULUS_AXIS => {
                let reply = self
                    .frequencies()
                    .iter()
                    .map(|value| value.to_string())
                    .collect::<Vec<_>>()
                    .join(",");
                self.replies.push_back(reply);
            }
            other if other.starts_with("CSET:PROP:CAT?") => {
                self.replies.push_back("\"simulated calibration\"".into())
            }
            other => {
                let (header, argument) = other.split_once(' ').unwrap_or((other, ""));
                let argument = argument.trim();
                match header {
                    "SENS1:FREQ:STAR" => self.stimulus.start_hz = parse_argument(command, argument)?,
                    "SENS1:FREQ:STOP" => self.stimulus.stop_hz = parse_argument(command, argument)?,
                    "SENS1:SWE:POIN" => self.stimulus.points = parse_argument(command, argument)?,
                    _ if header.ends_with('?') => {
                        return Err(InstrumentError::UnsupportedCommand(command.to_string()))
                    }
                    _ => debug!("simulated VNA accepted {}", command),
                }
            }
        }
        Ok(())
    }
}

fn parse_argument<T: std::str::FromStr>(command: &str, argument: &str) -> InstrumentResult<T> {
    argument
        .parse()
        .map_err(|_| InstrumentError::UnsupportedCommand(command.to_string()))
}

impl ScpiTransport for SimulatedVna {
    fn write(&mut self, command: &str) -> InstrumentResult<()> {
        self.respond(command)
    }

    fn read_line(&mut self) -> InstrumentResult<String> {
        self.replies.pop_front().ok_or_else(|| {
            InstrumentError::Io(io::Error::new(io::ErrorKind::TimedOut, "no reply pending"))
        })
    }
}
