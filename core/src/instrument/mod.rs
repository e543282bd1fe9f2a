//! Instrument capability set and the SCPI adapter that implements it.

pub mod scpi;
pub mod tcp;

pub use scpi::{InstrumentSettings, ScpiInstrument, ScpiTransport, Stimulus};
pub use tcp::{ResourceAddress, TcpTransport};

use num_complex::Complex32;

/// Errors raised while talking to the analyzer.
#[derive(thiserror::Error, Debug)]
pub enum InstrumentError {
    #[error("transport failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("unsupported resource address {0}")]
    UnsupportedAddress(String),
    #[error("malformed reply to {query}: {reason}")]
    MalformedReply { query: String, reason: String },
    #[error("operation-complete query returned {0:?}")]
    OperationIncomplete(String),
    #[error("connection closed by instrument")]
    Disconnected,
    #[error("unsupported command {0}")]
    UnsupportedCommand(String),
}

pub type InstrumentResult<T> = Result<T, InstrumentError>;

/// Capability set the acquisition loop needs from an analyzer.
///
/// Every call blocks until the instrument has answered.
pub trait Instrument {
    /// Identity string, used for logging only.
    fn identify(&mut self) -> InstrumentResult<String> {
        Ok("unidentified instrument".to_string())
    }

    /// One-time, order-dependent setup of window, calibration and measurement.
    fn configure(&mut self) -> InstrumentResult<()>;

    /// Runs a single sweep and waits for operation-complete.
    fn trigger_sweep(&mut self) -> InstrumentResult<()>;

    /// Complex S21 samples of the last sweep.
    fn read_spectrum(&mut self) -> InstrumentResult<Vec<Complex32>>;

    /// Stimulus axis of the last sweep in Hz.
    fn read_frequency_axis(&mut self) -> InstrumentResult<Vec<f64>>;
}

impl<I: Instrument + ?Sized> Instrument for Box<I> {
    fn identify(&mut self) -> InstrumentResult<String> {
        (**self).identify()
    }

    fn configure(&mut self) -> InstrumentResult<()> {
        (**self).configure()
    }

    fn trigger_sweep(&mut self) -> InstrumentResult<()> {
        (**self).trigger_sweep()
    }

    fn read_spectrum(&mut self) -> InstrumentResult<Vec<Complex32>> {
        (**self).read_spectrum()
    }

    fn read_frequency_axis(&mut self) -> InstrumentResult<Vec<f64>> {
        (**self).read_frequency_axis()
    }
}
