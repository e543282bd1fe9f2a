//! Instrument adapter and range-profile processing core for VNA acquisition.
//!
//! The modules split the acquisition into an instrument capability set, pure
//! processing stages (transform, background subtraction, peak selection) and
//! the fixed-size capture buffer the driver fills one sweep at a time.

pub mod instrument;
pub mod math;
pub mod prelude;
pub mod processing;
pub mod report;
pub mod telemetry;

pub use instrument::{Instrument, InstrumentError};
pub use prelude::{ProcessingError, RangeProfile, Spectrum};
