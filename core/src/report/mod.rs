pub mod export;
pub mod frame;
pub mod peak;

pub use export::CaptureExport;
pub use frame::ProfileFrame;
pub use peak::{Peak, PeakTable, PEAK_TABLE_COLUMNS};
