pub mod background;
pub mod capture;
pub mod detection;
pub mod transform;

pub use background::Background;
pub use capture::CaptureBuffer;
pub use detection::{top_peaks, DEFAULT_PEAK_COUNT};
pub use transform::{IfftRangeTransform, RangeTransform, SPEED_OF_LIGHT};
