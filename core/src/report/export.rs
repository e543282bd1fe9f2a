use serde::{Deserialize, Serialize};

/// Serialised capture buffer: one `[re, im]` row per capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureExport {
    pub distances: Vec<f64>,
    pub frames: Vec<Vec<[f32; 2]>>,
}
