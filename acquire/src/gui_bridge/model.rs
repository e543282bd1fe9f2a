use serde::{Deserialize, Serialize};
use vnacore::report::ProfileFrame;

/// State served to the visualizer.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VisualizationModel {
    pub frame: ProfileFrame,
    pub captures_total: usize,
    pub frames_published: usize,
    pub status: String,
}

impl VisualizationModel {
    pub fn new(captures_total: usize) -> Self {
        Self {
            captures_total,
            status: "Waiting for first sweep".into(),
            ..Default::default()
        }
    }
}
