use serde::{Deserialize, Serialize};

/// Point reflector seen by the simulated analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reflector {
    pub distance_m: f64,
    pub amplitude: f32,
    /// Distance change applied on every sweep.
    #[serde(default)]
    pub drift_m_per_sweep: f64,
}

impl Reflector {
    pub fn distance_at(&self, sweep: u64) -> f64 {
        self.distance_m + self.drift_m_per_sweep * sweep as f64
    }
}

/// Scene rendered by [`crate::generator::vna::SimulatedVna`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub reflectors: Vec<Reflector>,
    pub noise: f32,
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            reflectors: vec![
                Reflector {
                    distance_m: 2.4,
                    amplitude: 0.5,
                    drift_m_per_sweep: 0.0,
                },
                Reflector {
                    distance_m: 1.2,
                    amplitude: 0.2,
                    drift_m_per_sweep: 0.01,
                },
            ],
            noise: 0.002,
            seed: 0,
        }
    }
}

