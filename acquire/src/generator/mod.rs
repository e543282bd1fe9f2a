pub mod scenario;
pub mod vna;
