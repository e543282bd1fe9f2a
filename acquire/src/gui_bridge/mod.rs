pub mod bridge;
pub mod model;

use vnacore::report::ProfileFrame;

/// Sink for the live range-profile plot and peak table.
pub trait LiveDisplay {
    fn publish(&mut self, frame: &ProfileFrame) -> anyhow::Result<()>;
}

/// Display used when the GUI is disabled.
#[derive(Debug, Default)]
pub struct NullDisplay;

impl LiveDisplay for NullDisplay {
    fn publish(&mut self, frame: &ProfileFrame) -> anyhow::Result<()> {
        log::debug!("frame {} peaks:\n{}", frame.iteration, frame.table);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vnacore::report::PeakTable;

    #[test]
    fn null_display_accepts_frames_without_peaks() {
        let frame = ProfileFrame {
            iteration: 0,
            distances: vec![0.0, 0.5],
            magnitudes: vec![0.0, 0.0],
            table: PeakTable::new(),
        };
        let mut display = NullDisplay;
        display.publish(&frame).unwrap();
        assert!(frame.table.to_string().starts_with("  Distance"));
    }
}
