use anyhow::Context;
use clap::Parser;
use generator::vna::SimulatedVna;
use gui_bridge::bridge::{gui_bind_address, GuiBridge};
use gui_bridge::NullDisplay;
use log::{info, warn};
use std::path::PathBuf;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use vnacore::instrument::{Instrument, ResourceAddress, ScpiInstrument, TcpTransport};
use vnacore::processing::IfftRangeTransform;
use workflow::config::AcquisitionConfig;
use workflow::export::write_captures;
use workflow::runner::Runner;

mod generator;
mod gui_bridge;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Capture background-subtracted VNA range profiles")]
struct Args {
    /// Load the acquisition config from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    /// Instrument resource, e.g. TCPIP0::192.168.1.91::5025::SOCKET
    #[arg(long)]
    address: Option<String>,
    /// Number of range profiles to capture
    #[arg(long)]
    captures: Option<usize>,
    #[arg(long)]
    points: Option<usize>,
    /// Sweeps averaged per range profile
    #[arg(long)]
    averages: Option<usize>,
    /// Use the built-in simulated analyzer instead of a real instrument
    #[arg(long, default_value_t = false)]
    simulate: bool,
    /// Publish the live profile and peak table for the visualizer
    #[arg(long, default_value_t = false)]
    show_gui: bool,
    /// Keep the GUI bridge alive after the run until Ctrl+C
    #[arg(long, default_value_t = false)]
    hold: bool,
    /// Print the phase of this range bin for every captured frame
    #[arg(long)]
    phase_bin: Option<usize>,
    /// Write the captured profiles as JSON
    #[arg(long)]
    export: Option<PathBuf>,
}

/// `--hold` only applies while the GUI bridge is running.
fn hold_bridge(args: &Args, config: &AcquisitionConfig) -> bool {
    if args.hold && !config.show_gui {
        warn!("--hold ignored: the GUI bridge is disabled (enable show_gui)");
        return false;
    }
    args.hold
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = if let Some(path) = args.config.as_ref() {
        AcquisitionConfig::load(path)?
    } else {
        AcquisitionConfig::default()
    };
    if let Some(address) = args.address.as_ref() {
        config.address = address.clone();
    }
    if let Some(captures) = args.captures {
        config.captures = captures;
    }
    if let Some(points) = args.points {
        config.points = points;
    }
    if let Some(averages) = args.averages {
        config.averages = averages;
    }
    config.show_gui |= args.show_gui;
    config.validate()?;
    let hold = hold_bridge(&args, &config);

    let settings = config.to_instrument_settings();
    let mut instrument: Box<dyn Instrument> = if args.simulate {
        let vna = SimulatedVna::new(config.simulation.clone(), config.stimulus());
        Box::new(ScpiInstrument::new(vna, settings))
    } else {
        let address: ResourceAddress = config
            .address
            .parse()
            .with_context(|| format!("parsing instrument address {}", config.address))?;
        let transport = TcpTransport::connect(&address, config.timeout())
            .with_context(|| format!("connecting to {}", address))?;
        Box::new(ScpiInstrument::new(transport, settings))
    };

    let identity = instrument.identify().context("identifying instrument")?;
    info!("connected to {}", identity);
    instrument.configure().context("configuring instrument")?;

    let mut transform = IfftRangeTransform::new(config.window, config.round_trip);
    let runner = Runner::new(config.clone());

    let bridge = config.show_gui.then(|| {
        let bridge = GuiBridge::new(config.captures);
        bridge.serve(gui_bind_address());
        bridge
    });

    let result = match bridge {
        Some(mut bridge) => {
            let result = runner.run(&mut instrument, &mut transform, &mut bridge)?;
            bridge.publish_status("Acquisition complete.");
            if hold {
                bridge.publish_status("HTTP bridge running (Ctrl+C to stop)...");
                let runtime = TokioBuilder::new_current_thread()
                    .enable_all()
                    .build()
                    .context("creating runtime for signal handling")?;
                runtime.block_on(async {
                    signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
                    Ok::<(), anyhow::Error>(())
                })?;
            }
            result
        }
        None => runner.run(&mut instrument, &mut transform, &mut NullDisplay)?,
    };

    println!(
        "Captured {} range profiles ({} sweeps), baseline peaks {:?}",
        result.captures.len(),
        result.metrics.sweeps,
        result.baseline_peaks
    );

    if let Some(bin) = args.phase_bin {
        let phases = result
            .captures
            .phase_history(bin)
            .with_context(|| format!("range bin {} is outside the profile", bin))?;
        println!("Phase at bin {} per frame (rad): {:?}", bin, phases);
    }

    if let Some(path) = args.export {
        write_captures(&path, &result.captures)?;
        info!("captures written to {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hold_is_dropped_without_gui() {
        let args = Args::try_parse_from(["acquire", "--hold"]).unwrap();
        assert!(!hold_bridge(&args, &AcquisitionConfig::default()));
    }

    #[test]
    fn hold_applies_when_gui_enabled_in_config() {
        let args = Args::try_parse_from(["acquire", "--hold", "--phase-bin", "42"]).unwrap();
        let config = AcquisitionConfig {
            show_gui: true,
            ..Default::default()
        };
        assert!(hold_bridge(&args, &config));
        assert_eq!(args.phase_bin, Some(42));
    }
}
