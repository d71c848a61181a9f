use crate::CliOptions;
use clap::Parser;
use log::{info, warn};
use water_network::io::layers::{read_pipe_segments, read_valves, MainsSchema};
use water_network::network::NetworkBuilder;
use water_network::pipegraph::barrier_components;

#[derive(Parser)]
pub struct VerifyCommand {
    #[clap(short, long, help = "The water main layer in GeoJSON format")]
    pub mains: String,

    #[clap(short, long, help = "The isolation valve layer in GeoJSON format")]
    pub valves: Option<String>,

    #[clap(
        long,
        default_value = "0.05",
        help = "The maximum distance between segment endpoints that snap to the same junction"
    )]
    pub snap_tolerance: f64,
}

pub(crate) fn verify(_options: &CliOptions, subcommand: &VerifyCommand) -> crate::Result<()> {
    info!("Building the water network for verification...");

    let segments = read_pipe_segments(&subcommand.mains, &MainsSchema::default())?;
    let valves = match &subcommand.valves {
        Some(path) => read_valves(path)?,
        None => Vec::new(),
    };

    let network = NetworkBuilder::with_snap_tolerance(subcommand.snap_tolerance)
        .build(segments, &valves)?;

    info!("Mains: {}", network.segments().len());
    info!("Junctions: {}", network.junction_count());
    info!("Total main length: {:.1}", network.total_length());
    info!(
        "Valves matched to junctions: {} of {}",
        network.matched_valve_count(),
        network.matched_valve_count() + network.unmatched_valve_count()
    );
    if network.unmatched_valve_count() > 0 {
        warn!(
            "{} valves lie farther than {} from any junction",
            network.unmatched_valve_count(),
            network.snap_tolerance()
        );
    }

    let components = barrier_components(network.graph(), network.barriers());
    info!("Valve-bounded components: {}", components.len());

    Ok(())
}
