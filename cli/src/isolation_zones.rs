use crate::config::log_layer_provenance;
use crate::CliOptions;
use clap::Parser;
use log::{info, warn};
use water_network::io::layers::{read_pipe_segments, read_valves, write_zone_layer, MainsSchema};
use water_network::network::NetworkBuilder;
use water_network::seeds::generate_seed_points;
use water_network::trace::NetworkTraceEngine;
use water_network::zones::partition_zones;

#[derive(Parser)]
pub struct FindIsolationZonesCommand {
    #[clap(short, long, help = "The water main layer in GeoJSON format")]
    pub mains: String,

    #[clap(short, long, help = "The isolation valve layer in GeoJSON format")]
    pub valves: String,

    #[clap(short, long, help = "The output isolation-zone layer in GeoJSON format")]
    pub output: String,

    #[clap(
        long,
        default_value = "0.05",
        help = "The maximum distance between segment endpoints that snap to the same junction"
    )]
    pub snap_tolerance: f64,

    #[clap(
        long,
        default_value = "0.05",
        help = "The maximum distance between a seed point and a traced line for the seed to count as covered"
    )]
    pub coverage_tolerance: f64,

    #[clap(long, help = "The YAML file with per-city feature-service logins")]
    pub city_logins: Option<String>,

    #[clap(long, help = "The city whose layers are being processed")]
    pub city: Option<String>,
}

pub(crate) fn find_isolation_zones(
    _options: &CliOptions,
    subcommand: &FindIsolationZonesCommand,
) -> crate::Result<()> {
    info!("Partitioning the water mains into isolation zones...");
    log_layer_provenance(&subcommand.city_logins, &subcommand.city)?;

    let segments = read_pipe_segments(&subcommand.mains, &MainsSchema::default())?;
    let valves = read_valves(&subcommand.valves)?;
    info!(
        "Read {} mains and {} valves",
        segments.len(),
        valves.len()
    );

    let network = NetworkBuilder::with_snap_tolerance(subcommand.snap_tolerance)
        .build(segments, &valves)?;
    let seeds = generate_seed_points(&network);
    let engine = NetworkTraceEngine::new(&network);
    let partition = partition_zones(&engine, &seeds, subcommand.coverage_tolerance);

    for failed_seed in &partition.failed_seeds {
        warn!(
            "Seed {} produced no zone: {}",
            failed_seed.facility_id, failed_seed.reason
        );
    }
    info!(
        "Found {} isolation zones with {} traces over {} seeds ({} failed)",
        partition.zone_count(),
        partition.trace_count,
        seeds.len(),
        partition.failed_seeds.len()
    );

    write_zone_layer(&subcommand.output, &partition.zones)?;
    info!("Wrote the zone layer to {}", subcommand.output);
    Ok(())
}
