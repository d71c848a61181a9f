use crate::config::log_layer_provenance;
use crate::{CliOptions, ErrorKind};
use clap::Parser;
use error_chain::bail;
use log::{error, info};
use risk_scoring::cof::{score_cof, CofOptions};
use risk_scoring::near::NearLayer;
use risk_scoring::tables::{read_lof_table, write_risk_table};
use std::collections::HashMap;
use water_network::io::layers::{
    read_facilities, read_laterals, read_near_layer, read_pipe_segments, read_zone_layer,
    MainsSchema,
};
use water_network::model::FacilityKind;

#[derive(Parser)]
pub struct ComputeCofCommand {
    #[clap(short, long, help = "The water main layer in GeoJSON format")]
    pub mains: String,

    #[clap(short, long, help = "The isolation-zone layer in GeoJSON format")]
    pub zones: String,

    #[clap(short, long, help = "The service lateral layer in GeoJSON format")]
    pub laterals: Option<String>,

    #[clap(long, help = "The critical customer point layer in GeoJSON format")]
    pub critical_customers: Option<String>,

    #[clap(long, help = "The school and childcare point layer in GeoJSON format")]
    pub schools: Option<String>,

    #[clap(long, help = "The healthcare facility point layer in GeoJSON format")]
    pub healthcare: Option<String>,

    #[clap(
        short,
        long,
        help = "A proximity layer as NAME=path, repeatable; each layer becomes one NEAR_NAME column"
    )]
    pub near: Vec<String>,

    #[clap(long, help = "A LOF table in CSV format to merge into the risk table")]
    pub lof: Option<String>,

    #[clap(short, long, help = "The output risk table in CSV format")]
    pub output: String,

    #[clap(
        long,
        default_value = "0.05",
        help = "The maximum distance between a geometry and a zone for the geometry to belong to the zone"
    )]
    pub zone_tolerance: f64,

    #[clap(
        long,
        default_value = "500.0",
        help = "The search radius of the near-distance columns and the facility-to-zone join"
    )]
    pub search_radius: f64,

    #[clap(long, help = "The YAML file with per-city feature-service logins")]
    pub city_logins: Option<String>,

    #[clap(long, help = "The city whose layers are being processed")]
    pub city: Option<String>,
}

fn read_near_layers(arguments: &[String]) -> crate::Result<Vec<NearLayer>> {
    let mut layers = Vec::with_capacity(arguments.len());
    for argument in arguments {
        let (name, path) = match argument.split_once('=') {
            Some(split) => split,
            None => {
                error!("--near expects NAME=path, got '{}'", argument);
                bail!(ErrorKind::Parameter);
            }
        };
        layers.push(NearLayer {
            name: name.to_owned(),
            features: read_near_layer(path)?,
        });
    }
    Ok(layers)
}

pub(crate) fn compute_cof(
    _options: &CliOptions,
    subcommand: &ComputeCofCommand,
) -> crate::Result<()> {
    info!("Computing the consequence of failure per main...");
    log_layer_provenance(&subcommand.city_logins, &subcommand.city)?;

    let mut segments = read_pipe_segments(&subcommand.mains, &MainsSchema::default())?;
    segments.sort_by(|a, b| a.facility_id.cmp(&b.facility_id));
    let zones = read_zone_layer(&subcommand.zones)?;
    info!("Read {} mains and {} zones", segments.len(), zones.len());

    let laterals = match &subcommand.laterals {
        Some(path) => read_laterals(path)?,
        None => Vec::new(),
    };

    let mut facilities = Vec::new();
    for (path, kind) in [
        (&subcommand.critical_customers, FacilityKind::CriticalCustomer),
        (&subcommand.schools, FacilityKind::SchoolChildcare),
        (&subcommand.healthcare, FacilityKind::Healthcare),
    ] {
        if let Some(path) = path {
            facilities.extend(read_facilities(path, kind)?);
        }
    }
    info!(
        "Read {} laterals and {} critical facilities",
        laterals.len(),
        facilities.len()
    );

    let near_layers = read_near_layers(&subcommand.near)?;

    let cof = score_cof(
        &segments,
        &zones,
        &laterals,
        &facilities,
        &near_layers,
        &CofOptions {
            zone_tolerance: subcommand.zone_tolerance,
            search_radius: subcommand.search_radius,
        },
    );

    let lof_by_id = match &subcommand.lof {
        Some(path) => read_lof_table(path)?
            .into_iter()
            .map(|record| (record.facility_id.clone(), record))
            .collect(),
        None => HashMap::new(),
    };

    write_risk_table(&subcommand.output, &cof, &lof_by_id)?;
    info!(
        "Wrote {} risk rows to {}",
        cof.records.len(),
        subcommand.output
    );
    Ok(())
}
