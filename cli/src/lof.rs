use crate::config::log_layer_provenance;
use crate::CliOptions;
use chrono::Datelike;
use clap::Parser;
use log::{info, warn};
use risk_scoring::breaks::{count_breaks_per_main, score_breaks};
use risk_scoring::lof::combine_lof;
use risk_scoring::service_life::{score_service_life, ServiceLifeTable};
use risk_scoring::tables::{write_breaks_table, write_lof_table};
use water_network::io::layers::{read_pipe_segments, read_point_layer, MainsSchema};

#[derive(Parser)]
pub struct ComputeLofCommand {
    #[clap(short, long, help = "The water main layer in GeoJSON format")]
    pub mains: String,

    #[clap(short, long, help = "The historical break point layer in GeoJSON format")]
    pub breaks: Option<String>,

    #[clap(
        short,
        long,
        help = "The CSV table with columns 'Material' and 'Service Life'"
    )]
    pub service_life_table: String,

    #[clap(short, long, help = "The output LOF table in CSV format")]
    pub output: String,

    #[clap(long, help = "The output break table in CSV format")]
    pub breaks_output: Option<String>,

    #[clap(
        long,
        help = "The year to compute pipe ages against, defaulting to the current year"
    )]
    pub current_year: Option<i32>,

    #[clap(
        long,
        default_value = "10.0",
        help = "The search radius of the break-to-main join"
    )]
    pub search_radius: f64,

    #[clap(
        long,
        default_value = "FACILITYID",
        help = "The facility identifier property of the main layer"
    )]
    pub facility_id_field: String,

    #[clap(
        long,
        default_value = "PLACEDINSE",
        help = "The installation date property of the main layer"
    )]
    pub install_date_field: String,

    #[clap(
        long,
        default_value = "MATERIAL",
        help = "The pipe material property of the main layer"
    )]
    pub material_field: String,

    #[clap(
        long,
        default_value = "DIAMETER",
        help = "The pipe diameter property of the main layer"
    )]
    pub diameter_field: String,

    #[clap(long, help = "The YAML file with per-city feature-service logins")]
    pub city_logins: Option<String>,

    #[clap(long, help = "The city whose layers are being processed")]
    pub city: Option<String>,
}

impl ComputeLofCommand {
    fn mains_schema(&self) -> MainsSchema {
        MainsSchema {
            facility_id: self.facility_id_field.clone(),
            install_date: self.install_date_field.clone(),
            material: self.material_field.clone(),
            diameter: self.diameter_field.clone(),
        }
    }
}

pub(crate) fn compute_lof(
    _options: &CliOptions,
    subcommand: &ComputeLofCommand,
) -> crate::Result<()> {
    info!("Computing the likelihood of failure per main...");
    log_layer_provenance(&subcommand.city_logins, &subcommand.city)?;

    let mut segments = read_pipe_segments(&subcommand.mains, &subcommand.mains_schema())?;
    segments.sort_by(|a, b| a.facility_id.cmp(&b.facility_id));
    info!("Read {} mains", segments.len());

    let table = ServiceLifeTable::from_csv_file(&subcommand.service_life_table)?;
    info!("Service-life table maps {} materials", table.len());

    let current_year = subcommand
        .current_year
        .unwrap_or_else(|| chrono::Utc::now().year());
    let service_records = score_service_life(&segments, &table, current_year);

    let break_records = match &subcommand.breaks {
        Some(path) => {
            let break_points = read_point_layer(path)?;
            info!("Read {} break events", break_points.len());
            let counts =
                count_breaks_per_main(&break_points, &segments, subcommand.search_radius);
            let records = score_breaks(&counts);
            if records.is_empty() && !break_points.is_empty() {
                warn!("No break event matched a main; scoring on service life alone");
            }
            records
        }
        None => Vec::new(),
    };

    if let Some(path) = &subcommand.breaks_output {
        write_breaks_table(path, &break_records)?;
    }

    let lof_records = combine_lof(&service_records, &break_records);
    write_lof_table(&subcommand.output, &lof_records)?;
    info!(
        "Wrote {} LOF rows to {}",
        lof_records.len(),
        subcommand.output
    );
    Ok(())
}
