#![recursion_limit = "1024"]

use clap::Parser;
use error_chain::{error_chain, ChainedError, ExitCode};
use log::{error, info};
use simplelog::{ColorChoice, CombinedLogger, Config, LevelFilter, TermLogger, TerminalMode};

mod cof;
mod config;
mod isolation_zones;
mod lof;
mod verify;

error_chain! {
    foreign_links {
        Io(std::io::Error);
        Yaml(serde_yaml::Error);
    }

    links {
        WaterNetwork(water_network::error::Error, water_network::error::ErrorKind);
        LayerIo(water_network::io::layers::Error, water_network::io::layers::ErrorKind);
        RiskScoring(risk_scoring::error::Error, risk_scoring::error::ErrorKind);
    }

    errors {
        Parameter {
            description("a parameter was missing, superfluous or had an illegal value, see the log for more details")
            display("a parameter was missing, superfluous or had an illegal value, see the log for more details")
        }

        UnknownCity(name: String) {
            description("the city is not present in the logins file")
            display("the city '{}' is not present in the logins file", name)
        }
    }
}

#[derive(Parser)]
#[clap(name = "Water Asset Toolkit", version = env!("CARGO_PKG_VERSION"))]
struct CliOptions {
    #[clap(subcommand)]
    pub subcommand: Command,

    #[clap(
        long,
        default_value = "Info",
        help = "The log level to use, one of Error, Warn, Info, Debug, Trace"
    )]
    pub log_level: LevelFilter,
}

#[derive(Parser)]
enum Command {
    #[clap(about = "Prints statistics about the water network built from the input layers.")]
    Verify(verify::VerifyCommand),
    #[clap(
        about = "Partitions the water mains into isolation zones bounded by valves and writes the zone layer."
    )]
    FindIsolationZones(isolation_zones::FindIsolationZonesCommand),
    #[clap(
        about = "Computes the likelihood-of-failure score per main from service life and break history."
    )]
    ComputeLof(lof::ComputeLofCommand),
    #[clap(
        about = "Computes the consequence-of-failure columns per main and writes the combined risk table."
    )]
    ComputeCof(cof::ComputeCofCommand),
}

// The main is unpacked from an error-chain macro.
// Using just the macro makes IntelliJ complain that there would be no main.
// The real main (programmed manually) is run(), below this method.
fn main() {
    ::std::process::exit(match run() {
        Ok(()) => ExitCode::code(()),
        Err(ref e) => {
            error!("{}", ChainedError::display_chain(e));
            1
        }
    });
}

fn initialise_logging(level_filter: LevelFilter) {
    CombinedLogger::init(vec![TermLogger::new(
        level_filter,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )])
    .unwrap();

    info!("Logging initialised successfully");
}

fn run() -> Result<()> {
    let options = &CliOptions::parse();
    initialise_logging(options.log_level);

    info!("Hello");

    match &options.subcommand {
        Command::Verify(subcommand) => verify::verify(options, subcommand),
        Command::FindIsolationZones(subcommand) => {
            isolation_zones::find_isolation_zones(options, subcommand)
        }
        Command::ComputeLof(subcommand) => lof::compute_lof(options, subcommand),
        Command::ComputeCof(subcommand) => cof::compute_cof(options, subcommand),
    }?;

    info!("Goodbye");
    Ok(())
}
