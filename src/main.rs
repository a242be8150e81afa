use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};

use snmp_inventory::formatter::{JsonFormatter, OutputFormat, XmlFormatter};
use snmp_inventory::{AppConfig, SnmpCollector};

#[derive(Parser, Debug)]
#[command(name = "snmp-inventory", about = "Collect health and inventory metrics over SNMP")]
struct Cli {
    /// Settings YAML (connection, community, fleet)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Scalar profile YAML replacing the built-in catalog
    #[arg(short, long, global = true)]
    profile: Option<PathBuf>,

    /// Community string, overrides the settings file
    #[arg(long, global = true)]
    community: Option<String>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Collect one device
    Collect {
        /// Device address, `host` or `host:port` (defaults to SNMP_TARGET)
        address: Option<String>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Wrap the JSON record with a timestamp and failure summary
        #[arg(long)]
        report: bool,
    },
    /// Collect several devices concurrently
    Fleet {
        #[arg(required = true)]
        addresses: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    if let Err(e) = run(cli).await {
        error!(error = %e, "Collection failed");
        return Err(e);
    }

    Ok(())
}

fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    // В stdout идёт документ, логи в stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = AppConfig::load(cli.config.as_deref(), cli.profile.as_deref())?;
    if let Some(community) = cli.community {
        config.settings.auth.community = community;
    }
    config.log_summary();

    let collector = SnmpCollector::from_config(&config);

    match cli.command {
        Command::Collect {
            address,
            format,
            report,
        } => {
            let address = match address.or_else(|| config.get_target()) {
                Some(address) => address,
                None => anyhow::bail!("No device address given and SNMP_TARGET is not set"),
            };

            info!(address = %address, "Collecting device");
            let results = collector.collect(&address).await?;

            let document = match (format, report) {
                (OutputFormat::Xml, _) => XmlFormatter::export_markup(&results)?,
                (OutputFormat::Json, true) => JsonFormatter::report_to_json_string(&address, &results)?,
                (OutputFormat::Json, false) => JsonFormatter::to_json_string(&results)?,
            };
            println!("{}", document);
        }
        Command::Fleet { addresses } => {
            info!(devices = addresses.len(), "Collecting fleet");
            let reports = collector.collect_fleet(&addresses).await;
            println!("{}", JsonFormatter::fleet_to_json_string(&reports)?);
        }
    }

    Ok(())
}
