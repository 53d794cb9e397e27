use std::path::PathBuf;
use std::process::ExitCode;

use administrare_log::init_logging;
use administrare_report::conf::parse_zoom;
use administrare_report::{
    ReportError, SpecDemandDocument, SpecDependencyDocument, SpecMasterDocument,
    SpecReportConfig, SpecRequestDocument, derive_current_date_stamp, read_json_document,
    write_inventory_demand, write_inventory_master, write_inventory_request,
    write_inventory_request_user,
};
use clap::{Parser, Subcommand};
use tracing::{error, info};

#[derive(Parser)]
#[command(about = "Generate inventory spreadsheet reports from JSON documents.")]
struct Args {
    /// Base output folder (overrides ADMINISTRARE_OUTPUT_DIR).
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Sheet zoom percentage, 10..=400 (overrides ADMINISTRARE_ZOOM).
    #[arg(long, global = true, value_parser = parse_zoom_arg)]
    zoom: Option<u16>,

    /// Log filter when RUST_LOG is unset (overrides ADMINISTRARE_LOG_LEVEL).
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// File-name stamp; defaults to the current local time.
    #[arg(long, global = true)]
    stamp: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Inventory ledger with sub-totals and signatures.
    Master {
        #[arg(long)]
        master: PathBuf,
        #[arg(long)]
        dependency: PathBuf,
    },
    /// Category and item demands.
    Demand {
        #[arg(long)]
        demand: PathBuf,
        #[arg(long)]
        master: PathBuf,
    },
    /// All requests plus per-user and per-day sheets.
    Request {
        #[arg(long)]
        request: PathBuf,
        #[arg(long)]
        master: PathBuf,
    },
    /// One user's requests on one day, by 1-based ids.
    RequestUser {
        #[arg(long)]
        request: PathBuf,
        #[arg(long)]
        master: PathBuf,
        #[arg(long)]
        user_id: usize,
        #[arg(long)]
        date_id: usize,
    },
}

fn parse_zoom_arg(value: &str) -> Result<u16, String> {
    parse_zoom(value).map_err(|err| err.to_string())
}

fn derive_config(args: &Args) -> Result<SpecReportConfig, ReportError> {
    let mut config = SpecReportConfig::from_env()?;
    if let Some(dir_output) = &args.output_dir {
        config.dir_output = dir_output.clone();
    }
    if let Some(zoom) = args.zoom {
        config.zoom = zoom;
    }
    if let Some(level) = &args.log_level {
        config.log_level = level.clone();
    }
    Ok(config)
}

fn run(args: &Args, config: &SpecReportConfig) -> Result<PathBuf, ReportError> {
    let c_stamp = args.stamp.clone().unwrap_or_else(derive_current_date_stamp);

    match &args.command {
        Command::Master { master, dependency } => {
            let master: SpecMasterDocument = read_json_document(master)?;
            let dependency: SpecDependencyDocument = read_json_document(dependency)?;
            let (path_saved, _) = write_inventory_master(
                config.derive_master_path(&c_stamp),
                &master,
                &dependency,
                config,
            )?;
            Ok(path_saved)
        }
        Command::Demand { demand, master } => {
            let demand: SpecDemandDocument = read_json_document(demand)?;
            let master: SpecMasterDocument = read_json_document(master)?;
            write_inventory_demand(config.derive_demand_path(&c_stamp), &demand, &master, config)
        }
        Command::Request { request, master } => {
            let request: SpecRequestDocument = read_json_document(request)?;
            let master: SpecMasterDocument = read_json_document(master)?;
            write_inventory_request(config.derive_request_path(&c_stamp), &request, &master, config)
        }
        Command::RequestUser {
            request,
            master,
            user_id,
            date_id,
        } => {
            let request: SpecRequestDocument = read_json_document(request)?;
            let master: SpecMasterDocument = read_json_document(master)?;
            write_inventory_request_user(config, &request, &master, *user_id, *date_id)
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let outcome = derive_config(&args).and_then(|config| {
        init_logging(Some(config.log_level.as_str()));
        run(&args, &config)
    });

    let if_success = match outcome {
        Ok(path_saved) => {
            info!(path = %path_saved.display(), "report saved");
            true
        }
        Err(err) => {
            init_logging(args.log_level.as_deref());
            error!(error = %err, "report failed");
            false
        }
    };

    println!("{}", serde_json::json!({ "success": if_success }));
    if if_success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
