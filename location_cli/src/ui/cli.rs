use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use location_core::{ApiError, ClientConfig, Location, LocationApi, Uuid};
use location_grpc::GrpcLocationApi;
use log::info;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "location-cli", version, subcommand_required = true)]
pub struct Args {
    /// JSON config file (`{ "address": "...", "timeout_ms": 5000 }`)
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Service address, overrides the config file
    #[arg(long)]
    pub addr: Option<String>,
    /// Per-call timeout in milliseconds, overrides the config file
    #[arg(long)]
    pub timeout_ms: Option<u64>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Ask the service whether it is serving
    Health,
    /// Print every location
    List,
    /// Print one location
    Get { uuid: Uuid },
    /// Delete one location
    Delete { uuid: Uuid },
    /// Create or update the location described by a JSON file
    Upsert { file: PathBuf },
    /// Update the location described by a JSON file
    Update { file: PathBuf },
}

/// File values first, then command-line overrides.
pub fn resolve_config(args: &Args) -> Result<ClientConfig, ApiError> {
    let mut config = match &args.config {
        Some(path) => ClientConfig::load(path)?,
        None => ClientConfig::default(),
    };
    if let Some(addr) = &args.addr {
        config.address = addr.clone();
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.timeout_ms = timeout_ms;
    }
    config.validate()?;
    Ok(config)
}

fn read_location(path: &Path) -> Result<Location, ApiError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| ApiError::Config(format!("could not read {:?}: {e}", path)))?;
    Ok(serde_json::from_str(&raw)?)
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<(), ApiError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn run_cli(args: Args) -> Result<(), ApiError> {
    let config = resolve_config(&args)?;
    info!(
        "Using Location service at {} (timeout {} ms)",
        config.address, config.timeout_ms
    );
    let api = GrpcLocationApi::from_config(&config)?;

    let result = run_command(&api, args.command).await;
    api.close()?;
    result
}

async fn run_command(api: &impl LocationApi, command: Command) -> Result<(), ApiError> {
    match command {
        Command::Health => {
            api.health_check().await?;
            println!("SERVING");
        }
        Command::List => print_json(&api.get_all_locations().await?)?,
        Command::Get { uuid } => print_json(&api.location_by_uuid(uuid).await?)?,
        Command::Delete { uuid } => {
            api.delete_location(uuid).await?;
            info!("Deleted location {}", uuid);
        }
        Command::Upsert { file } => {
            let location = read_location(&file)?;
            api.create_or_update_location(&location).await?;
            info!("Stored location {}", location.location_uuid);
        }
        Command::Update { file } => {
            let location = read_location(&file)?;
            api.update_location(&location).await?;
            info!("Updated location {}", location.location_uuid);
        }
    }
    Ok(())
}
