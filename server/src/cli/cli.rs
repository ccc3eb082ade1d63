// server/src/cli/cli.rs

use anyhow::Result;
use clap::Parser;
use log::debug;

use lib::{AppConfig, load_app_config};

use crate::cli::commands::{BedAllocCommand, CliArgs};
use crate::cli::handlers::{handle_allocate, handle_search, handle_seed, handle_serve};

/// Layers command-line overrides on top of the loaded configuration.
pub fn resolve_config(args: &CliArgs) -> Result<AppConfig> {
    let mut config = load_app_config(args.config.as_deref())?;
    if let Some(engine) = args.storage {
        config.storage.engine = engine;
    }
    if let Some(dir) = &args.data_dir {
        config.storage.data_directory = dir.clone();
    }
    Ok(config)
}

fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    // A second init in the same process (tests) is harmless.
    let _ = env_logger::Builder::from_env(env).try_init();
}

pub async fn run(args: CliArgs) -> Result<()> {
    let config = resolve_config(&args)?;
    init_logging(&config.log.level);
    debug!("[Server] command {:?}", args.command);

    match args.command.unwrap_or(BedAllocCommand::Serve { host: None, port: None, seed: false }) {
        BedAllocCommand::Serve { host, port, seed } => handle_serve(config, host, port, seed).await,
        BedAllocCommand::Seed => handle_seed(config).await,
        BedAllocCommand::Allocate { lat, lon, specialty } => {
            handle_allocate(config, lat, lon, &specialty).await
        }
        BedAllocCommand::Search { lat, lon, specialty, limit, radius_km } => {
            handle_search(config, lat, lon, &specialty, limit, radius_km).await
        }
    }
}

pub async fn start_cli() -> Result<()> {
    run(CliArgs::parse()).await
}
