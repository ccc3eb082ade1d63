// server/src/cli/commands.rs

// Command-line arguments and subcommands for the bed allocation server.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use lib::StorageEngineType;

#[derive(Debug, Parser)]
#[clap(name = "bedalloc-server", version, about = "Emergency hospital bed allocation")]
pub struct CliArgs {
    /// YAML or TOML configuration file.
    #[clap(long, short = 'c', global = true, env = "BEDALLOC_CONFIG")]
    pub config: Option<PathBuf>,
    /// Overrides `storage.engine`.
    #[clap(long, global = true)]
    pub storage: Option<StorageEngineType>,
    /// Overrides `storage.data_directory`.
    #[clap(long, global = true)]
    pub data_dir: Option<PathBuf>,
    #[clap(subcommand)]
    pub command: Option<BedAllocCommand>,
}

#[derive(Debug, Subcommand, PartialEq)]
pub enum BedAllocCommand {
    /// Run the REST API (default).
    Serve {
        #[clap(long)]
        host: Option<String>,
        #[clap(long, short = 'p')]
        port: Option<u16>,
        /// Seed demo data before serving.
        #[clap(long)]
        seed: bool,
    },
    /// Load reference specialties and demo hospitals.
    Seed,
    /// Recommend one hospital for an emergency.
    Allocate {
        #[clap(long, allow_negative_numbers = true)]
        lat: f64,
        #[clap(long, allow_negative_numbers = true)]
        lon: f64,
        #[clap(long, short = 's')]
        specialty: String,
    },
    /// List the nearest hospitals with an available bed.
    Search {
        #[clap(long, allow_negative_numbers = true)]
        lat: f64,
        #[clap(long, allow_negative_numbers = true)]
        lon: f64,
        #[clap(long, short = 's')]
        specialty: String,
        #[clap(long, short = 'l')]
        limit: Option<usize>,
        #[clap(long)]
        radius_km: Option<f64>,
    },
}
