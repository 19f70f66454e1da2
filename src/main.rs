use anyhow::Result;
use clap::Parser;

use tmin_zonal::cli::{Cli, Commands};
use tmin_zonal::commands::{inspect, stats};

fn main() -> Result<()> {
    let cli = Cli::parse();
    match &cli.command {
        Commands::Stats(args) => stats::run(&cli, args),
        Commands::Inspect(args) => inspect::run(&cli, args),
    }
}
