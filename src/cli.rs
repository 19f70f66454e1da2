use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint};
use std::path::PathBuf;

/// Zonal Tmin statistics CLI (argument schema only)
#[derive(Parser, Debug)]
#[command(name = "tmin-zonal", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute zonal statistics for a boundary layer against a Tmin raster
    Stats(StatsArgs),

    /// Print a boundary file's record count, geometry mix and attribute schema
    Inspect(InspectArgs),
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, ValueEnum)]
pub enum OutputFormat {
    Csv,
    Json,
}

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Input boundary shapefile (district level)
    #[arg(value_hint = ValueHint::FilePath)]
    pub boundaries: PathBuf,

    /// Input GeoTIFF raster of minimum temperatures
    #[arg(value_hint = ValueHint::FilePath)]
    pub raster: PathBuf,

    /// Territorial level: district, province, or department
    #[arg(short, long, default_value = "district")]
    pub level: String,

    /// 1-based raster band to read (bands are typically years)
    #[arg(short, long, default_value_t = 1)]
    pub band: usize,

    /// Threshold for the below-threshold metric (degC)
    #[arg(short, long)]
    pub threshold: Option<f64>,

    /// Drop units covered by fewer valid pixels than this
    #[arg(long, default_value_t = 10)]
    pub min_count: u32,

    /// Print the N coldest and warmest units by mean Tmin
    #[arg(long, default_value_t = 0)]
    pub top: usize,

    /// Output file (defaults to <raster-slug>_zonal_<level>.<ext>; "-" is rejected)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Output table format
    #[arg(long, value_enum, default_value = "csv")]
    pub format: OutputFormat,

    /// Overwrite if the file exists
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Input boundary shapefile
    #[arg(value_hint = ValueHint::FilePath)]
    pub boundaries: PathBuf,
}
