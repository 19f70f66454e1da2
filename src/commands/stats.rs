use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use polars::frame::DataFrame;
use polars::prelude::SortMultipleOptions;

use crate::cli::{Cli, OutputFormat, StatsArgs};
use crate::common;
use crate::dissolve::dissolve_level;
use crate::join::attach_identity;
use crate::layer::BoundaryLayer;
use crate::normalize::normalize_columns;
use crate::rank::{add_risk_score, filter_min_count};
use crate::types::Level;
use crate::zonal::{compute_zonal_stats, records_to_dataframe};

pub fn run(cli: &Cli, args: &StatsArgs) -> Result<()> {
    // Validate the level token before any heavy I/O.
    let level: Level = args.level.parse()?;

    let output = match &args.output {
        Some(path) => path.clone(),
        None => default_output(&args.raster, level, args.format),
    };
    if output == Path::new("-") {
        bail!("stdout is not supported.");
    }
    if output.exists() && !args.force {
        bail!("Output file already exists (use --force to overwrite): {}", output.display());
    }

    if cli.verbose > 0 {
        eprintln!("[stats] loading boundaries from {}", args.boundaries.display());
    }
    let mut layer = BoundaryLayer::from_shapefile(&args.boundaries)?;
    normalize_columns(&mut layer)?;

    if cli.verbose > 0 {
        eprintln!("[stats] dissolving {} features to {} level", layer.len(), level);
    }
    let layer = dissolve_level(&layer, level)?;

    if cli.verbose > 0 {
        eprintln!(
            "[stats] computing zonal statistics on band {} of {}",
            args.band,
            args.raster.display()
        );
    }
    let records = compute_zonal_stats(&layer.geoms, &args.raster, args.band, args.threshold)?;
    let stats = records_to_dataframe(&records)?;

    let mut out = attach_identity(&layer, &stats, level)?;
    out = filter_min_count(&out, args.min_count)?;
    add_risk_score(&mut out)?;

    if args.top > 0 {
        print_extremes(&out, level, args.top)?;
    }

    match args.format {
        OutputFormat::Csv => common::write_csv(&mut out, &output)?,
        OutputFormat::Json => common::write_json(&mut out, &output)?,
    }
    println!("Wrote {} {} rows -> {}", out.height(), level, output.display());

    Ok(())
}

fn default_output(raster: &Path, level: Level, format: OutputFormat) -> PathBuf {
    let stem = raster
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "raster".to_string());
    let ext = match format {
        OutputFormat::Csv => "csv",
        OutputFormat::Json => "json",
    };
    PathBuf::from(format!("{}_zonal_{}.{}", common::slugify(&stem), level, ext))
}

/// Print the coldest and warmest units by mean Tmin to stdout.
fn print_extremes(df: &DataFrame, level: Level, top: usize) -> Result<()> {
    let sorted = df.sort(["mean"], SortMultipleOptions::default())?;
    let label = level.name_column();
    let names = if common::has_column(&sorted, label) {
        common::text_column(&sorted, label)?
    } else {
        vec![None; sorted.height()]
    };
    let means: Vec<Option<f64>> = sorted.column("mean")?.f64()?.into_iter().collect();

    let n = top.min(sorted.height());
    println!("Coldest {n} by mean Tmin:");
    for i in 0..n {
        println!(
            "  {:>8.2}  {}",
            means[i].unwrap_or(f64::NAN),
            names[i].as_deref().unwrap_or("<unknown>")
        );
    }
    println!("Warmest {n} by mean Tmin:");
    for i in (sorted.height() - n..sorted.height()).rev() {
        println!(
            "  {:>8.2}  {}",
            means[i].unwrap_or(f64::NAN),
            names[i].as_deref().unwrap_or("<unknown>")
        );
    }
    Ok(())
}
