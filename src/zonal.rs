use std::path::Path;

use anyhow::Result;
use geo::{BoundingRect, Contains, MultiPolygon, Point};
use polars::{frame::DataFrame, prelude::Column};
use rayon::prelude::*;

use crate::raster::RasterBand;

/// Statistic columns produced for every polygon, in output order.
pub const STAT_COLUMNS: [&str; 8] = [
    "count",
    "mean",
    "min",
    "max",
    "std",
    "percentile_10",
    "percentile_90",
    "below_threshold_pct",
];

/// Zonal statistics for one polygon. Statistics are absent (None) when the
/// polygon covers no valid cells, and the threshold metric additionally when
/// no threshold was requested. Absence is never encoded as a sentinel value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ZonalRecord {
    pub count: u32,
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub std: Option<f64>,
    pub percentile_10: Option<f64>,
    pub percentile_90: Option<f64>,
    pub below_threshold_pct: Option<f64>,
}

impl ZonalRecord {
    /// Aggregate a set of valid cell values. Empty input produces the
    /// count = 0 record with every statistic absent.
    pub fn from_values(values: &[f64], threshold: Option<f64>) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        // population variance (divide by n), pinned by tests
        let variance = values
            .iter()
            .map(|v| {
                let d = v - mean;
                d * d
            })
            .sum::<f64>()
            / n;

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let below_threshold_pct = threshold
            .map(|t| 100.0 * values.iter().filter(|&&v| v < t).count() as f64 / n);

        Self {
            count: values.len() as u32,
            mean: Some(mean),
            min: Some(min),
            max: Some(max),
            std: Some(variance.sqrt()),
            percentile_10: Some(percentile(&sorted, 10.0)),
            percentile_90: Some(percentile(&sorted, 90.0)),
            below_threshold_pct,
        }
    }
}

/// Linear-interpolation percentile over ascending `sorted`: the value at
/// fractional rank (n − 1)·p/100.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let rank = (sorted.len() - 1) as f64 * p / 100.0;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
}

/// Values of the cells covered by `polygon`, excluding no-data.
///
/// Rasterization rule: a cell is covered iff its center point lies inside
/// the polygon (strict pixel-center rule, never "any touch"). The rule is
/// fixed: changing it would silently change every statistic.
pub(crate) fn covered_values(polygon: &MultiPolygon<f64>, band: &RasterBand) -> Vec<f64> {
    let Some(rect) = polygon.bounding_rect() else {
        return Vec::new();
    };
    let Some((rows, cols)) = band.window(&rect) else {
        return Vec::new();
    };

    let mut values = Vec::new();
    for row in rows {
        for col in cols.clone() {
            let (x, y) = band.transform().cell_center(row, col);
            if !polygon.contains(&Point::new(x, y)) {
                continue;
            }
            let value = band.value(row, col);
            if band.is_valid(value) {
                values.push(value);
            }
        }
    }
    values
}

/// Compute one record per polygon against an already-loaded band.
///
/// Polygons are independent, so the work fans out across threads; the
/// collected output has the same length and order as `polygons`, and every
/// polygon yields a record (empty intersections become count = 0).
pub fn zonal_stats_on_band(
    polygons: &[MultiPolygon<f64>],
    band: &RasterBand,
    threshold: Option<f64>,
) -> Vec<ZonalRecord> {
    polygons
        .par_iter()
        .map(|polygon| ZonalRecord::from_values(&covered_values(polygon, band), threshold))
        .collect()
}

/// Open `raster` and compute zonal statistics for every polygon on the
/// 1-based `band`. Opening failures are fatal; data-quality gaps are not.
pub fn compute_zonal_stats(
    polygons: &[MultiPolygon<f64>],
    raster: &Path,
    band: usize,
    threshold: Option<f64>,
) -> Result<Vec<ZonalRecord>> {
    let band = RasterBand::open(raster, band)?;
    Ok(zonal_stats_on_band(polygons, &band, threshold))
}

/// Assemble records into a DataFrame tagged with a positional "idx" column,
/// so downstream joins can verify alignment instead of trusting it.
pub fn records_to_dataframe(records: &[ZonalRecord]) -> Result<DataFrame> {
    let df = DataFrame::new(vec![
        Column::new("count".into(), records.iter().map(|r| r.count).collect::<Vec<u32>>()),
        Column::new("mean".into(), records.iter().map(|r| r.mean).collect::<Vec<_>>()),
        Column::new("min".into(), records.iter().map(|r| r.min).collect::<Vec<_>>()),
        Column::new("max".into(), records.iter().map(|r| r.max).collect::<Vec<_>>()),
        Column::new("std".into(), records.iter().map(|r| r.std).collect::<Vec<_>>()),
        Column::new(
            "percentile_10".into(),
            records.iter().map(|r| r.percentile_10).collect::<Vec<_>>(),
        ),
        Column::new(
            "percentile_90".into(),
            records.iter().map(|r| r.percentile_90).collect::<Vec<_>>(),
        ),
        Column::new(
            "below_threshold_pct".into(),
            records.iter().map(|r| r.below_threshold_pct).collect::<Vec<_>>(),
        ),
    ])?;
    Ok(df.with_row_index("idx".into(), None)?)
}
