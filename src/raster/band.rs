use std::ops::Range;

use anyhow::{Result, anyhow};
use geo::Rect;
use ndarray::Array2;

use super::GeoTransform;

/// One raster band held in memory: cell values in row-major (row, col) order,
/// georeferencing, and the source's no-data sentinel.
#[derive(Debug, Clone)]
pub struct RasterBand {
    data: Array2<f64>,
    transform: GeoTransform,
    inverse: GeoTransform,
    nodata: Option<f64>,
}

impl RasterBand {
    /// Wrap an in-memory grid. The transform must be invertible so that
    /// geographic masking never needs a fallible inverse later.
    pub fn new(data: Array2<f64>, transform: GeoTransform, nodata: Option<f64>) -> Result<Self> {
        let inverse = transform
            .inverse()
            .ok_or_else(|| anyhow!("degenerate geotransform: {:?}", transform.coefficients()))?;
        Ok(Self { data, transform, inverse, nodata })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    #[inline]
    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    #[inline]
    pub fn nodata(&self) -> Option<f64> {
        self.nodata
    }

    /// Cell value at (row, col).
    #[inline]
    pub fn value(&self, row: usize, col: usize) -> f64 {
        self.data[[row, col]]
    }

    /// A cell participates in statistics unless it holds the no-data
    /// sentinel or a non-finite value.
    #[inline]
    pub fn is_valid(&self, value: f64) -> bool {
        value.is_finite() && self.nodata.is_none_or(|nd| value != nd)
    }

    /// Fractional grid coordinates (col, row) of a world point.
    #[inline]
    pub fn world_to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        self.inverse.apply(x, y)
    }

    /// Grid window (rows, cols) covering `rect`, clipped to the raster
    /// extent. None when the rectangle misses the raster entirely.
    pub fn window(&self, rect: &Rect<f64>) -> Option<(Range<usize>, Range<usize>)> {
        let (min, max) = (rect.min(), rect.max());
        let corners = [
            self.world_to_pixel(min.x, min.y),
            self.world_to_pixel(min.x, max.y),
            self.world_to_pixel(max.x, min.y),
            self.world_to_pixel(max.x, max.y),
        ];
        let col_lo = corners.iter().map(|c| c.0).fold(f64::INFINITY, f64::min).floor();
        let col_hi = corners.iter().map(|c| c.0).fold(f64::NEG_INFINITY, f64::max).ceil();
        let row_lo = corners.iter().map(|c| c.1).fold(f64::INFINITY, f64::min).floor();
        let row_hi = corners.iter().map(|c| c.1).fold(f64::NEG_INFINITY, f64::max).ceil();

        if !(col_lo.is_finite() && col_hi.is_finite() && row_lo.is_finite() && row_hi.is_finite()) {
            return None;
        }
        if col_hi < 0.0
            || row_hi < 0.0
            || col_lo >= self.width() as f64
            || row_lo >= self.height() as f64
        {
            return None;
        }

        let cols = col_lo.max(0.0) as usize..(col_hi + 1.0).min(self.width() as f64) as usize;
        let rows = row_lo.max(0.0) as usize..(row_hi + 1.0).min(self.height() as f64) as usize;
        (!cols.is_empty() && !rows.is_empty()).then_some((rows, cols))
    }
}
