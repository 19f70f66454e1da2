/// GDAL-ordered affine georeferencing coefficients:
/// x = c0 + col·c1 + row·c2, y = c3 + col·c4 + row·c5,
/// with (col, row) measured from the top-left corner of the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    c: [f64; 6],
}

impl GeoTransform {
    pub fn new(coefficients: [f64; 6]) -> Self {
        Self { c: coefficients }
    }

    /// North-up transform with square pixels of size `pixel` and the grid
    /// origin (top-left corner) at (x0, y0).
    pub fn north_up(x0: f64, y0: f64, pixel: f64) -> Self {
        Self::new([x0, pixel, 0.0, y0, 0.0, -pixel])
    }

    #[inline]
    pub fn coefficients(&self) -> [f64; 6] {
        self.c
    }

    /// Map fractional (col, row) grid coordinates to world coordinates.
    #[inline]
    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.c[0] + col * self.c[1] + row * self.c[2],
            self.c[3] + col * self.c[4] + row * self.c[5],
        )
    }

    /// World coordinates of the center of cell (row, col).
    #[inline]
    pub fn cell_center(&self, row: usize, col: usize) -> (f64, f64) {
        self.apply(col as f64 + 0.5, row as f64 + 0.5)
    }

    /// Invert the affine; None when the pixel axes are degenerate.
    pub fn inverse(&self) -> Option<GeoTransform> {
        let det = self.c[1] * self.c[5] - self.c[2] * self.c[4];
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        Some(GeoTransform::new([
            (-self.c[0] * self.c[5] + self.c[2] * self.c[3]) / det,
            self.c[5] / det,
            -self.c[2] / det,
            (self.c[0] * self.c[4] - self.c[1] * self.c[3]) / det,
            -self.c[4] / det,
            self.c[1] / det,
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn north_up_round_trip() {
        let t = GeoTransform::north_up(-77.0, -9.0, 0.25);
        let inv = t.inverse().unwrap();
        let (x, y) = t.apply(3.0, 5.0);
        let (col, row) = inv.apply(x, y);
        assert!((col - 3.0).abs() < 1e-12);
        assert!((row - 5.0).abs() < 1e-12);
    }

    #[test]
    fn cell_center_is_half_a_pixel_in() {
        let t = GeoTransform::north_up(0.0, 6.0, 1.0);
        assert_eq!(t.cell_center(0, 0), (0.5, 5.5));
        assert_eq!(t.cell_center(5, 7), (7.5, 0.5));
    }

    #[test]
    fn degenerate_transform_has_no_inverse() {
        assert!(GeoTransform::new([0.0, 0.0, 0.0, 0.0, 0.0, 0.0]).inverse().is_none());
    }

    #[test]
    fn rotated_transform_round_trip() {
        let t = GeoTransform::new([10.0, 0.6, 0.2, 20.0, -0.1, -0.7]);
        let inv = t.inverse().unwrap();
        let (x, y) = t.apply(11.0, 4.0);
        let (col, row) = inv.apply(x, y);
        assert!((col - 11.0).abs() < 1e-9);
        assert!((row - 4.0).abs() < 1e-9);
    }
}
