use anyhow::{Result, bail};
use geo::{LineString, MultiPolygon, Polygon};
use shapefile as shp;

/// Convert a shapefile Shape into a geo::MultiPolygon<f64>.
/// Null shapes become an empty MultiPolygon (zero covered cells downstream);
/// non-areal shapes are rejected.
pub(crate) fn shape_to_multipolygon(shape: shp::Shape) -> Result<MultiPolygon<f64>> {
    match shape {
        shp::Shape::NullShape => Ok(MultiPolygon(Vec::new())),
        shp::Shape::Polygon(p) => Ok(rings_to_multipolygon(ring_parts(p.rings(), |pt| (pt.x, pt.y)))),
        shp::Shape::PolygonM(p) => Ok(rings_to_multipolygon(ring_parts(p.rings(), |pt| (pt.x, pt.y)))),
        shp::Shape::PolygonZ(p) => Ok(rings_to_multipolygon(ring_parts(p.rings(), |pt| (pt.x, pt.y)))),
        other => bail!("unsupported geometry type in boundary layer: {}", other.shapetype()),
    }
}

/// Flatten rings into (coords, is_exterior) pairs, preserving shapefile order.
fn ring_parts<P>(
    rings: &[shp::PolygonRing<P>],
    xy: impl Fn(&P) -> (f64, f64),
) -> Vec<(Vec<(f64, f64)>, bool)> {
    rings
        .iter()
        .map(|ring| match ring {
            shp::PolygonRing::Outer(pts) => (pts.iter().map(&xy).collect(), true),
            shp::PolygonRing::Inner(pts) => (pts.iter().map(&xy).collect(), false),
        })
        .collect()
}

/// Group rings into polygons: each exterior claims the holes that follow it
/// (Shapefile stores rings in this order). Stray holes before any exterior
/// are dropped.
fn rings_to_multipolygon(rings: Vec<(Vec<(f64, f64)>, bool)>) -> MultiPolygon<f64> {
    let mut polys: Vec<Polygon<f64>> = Vec::new();
    let mut exterior: Option<LineString<f64>> = None;
    let mut holes: Vec<LineString<f64>> = Vec::new();

    for (coords, is_exterior) in rings {
        let ring = closed_ring(coords);
        if is_exterior {
            if let Some(ext) = exterior.take() {
                polys.push(Polygon::new(ext, std::mem::take(&mut holes)));
            }
            exterior = Some(ring);
        } else if exterior.is_some() {
            holes.push(ring);
        }
    }
    if let Some(ext) = exterior {
        polys.push(Polygon::new(ext, holes));
    }

    MultiPolygon(polys)
}

/// Ensure first and last coordinates coincide.
fn closed_ring(mut coords: Vec<(f64, f64)>) -> LineString<f64> {
    if let (Some(&first), Some(&last)) = (coords.first(), coords.last()) {
        if first != last {
            coords.push(first);
        }
    }
    LineString::from(coords)
}
