use std::collections::BTreeMap;

use anyhow::Result;
use shapefile::Shape;

use crate::cli::{Cli, InspectArgs};
use crate::common;

pub fn run(_cli: &Cli, args: &InspectArgs) -> Result<()> {
    let items = common::read_shapefile(&args.boundaries)?;
    println!("Number of records: {}", items.len());

    // Geometry-type breakdown
    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    for (shape, _) in &items {
        let kind = match shape {
            Shape::Point(_) | Shape::PointM(_) | Shape::PointZ(_) => "Point",
            Shape::Polygon(_) | Shape::PolygonM(_) | Shape::PolygonZ(_) => "Polygon",
            Shape::Polyline(_) | Shape::PolylineM(_) | Shape::PolylineZ(_) => "Polyline",
            _ => "Other",
        };
        *counts.entry(kind).or_default() += 1;
    }
    println!("Geometry mix:");
    for (kind, count) in counts {
        println!("  - {}: {}", kind, count);
    }

    if let Some((_, record)) = items.first() {
        println!("Attribute columns:");
        for (field, value) in record.clone() {
            println!("  - {} ({:?})", field, value);
        }
    }
    if let Some(epsg) = common::epsg_from_prj(&args.boundaries) {
        println!("CRS: EPSG:{}", epsg);
    }
    Ok(())
}
