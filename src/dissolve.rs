use ahash::AHashMap;
use anyhow::Result;
use geo::{BooleanOps, MultiPolygon};
use polars::frame::DataFrame;
use polars::prelude::Column;

use crate::common::{has_column, text_column};
use crate::layer::BoundaryLayer;
use crate::normalize::{COL_CODE, COL_DEPARTMENT, COL_DISTRICT, COL_PROVINCE};
use crate::types::Level;

/// Merge district features into `level` units by geometric union.
///
/// District level is the identity transform. Above it, features are grouped
/// by the level's canonical key and unioned; every other retained identity
/// column takes the first member's value (explicit "first" policy), while the
/// key column is exact. Features with an absent key are dropped with a
/// warning, and output rows are ordered by ascending key.
pub fn dissolve_level(layer: &BoundaryLayer, level: Level) -> Result<BoundaryLayer> {
    if level == Level::District {
        return Ok(layer.clone());
    }
    let key_col = level.name_column();
    let keys = text_column(&layer.data, key_col)?;

    // Group rows by key in first-encounter order.
    let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
    let mut index: AHashMap<String, usize> = AHashMap::new();
    let mut dropped = 0usize;
    for (row, key) in keys.iter().enumerate() {
        match key {
            Some(key) => {
                let slot = *index.entry(key.clone()).or_insert_with(|| {
                    groups.push((key.clone(), Vec::new()));
                    groups.len() - 1
                });
                groups[slot].1.push(row);
            }
            None => dropped += 1,
        }
    }
    if dropped > 0 {
        eprintln!("[dissolve] warning: dropped {dropped} feature(s) with no {key_col} key");
    }

    groups.sort_by(|a, b| a.0.cmp(&b.0));

    // Data-quality check: sibling districts must agree on parent-level keys.
    if level == Level::Province && has_column(&layer.data, COL_DEPARTMENT) {
        let parents = text_column(&layer.data, COL_DEPARTMENT)?;
        for (key, members) in &groups {
            let first = members.first().and_then(|&i| parents[i].as_deref());
            if members.iter().any(|&i| parents[i].as_deref() != first) {
                eprintln!(
                    "[dissolve] warning: members of province {key:?} disagree on {COL_DEPARTMENT}; keeping the first value"
                );
            }
        }
    }

    let geoms: Vec<MultiPolygon<f64>> = groups
        .iter()
        .map(|(_, members)| {
            members
                .iter()
                .map(|&i| layer.geoms[i].clone())
                .reduce(|a, b| a.union(&b))
                .unwrap_or_else(|| MultiPolygon(Vec::new()))
        })
        .collect();

    let retained: Vec<&str> = [COL_DEPARTMENT, COL_PROVINCE, COL_DISTRICT, COL_CODE]
        .into_iter()
        .filter(|name| has_column(&layer.data, name))
        .collect();

    let mut columns = Vec::with_capacity(retained.len());
    for name in &retained {
        let source = text_column(&layer.data, name)?;
        let values: Vec<Option<String>> = groups
            .iter()
            .map(|(key, members)| {
                if *name == key_col {
                    Some(key.clone())
                } else {
                    members.first().and_then(|&i| source[i].clone())
                }
            })
            .collect();
        columns.push(Column::new((*name).into(), values));
    }

    BoundaryLayer::from_parts(DataFrame::new(columns)?, geoms, layer.epsg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Area, LineString, Polygon};

    fn square(x0: f64, y0: f64, size: f64) -> MultiPolygon<f64> {
        Polygon::new(
            LineString::from(vec![
                (x0, y0),
                (x0 + size, y0),
                (x0 + size, y0 + size),
                (x0, y0 + size),
                (x0, y0),
            ]),
            vec![],
        )
        .into()
    }

    fn district_layer() -> BoundaryLayer {
        let data = DataFrame::new(vec![
            Column::new(COL_DEPARTMENT.into(), vec!["LIMA", "LIMA", "AREQUIPA"]),
            Column::new(COL_PROVINCE.into(), vec!["HUAURA", "HUAURA", "CAMANA"]),
            Column::new(COL_DISTRICT.into(), vec!["HUACHO", "HUALMAY", "QUILCA"]),
            Column::new(COL_CODE.into(), vec!["150801", "150803", "040506"]),
        ])
        .unwrap();
        let geoms = vec![square(0.0, 0.0, 1.0), square(1.0, 0.0, 1.0), square(5.0, 5.0, 1.0)];
        BoundaryLayer::from_parts(data, geoms, Some(4326)).unwrap()
    }

    #[test]
    fn district_level_is_identity() {
        let layer = district_layer();
        let out = dissolve_level(&layer, Level::District).unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(out.data.get_column_names(), layer.data.get_column_names());
    }

    #[test]
    fn province_dissolve_unions_members() {
        let out = dissolve_level(&district_layer(), Level::Province).unwrap();
        assert_eq!(out.len(), 2);

        // ordered by ascending key
        assert_eq!(
            text_column(&out.data, COL_PROVINCE).unwrap(),
            vec![Some("CAMANA".into()), Some("HUAURA".into())]
        );
        // union of the two adjacent unit squares
        assert!((out.geoms[1].unsigned_area() - 2.0).abs() < 1e-9);
        // first-wins for non-key identity columns
        assert_eq!(
            text_column(&out.data, COL_DISTRICT).unwrap(),
            vec![Some("QUILCA".into()), Some("HUACHO".into())]
        );
        assert_eq!(
            text_column(&out.data, COL_CODE).unwrap(),
            vec![Some("040506".into()), Some("150801".into())]
        );
    }

    #[test]
    fn department_dissolve_groups_by_department() {
        let out = dissolve_level(&district_layer(), Level::Department).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(
            text_column(&out.data, COL_DEPARTMENT).unwrap(),
            vec![Some("AREQUIPA".into()), Some("LIMA".into())]
        );
    }

    #[test]
    fn null_keys_are_dropped() {
        let data = DataFrame::new(vec![
            Column::new(COL_DEPARTMENT.into(), vec![Some("LIMA"), None]),
            Column::new(COL_PROVINCE.into(), vec![Some("HUAURA"), None]),
            Column::new(COL_DISTRICT.into(), vec![Some("HUACHO"), Some("SIN NOMBRE")]),
            Column::new(COL_CODE.into(), vec![Some("150801"), None]),
        ])
        .unwrap();
        let layer =
            BoundaryLayer::from_parts(data, vec![square(0.0, 0.0, 1.0), square(2.0, 0.0, 1.0)], None)
                .unwrap();
        let out = dissolve_level(&layer, Level::Province).unwrap();
        assert_eq!(out.len(), 1);
    }
}
