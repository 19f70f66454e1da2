use std::path::Path;

use anyhow::{Context, Result, ensure};
use geo::MultiPolygon;
use polars::frame::DataFrame;
use polars::prelude::Column;
use shapefile::dbase::{FieldValue, Record};

use crate::common;

/// A flat administrative boundary layer: one attribute row per geometry.
#[derive(Debug, Clone)]
pub struct BoundaryLayer {
    /// Attribute table, positionally aligned with `geoms`.
    pub data: DataFrame,
    pub geoms: Vec<MultiPolygon<f64>>,
    /// EPSG code, if known. Geometries are assumed to share the raster's CRS.
    pub epsg: Option<u32>,
}

impl BoundaryLayer {
    /// Build a layer from parts; attribute rows and geometries must agree.
    pub fn from_parts(
        data: DataFrame,
        geoms: Vec<MultiPolygon<f64>>,
        epsg: Option<u32>,
    ) -> Result<Self> {
        ensure!(
            data.height() == geoms.len(),
            "attribute rows ({}) do not match geometries ({})",
            data.height(),
            geoms.len()
        );
        Ok(Self { data, geoms, epsg })
    }

    /// Loads layer geometries and attributes from a given .shp file path.
    pub fn from_shapefile(path: &Path) -> Result<Self> {
        let items = common::read_shapefile(path)?;
        let (shapes, records): (Vec<_>, Vec<_>) = items.into_iter().unzip();

        let geoms = shapes
            .into_iter()
            .map(common::shape_to_multipolygon)
            .collect::<Result<Vec<_>>>()
            .with_context(|| format!("Error converting shapes in {}", path.display()))?;

        let data = records_to_dataframe(&records)?;
        Self::from_parts(data, geoms, common::epsg_from_prj(path))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.geoms.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.geoms.is_empty()
    }
}

/// Column type chosen by inspecting every record's value for a field.
/// Source schemas vary by provider, so nothing is assumed up front.
enum FieldKind {
    Int,
    Float,
    Text,
}

/// Convert dBase records to a DataFrame, one typed column per field.
fn records_to_dataframe(records: &[Record]) -> Result<DataFrame> {
    let names: Vec<String> = match records.first() {
        Some(first) => first.clone().into_iter().map(|(name, _)| name).collect(),
        None => return Ok(DataFrame::empty()),
    };

    let mut columns = Vec::with_capacity(names.len());
    for name in &names {
        columns.push(match field_kind(records, name) {
            FieldKind::Int => Column::new(
                name.as_str().into(),
                records.iter().map(|r| field_as_i64(r.get(name))).collect::<Vec<_>>(),
            ),
            FieldKind::Float => Column::new(
                name.as_str().into(),
                records.iter().map(|r| field_as_f64(r.get(name))).collect::<Vec<_>>(),
            ),
            FieldKind::Text => Column::new(
                name.as_str().into(),
                records.iter().map(|r| field_as_text(r.get(name))).collect::<Vec<_>>(),
            ),
        });
    }
    Ok(DataFrame::new(columns)?)
}

fn field_kind(records: &[Record], name: &str) -> FieldKind {
    let mut all_integral = true;
    for record in records {
        match record.get(name) {
            None
            | Some(FieldValue::Numeric(None))
            | Some(FieldValue::Float(None))
            | Some(FieldValue::Integer(_)) => {}
            Some(FieldValue::Numeric(Some(v))) | Some(FieldValue::Double(v)) => {
                if v.fract() != 0.0 {
                    all_integral = false;
                }
            }
            Some(FieldValue::Float(Some(v))) => {
                if f64::from(*v).fract() != 0.0 {
                    all_integral = false;
                }
            }
            Some(_) => return FieldKind::Text,
        }
    }
    if all_integral { FieldKind::Int } else { FieldKind::Float }
}

fn field_as_i64(value: Option<&FieldValue>) -> Option<i64> {
    match value? {
        FieldValue::Numeric(v) => v.map(|n| n as i64),
        FieldValue::Float(v) => v.map(|n| n as i64),
        FieldValue::Integer(n) => Some(i64::from(*n)),
        FieldValue::Double(n) => Some(*n as i64),
        _ => None,
    }
}

fn field_as_f64(value: Option<&FieldValue>) -> Option<f64> {
    match value? {
        FieldValue::Numeric(v) => *v,
        FieldValue::Float(v) => v.map(f64::from),
        FieldValue::Integer(n) => Some(f64::from(*n)),
        FieldValue::Double(n) => Some(*n),
        _ => None,
    }
}

fn field_as_text(value: Option<&FieldValue>) -> Option<String> {
    match value? {
        FieldValue::Character(v) => v.as_ref().map(|s| s.trim().to_string()),
        FieldValue::Memo(s) => Some(s.clone()),
        FieldValue::Logical(v) => v.map(|b| b.to_string()),
        FieldValue::Date(v) => {
            v.as_ref().map(|d| format!("{:04}-{:02}-{:02}", d.year(), d.month(), d.day()))
        }
        FieldValue::Numeric(v) => v.map(|n| {
            if n.fract() == 0.0 { format!("{:.0}", n) } else { n.to_string() }
        }),
        FieldValue::Integer(n) => Some(n.to_string()),
        FieldValue::Double(n) => Some(n.to_string()),
        _ => None,
    }
}
