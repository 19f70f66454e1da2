// End-to-end pipeline over a synthetic boundary layer and raster:
// normalize -> dissolve -> zonal aggregation -> identity join -> filter/rank.

use geo::{LineString, MultiPolygon, Polygon};
use ndarray::Array2;
use polars::{frame::DataFrame, prelude::*};

use tmin_zonal::{
    BoundaryLayer, GeoTransform, Level, RasterBand, add_risk_score, attach_identity,
    dissolve_level, filter_min_count, normalize_columns, records_to_dataframe,
    zonal_stats_on_band,
};

fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> MultiPolygon<f64> {
    Polygon::new(
        LineString::from(vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1), (x0, y0)]),
        vec![],
    )
    .into()
}

/// Three districts over a provider schema with accents and split codes.
fn raw_layer() -> BoundaryLayer {
    let data = DataFrame::new(vec![
        Column::new("DEPARTAMEN".into(), vec!["Lima", "Lima", "Cusco"]),
        Column::new("PROVINCIA".into(), vec!["Huaura", "Huaura", "Canchis"]),
        Column::new("DISTRITO".into(), vec!["Huacho", "Végueta", "Sicuani"]),
        Column::new("IDDPTO".into(), vec!["15", "15", "8"]),
        Column::new("IDPROV".into(), vec!["08", "08", "06"]),
        Column::new("IDDIST".into(), vec!["1", "5", "11"]),
    ])
    .unwrap();
    let geoms = vec![
        square(0.0, 4.0, 2.0, 6.0), // Huacho: cols 0..2, rows 0..2
        square(2.0, 4.0, 4.0, 6.0), // Vegueta: cols 2..4, rows 0..2
        square(2.0, 0.0, 5.0, 3.0), // Sicuani: cols 2..5, rows 3..6
    ];
    BoundaryLayer::from_parts(data, geoms, Some(4326)).unwrap()
}

/// 8 x 6 grid over x in [0, 8], y in [0, 6]; value = column index.
fn tmin_band() -> RasterBand {
    let data = Array2::from_shape_fn((6, 8), |(_, col)| col as f64);
    RasterBand::new(data, GeoTransform::north_up(0.0, 6.0, 1.0), Some(-1.0)).unwrap()
}

fn texts(df: &DataFrame, name: &str) -> Vec<Option<String>> {
    df.column(name)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect()
}

fn counts(df: &DataFrame) -> Vec<u32> {
    df.column("count").unwrap().u32().unwrap().into_no_null_iter().collect()
}

fn floats(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
    df.column(name).unwrap().f64().unwrap().into_iter().collect()
}

#[test]
fn district_pipeline_preserves_order_and_identity() {
    let mut layer = raw_layer();
    normalize_columns(&mut layer).unwrap();
    let layer = dissolve_level(&layer, Level::District).unwrap();

    let records = zonal_stats_on_band(&layer.geoms, &tmin_band(), Some(2.5));
    let stats = records_to_dataframe(&records).unwrap();
    let out = attach_identity(&layer, &stats, Level::District).unwrap();

    assert_eq!(out.height(), 3);
    assert_eq!(
        texts(&out, "DISTRITO_N"),
        vec![
            Some("HUACHO".into()),
            Some("VEGUETA".into()),
            Some("SICUANI".into())
        ]
    );
    assert_eq!(
        texts(&out, "UBIGEO"),
        vec![
            Some("150801".into()),
            Some("150805".into()),
            Some("080611".into())
        ]
    );
    assert_eq!(counts(&out), vec![4, 4, 9]);
    assert_eq!(
        floats(&out, "mean"),
        vec![Some(0.5), Some(2.5), Some(3.0)]
    );

    // below-threshold percentages at threshold 2.5
    let below = floats(&out, "below_threshold_pct");
    assert_eq!(below[0], Some(100.0));
    assert_eq!(below[1], Some(50.0));
    assert!((below[2].unwrap() - 100.0 / 3.0).abs() < 1e-9);
}

#[test]
fn province_pipeline_dissolves_and_narrows_identity() {
    let mut layer = raw_layer();
    normalize_columns(&mut layer).unwrap();
    let layer = dissolve_level(&layer, Level::Province).unwrap();
    assert_eq!(layer.len(), 2);

    let records = zonal_stats_on_band(&layer.geoms, &tmin_band(), None);
    let stats = records_to_dataframe(&records).unwrap();
    let out = attach_identity(&layer, &stats, Level::Province).unwrap();

    let names: Vec<&str> = out.get_column_names().iter().map(|s| s.as_str()).collect();
    assert_eq!(&names[..3], &["DEPARTAMENTO", "PROVINCIA_N", "UBIGEO"]);
    assert!(!names.contains(&"DISTRITO_N"));

    // ascending key order: CANCHIS before HUAURA
    assert_eq!(
        texts(&out, "PROVINCIA_N"),
        vec![Some("CANCHIS".into()), Some("HUAURA".into())]
    );
    // HUAURA is the union of the two adjacent district squares
    assert_eq!(counts(&out), vec![9, 8]);
    assert_eq!(floats(&out, "mean"), vec![Some(3.0), Some(1.5)]);
    // first-wins: the dissolved unit keeps its first district's code
    assert_eq!(
        texts(&out, "UBIGEO"),
        vec![Some("080611".into()), Some("150801".into())]
    );
}

#[test]
fn department_pipeline_keeps_department_and_code_only() {
    let mut layer = raw_layer();
    normalize_columns(&mut layer).unwrap();
    let layer = dissolve_level(&layer, Level::Department).unwrap();

    let records = zonal_stats_on_band(&layer.geoms, &tmin_band(), None);
    let stats = records_to_dataframe(&records).unwrap();
    let out = attach_identity(&layer, &stats, Level::Department).unwrap();

    let names: Vec<&str> = out.get_column_names().iter().map(|s| s.as_str()).collect();
    assert_eq!(&names[..2], &["DEPARTAMENTO", "UBIGEO"]);
    assert_eq!(
        texts(&out, "DEPARTAMENTO"),
        vec![Some("CUSCO".into()), Some("LIMA".into())]
    );
}

#[test]
fn filter_and_risk_score_compose_downstream() {
    let mut layer = raw_layer();
    normalize_columns(&mut layer).unwrap();
    let layer = dissolve_level(&layer, Level::District).unwrap();

    let records = zonal_stats_on_band(&layer.geoms, &tmin_band(), Some(2.5));
    let stats = records_to_dataframe(&records).unwrap();
    let mut out = attach_identity(&layer, &stats, Level::District).unwrap();

    out = filter_min_count(&out, 5).unwrap();
    assert_eq!(out.height(), 1);
    assert_eq!(texts(&out, "DISTRITO_N"), vec![Some("SICUANI".into())]);

    add_risk_score(&mut out).unwrap();
    assert!(floats(&out, "risk_score")[0].is_some());
}

#[test]
fn unknown_level_token_fails_before_any_computation() {
    let err = "region".parse::<Level>().unwrap_err();
    assert_eq!(
        err.to_string(),
        "level must be one of: district, province, department"
    );
}
