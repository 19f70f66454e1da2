use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use polars::{
    frame::DataFrame,
    io::SerWriter,
    prelude::{Column, CsvWriter, DataType, JsonFormat, JsonWriter},
};
use regex::Regex;
use shapefile::{Reader, Shape, dbase::Record};

/// Reads all shapes + attribute records from a given `.shp` file path.
pub(crate) fn read_shapefile(path: &Path) -> Result<Vec<(Shape, Record)>> {
    let mut reader = Reader::from_path(path)
        .with_context(|| format!("Failed to open shapefile: {}", path.display()))?;

    let mut items = Vec::with_capacity(reader.shape_count()?);
    for result in reader.iter_shapes_and_records() {
        let (shape, record) = result.context("Error reading shape+record")?;
        items.push((shape, record));
    }
    Ok(items)
}

/// Write a DataFrame to a CSV file.
pub(crate) fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
    CsvWriter::new(file)
        .finish(df)
        .with_context(|| format!("Failed to write CSV to {}", path.display()))
}

/// Write a DataFrame to a JSON file (array of row objects).
pub(crate) fn write_json(df: &mut DataFrame, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create JSON file: {}", path.display()))?;
    JsonWriter::new(file)
        .with_json_format(JsonFormat::Json)
        .finish(df)
        .with_context(|| format!("Failed to write JSON to {}", path.display()))
}

/// Best-effort EPSG detection from the `.prj` sidecar of a shapefile
/// (last AUTHORITY clause in the WKT wins).
pub(crate) fn epsg_from_prj(shp_path: &Path) -> Option<u32> {
    let wkt = std::fs::read_to_string(shp_path.with_extension("prj")).ok()?;
    let re = Regex::new(r#"AUTHORITY\["EPSG",\s*"?(\d+)"?\]"#).ok()?;
    re.captures_iter(&wkt).last()?.get(1)?.as_str().parse().ok()
}

/// True if the frame has a column named `name`.
pub(crate) fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}

/// Column values as trimmed text, by position.
pub(crate) fn text_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    column_as_text(df.column(name)?)
}

/// Render a column as code/name text. Integral floats lose the fraction so
/// numeric geographic codes come out the way they are written ("1234", not
/// "1234.0").
pub(crate) fn column_as_text(col: &Column) -> Result<Vec<Option<String>>> {
    let out: Vec<Option<String>> = match col.dtype() {
        DataType::String => col
            .str()?
            .into_iter()
            .map(|v| v.map(|s| s.trim().to_string()))
            .collect(),
        DataType::Int64 => col.i64()?.into_iter().map(|v| v.map(|n| n.to_string())).collect(),
        DataType::Float64 => col.f64()?.into_iter().map(|v| v.map(float_code_text)).collect(),
        _ => {
            let cast = col.cast(&DataType::String)?;
            cast.str()?
                .into_iter()
                .map(|v| v.map(|s| s.trim().to_string()))
                .collect()
        }
    };
    Ok(out)
}

fn float_code_text(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{:.0}", v)
    } else {
        v.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_floats_render_as_codes() {
        assert_eq!(float_code_text(1234.0), "1234");
        assert_eq!(float_code_text(-7.0), "-7");
        assert_eq!(float_code_text(12.5), "12.5");
    }

    #[test]
    fn text_column_handles_dtypes() {
        let df = DataFrame::new(vec![
            Column::new("s".into(), vec![Some(" LIMA "), None]),
            Column::new("i".into(), vec![Some(150101i64), None]),
            Column::new("f".into(), vec![Some(42.0f64), None]),
        ])
        .unwrap();
        assert_eq!(
            text_column(&df, "s").unwrap(),
            vec![Some("LIMA".to_string()), None]
        );
        assert_eq!(
            text_column(&df, "i").unwrap(),
            vec![Some("150101".to_string()), None]
        );
        assert_eq!(
            text_column(&df, "f").unwrap(),
            vec![Some("42".to_string()), None]
        );
    }
}
