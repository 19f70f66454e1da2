use anyhow::Result;
use polars::frame::DataFrame;
use polars::prelude::{Column, DataType};

use crate::common::{column_as_text, first_n, last_n, normalize_name, zfill};
use crate::layer::BoundaryLayer;

pub const COL_DEPARTMENT: &str = "DEPARTAMENTO";
pub const COL_PROVINCE: &str = "PROVINCIA_N";
pub const COL_DISTRICT: &str = "DISTRITO_N";
pub const COL_CODE: &str = "UBIGEO";

/// Case-insensitive source-column synonyms for each canonical field, in
/// decreasing order of specificity. Defaults cover the schemas seen across
/// Peruvian boundary providers.
#[derive(Debug, Clone)]
pub struct FieldSynonyms {
    pub department: Vec<String>,
    pub province: Vec<String>,
    pub district: Vec<String>,
    pub code: Vec<String>,
    pub department_code: Vec<String>,
    pub province_code: Vec<String>,
    pub district_code: Vec<String>,
}

impl Default for FieldSynonyms {
    fn default() -> Self {
        fn list(items: &[&str]) -> Vec<String> {
            items.iter().map(|s| s.to_string()).collect()
        }
        Self {
            department: list(&["DEPARTAMEN", "DEPARTAMENTO", "NOMBDEP", "DPTO", "DEPA"]),
            province: list(&["PROVINCIA", "NOMBPROV", "PROV"]),
            district: list(&["DISTRITO", "NOMBDIST", "DIST"]),
            code: list(&["UBIGEO", "IDDIST", "UBI"]),
            department_code: list(&["IDDPTO"]),
            province_code: list(&["IDPROV"]),
            district_code: list(&["IDDIST"]),
        }
    }
}

/// Attach canonical identity columns (DEPARTAMENTO, PROVINCIA_N, DISTRITO_N,
/// UBIGEO) using the default synonym lists. Missing source columns become
/// all-null canonical columns, never an error.
pub fn normalize_columns(layer: &mut BoundaryLayer) -> Result<()> {
    normalize_columns_with(layer, &FieldSynonyms::default())
}

/// Same as [`normalize_columns`] with caller-provided synonym lists.
pub fn normalize_columns_with(layer: &mut BoundaryLayer, synonyms: &FieldSynonyms) -> Result<()> {
    normalize_dataframe(&mut layer.data, synonyms)
}

/// Attribute-table half of normalization, usable without geometries.
pub fn normalize_dataframe(df: &mut DataFrame, synonyms: &FieldSynonyms) -> Result<()> {
    // Resolve everything against the raw schema before inserting, so
    // canonical columns never shadow a source column mid-way.
    let department = name_series(df, &synonyms.department, COL_DEPARTMENT)?;
    let province = name_series(df, &synonyms.province, COL_PROVINCE)?;
    let district = name_series(df, &synonyms.district, COL_DISTRICT)?;
    let code = code_series(df, synonyms)?;

    df.with_column(department)?;
    df.with_column(province)?;
    df.with_column(district)?;
    df.with_column(code)?;
    Ok(())
}

/// First source column matching any synonym (case-insensitive), skipping the
/// geometry column so a stray "geometry" attribute never becomes identity.
fn find_column<'a>(df: &'a DataFrame, candidates: &[String]) -> Option<&'a str> {
    for candidate in candidates {
        for name in df.get_column_names() {
            if name.as_str() != "geometry" && name.as_str().eq_ignore_ascii_case(candidate) {
                return Some(name.as_str());
            }
        }
    }
    None
}

/// Canonical name column: matched source values uppercased and folded to
/// ASCII, or all-null when no synonym matches.
fn name_series(df: &DataFrame, candidates: &[String], out_name: &str) -> Result<Column> {
    match find_column(df, candidates) {
        Some(source) => {
            let values: Vec<Option<String>> = column_as_text(df.column(source)?)?
                .iter()
                .map(|v| v.as_deref().map(normalize_name))
                .collect();
            Ok(Column::new(out_name.into(), values))
        }
        None => Ok(Column::full_null(out_name.into(), df.height(), &DataType::String)),
    }
}

/// Canonical 6-digit geographic code. A direct code column wins (zero-padded
/// to 6, first 6 characters kept); otherwise the code is synthesized from the
/// three positional sub-codes; otherwise it is absent.
fn code_series(df: &DataFrame, synonyms: &FieldSynonyms) -> Result<Column> {
    if let Some(source) = find_column(df, &synonyms.code) {
        let values: Vec<Option<String>> = column_as_text(df.column(source)?)?
            .iter()
            .map(|v| v.as_deref().map(|s| first_n(&zfill(s, 6), 6)))
            .collect();
        return Ok(Column::new(COL_CODE.into(), values));
    }

    let (Some(dept), Some(prov), Some(dist)) = (
        find_column(df, &synonyms.department_code),
        find_column(df, &synonyms.province_code),
        find_column(df, &synonyms.district_code),
    ) else {
        return Ok(Column::full_null(COL_CODE.into(), df.height(), &DataType::String));
    };

    let dept = column_as_text(df.column(dept)?)?;
    let prov = column_as_text(df.column(prov)?)?;
    let dist = column_as_text(df.column(dist)?)?;

    let values: Vec<Option<String>> = dept
        .iter()
        .zip(&prov)
        .zip(&dist)
        .map(|((d, p), i)| match (d, p, i) {
            (Some(d), Some(p), Some(i)) => Some(format!(
                "{}{}{}",
                zfill(d, 2),
                last_n(&zfill(p, 4), 2),
                last_n(&zfill(i, 2), 2)
            )),
            _ => None,
        })
        .collect();
    Ok(Column::new(COL_CODE.into(), values))
}
