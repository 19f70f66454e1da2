use anyhow::{Result, ensure};
use polars::{frame::DataFrame, prelude::*};

use crate::common::has_column;
use crate::layer::BoundaryLayer;
use crate::types::Level;

/// Concatenate identity columns for `level` with the statistics table.
///
/// Alignment is positional by contract: row i of the layer describes the
/// polygon behind row i of `stats`, and rows are never matched by key. The
/// "idx" column produced by `records_to_dataframe` is validated here so an
/// upstream reorder or drop fails loudly instead of silently mispairing
/// rows. No filtering or sorting happens here; that is the caller's job.
pub fn attach_identity(layer: &BoundaryLayer, stats: &DataFrame, level: Level) -> Result<DataFrame> {
    ensure!(
        stats.height() == layer.len(),
        "statistics rows ({}) do not match layer features ({})",
        stats.height(),
        layer.len()
    );
    if has_column(stats, "idx") {
        for (expected, got) in stats.column("idx")?.u32()?.into_no_null_iter().enumerate() {
            ensure!(
                got as usize == expected,
                "statistics rows are out of positional order (found idx {got} at row {expected})"
            );
        }
    }

    let mut columns: Vec<Column> = Vec::new();
    for name in level.identity_columns() {
        if has_column(&layer.data, name) {
            columns.push(layer.data.column(name)?.clone());
        }
    }
    for column in stats.get_columns() {
        if column.name().as_str() != "idx" {
            columns.push(column.clone());
        }
    }
    Ok(DataFrame::new(columns)?)
}
