use anyhow::Result;
use polars::{frame::DataFrame, prelude::*};

/// Percentile ranks the way pandas computes them: ties get the average of
/// their 1-based ranks, the result is divided by the non-null count, and
/// null (or non-finite) inputs stay null.
fn pct_rank(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut order: Vec<usize> = (0..values.len())
        .filter(|&i| values[i].is_some_and(f64::is_finite))
        .collect();
    order.sort_by(|&a, &b| values[a].unwrap().total_cmp(&values[b].unwrap()));

    let n = order.len() as f64;
    let mut ranks = vec![None; values.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        let rank = (i + j + 2) as f64 / 2.0; // average of 1-based ranks i+1..=j+1
        for &row in &order[i..=j] {
            ranks[row] = Some(rank / n);
        }
        i = j + 1;
    }
    ranks
}

/// Attach the composite frost-risk score:
/// 0.6 · pct_rank(100 − percentile_10) + 0.4 · pct_rank(below_threshold_pct).
/// Rows missing either input get a null score.
pub fn add_risk_score(df: &mut DataFrame) -> Result<()> {
    let p10: Vec<Option<f64>> = df.column("percentile_10")?.f64()?.into_iter().collect();
    let below: Vec<Option<f64>> = df.column("below_threshold_pct")?.f64()?.into_iter().collect();

    let cold = pct_rank(&p10.iter().map(|v| v.map(|v| 100.0 - v)).collect::<Vec<_>>());
    let frequent = pct_rank(&below);

    let score: Vec<Option<f64>> = cold
        .iter()
        .zip(&frequent)
        .map(|(c, f)| match (c, f) {
            (Some(c), Some(f)) => Some(c * 0.6 + f * 0.4),
            _ => None,
        })
        .collect();
    df.with_column(Column::new("risk_score".into(), score))?;
    Ok(())
}

/// Drop rows covered by fewer valid pixels than `min_count`.
pub fn filter_min_count(df: &DataFrame, min_count: u32) -> Result<DataFrame> {
    let mask: BooleanChunked = df
        .column("count")?
        .u32()?
        .into_iter()
        .map(|v| Some(v.is_some_and(|c| c >= min_count)))
        .collect();
    Ok(df.filter(&mask)?)
}
