#![doc = "Zonal minimum-temperature statistics public API"]
pub mod cli;
pub mod commands;
mod common;
mod dissolve;
mod join;
mod layer;
mod normalize;
mod rank;
mod raster;
mod types;
mod zonal;

#[doc(inline)]
pub use layer::BoundaryLayer;

#[doc(inline)]
pub use types::Level;

#[doc(inline)]
pub use normalize::{
    COL_CODE, COL_DEPARTMENT, COL_DISTRICT, COL_PROVINCE, FieldSynonyms, normalize_columns,
    normalize_columns_with, normalize_dataframe,
};

#[doc(inline)]
pub use dissolve::dissolve_level;

#[doc(inline)]
pub use raster::{GeoTransform, RasterBand};

#[doc(inline)]
pub use zonal::{
    STAT_COLUMNS, ZonalRecord, compute_zonal_stats, records_to_dataframe, zonal_stats_on_band,
};

#[doc(inline)]
pub use join::attach_identity;

#[doc(inline)]
pub use rank::{add_risk_score, filter_min_count};
