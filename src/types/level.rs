use std::fmt;
use std::str::FromStr;

use anyhow::bail;

use crate::normalize::{COL_CODE, COL_DEPARTMENT, COL_DISTRICT, COL_PROVINCE};

/// Territorial aggregation level for zonal statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    District,   // Finest level, no dissolution
    Province,   // Districts merged by PROVINCIA_N
    Department, // Districts merged by DEPARTAMENTO
}

impl Level {
    pub fn to_str(&self) -> &'static str {
        match self {
            Level::District => "district",
            Level::Province => "province",
            Level::Department => "department",
        }
    }

    /// Canonical identity column carrying this level's display name,
    /// which is also the dissolve key above district level.
    pub fn name_column(&self) -> &'static str {
        match self {
            Level::District => COL_DISTRICT,
            Level::Province => COL_PROVINCE,
            Level::Department => COL_DEPARTMENT,
        }
    }

    /// Identity columns applicable to output tables at this level.
    pub fn identity_columns(&self) -> &'static [&'static str] {
        match self {
            Level::District => &[COL_DEPARTMENT, COL_PROVINCE, COL_DISTRICT, COL_CODE],
            Level::Province => &[COL_DEPARTMENT, COL_PROVINCE, COL_CODE],
            Level::Department => &[COL_DEPARTMENT, COL_CODE],
        }
    }
}

impl FromStr for Level {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "district" => Ok(Level::District),
            "province" => Ok(Level::Province),
            "department" => Ok(Level::Department),
            _ => bail!("level must be one of: district, province, department"),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}
