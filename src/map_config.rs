//! Granularity-specific settings for choropleth maps.
use crate::aggregate::{aggregate_over_departments, aggregate_over_regions, AreaCount};
use crate::error::InvalidModeError;
use crate::geo_join::GeoMergedPanel;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeoMode {
    Region,
    Department,
}

impl GeoMode {
    pub const ALL: [GeoMode; 2] = [GeoMode::Region, GeoMode::Department];

    pub fn as_str(self) -> &'static str {
        match self {
            GeoMode::Region => "region",
            GeoMode::Department => "department",
        }
    }
}

impl fmt::Display for GeoMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GeoMode {
    type Err = InvalidModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "region" | "reg" => Ok(GeoMode::Region),
            "department" | "dep" => Ok(GeoMode::Department),
            other => Err(InvalidModeError(other.to_string())),
        }
    }
}

pub type Aggregator = fn(&GeoMergedPanel) -> Vec<AreaCount>;

/// Column names, boundary join key and aggregation for one map granularity.
#[derive(Debug, Clone, Copy)]
pub struct GeoConfig {
    pub mode: GeoMode,
    pub geometry_key: &'static str,
    pub code_column: &'static str,
    pub name_column: &'static str,
    /// Dotted path to the join code inside each boundary feature.
    pub feature_id_key: &'static str,
    pub label: &'static str,
    pub aggregator: Aggregator,
}

impl GeoConfig {
    pub fn for_mode(mode: GeoMode) -> GeoConfig {
        match mode {
            GeoMode::Region => GeoConfig {
                mode,
                geometry_key: "geometry_region",
                code_column: "code_reg",
                name_column: "nom_reg",
                feature_id_key: "properties.DREG_C_COD",
                label: "région",
                aggregator: aggregate_over_regions,
            },
            GeoMode::Department => GeoConfig {
                mode,
                geometry_key: "geometry_departement",
                code_column: "code_dep",
                name_column: "nom_dep",
                feature_id_key: "properties.DDEP_C_COD",
                label: "département",
                aggregator: aggregate_over_departments,
            },
        }
    }

    pub fn aggregate(&self, merged: &GeoMergedPanel) -> Vec<AreaCount> {
        (self.aggregator)(merged)
    }
}

/// Resolve a mode string. Anything but region/department is rejected.
pub fn resolve_geo_config(mode: &str) -> Result<GeoConfig, InvalidModeError> {
    mode.parse::<GeoMode>().map(GeoConfig::for_mode)
}
