//! Birth statistics of French first names: cleaning, year × department panel
//! completion, aggregation, the join with region/department geometry, and SVG
//! rendering of series, rankings and choropleth maps.
pub mod aggregate;
pub mod boundary;
pub mod cache;
pub mod clean;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod geo_join;
pub mod loader;
pub mod map_config;
pub mod output;
pub mod panel;
pub mod render;
pub mod reports;
pub mod types;
pub mod util;

pub use error::{DataError, InvalidModeError};
