//! SVG artifacts: births over time, top names, choropleth maps.
mod charts;
mod choropleth;
mod color;
mod writer;

pub use color::{scale_color, NO_DATA};

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::aggregate::AreaCount;
use crate::boundary::BoundaryFeature;
use crate::map_config::GeoConfig;
use crate::types::{NameTotal, YearCount};
use writer::SvgWriter;

/// Line chart of births per year for `name`.
pub fn render_line_chart(path: &Path, series: &[YearCount], name: &str) -> Result<PathBuf> {
    let mut w = SvgWriter::create(path)?;
    charts::write_line_chart(&mut w, series, name)?;
    w.finish()?;
    Ok(path.to_path_buf())
}

/// Bar chart of the most given names.
pub fn render_bar_chart(path: &Path, top: &[NameTotal]) -> Result<PathBuf> {
    let mut w = SvgWriter::create(path)?;
    let title = format!("Top {} des prénoms les plus donnés en France", top.len());
    charts::write_bar_chart(&mut w, top, &title)?;
    w.finish()?;
    Ok(path.to_path_buf())
}

/// Choropleth of `cells` for `year` over `boundaries`, colored on 0..=`color_max`.
pub fn render_choropleth(
    path: &Path,
    cells: &[AreaCount],
    boundaries: &[BoundaryFeature],
    cfg: &GeoConfig,
    year: &str,
    color_max: u64,
) -> Result<PathBuf> {
    let mut w = SvgWriter::create(path)?;
    choropleth::write_choropleth(&mut w, cells, boundaries, cfg, year, color_max)?;
    w.finish()?;
    Ok(path.to_path_buf())
}
