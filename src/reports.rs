//! One report run for a selected name and year: CSV tables, SVG charts and
//! maps, and a JSON summary, all under the output directory.
use crate::aggregate::AreaCount;
use crate::boundary::{load_boundaries, BoundaryFeature};
use crate::config::Config;
use crate::dashboard::{Dashboard, GeoView, MapYear, NameView};
use crate::map_config::{GeoConfig, GeoMode};
use crate::output::{write_csv, write_json};
use crate::render::{render_bar_chart, render_choropleth, render_line_chart};
use crate::types::{AreaRow, Sex, SummaryStats};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Boundary outlines per map granularity.
#[derive(Debug, Default)]
pub struct Boundaries {
    by_mode: HashMap<GeoMode, Vec<BoundaryFeature>>,
}

impl Boundaries {
    /// Load both boundary files. A file that cannot be read is logged and left
    /// out; its map is then skipped.
    pub fn load(config: &Config) -> Boundaries {
        let mut by_mode = HashMap::new();
        for mode in GeoMode::ALL {
            let cfg = GeoConfig::for_mode(mode);
            let path = config.boundaries_path(mode);
            match load_boundaries(path, cfg.feature_id_key) {
                Ok(features) => {
                    by_mode.insert(mode, features);
                }
                Err(e) => warn!("no {mode} map: {e}"),
            }
        }
        Boundaries { by_mode }
    }

    pub fn from_features(by_mode: HashMap<GeoMode, Vec<BoundaryFeature>>) -> Boundaries {
        Boundaries { by_mode }
    }

    /// Features for `mode`, or `None` when none of them carries a shape.
    pub fn get(&self, mode: GeoMode) -> Option<&[BoundaryFeature]> {
        self.by_mode
            .get(&mode)
            .map(Vec::as_slice)
            .filter(|f| f.iter().any(|b| !b.geometry.0.is_empty()))
    }
}

#[derive(Debug, Default)]
pub struct GeneratedReports {
    pub tables: Vec<PathBuf>,
    pub charts: Vec<PathBuf>,
    pub maps: Vec<PathBuf>,
    pub summary: PathBuf,
}

pub fn area_rows(cells: &[AreaCount]) -> Vec<AreaRow> {
    cells.iter().map(AreaCount::to_row).collect()
}

pub fn build_summary(name: &NameView, geo: &GeoView, map: &MapYear) -> SummaryStats {
    let peak = name
        .by_year
        .iter()
        .filter(|y| y.count > 0)
        .fold(None, |best: Option<&crate::types::YearCount>, y| match best {
            Some(b) if b.count >= y.count => Some(b),
            _ => Some(y),
        });
    SummaryStats {
        name: name.name.clone(),
        year: map.year.clone(),
        total_births: name.panel.total(),
        boys_occurrences: name.occurrences(Sex::Male),
        girls_occurrences: name.occurrences(Sex::Female),
        peak_year: peak.map(|p| p.year.clone()),
        peak_births: peak.map(|p| p.count).unwrap_or(0),
        unmatched_departments: geo.merged.unmatched,
        records_outside_grid: name.panel.outside_grid,
        map_color_max: map.global_max,
        generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    }
}

/// Write every artifact for `name` in `year` under `out_dir`.
pub fn generate_reports(
    dashboard: &mut Dashboard,
    boundaries: &Boundaries,
    name: &str,
    year: &str,
    out_dir: &Path,
) -> Result<GeneratedReports> {
    let name_view = dashboard.name_view(name)?;
    let geo_view = dashboard.geo_view(name)?;
    let map = dashboard.map_year(name, year)?;
    let mut out = GeneratedReports::default();

    let by_year = out_dir.join("by_year.csv");
    write_csv(&by_year, &name_view.by_year).context("writing yearly series")?;
    out.tables.push(by_year);

    for mode in GeoMode::ALL {
        let path = out_dir.join(format!("{}s_{year}.csv", mode.as_str()));
        write_csv(&path, &area_rows(map.cells(mode)))
            .with_context(|| format!("writing {mode} table"))?;
        out.tables.push(path);
    }

    let top_path = out_dir.join("top_names.csv");
    write_csv(&top_path, dashboard.top_names()).context("writing top names")?;
    out.tables.push(top_path);

    out.charts.push(render_line_chart(&out_dir.join("evolution.svg"), &name_view.by_year, name)?);
    out.charts.push(render_bar_chart(&out_dir.join("top_names.svg"), dashboard.top_names())?);

    for mode in GeoMode::ALL {
        let Some(features) = boundaries.get(mode) else {
            warn!("skipping {mode} map: no boundary geometry loaded");
            continue;
        };
        let cfg = GeoConfig::for_mode(mode);
        let path = out_dir.join(format!("map_{}_{year}.svg", mode.as_str()));
        out.maps.push(render_choropleth(&path, map.cells(mode), features, &cfg, year, map.global_max)?);
    }

    let summary = build_summary(&name_view, &geo_view, &map);
    out.summary = out_dir.join("summary.json");
    write_json(&out.summary, &summary).context("writing summary")?;

    info!(
        name,
        year,
        tables = out.tables.len(),
        charts = out.charts.len(),
        maps = out.maps.len(),
        "reports written to {}",
        out_dir.display()
    );
    Ok(out)
}
