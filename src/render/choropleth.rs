use std::collections::HashMap;
use std::io::Write;

use anyhow::{anyhow, Result};
use geo::{BoundingRect, Coord, CoordsIter, LineString, MultiPolygon, Rect};

use super::color::{color_at, scale_color, NO_DATA};
use super::writer::{escape, SvgWriter};
use crate::aggregate::AreaCount;
use crate::boundary::BoundaryFeature;
use crate::map_config::GeoConfig;

const WIDTH: f64 = 700.0;
const MARGIN: f64 = 20.0;
const HEADER: f64 = 50.0;
const LEGEND: f64 = 60.0;

/// Projection function: lon/lat -> SVG coords (x,y)
type Projection = dyn Fn(&Coord<f64>) -> (f64, f64);

fn bounds(features: &[BoundaryFeature]) -> Option<Rect<f64>> {
    features
        .iter()
        .filter_map(|f| f.geometry.bounding_rect())
        .reduce(|a, b| {
            Rect::new(
                Coord { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
                Coord { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
            )
        })
}

/// Build a compact SVG path string for a MultiPolygon (exteriors + holes).
fn multipolygon_to_path(shape: &MultiPolygon<f64>, project: &Projection) -> String {
    let mut out = String::new();
    for polygon in &shape.0 {
        out.push_str(&ring_to_path(polygon.exterior(), project));
        for interior in polygon.interiors() {
            out.push_str(&ring_to_path(interior, project));
        }
    }
    out
}

fn ring_to_path(ring: &LineString<f64>, project: &Projection) -> String {
    let mut out = String::new();
    let mut coords = ring.coords_iter().map(|coord| project(&coord));
    if let Some((x, y)) = coords.next() {
        out.push_str(&format!(" M{x:.3},{y:.3}"));
        for (x, y) in coords {
            out.push_str(&format!(" L{x:.3},{y:.3}"));
        }
        out.push('Z');
    }
    out
}

/// Draw one year of a map. Each boundary feature is filled from the cell
/// sharing its code on a 0..=`color_max` scale; features without a cell are
/// grey. Passing the same `color_max` to sibling maps keeps them comparable.
pub(crate) fn write_choropleth<W: Write>(
    w: &mut SvgWriter<W>,
    cells: &[AreaCount],
    boundaries: &[BoundaryFeature],
    cfg: &GeoConfig,
    year: &str,
    color_max: u64,
) -> Result<()> {
    let bounds = bounds(boundaries).ok_or_else(|| anyhow!("[to_svg] No boundary geometry to draw."))?;

    let scale = (WIDTH - 2.0 * MARGIN) / bounds.width().max(f64::EPSILON);
    let map_height = bounds.height() * scale;
    let height = HEADER + map_height + LEGEND + 2.0 * MARGIN;

    // --- Map lon/lat -> SVG coords (preserve aspect, Y down) ---
    let project = move |coord: &Coord<f64>| -> (f64, f64) {
        let x = MARGIN + (coord.x - bounds.min().x) * scale;
        let y = HEADER + MARGIN + (bounds.max().y - coord.y) * scale;
        (x, y)
    };

    let by_code: HashMap<&str, &AreaCount> = cells
        .iter()
        .filter(|c| c.year == year)
        .map(|c| (c.code.as_str(), c))
        .collect();

    w.write_header(WIDTH, height)?;
    w.write_styles()?;
    w.write_title(WIDTH / 2.0, 32.0, &format!("Répartition par {} en {year}", cfg.label))?;

    for feature in boundaries {
        let (fill, tooltip) = match by_code.get(feature.code.as_str()) {
            Some(cell) => (scale_color(cell.count, color_max), format!("{} ({}): {}", cell.name, cell.code, cell.count)),
            None => (NO_DATA.to_string(), format!("{}: no data", feature.code)),
        };
        writeln!(
            w,
            r#"<path class="area" data-code="{}" d="{}" style="fill:{fill}"><title>{}</title></path>"#,
            escape(&feature.code),
            multipolygon_to_path(&feature.geometry, &project),
            escape(&tooltip)
        )?;
    }

    write_legend(w, HEADER + map_height + 2.0 * MARGIN, color_max)?;
    Ok(())
}

/// Horizontal gradient from 0 to `color_max`.
fn write_legend<W: Write>(w: &mut SvgWriter<W>, top: f64, color_max: u64) -> Result<()> {
    let left = MARGIN;
    let width = WIDTH / 2.0;
    writeln!(w, r#"<defs><linearGradient id="scale" x1="0" x2="1" y1="0" y2="0">"#)?;
    for stop in 0..=4 {
        let t = stop as f64 / 4.0;
        writeln!(w, r#"<stop offset="{:.0}%" stop-color="{}"/>"#, t * 100.0, color_at(t))?;
    }
    writeln!(w, "</linearGradient></defs>")?;
    writeln!(w, r#"<rect x="{left}" y="{top:.1}" width="{width}" height="12" fill="url(#scale)"/>"#)?;
    writeln!(w, r#"<text class="label" x="{left}" y="{:.1}">0</text>"#, top + 28.0)?;
    writeln!(w, r#"<text class="label" x="{:.1}" y="{:.1}" text-anchor="end">{color_max}</text>"#, left + width, top + 28.0)?;
    Ok(())
}
