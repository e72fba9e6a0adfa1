use std::io::Write;

use anyhow::Result;

use super::writer::{escape, SvgWriter};
use crate::types::{NameTotal, YearCount};

const WIDTH: f64 = 1000.0;
const HEIGHT: f64 = 500.0;
const LEFT: f64 = 80.0;
const RIGHT: f64 = 30.0;
const TOP: f64 = 60.0;
const BOTTOM: f64 = 110.0;
const Y_TICKS: u64 = 5;

/// Round `max` up to a value that divides nicely into `Y_TICKS` steps.
fn nice_max(max: u64) -> u64 {
    if max == 0 {
        return Y_TICKS;
    }
    let raw = max.div_ceil(Y_TICKS);
    let magnitude = 10u64.pow(raw.ilog10());
    let step = [1, 2, 5, 10]
        .iter()
        .map(|m| m * magnitude)
        .find(|s| *s >= raw)
        .unwrap_or(10 * magnitude);
    step * Y_TICKS
}

fn plot_height() -> f64 {
    HEIGHT - TOP - BOTTOM
}

fn y_of(value: u64, y_max: u64) -> f64 {
    TOP + plot_height() * (1.0 - value as f64 / y_max as f64)
}

/// Axes, horizontal grid lines and y labels.
fn write_axes<W: Write>(w: &mut SvgWriter<W>, y_max: u64, y_label: &str, x_label: &str) -> Result<()> {
    let x_end = WIDTH - RIGHT;
    for i in 0..=Y_TICKS {
        let value = y_max / Y_TICKS * i;
        let y = y_of(value, y_max);
        writeln!(w, r#"<line class="grid" x1="{LEFT}" y1="{y:.1}" x2="{x_end}" y2="{y:.1}"/>"#)?;
        writeln!(
            w,
            r#"<text class="label" x="{:.1}" y="{:.1}" text-anchor="end">{value}</text>"#,
            LEFT - 8.0,
            y + 4.0
        )?;
    }
    let y_axis_bottom = TOP + plot_height();
    writeln!(w, r#"<line class="axis" x1="{LEFT}" y1="{TOP}" x2="{LEFT}" y2="{y_axis_bottom}"/>"#)?;
    writeln!(w, r#"<line class="axis" x1="{LEFT}" y1="{y_axis_bottom}" x2="{x_end}" y2="{y_axis_bottom}"/>"#)?;
    writeln!(
        w,
        r#"<text class="label" transform="translate(20,{:.1}) rotate(-90)" text-anchor="middle">{}</text>"#,
        TOP + plot_height() / 2.0,
        escape(y_label)
    )?;
    writeln!(
        w,
        r#"<text class="label" x="{:.1}" y="{:.1}" text-anchor="middle">{}</text>"#,
        LEFT + (x_end - LEFT) / 2.0,
        HEIGHT - 10.0,
        escape(x_label)
    )?;
    Ok(())
}

/// Rotated category label under the x axis.
fn write_x_label<W: Write>(w: &mut SvgWriter<W>, x: f64, text: &str) -> Result<()> {
    let y = TOP + plot_height() + 16.0;
    writeln!(
        w,
        r#"<text class="label" transform="translate({x:.1},{y:.1}) rotate(-45)" text-anchor="end">{}</text>"#,
        escape(text)
    )?;
    Ok(())
}

/// Births per year as a line with markers. Every other year is labelled.
pub(crate) fn write_line_chart<W: Write>(w: &mut SvgWriter<W>, series: &[YearCount], name: &str) -> Result<()> {
    w.write_header(WIDTH, HEIGHT)?;
    w.write_styles()?;
    w.write_title(WIDTH / 2.0, 32.0, &format!("Évolution du prénom {name}"))?;

    let y_max = nice_max(series.iter().map(|p| p.count).max().unwrap_or(0));
    write_axes(w, y_max, "Nombre de naissances", "Année")?;

    let step = if series.len() > 1 { (WIDTH - LEFT - RIGHT) / (series.len() - 1) as f64 } else { 0.0 };
    let x_of = |i: usize| LEFT + step * i as f64;

    let points: Vec<String> = series
        .iter()
        .enumerate()
        .map(|(i, p)| format!("{:.1},{:.1}", x_of(i), y_of(p.count, y_max)))
        .collect();
    writeln!(w, r#"<polyline class="line" points="{}"/>"#, points.join(" "))?;

    for (i, p) in series.iter().enumerate() {
        let (x, y) = (x_of(i), y_of(p.count, y_max));
        writeln!(w, r#"<circle class="dot" cx="{x:.1}" cy="{y:.1}" r="3"><title>{}: {}</title></circle>"#, p.year, p.count)?;
        if i % 2 == 0 {
            write_x_label(w, x, &p.year)?;
        }
    }
    Ok(())
}

/// Ranked bars, one per name, in input order.
pub(crate) fn write_bar_chart<W: Write>(w: &mut SvgWriter<W>, top: &[NameTotal], title: &str) -> Result<()> {
    w.write_header(WIDTH, HEIGHT)?;
    w.write_styles()?;
    w.write_title(WIDTH / 2.0, 32.0, title)?;

    let y_max = nice_max(top.iter().map(|t| t.count).max().unwrap_or(0));
    write_axes(w, y_max, "Nombre de naissances", "Prénom")?;

    let slot = (WIDTH - LEFT - RIGHT) / top.len().max(1) as f64;
    let bar_width = slot * 0.7;
    let base = TOP + plot_height();
    for (i, t) in top.iter().enumerate() {
        let x = LEFT + slot * i as f64 + (slot - bar_width) / 2.0;
        let y = y_of(t.count, y_max);
        writeln!(
            w,
            r#"<rect class="bar" x="{x:.1}" y="{y:.1}" width="{bar_width:.1}" height="{:.1}"><title>{}: {}</title></rect>"#,
            base - y,
            escape(&t.name),
            t.count
        )?;
        write_x_label(w, x + bar_width / 2.0, &t.name)?;
    }
    Ok(())
}
