use std::{fs::File, io::{BufWriter, Write}, path::Path};

use anyhow::{Context, Result};

pub(crate) struct SvgWriter<W: Write> {
    writer: W,
}

/// Implement std::io::Write so `write!` / `writeln!` work.
impl<W: Write> Write for SvgWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> { self.writer.write(buf) }

    fn flush(&mut self) -> std::io::Result<()> { self.writer.flush() }

    fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()> { self.writer.write_all(buf) }
}

impl SvgWriter<BufWriter<File>> {
    /// Create a new SVG writer to a file path, creating parent directories.
    pub(crate) fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("[to_svg] Failed to create {}", parent.display()))?;
        }
        let file = File::create(path)
            .with_context(|| format!("[to_svg] Failed to create {}", path.display()))?;

        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> SvgWriter<W> {
    pub(crate) fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Write the XML declaration, the opening <svg> tag and a white background.
    pub(crate) fn write_header(&mut self, width: f64, height: f64) -> Result<()> {
        writeln!(self, r##"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"##)?;
        writeln!(self, r##"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"##)?;
        writeln!(self, r##"<rect width="100%" height="100%" fill="#ffffff"/>"##)?;
        Ok(())
    }

    /// Shared styles for charts and maps.
    pub(crate) fn write_styles(&mut self) -> Result<()> {
        writeln!(self, r##"<defs>
<style>
    text {{ font-family: sans-serif; fill: #111827; }}
    .title {{ font-size: 20px; font-weight: bold; }}
    .label {{ font-size: 12px; }}
    .axis {{ stroke: #374151; stroke-width: 1; }}
    .grid {{ stroke: #e5e7eb; stroke-width: 1; }}
    .line {{ fill: none; stroke: #1e90ff; stroke-width: 2; }}
    .dot {{ fill: #1e90ff; }}
    .bar {{ fill: #1e90ff; }}
    .area {{ stroke: #808080; stroke-width: 0.6; fill-opacity: 0.85; vector-effect: non-scaling-stroke; }}
</style>
</defs>"##)?;
        Ok(())
    }

    pub(crate) fn write_title(&mut self, x: f64, y: f64, title: &str) -> Result<()> {
        writeln!(self, r#"<text class="title" x="{x:.1}" y="{y:.1}" text-anchor="middle">{}</text>"#, escape(title))?;
        Ok(())
    }

    /// Write the closing </svg> tag and flush.
    pub(crate) fn finish(mut self) -> Result<W> {
        writeln!(self, "</svg>")?;
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Escape text content and attribute values.
pub(crate) fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
