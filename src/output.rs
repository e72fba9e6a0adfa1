use crate::error::{DataError, Result};
use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| DataError::io(parent.display().to_string(), e))?;
    }
    Ok(())
}

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    ensure_parent(path)?;
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush().map_err(|e| DataError::io(path.display().to_string(), e))?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    ensure_parent(path)?;
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s).map_err(|e| DataError::io(path.display().to_string(), e))?;
    Ok(())
}

/// Render the first `max_rows` rows as a Markdown table.
pub fn table_preview<T>(rows: &[T], max_rows: usize) -> Option<String>
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return None;
    }
    Some(Table::new(slice).with(Style::markdown()).to_string())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    match table_preview(rows, max_rows) {
        Some(table_str) => println!("{}\n", table_str),
        None => println!("(no rows)\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::YearCount;

    #[test]
    fn csv_header_uses_serde_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/by_year.csv");
        let rows = vec![YearCount { year: "2000".into(), count: 15 }];
        write_csv(&path, &rows).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "year,count\n2000,15\n");
    }

    #[test]
    fn preview_truncates() {
        let rows: Vec<YearCount> = (0..5).map(|i| YearCount { year: format!("200{i}"), count: i }).collect();
        let table = table_preview(&rows, 2).unwrap();
        assert!(table.contains("| Year"));
        assert!(table.contains("2001"));
        assert!(!table.contains("2002"));
        assert!(table_preview::<YearCount>(&[], 2).is_none());
    }
}
