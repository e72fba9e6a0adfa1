use crate::boundary::parse_geometry_str;
use crate::error::{DataError, Result};
use crate::geo_join::{DepartmentRegion, RegionDepartmentTable};
use crate::types::BirthRecord;
use csv::ReaderBuilder;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub parse_errors: usize,
}

/// Load the clean table (`name,sex,year,dept,count`). Rows that do not
/// deserialize are counted and skipped; an unreadable file is an error.
pub fn load_clean_records(path: &Path) -> Result<(Vec<BirthRecord>, LoadReport)> {
    let rdr = ReaderBuilder::new().flexible(true).from_reader(open(path)?);
    let (records, report) = read_clean_records(rdr)?;
    info!(
        "loaded {} of {} rows from {} ({} parse errors)",
        report.loaded_rows,
        report.total_rows,
        path.display(),
        report.parse_errors
    );
    Ok((records, report))
}

pub fn read_clean_records<R: std::io::Read>(mut rdr: csv::Reader<R>) -> Result<(Vec<BirthRecord>, LoadReport)> {
    let mut report = LoadReport::default();
    let mut records = Vec::new();
    for result in rdr.deserialize::<BirthRecord>() {
        report.total_rows += 1;
        match result {
            Ok(r) => records.push(r),
            Err(e) => {
                if report.parse_errors == 0 {
                    warn!("first unparseable row: {e}");
                }
                report.parse_errors += 1;
            }
        }
    }
    report.loaded_rows = records.len();
    Ok((records, report))
}

#[derive(Debug, Deserialize)]
struct ReferenceRow {
    code_dep: String,
    nom_dep: String,
    code_reg: String,
    nom_reg: String,
    geometry_departement: String,
    geometry_region: String,
}

/// Load the department → region reference table. Geometry cells hold GeoJSON
/// geometry objects; region outlines are shared between their departments.
pub fn load_reference(path: &Path) -> Result<RegionDepartmentTable> {
    let rdr = ReaderBuilder::new().from_reader(open(path)?);
    let table = read_reference(rdr)?;
    info!("loaded {} departments from {}", table.len(), path.display());
    Ok(table)
}

pub fn read_reference<R: std::io::Read>(mut rdr: csv::Reader<R>) -> Result<RegionDepartmentTable> {
    let mut regions: std::collections::HashMap<String, Arc<geo::MultiPolygon<f64>>> = Default::default();
    let mut entries = Vec::new();
    for result in rdr.deserialize::<ReferenceRow>() {
        let row = result?;
        let geometry_region = match regions.get(&row.code_reg) {
            Some(g) => g.clone(),
            None => {
                let g = Arc::new(parse_geometry_str(&row.geometry_region)?);
                regions.insert(row.code_reg.clone(), g.clone());
                g
            }
        };
        entries.push(DepartmentRegion {
            code_dep: row.code_dep.trim().to_string(),
            nom_dep: row.nom_dep.trim().to_string(),
            code_reg: row.code_reg.trim().to_string(),
            nom_reg: row.nom_reg.trim().to_string(),
            geometry_departement: Arc::new(parse_geometry_str(&row.geometry_departement)?),
            geometry_region,
        });
    }
    Ok(RegionDepartmentTable::new(entries))
}

pub(crate) fn open(path: &Path) -> Result<std::fs::File> {
    std::fs::File::open(path).map_err(|e| DataError::io(path.display().to_string(), e))
}
