//! Raw INSEE export → clean flat table.
//!
//! The raw file is `;`-delimited with French column names. Cleaning renames
//! the columns, drops incomplete rows, single-letter names and the `XXXX`
//! year / `XX` department placeholders, then writes `name,sex,year,dept,count`.
use crate::error::{DataError, Result};
use crate::loader::open;
use crate::types::{BirthRecord, RawRow, Sex};
use crate::util::{char_len, non_empty, parse_u64_safe};
use csv::{ReaderBuilder, WriterBuilder};
use std::collections::BTreeSet;
use std::io::{Read, Write};
use std::path::Path;
use tracing::{info, warn};

pub const YEAR_SENTINEL: &str = "XXXX";
pub const DEPT_SENTINEL: &str = "XX";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub total_rows: usize,
    pub missing_values: usize,
    pub single_letter_rows: usize,
    pub single_letter_names: Vec<String>,
    pub sentinel_rows: usize,
    pub parse_errors: usize,
    pub written_rows: usize,
}

/// Clean `input` into `output`, creating the output directory if needed.
pub fn clean_and_process(input: &Path, output: &Path) -> Result<CleanReport> {
    info!("load input dataset {}", input.display());
    let rdr = ReaderBuilder::new().delimiter(b';').flexible(true).from_reader(open(input)?);

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| DataError::io(parent.display().to_string(), e))?;
    }
    let file = std::fs::File::create(output).map_err(|e| DataError::io(output.display().to_string(), e))?;
    let wtr = WriterBuilder::new().from_writer(file);

    let report = clean_rows(rdr, wtr)?;
    info!("export dataset {} ({} rows)", output.display(), report.written_rows);
    Ok(report)
}

pub fn clean_rows<R: Read, W: Write>(mut rdr: csv::Reader<R>, mut wtr: csv::Writer<W>) -> Result<CleanReport> {
    let mut report = CleanReport::default();
    let mut short_names: BTreeSet<String> = BTreeSet::new();

    for result in rdr.deserialize::<RawRow>() {
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(_) => {
                report.parse_errors += 1;
                continue;
            }
        };

        let (Some(name), Some(sex), Some(year), Some(dept), Some(count)) = (
            non_empty(row.name.as_deref()),
            non_empty(row.sex.as_deref()),
            non_empty(row.year.as_deref()),
            non_empty(row.dept.as_deref()),
            non_empty(row.count.as_deref()),
        ) else {
            report.missing_values += 1;
            continue;
        };

        if char_len(name) == 1 {
            report.single_letter_rows += 1;
            short_names.insert(name.to_string());
            continue;
        }

        if year == YEAR_SENTINEL || dept == DEPT_SENTINEL {
            report.sentinel_rows += 1;
            continue;
        }

        let (Some(sex), Some(count)) = (Sex::from_code(sex), parse_u64_safe(Some(count))) else {
            report.parse_errors += 1;
            continue;
        };

        wtr.serialize(BirthRecord {
            name: name.to_string(),
            sex,
            year: year.to_string(),
            dept: dept.to_string(),
            count,
        })?;
        report.written_rows += 1;
    }
    wtr.flush().map_err(|e| DataError::io("clean output", e))?;

    report.single_letter_names = short_names.into_iter().collect();
    info!("dropped {} rows with missing values", report.missing_values);
    info!(
        "dropped {} rows with single-letter names: {:?}",
        report.single_letter_rows, report.single_letter_names
    );
    info!("dropped {} rows with year {YEAR_SENTINEL} or department {DEPT_SENTINEL}", report.sentinel_rows);
    if report.parse_errors > 0 {
        warn!("{} rows could not be parsed", report.parse_errors);
    }
    Ok(report)
}
