//! Year × department panel completion.
//!
//! A name's records only cover the (year, department) pairs where at least
//! one birth was registered. Maps and time series need the full grid, so the
//! panel is completed with zero counts.
use crate::types::BirthRecord;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, warn};

/// The 100 French department codes: 95 mainland (Corsica as a single `20`)
/// and the five overseas departments.
pub const ALL_DEPTS: &[&str] = &[
    "971", "972", "973", "974", "976", "77", "78", "91", "75", "93", "94", "92", "95", "36", "28",
    "37", "41", "18", "45", "39", "25", "90", "21", "70", "71", "89", "58", "76", "61", "50",
    "14", "27", "02", "80", "62", "60", "59", "68", "67", "57", "55", "54", "52", "51", "08",
    "10", "88", "44", "85", "49", "72", "53", "35", "29", "56", "22", "87", "16", "17", "24",
    "33", "79", "40", "64", "47", "19", "23", "86", "09", "82", "12", "11", "81", "30", "65",
    "31", "66", "32", "34", "48", "46", "15", "03", "07", "38", "26", "74", "42", "63", "69",
    "73", "43", "01", "84", "83", "06", "05", "04", "13", "20",
];

pub const FIRST_YEAR: u16 = 1900;
pub const LAST_YEAR: u16 = 2022;

/// Years and departments a panel is completed against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelDomain {
    pub years: Vec<String>,
    pub depts: Vec<String>,
}

impl PanelDomain {
    pub fn new(years: Vec<String>, depts: Vec<String>) -> Self {
        PanelDomain { years, depts }
    }

    /// Fixed grid: 1900..=2022 and [`ALL_DEPTS`].
    pub fn standard() -> Self {
        PanelDomain {
            years: (FIRST_YEAR..=LAST_YEAR).map(|y| y.to_string()).collect(),
            depts: ALL_DEPTS.iter().map(|d| d.to_string()).collect(),
        }
    }

    /// Grid derived from the data: distinct years and departments, each in
    /// plain string order.
    pub fn observed(records: &[BirthRecord]) -> Self {
        let years: BTreeSet<&str> = records.iter().map(|r| r.year.as_str()).collect();
        let depts: BTreeSet<&str> = records.iter().map(|r| r.dept.as_str()).collect();
        PanelDomain {
            years: years.into_iter().map(str::to_string).collect(),
            depts: depts.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.years.len() * self.depts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelRow {
    pub year: String,
    pub dept: String,
    pub count: u64,
}

/// A name's births over the full year × department grid, year-major.
#[derive(Debug, Clone)]
pub struct CompletedPanel {
    pub name: String,
    pub rows: Vec<PanelRow>,
    /// Records summed into a (year, dept) key that was already present.
    pub merged_duplicates: usize,
    /// Records whose year or department is not part of the grid.
    pub outside_grid: usize,
}

impl CompletedPanel {
    pub fn total(&self) -> u64 {
        self.rows.iter().map(|r| r.count).sum()
    }
}

/// Records of a single name.
pub fn filter_by_name(records: &[BirthRecord], name: &str) -> Vec<BirthRecord> {
    records.iter().filter(|r| r.name == name).cloned().collect()
}

/// Build one row per (year, dept) pair of `years × all_depts`, taking counts
/// from `records` and 0 where nothing was recorded.
///
/// `records` is expected to hold a single name. Records sharing a (year,
/// dept) key, which happens whenever a name is given to both sexes, are
/// summed first so that the grid never holds duplicate pairs. Repeated
/// entries in `years` or `all_depts` are ignored after their first position.
pub fn complete_year_dept_panel(
    records: &[BirthRecord],
    all_depts: &[String],
    years: &[String],
) -> CompletedPanel {
    let mut counts: HashMap<(&str, &str), u64> = HashMap::with_capacity(records.len());
    for r in records {
        *counts.entry((r.year.as_str(), r.dept.as_str())).or_insert(0) += r.count;
    }
    let merged_duplicates = records.len() - counts.len();

    let years = distinct(years);
    let depts = distinct(all_depts);
    let mut rows = Vec::with_capacity(years.len() * depts.len());
    let mut placed: HashSet<(&str, &str)> = HashSet::with_capacity(counts.len());
    for year in &years {
        for dept in &depts {
            let key = (year.as_str(), dept.as_str());
            let count = match counts.get(&key) {
                Some(c) => {
                    placed.insert(key);
                    *c
                }
                None => 0,
            };
            rows.push(PanelRow { year: year.to_string(), dept: dept.to_string(), count });
        }
    }
    let outside_grid = counts.keys().filter(|k| !placed.contains(*k)).count();

    let name = records.first().map(|r| r.name.clone()).unwrap_or_default();
    if merged_duplicates > 0 {
        debug!(name = %name, merged_duplicates, "summed records sharing a (year, dept) key");
    }
    if outside_grid > 0 {
        warn!(name = %name, outside_grid, "record keys fall outside the year × department grid");
    }

    CompletedPanel { name, rows, merged_duplicates, outside_grid }
}

/// First occurrence of each value, in input order.
fn distinct(values: &[String]) -> Vec<&String> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(values.len());
    values.iter().filter(|v| seen.insert(v.as_str())).collect()
}

/// Filter to one name, then complete its panel over `domain`.
pub fn filter_and_complete(records: &[BirthRecord], name: &str, domain: &PanelDomain) -> CompletedPanel {
    let filtered = filter_by_name(records, name);
    let mut panel = complete_year_dept_panel(&filtered, &domain.depts, &domain.years);
    panel.name = name.to_string();
    panel
}
