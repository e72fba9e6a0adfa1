use crate::geo_join::{DepartmentRegion, GeoMergedPanel, MergedRow};
use crate::panel::{CompletedPanel, PanelRow};
use crate::types::{AreaRow, BirthRecord, NameTotal, Sex, SexOccurrence, SexTotal, YearCount};
use geo::MultiPolygon;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tracing::warn;

/// Births of one area (region or department) in one year, with its outline.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaCount {
    pub code: String,
    pub name: String,
    pub geometry: Arc<MultiPolygon<f64>>,
    pub year: String,
    pub count: u64,
}

impl AreaCount {
    pub fn to_row(&self) -> AreaRow {
        AreaRow {
            code: self.code.clone(),
            name: self.name.clone(),
            year: self.year.clone(),
            count: self.count,
        }
    }
}

/// Rows that carry a year, so one filter serves every frame.
pub trait YearKeyed {
    fn year(&self) -> &str;
}

macro_rules! impl_year_keyed {
    ($($t:ty),*) => {
        $(impl YearKeyed for $t {
            fn year(&self) -> &str { &self.year }
        })*
    };
}

impl_year_keyed!(BirthRecord, PanelRow, MergedRow, YearCount, AreaCount);

/// Rows of a single year.
pub fn filter_over_year<T: YearKeyed + Clone>(rows: &[T], year: &str) -> Vec<T> {
    rows.iter().filter(|r| r.year() == year).cloned().collect()
}

/// Number of records per sex. This counts rows, not births, and runs on the
/// name's records before panel completion (zero-filled rows have no sex).
pub fn aggregate_by_sex(records: &[BirthRecord]) -> Vec<SexOccurrence> {
    let mut map: BTreeMap<Sex, usize> = BTreeMap::new();
    for r in records {
        *map.entry(r.sex).or_default() += 1;
    }
    map.into_iter().map(|(sex, occ)| SexOccurrence { sex, occ }).collect()
}

/// Births per sex.
pub fn total_births_by_sex(records: &[BirthRecord]) -> Vec<SexTotal> {
    let mut map: BTreeMap<Sex, u64> = BTreeMap::new();
    for r in records {
        *map.entry(r.sex).or_default() += r.count;
    }
    map.into_iter().map(|(sex, count)| SexTotal { sex, count }).collect()
}

/// Births per year over a completed panel. Zero years stay in the output.
pub fn aggregate_by_year(panel: &CompletedPanel) -> Vec<YearCount> {
    let mut map: BTreeMap<&str, u64> = BTreeMap::new();
    for r in &panel.rows {
        *map.entry(r.year.as_str()).or_default() += r.count;
    }
    map.into_iter()
        .map(|(year, count)| YearCount { year: year.to_string(), count })
        .collect()
}

fn aggregate_areas<K, F>(merged: &GeoMergedPanel, what: &str, key: F) -> Vec<AreaCount>
where
    K: Ord,
    F: Fn(&MergedRow, &Arc<DepartmentRegion>) -> (K, AreaCount),
{
    let mut map: BTreeMap<K, AreaCount> = BTreeMap::new();
    let mut skipped = 0usize;
    for row in &merged.rows {
        let Some(reference) = row.reference.as_ref() else {
            skipped += 1;
            continue;
        };
        let (k, cell) = key(row, reference);
        map.entry(k)
            .and_modify(|acc| acc.count += row.count)
            .or_insert(cell);
    }
    if skipped > 0 {
        warn!(name = %merged.name, skipped, "{what} aggregation skipped rows without a reference entry");
    }
    map.into_values().collect()
}

/// Births per (region, year), ordered by region name, region code, year.
pub fn aggregate_over_regions(merged: &GeoMergedPanel) -> Vec<AreaCount> {
    aggregate_areas(merged, "region", |row, r| {
        (
            (r.nom_reg.clone(), r.code_reg.clone(), row.year.clone()),
            AreaCount {
                code: r.code_reg.clone(),
                name: r.nom_reg.clone(),
                geometry: r.geometry_region.clone(),
                year: row.year.clone(),
                count: row.count,
            },
        )
    })
}

/// Births per (department, year), ordered by department code, then year.
pub fn aggregate_over_departments(merged: &GeoMergedPanel) -> Vec<AreaCount> {
    aggregate_areas(merged, "department", |row, r| {
        (
            (row.dept.clone(), r.code_dep.clone(), r.nom_dep.clone(), row.year.clone()),
            AreaCount {
                code: r.code_dep.clone(),
                name: r.nom_dep.clone(),
                geometry: r.geometry_departement.clone(),
                year: row.year.clone(),
                count: row.count,
            },
        )
    })
}

/// The `n` most given names nationally, largest first. `sentinel` (the
/// rare-names bucket) is left out. Ties keep the order names first appear in.
pub fn top_names(records: &[BirthRecord], sentinel: &str, n: usize) -> Vec<NameTotal> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<NameTotal> = Vec::new();
    for r in records {
        if r.name == sentinel {
            continue;
        }
        match index.get(r.name.as_str()) {
            Some(&i) => totals[i].count += r.count,
            None => {
                index.insert(r.name.as_str(), totals.len());
                totals.push(NameTotal { name: r.name.clone(), count: r.count });
            }
        }
    }
    // stable: equal totals stay in first-seen order
    totals.sort_by(|a, b| b.count.cmp(&a.count));
    totals.truncate(n);
    totals
}

/// Sorted distinct years of a name's records.
pub fn years_available(records: &[BirthRecord]) -> Vec<String> {
    let years: BTreeSet<&str> = records.iter().map(|r| r.year.as_str()).collect();
    years.into_iter().map(str::to_string).collect()
}

/// Largest count in a set of map cells, 0 when empty.
pub fn max_count(cells: &[AreaCount]) -> u64 {
    cells.iter().map(|c| c.count).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo_join::{fixtures, merge_with_reference};
    use crate::panel::complete_year_dept_panel;

    fn rec(name: &str, sex: Sex, year: &str, dept: &str, count: u64) -> BirthRecord {
        BirthRecord {
            name: name.to_string(),
            sex,
            year: year.to_string(),
            dept: dept.to_string(),
            count,
        }
    }

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn sample() -> Vec<BirthRecord> {
        vec![
            rec("ALICE", Sex::Female, "2000", "75", 10),
            rec("ALICE", Sex::Female, "2000", "69", 5),
            rec("ALICE", Sex::Female, "2001", "01", 4),
            rec("ALICE", Sex::Male, "2001", "69", 1),
        ]
    }

    #[test]
    fn sex_counts_rows_of_filtered_records() {
        let records = vec![
            rec("ALICE", Sex::Female, "2000", "75", 10),
            rec("ALICE", Sex::Female, "2000", "69", 5),
        ];
        let occ = aggregate_by_sex(&records);
        assert_eq!(occ, vec![SexOccurrence { sex: Sex::Female, occ: 2 }]);
    }

    #[test]
    fn births_by_sex_sums_counts() {
        let totals = total_births_by_sex(&sample());
        assert_eq!(
            totals,
            vec![SexTotal { sex: Sex::Male, count: 1 }, SexTotal { sex: Sex::Female, count: 19 }]
        );
    }

    #[test]
    fn year_series_keeps_zero_years() {
        let records = sample();
        let panel = complete_year_dept_panel(&records, &strings(&["75", "69", "01"]), &strings(&["1999", "2000", "2001"]));
        let series = aggregate_by_year(&panel);
        assert_eq!(
            series,
            vec![
                YearCount { year: "1999".into(), count: 0 },
                YearCount { year: "2000".into(), count: 15 },
                YearCount { year: "2001".into(), count: 5 },
            ]
        );
    }

    #[test]
    fn regions_roll_up_departments() {
        let records = sample();
        let panel = complete_year_dept_panel(&records, &strings(&["75", "69", "01"]), &strings(&["2000", "2001"]));
        let merged = merge_with_reference(&panel, &fixtures::reference());
        let regions = aggregate_over_regions(&merged);
        let departments = aggregate_over_departments(&merged);
        let reference = fixtures::reference();

        assert_eq!(regions.len(), 4);
        assert_eq!(departments.len(), 6);
        for region in &regions {
            let from_departments: u64 = departments
                .iter()
                .filter(|d| d.year == region.year && reference.get(&d.code).unwrap().code_reg == region.code)
                .map(|d| d.count)
                .sum();
            assert_eq!(from_departments, region.count, "region {} year {}", region.code, region.year);
        }
        let ara_2001 = regions.iter().find(|r| r.code == "84" && r.year == "2001").unwrap();
        assert_eq!(ara_2001.count, 5);
        assert_eq!(ara_2001.name, "Auvergne-Rhône-Alpes");
    }

    #[test]
    fn unmatched_rows_are_left_out_of_map_aggregates() {
        let records = vec![rec("ALICE", Sex::Female, "2000", "13", 8), rec("ALICE", Sex::Female, "2000", "75", 2)];
        let panel = complete_year_dept_panel(&records, &strings(&["75", "13"]), &strings(&["2000"]));
        let merged = merge_with_reference(&panel, &fixtures::reference());
        assert_eq!(merged.unmatched, 1);
        let departments = aggregate_over_departments(&merged);
        assert_eq!(departments.len(), 1);
        assert_eq!(departments[0].count, 2);
    }

    #[test]
    fn top_names_excludes_rare_bucket_and_breaks_ties_by_first_seen() {
        let records = vec![
            rec("_PRENOMS_RARES", Sex::Male, "2000", "75", 1000),
            rec("BOB", Sex::Male, "2000", "75", 5),
            rec("ALICE", Sex::Female, "2000", "75", 7),
            rec("CLARA", Sex::Female, "2000", "75", 7),
            rec("BOB", Sex::Male, "2001", "75", 2),
            rec("DAVID", Sex::Male, "2000", "75", 1),
        ];
        let top = top_names(&records, "_PRENOMS_RARES", 3);
        let names: Vec<(&str, u64)> = top.iter().map(|t| (t.name.as_str(), t.count)).collect();
        assert_eq!(names, vec![("BOB", 7), ("ALICE", 7), ("CLARA", 7)]);
    }

    #[test]
    fn top_names_sorted_descending() {
        let records: Vec<BirthRecord> = (0..30)
            .map(|i| rec(&format!("N{i:02}"), Sex::Female, "2000", "75", i as u64))
            .collect();
        let top = top_names(&records, "_PRENOMS_RARES", 20);
        assert_eq!(top.len(), 20);
        assert_eq!(top[0].name, "N29");
        assert!(top.windows(2).all(|w| w[0].count > w[1].count));
    }

    #[test]
    fn year_filter_and_available_years() {
        let records = sample();
        assert_eq!(years_available(&records), strings(&["2000", "2001"]));
        assert_eq!(filter_over_year(&records, "2001").len(), 2);
        assert!(filter_over_year(&records, "1980").is_empty());
    }
}
