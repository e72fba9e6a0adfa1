//! Department → region reference data and the join with completed panels.
use crate::panel::CompletedPanel;
use geo::MultiPolygon;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// One department of the reference table, with its region and both outlines.
#[derive(Debug, Clone, PartialEq)]
pub struct DepartmentRegion {
    pub code_dep: String,
    pub nom_dep: String,
    pub code_reg: String,
    pub nom_reg: String,
    pub geometry_departement: Arc<MultiPolygon<f64>>,
    pub geometry_region: Arc<MultiPolygon<f64>>,
}

/// Reference table keyed by department code. Many departments share a region.
#[derive(Debug, Clone, Default)]
pub struct RegionDepartmentTable {
    by_code: HashMap<String, Arc<DepartmentRegion>>,
    order: Vec<String>,
}

impl RegionDepartmentTable {
    /// Build the table. A repeated `code_dep` keeps its first entry.
    pub fn new(entries: Vec<DepartmentRegion>) -> Self {
        let mut table = RegionDepartmentTable::default();
        let mut duplicates = 0usize;
        for entry in entries {
            if table.by_code.contains_key(&entry.code_dep) {
                duplicates += 1;
                continue;
            }
            table.order.push(entry.code_dep.clone());
            table.by_code.insert(entry.code_dep.clone(), Arc::new(entry));
        }
        if duplicates > 0 {
            warn!(duplicates, "reference table repeats department codes; first entries kept");
        }
        table
    }

    pub fn get(&self, code_dep: &str) -> Option<&Arc<DepartmentRegion>> {
        self.by_code.get(code_dep)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Entries in load order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<DepartmentRegion>> {
        self.order.iter().filter_map(|code| self.by_code.get(code))
    }
}

#[derive(Debug, Clone)]
pub struct MergedRow {
    pub year: String,
    pub dept: String,
    pub count: u64,
    /// `None` when the department code is missing from the reference table.
    pub reference: Option<Arc<DepartmentRegion>>,
}

#[derive(Debug, Clone)]
pub struct GeoMergedPanel {
    pub name: String,
    pub rows: Vec<MergedRow>,
    /// Rows whose department had no reference entry.
    pub unmatched: usize,
}

impl GeoMergedPanel {
    /// Births carried by rows without a reference entry.
    pub fn unmatched_births(&self) -> u64 {
        self.rows.iter().filter(|r| r.reference.is_none()).map(|r| r.count).sum()
    }
}

/// Left join of a completed panel with the reference table on department code.
pub fn merge_with_reference(panel: &CompletedPanel, reference: &RegionDepartmentTable) -> GeoMergedPanel {
    let mut unmatched = 0usize;
    let rows: Vec<MergedRow> = panel
        .rows
        .iter()
        .map(|row| {
            let reference = reference.get(&row.dept).cloned();
            if reference.is_none() {
                unmatched += 1;
            }
            MergedRow {
                year: row.year.clone(),
                dept: row.dept.clone(),
                count: row.count,
                reference,
            }
        })
        .collect();

    let merged = GeoMergedPanel { name: panel.name.clone(), rows, unmatched };
    if unmatched > 0 {
        warn!(
            name = %merged.name,
            unmatched,
            births = merged.unmatched_births(),
            "department codes missing from the reference table"
        );
    }
    merged
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::PanelRow;

    fn panel(rows: &[(&str, &str, u64)]) -> CompletedPanel {
        CompletedPanel {
            name: "ALICE".to_string(),
            rows: rows
                .iter()
                .map(|(y, d, c)| PanelRow { year: y.to_string(), dept: d.to_string(), count: *c })
                .collect(),
            merged_duplicates: 0,
            outside_grid: 0,
        }
    }

    #[test]
    fn left_join_keeps_every_row() {
        let reference = fixtures::reference();
        let merged = merge_with_reference(&panel(&[("2000", "75", 10), ("2000", "69", 5), ("2000", "13", 3)]), &reference);
        assert_eq!(merged.rows.len(), 3);
        assert_eq!(merged.unmatched, 1);
        assert_eq!(merged.unmatched_births(), 3);
        assert_eq!(merged.rows[0].reference.as_ref().unwrap().code_reg, "11");
        assert!(merged.rows[2].reference.is_none());
    }

    #[test]
    fn duplicate_codes_keep_first() {
        let mut entries: Vec<DepartmentRegion> = fixtures::reference().iter().map(|e| (**e).clone()).collect();
        let mut dup = entries[0].clone();
        dup.nom_dep = "Other".to_string();
        entries.push(dup);
        let table = RegionDepartmentTable::new(entries);
        assert_eq!(table.len(), 3);
        assert_eq!(table.get("75").unwrap().nom_dep, "Paris");
    }
}
