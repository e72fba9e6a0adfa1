//! Session state for exploring one dataset: loaded tables, the selected
//! name's derived frames and their memoization.
use crate::aggregate::{
    aggregate_by_sex, aggregate_by_year, filter_over_year, max_count, top_names,
    total_births_by_sex, years_available, AreaCount,
};
use crate::cache::LruCache;
use crate::config::Config;
use crate::error::{DataError, Result};
use crate::geo_join::{merge_with_reference, GeoMergedPanel, RegionDepartmentTable};
use crate::map_config::{GeoConfig, GeoMode};
use crate::panel::{filter_and_complete, filter_by_name, CompletedPanel, PanelDomain};
use crate::types::{BirthRecord, NameTotal, SexOccurrence, SexTotal, YearCount};
use once_cell::unsync::OnceCell;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

/// Everything derived from one name, before the geographic join.
#[derive(Debug)]
pub struct NameView {
    pub name: String,
    pub records: Vec<BirthRecord>,
    pub panel: CompletedPanel,
    pub by_sex: Vec<SexOccurrence>,
    pub by_year: Vec<YearCount>,
    pub years_available: Vec<String>,
}

impl NameView {
    pub fn occurrences(&self, sex: crate::types::Sex) -> usize {
        self.by_sex.iter().find(|s| s.sex == sex).map(|s| s.occ).unwrap_or(0)
    }
}

/// The name's panel joined to the reference table, aggregated per area.
#[derive(Debug)]
pub struct GeoView {
    pub merged: GeoMergedPanel,
    pub regions: Vec<AreaCount>,
    pub departments: Vec<AreaCount>,
}

impl GeoView {
    pub fn cells(&self, mode: GeoMode) -> &[AreaCount] {
        match mode {
            GeoMode::Region => &self.regions,
            GeoMode::Department => &self.departments,
        }
    }
}

/// Region and department cells of one year, with a color maximum shared by
/// both maps.
#[derive(Debug, Clone)]
pub struct MapYear {
    pub year: String,
    pub regions: Vec<AreaCount>,
    pub departments: Vec<AreaCount>,
    pub global_max: u64,
}

impl MapYear {
    pub fn cells(&self, mode: GeoMode) -> &[AreaCount] {
        match mode {
            GeoMode::Region => &self.regions,
            GeoMode::Department => &self.departments,
        }
    }
}

pub struct Dashboard {
    records: Vec<BirthRecord>,
    reference: RegionDepartmentTable,
    domain: PanelDomain,
    config: Config,
    names: Vec<String>,
    name_views: LruCache<String, Arc<NameView>>,
    geo_views: LruCache<String, Arc<GeoView>>,
    map_years: LruCache<(String, String), Arc<MapYear>>,
    top: OnceCell<Vec<NameTotal>>,
    by_sex: OnceCell<Vec<SexTotal>>,
}

impl Dashboard {
    pub fn new(records: Vec<BirthRecord>, reference: RegionDepartmentTable, domain: PanelDomain, config: Config) -> Self {
        let names: BTreeSet<&str> = records.iter().map(|r| r.name.as_str()).collect();
        let names: Vec<String> = names.into_iter().map(str::to_string).collect();
        let capacity = config.cache_capacity;
        Dashboard {
            records,
            reference,
            domain,
            config,
            names,
            name_views: LruCache::new(capacity),
            geo_views: LruCache::new(capacity),
            map_years: LruCache::new(capacity),
            top: OnceCell::new(),
            by_sex: OnceCell::new(),
        }
    }

    pub fn domain(&self) -> &PanelDomain {
        &self.domain
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Sorted distinct names.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.names.binary_search_by(|n| n.as_str().cmp(name)).is_ok()
    }

    /// The configured default name when present in the data, else the first name.
    pub fn default_name(&self) -> Option<&str> {
        if self.has_name(&self.config.default_name) {
            Some(self.config.default_name.as_str())
        } else {
            self.names.first().map(String::as_str)
        }
    }

    pub fn name_view(&mut self, name: &str) -> Result<Arc<NameView>> {
        if !self.has_name(name) {
            return Err(DataError::UnknownName(name.to_string()));
        }
        let view = self.name_views.get_or_insert_with(name.to_string(), || {
            debug!(name, "computing name view");
            let records = filter_by_name(&self.records, name);
            let panel = filter_and_complete(&self.records, name, &self.domain);
            Ok::<_, DataError>(Arc::new(NameView {
                name: name.to_string(),
                by_sex: aggregate_by_sex(&records),
                by_year: aggregate_by_year(&panel),
                years_available: years_available(&records),
                records,
                panel,
            }))
        })?;
        Ok(view.clone())
    }

    pub fn geo_view(&mut self, name: &str) -> Result<Arc<GeoView>> {
        if let Some(view) = self.geo_views.get(&name.to_string()) {
            return Ok(view.clone());
        }
        let name_view = self.name_view(name)?;
        debug!(name, "computing geo view");
        let merged = merge_with_reference(&name_view.panel, &self.reference);
        let view = Arc::new(GeoView {
            regions: GeoConfig::for_mode(GeoMode::Region).aggregate(&merged),
            departments: GeoConfig::for_mode(GeoMode::Department).aggregate(&merged),
            merged,
        });
        self.geo_views.insert(name.to_string(), view.clone());
        Ok(view)
    }

    /// Map cells of `year` for `name`. The year must be one where the name
    /// was given.
    pub fn map_year(&mut self, name: &str, year: &str) -> Result<Arc<MapYear>> {
        let key = (name.to_string(), year.to_string());
        if let Some(view) = self.map_years.get(&key) {
            return Ok(view.clone());
        }
        let name_view = self.name_view(name)?;
        if !name_view.years_available.iter().any(|y| y == year) {
            return Err(DataError::UnknownYear { name: name.to_string(), year: year.to_string() });
        }
        let geo_view = self.geo_view(name)?;
        let regions = filter_over_year(&geo_view.regions, year);
        let departments = filter_over_year(&geo_view.departments, year);
        let global_max = max_count(&regions).max(max_count(&departments));
        let view = Arc::new(MapYear { year: year.to_string(), regions, departments, global_max });
        self.map_years.insert(key, view.clone());
        Ok(view)
    }

    /// National top names, rare-names bucket excluded.
    pub fn top_names(&self) -> &[NameTotal] {
        self.top
            .get_or_init(|| top_names(&self.records, &self.config.rare_names_sentinel, self.config.top_n))
    }

    /// National births per sex.
    pub fn births_by_sex(&self) -> &[SexTotal] {
        self.by_sex.get_or_init(|| total_births_by_sex(&self.records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo_join::fixtures;
    use crate::types::Sex;

    fn rec(name: &str, sex: Sex, year: &str, dept: &str, count: u64) -> BirthRecord {
        BirthRecord {
            name: name.to_string(),
            sex,
            year: year.to_string(),
            dept: dept.to_string(),
            count,
        }
    }

    fn dashboard() -> Dashboard {
        let records = vec![
            rec("ALICE", Sex::Female, "2000", "75", 10),
            rec("ALICE", Sex::Female, "2000", "69", 5),
            rec("ALICE", Sex::Female, "2002", "01", 30),
            rec("CHANTAL", Sex::Female, "1960", "75", 100),
            rec("CHANTAL", Sex::Male, "1960", "75", 1),
            rec("_PRENOMS_RARES", Sex::Male, "2000", "75", 5000),
        ];
        let domain = PanelDomain::observed(&records);
        Dashboard::new(records, fixtures::reference(), domain, Config::default())
    }

    #[test]
    fn default_name_falls_back_to_first() {
        let d = dashboard();
        assert_eq!(d.default_name(), Some("CHANTAL"));
        let mut cfg = Config::default();
        cfg.default_name = "ZOE".into();
        let d = Dashboard::new(vec![rec("BOB", Sex::Male, "2000", "75", 1)], fixtures::reference(), PanelDomain::standard(), cfg);
        assert_eq!(d.default_name(), Some("BOB"));
    }

    #[test]
    fn name_view_is_memoized_and_complete() {
        let mut d = dashboard();
        let a = d.name_view("ALICE").unwrap();
        let b = d.name_view("ALICE").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.panel.rows.len(), d.domain().len());
        assert_eq!(a.panel.name, "ALICE");
        let direct = filter_and_complete(&d.records, "ALICE", d.domain());
        assert_eq!(a.panel.rows, direct.rows);
        assert_eq!(a.occurrences(Sex::Female), 3);
        assert_eq!(a.occurrences(Sex::Male), 0);
        assert_eq!(a.years_available, vec!["2000".to_string(), "2002".to_string()]);
        let year_2000 = a.by_year.iter().find(|y| y.year == "2000").unwrap();
        assert_eq!(year_2000.count, 15);
        let year_1960 = a.by_year.iter().find(|y| y.year == "1960").unwrap();
        assert_eq!(year_1960.count, 0);
    }

    #[test]
    fn unknown_name_is_rejected() {
        let mut d = dashboard();
        assert!(matches!(d.name_view("NOBODY"), Err(DataError::UnknownName(_))));
    }

    #[test]
    fn map_year_shares_color_max() {
        let mut d = dashboard();
        let map = d.map_year("ALICE", "2000").unwrap();
        assert!(map.regions.iter().all(|r| r.year == "2000"));
        // IDF region = 10, ARA region = 5; Paris department = 10
        assert_eq!(map.global_max, 10);
        let ara = map.cells(GeoMode::Region).iter().find(|r| r.code == "84").unwrap();
        assert_eq!(ara.count, 5);
        assert!(matches!(d.map_year("ALICE", "1960"), Err(DataError::UnknownYear { .. })));
    }

    #[test]
    fn national_statistics() {
        let d = dashboard();
        let top = d.top_names();
        assert_eq!(top[0].name, "CHANTAL");
        assert_eq!(top[0].count, 101);
        assert!(top.iter().all(|t| t.name != "_PRENOMS_RARES"));
        let by_sex = d.births_by_sex();
        assert_eq!(by_sex[0], SexTotal { sex: Sex::Male, count: 5001 });
    }
}
