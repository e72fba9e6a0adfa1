use prenoms_report::boundary::load_boundaries;
use prenoms_report::clean::clean_and_process;
use prenoms_report::config::Config;
use prenoms_report::dashboard::Dashboard;
use prenoms_report::loader::{load_clean_records, load_reference};
use prenoms_report::map_config::{resolve_geo_config, GeoMode};
use prenoms_report::panel::PanelDomain;
use prenoms_report::reports::{generate_reports, Boundaries};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const RAW: &str = "sexe;preusuel;annais;dpt;nombre\n\
    2;ALICE;2000;75;10\n\
    2;ALICE;2000;69;5\n\
    1;ALICE;2001;01;2\n\
    2;ALICE;2001;01;6\n\
    2;CHANTAL;1960;75;300\n\
    1;X;2000;75;9\n\
    1;_PRENOMS_RARES;XXXX;XX;12000\n";

fn square(x: f64, y: f64) -> String {
    format!(
        r#"{{"type":"Polygon","coordinates":[[[{x},{y}],[{x1},{y}],[{x1},{y1}],[{x},{y1}],[{x},{y}]]]}}"#,
        x1 = x + 1.0,
        y1 = y + 1.0
    )
}

fn csv_cell(json: &str) -> String {
    format!("\"{}\"", json.replace('"', "\"\""))
}

fn write_fixtures(dir: &Path) -> Config {
    let raw = dir.join("raw.csv");
    fs::write(&raw, RAW).unwrap();

    let reg_idf = square(2.0, 48.0);
    let reg_ara = square(4.0, 45.0);
    let reference = format!(
        "code_dep,nom_dep,code_reg,nom_reg,geometry_departement,geometry_region\n\
         75,Paris,11,Île-de-France,{},{}\n\
         69,Rhône,84,Auvergne-Rhône-Alpes,{},{}\n\
         01,Ain,84,Auvergne-Rhône-Alpes,{},{}\n",
        csv_cell(&square(2.0, 48.0)),
        csv_cell(&reg_idf),
        csv_cell(&square(4.5, 45.5)),
        csv_cell(&reg_ara),
        csv_cell(&square(5.0, 46.0)),
        csv_cell(&reg_ara),
    );
    fs::write(dir.join("reference.csv"), reference).unwrap();

    let feature = |key: &str, code: &str, geom: &str| {
        format!(r#"{{"type":"Feature","properties":{{"{key}":"{code}"}},"geometry":{geom}}}"#)
    };
    let regions = format!(
        r#"{{"type":"FeatureCollection","features":[{},{}]}}"#,
        feature("DREG_C_COD", "11", &reg_idf),
        feature("DREG_C_COD", "84", &reg_ara)
    );
    let departments = format!(
        r#"{{"type":"FeatureCollection","features":[{},{},{}]}}"#,
        feature("DDEP_C_COD", "75", &square(2.0, 48.0)),
        feature("DDEP_C_COD", "69", &square(4.5, 45.5)),
        feature("DDEP_C_COD", "01", &square(5.0, 46.0))
    );
    fs::write(dir.join("regions.geojson"), regions).unwrap();
    fs::write(dir.join("departments.geojson"), departments).unwrap();

    Config {
        raw_data_path: raw,
        clean_data_path: dir.join("out/clean.csv"),
        reference_path: dir.join("reference.csv"),
        region_boundaries_path: dir.join("regions.geojson"),
        department_boundaries_path: dir.join("departments.geojson"),
        output_dir: dir.join("reports"),
        ..Config::default()
    }
}

#[test]
fn clean_load_and_report() {
    let dir = tempdir().unwrap();
    let config = write_fixtures(dir.path());

    let report = clean_and_process(&config.raw_data_path, &config.clean_data_path).unwrap();
    assert_eq!(report.written_rows, 5);
    assert_eq!(report.single_letter_names, vec!["X".to_string()]);
    assert_eq!(report.sentinel_rows, 1);

    let (records, load) = load_clean_records(&config.clean_data_path).unwrap();
    assert_eq!(load.loaded_rows, 5);
    assert_eq!(load.parse_errors, 0);
    let reference = load_reference(&config.reference_path).unwrap();
    assert_eq!(reference.len(), 3);

    let domain = PanelDomain::observed(&records);
    let mut dashboard = Dashboard::new(records, reference, domain, config.clone());
    assert_eq!(dashboard.default_name(), Some("CHANTAL"));

    let alice = dashboard.name_view("ALICE").unwrap();
    // ALICE in 2001/01 is given to both sexes: summed, not duplicated
    assert_eq!(alice.panel.rows.len(), dashboard.domain().len());
    assert_eq!(alice.panel.merged_duplicates, 1);
    assert_eq!(alice.panel.total(), 23);

    let boundaries = Boundaries::load(&config);
    let out = generate_reports(&mut dashboard, &boundaries, "ALICE", "2000", &config.output_dir).unwrap();
    assert_eq!(out.tables.len(), 4);
    assert_eq!(out.charts.len(), 2);
    assert_eq!(out.maps.len(), 2);
    for path in out.tables.iter().chain(&out.charts).chain(&out.maps) {
        assert!(path.exists(), "{} missing", path.display());
    }

    let regions = fs::read_to_string(config.output_dir.join("regions_2000.csv")).unwrap();
    assert_eq!(regions, "code,name,year,count\n84,Auvergne-Rhône-Alpes,2000,5\n11,Île-de-France,2000,10\n");

    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out.summary).unwrap()).unwrap();
    assert_eq!(summary["total_births"], 23);
    assert_eq!(summary["girls_occurrences"], 3);
    assert_eq!(summary["boys_occurrences"], 1);
    assert_eq!(summary["map_color_max"], 10);
    assert_eq!(summary["peak_year"], "2000");
    assert_eq!(summary["unmatched_departments"], 0);

    let map = fs::read_to_string(config.output_dir.join("map_department_2000.svg")).unwrap();
    assert_eq!(map.matches("<path").count(), 3);
}

#[test]
fn maps_are_skipped_without_boundaries() {
    let dir = tempdir().unwrap();
    let mut config = write_fixtures(dir.path());
    config.region_boundaries_path = dir.path().join("missing.geojson");
    clean_and_process(&config.raw_data_path, &config.clean_data_path).unwrap();
    let (records, _) = load_clean_records(&config.clean_data_path).unwrap();
    let reference = load_reference(&config.reference_path).unwrap();
    let mut dashboard = Dashboard::new(records, reference, PanelDomain::standard(), config.clone());

    let boundaries = Boundaries::load(&config);
    assert!(boundaries.get(GeoMode::Region).is_none());
    let out = generate_reports(&mut dashboard, &boundaries, "CHANTAL", "1960", &config.output_dir).unwrap();
    assert_eq!(out.maps.len(), 1);
}

#[test]
fn maps_without_geometry_are_skipped() {
    let dir = tempdir().unwrap();
    let mut config = write_fixtures(dir.path());
    let empty_regions = dir.path().join("regions_null.geojson");
    fs::write(
        &empty_regions,
        r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"DREG_C_COD":"11"},"geometry":null},
            {"type":"Feature","properties":{"DREG_C_COD":"84"},"geometry":null}
        ]}"#,
    )
    .unwrap();
    config.region_boundaries_path = empty_regions;
    clean_and_process(&config.raw_data_path, &config.clean_data_path).unwrap();
    let (records, _) = load_clean_records(&config.clean_data_path).unwrap();
    let reference = load_reference(&config.reference_path).unwrap();
    let mut dashboard = Dashboard::new(records, reference, PanelDomain::standard(), config.clone());

    let boundaries = Boundaries::load(&config);
    assert!(boundaries.get(GeoMode::Region).is_none());
    let out = generate_reports(&mut dashboard, &boundaries, "CHANTAL", "1960", &config.output_dir).unwrap();
    assert_eq!(out.maps.len(), 1);
    assert!(!config.output_dir.join("map_region_1960.svg").exists());
    assert!(out.summary.exists());
}

#[test]
fn boundary_codes_follow_feature_id_key() {
    let dir = tempdir().unwrap();
    let config = write_fixtures(dir.path());
    let cfg = resolve_geo_config("dep").unwrap();
    let features = load_boundaries(&config.department_boundaries_path, cfg.feature_id_key).unwrap();
    let codes: Vec<&str> = features.iter().map(|f| f.code.as_str()).collect();
    assert_eq!(codes, vec!["75", "69", "01"]);

    let by_mode: HashMap<GeoMode, _> = HashMap::from([(GeoMode::Department, features)]);
    let boundaries = Boundaries::from_features(by_mode);
    assert!(boundaries.get(GeoMode::Department).is_some());
}

#[test]
fn missing_input_is_an_error() {
    let dir = tempdir().unwrap();
    assert!(load_clean_records(&dir.path().join("nope.csv")).is_err());
    assert!(clean_and_process(&dir.path().join("nope.csv"), &dir.path().join("out.csv")).is_err());
}
