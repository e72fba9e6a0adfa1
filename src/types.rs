use serde::{Deserialize, Serialize};
use std::fmt;
use tabled::Tabled;

/// One line of the raw INSEE export (`;`-delimited). Every field is optional
/// so that incomplete rows can be counted instead of failing the whole read.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(rename = "sexe")]
    pub sex: Option<String>,
    #[serde(rename = "preusuel")]
    pub name: Option<String>,
    #[serde(rename = "annais")]
    pub year: Option<String>,
    #[serde(rename = "dpt")]
    pub dept: Option<String>,
    #[serde(rename = "nombre")]
    pub count: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "1")]
    Male,
    #[serde(rename = "2")]
    Female,
}

impl Sex {
    pub fn code(self) -> &'static str {
        match self {
            Sex::Male => "1",
            Sex::Female => "2",
        }
    }

    pub fn from_code(code: &str) -> Option<Sex> {
        match code.trim() {
            "1" => Some(Sex::Male),
            "2" => Some(Sex::Female),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Sex::Male => "Boys",
            Sex::Female => "Girls",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A row of the clean table: births of one name, sex, year and department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirthRecord {
    pub name: String,
    pub sex: Sex,
    pub year: String,
    pub dept: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct YearCount {
    #[serde(rename = "year")]
    #[tabled(rename = "Year")]
    pub year: String,
    #[serde(rename = "count")]
    #[tabled(rename = "Births")]
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct SexOccurrence {
    #[serde(rename = "sex")]
    #[tabled(rename = "Sex")]
    pub sex: Sex,
    #[serde(rename = "occ")]
    #[tabled(rename = "Occurrences")]
    pub occ: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct SexTotal {
    #[serde(rename = "sex")]
    #[tabled(rename = "Sex")]
    pub sex: Sex,
    #[serde(rename = "count")]
    #[tabled(rename = "Births")]
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct NameTotal {
    #[serde(rename = "name")]
    #[tabled(rename = "Name")]
    pub name: String,
    #[serde(rename = "count")]
    #[tabled(rename = "Births")]
    pub count: u64,
}

/// Flat, exportable form of an aggregated map cell (geometry left out).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct AreaRow {
    #[serde(rename = "code")]
    #[tabled(rename = "Code")]
    pub code: String,
    #[serde(rename = "name")]
    #[tabled(rename = "Name")]
    pub name: String,
    #[serde(rename = "year")]
    #[tabled(rename = "Year")]
    pub year: String,
    #[serde(rename = "count")]
    #[tabled(rename = "Births")]
    pub count: u64,
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub name: String,
    pub year: String,
    pub total_births: u64,
    pub boys_occurrences: usize,
    pub girls_occurrences: usize,
    pub peak_year: Option<String>,
    pub peak_births: u64,
    pub unmatched_departments: usize,
    pub records_outside_grid: usize,
    pub map_color_max: u64,
    pub generated_at: String,
}
