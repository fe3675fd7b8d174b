// crates/provstat-core/src/model.rs

//! Typed records projected out of the harmonized tables.

use crate::error::StatError;
use crate::table::Table;
use crate::text::{equals_folded, parse_year};
use crate::traits::{find_named, NameMatch};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Canonical name of the national aggregate row found in several sources.
pub const NATIONAL_AGGREGATE: &str = "INDONESIA";

/// One of the seven macro-regions used to group provinces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Region {
    #[serde(rename = "Sumatra")]
    Sumatra,
    #[serde(rename = "Jawa")]
    Jawa,
    #[serde(rename = "Kalimantan")]
    Kalimantan,
    #[serde(rename = "Sulawesi")]
    Sulawesi,
    #[serde(rename = "Bali & Nusa Tenggara")]
    BaliNusaTenggara,
    #[serde(rename = "Maluku")]
    Maluku,
    #[serde(rename = "Papua")]
    Papua,
}

/// Province → region lookup. Provinces created after 2022 are absent.
pub const REGION_TABLE: &[(&str, Region)] = &[
    ("ACEH", Region::Sumatra),
    ("SUMATERA UTARA", Region::Sumatra),
    ("SUMATERA BARAT", Region::Sumatra),
    ("RIAU", Region::Sumatra),
    ("KEPULAUAN RIAU", Region::Sumatra),
    ("JAMBI", Region::Sumatra),
    ("SUMATERA SELATAN", Region::Sumatra),
    ("BENGKULU", Region::Sumatra),
    ("LAMPUNG", Region::Sumatra),
    ("KEPULAUAN BANGKA BELITUNG", Region::Sumatra),
    ("DKI JAKARTA", Region::Jawa),
    ("JAWA BARAT", Region::Jawa),
    ("JAWA TENGAH", Region::Jawa),
    ("DI YOGYAKARTA", Region::Jawa),
    ("JAWA TIMUR", Region::Jawa),
    ("BANTEN", Region::Jawa),
    ("KALIMANTAN BARAT", Region::Kalimantan),
    ("KALIMANTAN TENGAH", Region::Kalimantan),
    ("KALIMANTAN SELATAN", Region::Kalimantan),
    ("KALIMANTAN TIMUR", Region::Kalimantan),
    ("KALIMANTAN UTARA", Region::Kalimantan),
    ("SULAWESI UTARA", Region::Sulawesi),
    ("SULAWESI TENGAH", Region::Sulawesi),
    ("SULAWESI SELATAN", Region::Sulawesi),
    ("SULAWESI TENGGARA", Region::Sulawesi),
    ("GORONTALO", Region::Sulawesi),
    ("SULAWESI BARAT", Region::Sulawesi),
    ("BALI", Region::BaliNusaTenggara),
    ("NUSA TENGGARA BARAT", Region::BaliNusaTenggara),
    ("NUSA TENGGARA TIMUR", Region::BaliNusaTenggara),
    ("MALUKU", Region::Maluku),
    ("MALUKU UTARA", Region::Maluku),
    ("PAPUA", Region::Papua),
    ("PAPUA BARAT", Region::Papua),
];

impl Region {
    pub const ALL: [Region; 7] = [
        Region::Sumatra,
        Region::Jawa,
        Region::Kalimantan,
        Region::Sulawesi,
        Region::BaliNusaTenggara,
        Region::Maluku,
        Region::Papua,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Region::Sumatra => "Sumatra",
            Region::Jawa => "Jawa",
            Region::Kalimantan => "Kalimantan",
            Region::Sulawesi => "Sulawesi",
            Region::BaliNusaTenggara => "Bali & Nusa Tenggara",
            Region::Maluku => "Maluku",
            Region::Papua => "Papua",
        }
    }

    /// Region of a canonical province name, if it is in [`REGION_TABLE`].
    pub fn for_province(province: &str) -> Option<Region> {
        REGION_TABLE
            .iter()
            .find(|(name, _)| *name == province)
            .map(|(_, region)| *region)
    }

    /// Canonical names of the provinces in this region, in table order.
    pub fn provinces(self) -> impl Iterator<Item = &'static str> {
        REGION_TABLE
            .iter()
            .filter(move |(_, r)| *r == self)
            .map(|(name, _)| *name)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Region {
    type Err = StatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Region::ALL
            .into_iter()
            .find(|r| equals_folded(r.label(), s))
            .ok_or_else(|| StatError::unknown("region", s))
    }
}

/// Column names of the master table.
pub mod columns {
    pub const PROVINCE: &str = "Provinsi";
    pub const REGION: &str = "Region";
    pub const INCOME_FEB: &str = "Pendapatan Februari";
    pub const INCOME_AUG: &str = "Pendapatan Agustus";
    pub const PRIMARY: &str = "SD_2023";
    pub const JUNIOR: &str = "SMP_2023";
    pub const SENIOR: &str = "SMA_2023";
    pub const GINI: &str = "gini_ratio_2023";
    pub const POPULATION: &str = "Jumlah Penduduk";
    pub const NO_PRIMARY: &str = "Tidak Tamat SD";
    pub const PRIMARY_ONLY: &str = "Pendidikan Terakhir SD";
    pub const JUNIOR_ONLY: &str = "Pendidikan Terakhir SMP";
    pub const SENIOR_OR_HIGHER: &str = "Pendidikan Terakhir SMA/PT";

    /// Years with a crime-rate column in the master table.
    pub const CRIME_YEARS: [u16; 3] = [2021, 2022, 2023];

    pub fn crime(year: u16) -> String {
        format!("Tindak Pidana {year}")
    }
}

/// Average net income of informal workers, per survey month.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Income {
    pub february: Option<f64>,
    pub august: Option<f64>,
}

/// Cumulative completion rates (percent) per school level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationCompletion {
    pub primary: Option<f64>,
    pub junior: Option<f64>,
    pub senior: Option<f64>,
}

impl EducationCompletion {
    /// Highest-level shares, defined only when all three rates are known.
    pub fn tiers(&self) -> Option<EducationTiers> {
        let (sd, smp, sma) = (self.primary?, self.junior?, self.senior?);
        Some(EducationTiers {
            no_primary: 100.0 - sd,
            primary_only: sd - smp,
            junior_only: smp - sma,
            senior_or_higher: sma,
        })
    }
}

/// Population share by highest completed level. Sums to 100.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EducationTiers {
    pub no_primary: f64,
    pub primary_only: f64,
    pub junior_only: f64,
    pub senior_or_higher: f64,
}

impl EducationTiers {
    pub fn total(&self) -> f64 {
        self.no_primary + self.primary_only + self.junior_only + self.senior_or_higher
    }
}

/// One harmonized province row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProvinceRecord {
    /// Canonical name: uppercase, trimmed, abbreviations expanded.
    pub name: String,
    pub region: Option<Region>,
    pub income: Income,
    pub completion: EducationCompletion,
    pub education: Option<EducationTiers>,
    /// Crimes per 100,000 inhabitants, by year. Only known years are present.
    pub crime_rate: BTreeMap<u16, f64>,
    pub gini_ratio: Option<f64>,
    /// Thousands of inhabitants.
    pub population: Option<f64>,
}

impl ProvinceRecord {
    pub fn crime_rate(&self, year: u16) -> Option<f64> {
        self.crime_rate.get(&year).copied()
    }

    /// Projects every row of the master table. Rows without a name are skipped.
    pub fn from_master(table: &Table) -> Vec<ProvinceRecord> {
        let num = |row: usize, col: &str| table.cell(row, col).and_then(|c| c.as_f64());
        (0..table.len())
            .filter_map(|row| {
                let name = table.cell(row, columns::PROVINCE)?.as_str()?.to_string();
                let completion = EducationCompletion {
                    primary: num(row, columns::PRIMARY),
                    junior: num(row, columns::JUNIOR),
                    senior: num(row, columns::SENIOR),
                };
                let crime_rate = columns::CRIME_YEARS
                    .iter()
                    .filter_map(|&y| num(row, &columns::crime(y)).map(|v| (y, v)))
                    .collect();
                Some(ProvinceRecord {
                    region: Region::for_province(&name),
                    income: Income {
                        february: num(row, columns::INCOME_FEB),
                        august: num(row, columns::INCOME_AUG),
                    },
                    education: completion.tiers(),
                    completion,
                    crime_rate,
                    gini_ratio: num(row, columns::GINI),
                    population: num(row, columns::POPULATION),
                    name,
                })
            })
            .collect()
    }
}

impl NameMatch for ProvinceRecord {
    fn name_str(&self) -> &str {
        &self.name
    }
}

/// One province's crime rates over all available years.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CrimeSeriesRow {
    pub province: String,
    pub values: BTreeMap<u16, f64>,
}

impl NameMatch for CrimeSeriesRow {
    fn name_str(&self) -> &str {
        &self.province
    }
}

/// Sparse province × year crime-rate table.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CrimeTimeSeries {
    /// Every year column found in any source period, ascending.
    pub years: Vec<u16>,
    pub rows: Vec<CrimeSeriesRow>,
}

impl CrimeTimeSeries {
    /// Projects a merged time-series table. Year columns are the headers that
    /// are four-digit years; other columns are ignored.
    pub fn from_table(table: &Table) -> Self {
        let year_cols: Vec<(usize, u16)> = table
            .columns()
            .iter()
            .enumerate()
            .filter_map(|(i, c)| parse_year(c).map(|y| (i, y)))
            .collect();
        let Some(key) = table.column_index(columns::PROVINCE) else {
            return CrimeTimeSeries::default();
        };

        let mut years: Vec<u16> = year_cols.iter().map(|(_, y)| *y).collect();
        years.sort_unstable();
        years.dedup();

        let rows = table
            .rows()
            .iter()
            .filter_map(|row| {
                let province = row[key].as_str()?.to_string();
                let values = year_cols
                    .iter()
                    .filter_map(|&(i, y)| row[i].as_f64().map(|v| (y, v)))
                    .collect();
                Some(CrimeSeriesRow { province, values })
            })
            .collect();

        CrimeTimeSeries { years, rows }
    }

    /// The row for `name`, compared exactly first and then folded.
    pub fn province(&self, name: &str) -> Option<&CrimeSeriesRow> {
        self.rows
            .iter()
            .find(|r| r.province == name)
            .or_else(|| find_named(&self.rows, name))
    }

    pub fn value(&self, province: &str, year: u16) -> Option<f64> {
        self.province(province)?.values.get(&year).copied()
    }

    /// Rows other than the national aggregate.
    pub fn provinces(&self) -> impl Iterator<Item = &CrimeSeriesRow> {
        self.rows.iter().filter(|r| r.province != NATIONAL_AGGREGATE)
    }
}
