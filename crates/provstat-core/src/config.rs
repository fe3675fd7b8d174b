// crates/provstat-core/src/config.rs

//! Source-file contract and dashboard view settings.

use crate::choropleth::{ColorScale, Metric};
use crate::error::{Result, StatError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// One CSV source: path relative to the data directory plus its delimiter.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CsvSource {
    pub path: PathBuf,
    #[serde(default = "default_delimiter", with = "delimiter_char")]
    pub delimiter: u8,
}

fn default_delimiter() -> u8 {
    b','
}

mod delimiter_char {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &u8, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_char(*d as char)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u8, D::Error> {
        let c = char::deserialize(d)?;
        u8::try_from(c).map_err(|_| de::Error::custom("delimiter must be a single ASCII character"))
    }
}

impl CsvSource {
    pub fn comma(path: &str) -> Self {
        CsvSource {
            path: PathBuf::from(path),
            delimiter: b',',
        }
    }

    pub fn semicolon(path: &str) -> Self {
        CsvSource {
            path: PathBuf::from(path),
            delimiter: b';',
        }
    }
}

/// The literal source filenames. These names are the schema contract with
/// whoever drops the files into `dataset/` and `map/`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceFiles {
    pub gini_ratio: CsvSource,
    pub income: CsvSource,
    pub education: CsvSource,
    pub population: CsvSource,
    /// Crime-risk tables, oldest period first.
    pub crime_periods: Vec<CsvSource>,
    pub oc_index_2021: CsvSource,
    pub oc_index_2023: CsvSource,
    pub provinces_geojson: PathBuf,
}

impl Default for SourceFiles {
    fn default() -> Self {
        SourceFiles {
            gini_ratio: CsvSource::comma("dataset/Gini Ratio Menurut Provinsi dan Daerah 2023.csv"),
            income: CsvSource::comma(
                "dataset/Rata-rata Pendapatan Bersih Pekerja Bebas Menurut Provinsi dan Kelompok Umur, 2023.csv",
            ),
            education: CsvSource::comma(
                "dataset/Tingkat Penyelesaian Pendidikan Menurut Jenjang Pendidikan dan Provinsi, 2021-2023.csv",
            ),
            population: CsvSource::comma("dataset/Penduduk.csv"),
            crime_periods: ["2012-2014", "2015-2017", "2018-2020", "2021-2023"]
                .iter()
                .map(|p| {
                    CsvSource::comma(&format!(
                        "dataset/Risiko Penduduk Terkena Tindak Pidana (Per 100.000 Penduduk) , {p}.csv"
                    ))
                })
                .collect(),
            oc_index_2021: CsvSource::semicolon("dataset/oc_index_2021.csv"),
            oc_index_2023: CsvSource::semicolon("dataset/oc_index_2023.csv"),
            provinces_geojson: PathBuf::from("map/indonesia-prov.geojson"),
        }
    }
}

/// Where to read from. Also the memoization key of a load.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub data_dir: PathBuf,
    pub files: SourceFiles,
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig {
            data_dir: PathBuf::from("."),
            files: SourceFiles::default(),
        }
    }
}

impl SourceConfig {
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        SourceConfig {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    pub fn resolve(&self, relative: &Path) -> PathBuf {
        self.data_dir.join(relative)
    }
}

/// How the selected province/region is emphasised on a choropleth.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HighlightMode {
    /// A selected province wins; otherwise a selected region is highlighted.
    #[default]
    Province,
    /// Only regions are highlighted; a selected province highlights its region.
    Region,
    /// Plain colouring regardless of the selection.
    None,
}

/// Presentation settings that used to differ between copies of the dashboard.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Lock zoom interaction while the whole country is shown.
    pub fixed_zoom: bool,
    pub highlight_mode: HighlightMode,
    pub color_scales: BTreeMap<Metric, ColorScale>,
    pub trend_first_year: u16,
    pub trend_last_year: u16,
    pub top_n: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        ViewConfig {
            fixed_zoom: true,
            highlight_mode: HighlightMode::Province,
            color_scales: Metric::ALL
                .iter()
                .map(|m| (*m, m.default_scale()))
                .collect(),
            trend_first_year: 2012,
            trend_last_year: 2023,
            top_n: 10,
        }
    }
}

impl ViewConfig {
    /// Colour scale for `metric`, falling back to the built-in one.
    pub fn scale_for(&self, metric: Metric) -> ColorScale {
        self.color_scales
            .get(&metric)
            .copied()
            .unwrap_or_else(|| metric.default_scale())
    }
}

/// Everything the dashboard needs, loadable from one JSON file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub sources: SourceConfig,
    pub view: ViewConfig,
}

impl DashboardConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            StatError::NotFound(format!("Config not found at {}: {}", path.display(), e))
        })?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}
