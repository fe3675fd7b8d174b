// crates/provstat-core/src/dataset.rs

use crate::analysis::{self, Selection, Summary};
use crate::common::DatasetStats;
use crate::error::Result;
use crate::geo::{GeoShape, ProvinceMapping};
use crate::model::{CrimeTimeSeries, ProvinceRecord, Region};
use crate::oc_index::{compare, IndexComparison, IndexSnapshot};
use crate::table::Table;

/// Country whose index standing is reported in the national summary.
pub const HOME_COUNTRY: &str = "Indonesia";

/// Everything loaded and harmonized from one data directory.
///
/// Built by [`Dataset::load`](crate::Dataset::load); immutable afterwards
/// and shared through an `Arc`.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Master table, national aggregate removed.
    pub master: Table,
    /// Typed view of [`Dataset::master`].
    pub records: Vec<ProvinceRecord>,
    /// Merged crime-risk periods. Keeps the national aggregate row.
    pub time_series: Table,
    /// Typed view of [`Dataset::time_series`].
    pub crime_series: CrimeTimeSeries,
    pub oc_2021: IndexSnapshot,
    pub oc_2023: IndexSnapshot,
    /// Province polygons that resolved through [`Dataset::mapping`].
    pub shapes: Vec<GeoShape>,
    pub mapping: ProvinceMapping,
}

impl Dataset {
    pub fn stats(&self) -> DatasetStats {
        DatasetStats {
            provinces: self.records.len(),
            provinces_with_region: self.records.iter().filter(|r| r.region.is_some()).count(),
            regions: analysis::available_regions(&self.records).len(),
            series_rows: self.crime_series.rows.len(),
            series_years: self.crime_series.years.len(),
            indexed_countries_2021: self.oc_2021.world_total(),
            indexed_countries_2023: self.oc_2023.world_total(),
            shapes: self.shapes.len(),
        }
    }

    /// Looks a province up by any spelling the sources use.
    pub fn province(&self, name: &str) -> Option<&ProvinceRecord> {
        analysis::find_province(&self.records, name)
    }

    /// Validates `selection` against the loaded provinces; see
    /// [`Selection::resolve`].
    pub fn resolve(&self, selection: &Selection) -> Result<Selection> {
        selection.resolve(&self.records)
    }

    pub fn regions(&self) -> Vec<Region> {
        analysis::available_regions(&self.records)
    }

    pub fn provinces(&self, region: Option<Region>) -> Vec<&str> {
        analysis::available_provinces(&self.records, region)
    }

    /// Standing of [`HOME_COUNTRY`] in the latest index versus the previous one.
    pub fn index_comparison(&self) -> Option<IndexComparison> {
        compare(&self.oc_2023, &self.oc_2021, HOME_COUNTRY)
    }

    pub fn summary(&self, selection: &Selection) -> Summary {
        analysis::summarize(&self.records, self.index_comparison(), selection)
    }
}
