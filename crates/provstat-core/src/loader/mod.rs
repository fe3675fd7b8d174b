// crates/provstat-core/src/loader/mod.rs

//! # Data Loader
//!
//! Reads every source named by a [`SourceConfig`], runs the harmonizer and
//! keeps the result in a process-wide cache keyed by that config.

use crate::cache::Memo;
use crate::config::{CsvSource, SourceConfig};
use crate::dataset::Dataset;
use crate::error::Result;
use crate::geo::{load_geojson, reconcile_geometry_keys, ProvinceMapping};
use crate::harmonize::{
    build_master_table, exclude_national_aggregate, merge_time_series, MasterSources, PROVINCE_KEY,
};
use crate::model::{CrimeTimeSeries, ProvinceRecord};
use crate::oc_index::{load_oc_index, rank_entries};
use crate::table::Table;
use once_cell::sync::Lazy;
use std::sync::Arc;
use tracing::{debug, info};

pub mod common_io;

use common_io::read_csv_table;

static DATASET_CACHE: Lazy<Memo<SourceConfig, Dataset>> = Lazy::new(Memo::new);

impl Dataset {
    /// Loads and harmonizes every source, or returns the cached result for
    /// the same config.
    ///
    /// The cache is never refreshed on its own; call [`Dataset::invalidate`]
    /// after the files change.
    pub fn load(config: &SourceConfig) -> Result<Arc<Dataset>> {
        DATASET_CACHE.get_or_try_insert_with(config, || Self::load_uncached(config))
    }

    /// Forgets the cached dataset for `config`. Returns whether one was cached.
    pub fn invalidate(config: &SourceConfig) -> bool {
        DATASET_CACHE.invalidate(config)
    }

    pub fn clear_cache() {
        DATASET_CACHE.clear();
    }

    /// Loads without touching the cache. Any missing source aborts the load.
    pub fn load_uncached(config: &SourceConfig) -> Result<Dataset> {
        info!(data_dir = %config.data_dir.display(), "loading dataset");
        let files = &config.files;
        let read = |src: &CsvSource| {
            let path = config.resolve(&src.path);
            debug!(path = %path.display(), "reading source");
            read_csv_table(&path, src.delimiter)
        };

        let periods = files.crime_periods.iter().map(read).collect::<Result<Vec<Table>>>()?;
        let crime_latest = periods
            .last()
            .cloned()
            .unwrap_or_else(|| Table::new([PROVINCE_KEY]));

        let mut master = build_master_table(MasterSources {
            income: read(&files.income)?,
            education: read(&files.education)?,
            crime_latest,
            gini: read(&files.gini_ratio)?,
            population: read(&files.population)?,
        })?;
        exclude_national_aggregate(&mut master);
        let records = ProvinceRecord::from_master(&master);

        let time_series = merge_time_series(periods)?;
        let crime_series = CrimeTimeSeries::from_table(&time_series);

        let oc = |src: &CsvSource, year| -> Result<_> {
            let scores = load_oc_index(&config.resolve(&src.path), src.delimiter)?;
            Ok(rank_entries(scores, year))
        };
        let oc_2021 = oc(&files.oc_index_2021, 2021)?;
        let oc_2023 = oc(&files.oc_index_2023, 2023)?;

        let mapping = ProvinceMapping::indonesia()?;
        let collection = load_geojson(&config.resolve(&files.provinces_geojson))?;
        let total_features = collection.features.len();
        let shapes = reconcile_geometry_keys(collection.features, &mapping);

        info!(
            provinces = records.len(),
            series_rows = crime_series.rows.len(),
            series_years = crime_series.years.len(),
            oc_2021 = oc_2021.world_total(),
            oc_2023 = oc_2023.world_total(),
            shapes = shapes.len(),
            dropped_shapes = total_features - shapes.len(),
            "dataset loaded"
        );

        Ok(Dataset {
            master,
            records,
            time_series,
            crime_series,
            oc_2021,
            oc_2023,
            shapes,
            mapping,
        })
    }
}
