// crates/provstat-core/src/lib.rs

pub mod analysis;
pub mod cache;
pub mod choropleth;
pub mod common;
pub mod config;
pub mod dataset;
pub mod error;
pub mod geo;
pub mod harmonize; // The Dataset Harmonizer
pub mod loader;
pub mod model;
pub mod oc_index;
pub mod table;
pub mod text;
pub mod traits;

// Re-exports
pub use crate::analysis::{Selection, Summary};
pub use crate::choropleth::{build_choropleth, ChoroplethLayer, ColorScale, Metric};
pub use crate::common::{DatasetStats, Delta, RankChange};
pub use crate::config::{DashboardConfig, HighlightMode, SourceConfig, ViewConfig};
pub use crate::dataset::Dataset;
pub use crate::error::{Result, StatError};
pub use crate::harmonize::{build_master_table, merge_time_series, normalize_province_key};
pub use crate::geo::reconcile_geometry_keys;
pub use crate::model::{ProvinceRecord, Region};
pub use crate::table::{Cell, Table};
pub use crate::traits::NameMatch;

/// The types most callers need.
pub mod prelude {
    pub use crate::analysis::Selection;
    pub use crate::choropleth::Metric;
    pub use crate::config::{DashboardConfig, SourceConfig, ViewConfig};
    pub use crate::dataset::Dataset;
    pub use crate::error::{Result, StatError};
    pub use crate::model::{ProvinceRecord, Region};
    pub use crate::traits::NameMatch;
}
