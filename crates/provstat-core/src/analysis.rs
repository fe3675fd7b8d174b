// crates/provstat-core/src/analysis.rs

//! Read-only views over a loaded dataset: selection filtering, trends,
//! rankings and summary metrics.

use crate::choropleth::Metric;
use crate::common::{Delta, RankChange};
use crate::error::{Result, StatError};
use crate::model::{columns, CrimeTimeSeries, ProvinceRecord, Region};
use crate::oc_index::IndexComparison;
use crate::table::Table;
use crate::text::canonical_province;
use crate::traits::find_named;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

/// Year of the most recent crime-rate column.
pub const LATEST_YEAR: u16 = 2023;
/// Year compared against [`LATEST_YEAR`].
pub const PREVIOUS_YEAR: u16 = 2022;
/// Smallest crime-rate change reported as a change.
pub const CRIME_DELTA_THRESHOLD: f64 = 0.1;

/// Sidebar state. `None` means "all".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub region: Option<Region>,
    pub province: Option<String>,
}

impl Selection {
    pub fn all() -> Self {
        Selection::default()
    }

    pub fn with_region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    /// Selects a province; the name is canonicalized.
    pub fn with_province(mut self, name: &str) -> Self {
        self.province = Some(canonical_province(name));
        self
    }

    pub fn is_filtered(&self) -> bool {
        self.region.is_some() || self.province.is_some()
    }

    /// The province filter, if it lies within the region filter.
    ///
    /// A province outside the selected region is ignored by every view; the
    /// region filter alone applies. [`Selection::resolve`] rejects such a
    /// selection instead.
    pub fn province_filter(&self) -> Option<&str> {
        let p = self.province.as_deref()?;
        match self.region {
            Some(r) if Region::for_province(p) != Some(r) => None,
            _ => Some(p),
        }
    }

    /// Checks the selection against `records` and rewrites the province to
    /// the matched record's name.
    ///
    /// Any spelling [`find_province`] accepts is accepted here. A province
    /// that is unknown, or that lies outside the selected region, is an
    /// [`StatError::Unknown`] error.
    pub fn resolve(&self, records: &[ProvinceRecord]) -> Result<Selection> {
        let Some(p) = &self.province else {
            return Ok(self.clone());
        };
        let record = find_province(records, p).ok_or_else(|| StatError::unknown("province", p.as_str()))?;
        if let Some(region) = self.region {
            if record.region != Some(region) {
                return Err(StatError::unknown(
                    "province",
                    format!("{} in {region}", record.name),
                ));
            }
        }
        Ok(Selection {
            region: self.region,
            province: Some(record.name.clone()),
        })
    }

    /// Region filter first, then the province filter within it.
    pub fn matches(&self, record: &ProvinceRecord) -> bool {
        if let Some(region) = self.region {
            if record.region != Some(region) {
                return false;
            }
        }
        match self.province_filter() {
            Some(p) => record.name == p,
            None => true,
        }
    }

    pub fn apply<'a>(&self, records: &'a [ProvinceRecord]) -> Vec<&'a ProvinceRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }

    /// The filtered master table, for the data-table view.
    pub fn apply_table(&self, master: &Table) -> Table {
        let mut table = master.clone();
        let region = table.column_index(columns::REGION);
        let province = table.column_index(columns::PROVINCE);
        table.retain_rows(|row| {
            let region_ok = match (self.region, region) {
                (Some(r), Some(i)) => row[i].as_str() == Some(r.label()),
                (Some(_), None) => false,
                (None, _) => true,
            };
            let province_ok = match (self.province_filter(), province) {
                (Some(p), Some(i)) => row[i].as_str() == Some(p),
                (Some(_), None) => false,
                (None, _) => true,
            };
            region_ok && province_ok
        });
        table
    }
}

/// Looks a province up by any spelling the sources use: the canonical
/// spelling first, then a folded comparison.
pub fn find_province<'a>(records: &'a [ProvinceRecord], name: &str) -> Option<&'a ProvinceRecord> {
    let key = canonical_province(name);
    records
        .iter()
        .find(|r| r.name == key)
        .or_else(|| find_named(records, name))
}

/// Regions that occur in `records`, sorted by label.
pub fn available_regions(records: &[ProvinceRecord]) -> Vec<Region> {
    let mut regions: Vec<Region> = records.iter().filter_map(|r| r.region).collect();
    regions.sort_by_key(|r| r.label());
    regions.dedup();
    regions
}

/// Province names, optionally within one region, sorted.
pub fn available_provinces(records: &[ProvinceRecord], region: Option<Region>) -> Vec<&str> {
    let mut names: Vec<&str> = records
        .iter()
        .filter(|r| region.is_none() || r.region == region)
        .map(|r| r.name.as_str())
        .collect();
    names.sort_unstable();
    names.dedup();
    names
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub year: u16,
    pub value: f64,
}

/// A crime-rate line for the trend chart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    pub label: String,
    pub points: Vec<TrendPoint>,
}

/// Crime-rate trend for the current selection.
///
/// A selected province gives its own values; a selected region gives the
/// mean of its provinces; otherwise the mean of all provinces (the national
/// aggregate row excluded). Years without any value are skipped. The
/// province follows [`Selection::province_filter`].
pub fn crime_trend(series: &CrimeTimeSeries, selection: &Selection, years: RangeInclusive<u16>) -> Trend {
    let (label, rows): (String, Vec<_>) = match (selection.province_filter(), selection.region) {
        (Some(p), _) => (p.to_string(), series.province(p).into_iter().collect()),
        (None, Some(region)) => (
            format!("{region} Average"),
            series
                .provinces()
                .filter(|r| Region::for_province(&r.province) == Some(region))
                .collect(),
        ),
        (None, None) => ("National Average".to_string(), series.provinces().collect()),
    };

    let points = series
        .years
        .iter()
        .copied()
        .filter(|y| years.contains(y))
        .filter_map(|year| {
            let values: Vec<f64> = rows.iter().filter_map(|r| r.values.get(&year).copied()).collect();
            mean(&values).map(|value| TrendPoint { year, value })
        })
        .collect();

    Trend { label, points }
}

/// The `n` highest crime rates for `year`, highest first.
///
/// Records without a value are skipped; equal values keep input order.
pub fn top_provinces<'a>(
    records: impl IntoIterator<Item = &'a ProvinceRecord>,
    year: u16,
    n: usize,
) -> Vec<(&'a ProvinceRecord, f64)> {
    let mut ranked: Vec<_> = records
        .into_iter()
        .filter_map(|r| r.crime_rate(year).map(|v| (r, v)))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(n);
    ranked
}

/// One point of an X-vs-Y scatter plot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub province: String,
    pub region: Option<Region>,
    /// Colour group: the province when a filter is active, the region otherwise.
    pub group: Option<String>,
    pub x: f64,
    pub y: f64,
}

/// Points for provinces matching `selection` that have both values.
pub fn scatter(records: &[ProvinceRecord], x: Metric, y: Metric, selection: &Selection) -> Vec<ScatterPoint> {
    selection
        .apply(records)
        .into_iter()
        .filter_map(|r| {
            let group = if selection.is_filtered() {
                Some(r.name.clone())
            } else {
                r.region.map(|g| g.label().to_string())
            };
            Some(ScatterPoint {
                province: r.name.clone(),
                region: r.region,
                group,
                x: x.value(r)?,
                y: y.value(r)?,
            })
        })
        .collect()
}

/// Metrics shown for a selected province.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProvinceSummary {
    pub province: String,
    pub region: Option<Region>,
    pub crime_rate: Option<Delta>,
    /// Ascending by crime rate within the region (1 = lowest).
    pub regional_rank: Option<RankChange>,
    /// Ascending by crime rate among all provinces (1 = lowest).
    pub national_rank: Option<RankChange>,
}

/// Metrics shown for a selected region.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegionSummary {
    pub region: Region,
    pub mean_crime_rate: Option<Delta>,
    /// Ascending by mean crime rate among regions (1 = lowest).
    pub rank: Option<RankChange>,
    pub provinces: usize,
}

/// Headline metrics for the current selection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "lowercase")]
pub enum Summary {
    National { index: Option<IndexComparison> },
    Province(ProvinceSummary),
    Region(RegionSummary),
}

/// 1-based ascending position of `target` among the keys that have a value,
/// plus the number of ranked keys. Equal values keep input order.
fn ascending_rank<K: PartialEq + Copy>(items: &[(K, Option<f64>)], target: K) -> Option<(usize, usize)> {
    let mut ranked: Vec<(K, f64)> = items.iter().filter_map(|(k, v)| v.map(|v| (*k, v))).collect();
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
    let pos = ranked.iter().position(|(k, _)| *k == target)?;
    Some((pos + 1, ranked.len()))
}

fn rank_change<K: PartialEq + Copy>(
    current: &[(K, Option<f64>)],
    previous: &[(K, Option<f64>)],
    target: K,
) -> Option<RankChange> {
    let (rank, total) = ascending_rank(current, target)?;
    Some(RankChange {
        current: rank,
        previous: ascending_rank(previous, target).map(|(r, _)| r),
        total,
    })
}

fn crime_column<'a>(records: impl Iterator<Item = &'a ProvinceRecord>, year: u16) -> Vec<(&'a str, Option<f64>)> {
    records.map(|r| (r.name.as_str(), r.crime_rate(year))).collect()
}

pub fn province_summary(records: &[ProvinceRecord], province: &str) -> Option<ProvinceSummary> {
    let record = records.iter().find(|r| r.name == province)?;

    let crime_rate = record
        .crime_rate(LATEST_YEAR)
        .map(|v| Delta::new(v, record.crime_rate(PREVIOUS_YEAR), CRIME_DELTA_THRESHOLD));

    let regional_rank = record.region.and_then(|region| {
        let peers = || records.iter().filter(move |r| r.region == Some(region));
        rank_change(
            &crime_column(peers(), LATEST_YEAR),
            &crime_column(peers(), PREVIOUS_YEAR),
            record.name.as_str(),
        )
    });

    let national_rank = rank_change(
        &crime_column(records.iter(), LATEST_YEAR),
        &crime_column(records.iter(), PREVIOUS_YEAR),
        record.name.as_str(),
    );

    Some(ProvinceSummary {
        province: record.name.clone(),
        region: record.region,
        crime_rate,
        regional_rank,
        national_rank,
    })
}

/// Mean crime rate per region for `year`, in label order.
///
/// Regions whose provinces have no value for `year` are left out.
pub fn region_means(records: &[ProvinceRecord], year: u16) -> Vec<(Region, f64)> {
    let mut grouped: BTreeMap<&str, (Region, Vec<f64>)> = BTreeMap::new();
    for r in records {
        if let Some(region) = r.region {
            let entry = grouped.entry(region.label()).or_insert((region, Vec::new()));
            if let Some(v) = r.crime_rate(year) {
                entry.1.push(v);
            }
        }
    }
    grouped
        .into_values()
        .filter_map(|(region, values)| mean(&values).map(|m| (region, m)))
        .collect()
}

pub fn region_summary(records: &[ProvinceRecord], region: Region) -> RegionSummary {
    let members: Vec<&ProvinceRecord> = records.iter().filter(|r| r.region == Some(region)).collect();
    let rates = |year| -> Vec<f64> { members.iter().filter_map(|r| r.crime_rate(year)).collect() };

    let mean_crime_rate = mean(&rates(LATEST_YEAR))
        .map(|v| Delta::new(v, mean(&rates(PREVIOUS_YEAR)), CRIME_DELTA_THRESHOLD));

    let as_items = |means: Vec<(Region, f64)>| -> Vec<(Region, Option<f64>)> {
        means.into_iter().map(|(r, m)| (r, Some(m))).collect()
    };
    let rank = rank_change(
        &as_items(region_means(records, LATEST_YEAR)),
        &as_items(region_means(records, PREVIOUS_YEAR)),
        region,
    );

    RegionSummary {
        region,
        mean_crime_rate,
        rank,
        provinces: members.len(),
    }
}

/// Picks the summary matching the selection: province first, then region,
/// then the national index comparison. The province follows
/// [`Selection::province_filter`].
pub fn summarize(records: &[ProvinceRecord], index: Option<IndexComparison>, selection: &Selection) -> Summary {
    if let Some(p) = selection.province_filter() {
        if let Some(s) = province_summary(records, p) {
            return Summary::Province(s);
        }
    }
    match selection.region {
        Some(region) => Summary::Region(region_summary(records, region)),
        None => Summary::National { index },
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
