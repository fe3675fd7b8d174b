// crates/provstat-core/tests/pipeline.rs

use provstat_core::analysis::{self, Selection, Summary, TrendPoint};
use provstat_core::choropleth::{build_choropleth, Metric};
use provstat_core::model::{columns, Region};
use provstat_core::prelude::*;
use provstat_core::Cell;
use std::path::PathBuf;

fn fixtures() -> SourceConfig {
    SourceConfig::with_data_dir(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures"))
}

fn load() -> Dataset {
    Dataset::load_uncached(&fixtures()).expect("fixture dataset loads")
}

#[test]
fn stats_reflect_harmonized_sources() {
    let stats = load().stats();

    assert_eq!(stats.provinces, 5);
    assert_eq!(stats.provinces_with_region, 5);
    assert_eq!(stats.regions, 4);
    assert_eq!(stats.series_rows, 6);
    assert_eq!(stats.series_years, 12);
    assert_eq!(stats.indexed_countries_2021, 6);
    assert_eq!(stats.indexed_countries_2023, 6);
    assert_eq!(stats.shapes, 5);
}

#[test]
fn master_table_is_keyed_by_canonical_names() {
    let ds = load();

    let names: Vec<_> = ds.records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["ACEH", "BALI", "DKI JAKARTA", "KEPULAUAN RIAU", "PAPUA"]);
    assert!(!ds.master.has_column("Unnamed: 1"));
    assert_eq!(ds.master.columns().last().map(String::as_str), Some(columns::REGION));

    let jakarta = ds.province("Metro Jaya").unwrap();
    assert_eq!(jakarta.crime_rate(2023), Some(160.0));
    assert_eq!(jakarta.population, Some(10_672.1));
    assert_eq!(jakarta.region, Some(Region::Jawa));

    let kepri = ds.province("kep. riau").unwrap();
    assert_eq!(kepri.gini_ratio, Some(0.34));
    assert_eq!(kepri.income.august, Some(2_710_000.0));
}

#[test]
fn unparseable_and_blank_cells_become_missing() {
    let ds = load();
    let papua = ds.province("PAPUA").unwrap();

    assert_eq!(papua.income.february, None);
    assert_eq!(papua.income.august, Some(2_800_000.0));
    assert_eq!(papua.crime_rate(2023), None);
    assert_eq!(papua.crime_rate(2022), Some(150.0));
}

#[test]
fn education_tiers_are_derived() {
    let ds = load();
    let tiers = ds.province("ACEH").unwrap().education.unwrap();

    assert_eq!(tiers.no_primary, 2.5);
    assert_eq!(tiers.primary_only, 6.0);
    assert_eq!(tiers.junior_only, 20.0);
    assert_eq!(tiers.senior_or_higher, 71.5);
    assert!(ds.province("PAPUA TENGAH").is_none());
}

#[test]
fn time_series_keeps_every_period() {
    let ds = load();
    let series = &ds.crime_series;

    assert_eq!(series.years.first(), Some(&2012));
    assert_eq!(series.years.last(), Some(&2023));
    assert_eq!(series.value("DKI JAKARTA", 2012), Some(280.0));
    assert_eq!(series.value("PAPUA", 2016), None);
    assert!(series.province("INDONESIA").is_some());
    assert_eq!(
        ds.time_series.cell(0, columns::PROVINCE),
        Some(&Cell::from("ACEH"))
    );
}

#[test]
fn national_trend_excludes_aggregate() {
    let ds = load();
    let trend = analysis::crime_trend(&ds.crime_series, &Selection::all(), 2012..=2023);

    assert_eq!(trend.points.len(), 12);
    assert_eq!(trend.points[0], TrendPoint { year: 2012, value: 187.0 });
    assert_eq!(trend.points[4], TrendPoint { year: 2016, value: 171.25 });
}

#[test]
fn national_summary_compares_index_years() {
    let ds = load();
    let Summary::National { index: Some(cmp) } = ds.summary(&Selection::all()) else {
        panic!("expected national summary");
    };

    assert_eq!(cmp.world.current, 3);
    assert_eq!(cmp.world.change(), Some(0));
    assert_eq!(cmp.continent.unwrap().current, 2);
    assert_eq!(cmp.asean.unwrap().total, 4);
    assert!((cmp.score.change().unwrap() - 0.47).abs() < 1e-9);
    assert!(cmp.score.is_significant());
}

#[test]
fn province_summary_ranks_within_region_and_country() {
    let ds = load();
    let Summary::Province(s) = ds.summary(&Selection::all().with_province("Kep. Riau")) else {
        panic!("expected province summary");
    };

    assert_eq!(s.crime_rate.unwrap().change(), Some(-10.0));
    let regional = s.regional_rank.unwrap();
    assert_eq!((regional.current, regional.previous, regional.total), (1, Some(2), 2));
    let national = s.national_rank.unwrap();
    assert_eq!((national.current, national.total), (2, 4));
}

#[test]
fn region_without_latest_values_has_no_rank() {
    let ds = load();
    let Summary::Region(s) = ds.summary(&Selection::all().with_region(Region::Papua)) else {
        panic!("expected region summary");
    };
    assert_eq!(s.provinces, 1);
    assert!(s.mean_crime_rate.is_none());
    assert!(s.rank.is_none());
}

#[test]
fn top_and_table_views_follow_selection() {
    let ds = load();

    let top: Vec<_> = analysis::top_provinces(&ds.records, 2023, 3)
        .into_iter()
        .map(|(r, v)| (r.name.as_str(), v))
        .collect();
    assert_eq!(top, [("DKI JAKARTA", 160.0), ("ACEH", 100.0), ("KEPULAUAN RIAU", 95.0)]);

    let sumatra = Selection::all().with_region(Region::Sumatra);
    assert_eq!(sumatra.apply_table(&ds.master).len(), 2);
    assert_eq!(ds.provinces(Some(Region::Sumatra)), ["ACEH", "KEPULAUAN RIAU"]);
}

#[test]
fn choropleth_covers_reconciled_shapes() {
    let ds = load();
    let layer = build_choropleth(
        &ds.records,
        &ds.shapes,
        Metric::CrimeRate,
        &Selection::all(),
        &ViewConfig::default(),
    );

    assert_eq!(layer.features.len(), 5);
    assert_eq!(layer.range, Some((70.0, 160.0)));
    let papua = layer.features.iter().find(|f| f.province == "PAPUA").unwrap();
    assert!(papua.tooltip.ends_with("N/A"));

    let fc = layer.to_feature_collection(&ds.shapes);
    assert_eq!(fc.features.len(), 5);
}

#[test]
fn resolved_selection_uses_record_names() {
    let ds = load();
    let sel = ds.resolve(&Selection::all().with_province("Kepulauan  Riau")).unwrap();
    assert_eq!(sel.province.as_deref(), Some("KEPULAUAN RIAU"));

    let Summary::Province(s) = ds.summary(&sel) else {
        panic!("expected province summary");
    };
    assert_eq!(s.province, "KEPULAUAN RIAU");
    let top = analysis::top_provinces(sel.apply(&ds.records), 2023, 5);
    assert_eq!(top.len(), 1);

    let trend = analysis::crime_trend(&ds.crime_series, &sel, 2021..=2023);
    assert_eq!(trend.label, "KEPULAUAN RIAU");
    assert_eq!(trend.points.len(), 3);
}

#[test]
fn province_outside_region_is_rejected() {
    let ds = load();
    let sel = Selection::all().with_region(Region::Jawa).with_province("ACEH");
    let err = ds.resolve(&sel).unwrap_err();
    assert!(matches!(err, StatError::Unknown { kind: "province", .. }));

    assert!(ds.resolve(&Selection::all().with_region(Region::Sumatra).with_province("aceh")).is_ok());
}
