// crates/provstat-core/src/harmonize.rs

//! # Dataset Harmonizer
//!
//! Turns independently published tables into one master table keyed by
//! canonical province name, plus one merged crime time series.
//!
//! Every step takes a table and hands back a new one; nothing is shared or
//! mutated behind the caller's back. Harmonization is best-effort: a value
//! that does not parse becomes missing and a name that does not resolve
//! simply fails to join. Neither is an error.

use crate::error::Result;
use crate::model::{columns, Region, NATIONAL_AGGREGATE};
use crate::table::{Cell, Table};
use crate::text::canonical_province;
use tracing::debug;

/// The canonical join key.
pub const PROVINCE_KEY: &str = columns::PROVINCE;

/// Other headers that identify the province column, in preference order.
pub const ALTERNATE_KEYS: &[&str] = &["Kepolisian Daerah"];

/// Provinces split off in 2022. Only the education source reports them and
/// none of the other sources can be joined against them.
pub const EDUCATION_EXCLUDED: &[&str] = &[
    "PAPUA BARAT DAYA",
    "PAPUA SELATAN",
    "PAPUA TENGAH",
    "PAPUA PEGUNUNGAN",
];

/// Stray column in the income source.
const INCOME_STRAY_COLUMN: &str = "Unnamed: 1";
const INCOME_FEB_SOURCE: &str = "Rata-rata Feb 2023";
const INCOME_AUG_SOURCE: &str = "Rata-rata Aug 2023";
const POPULATION_SOURCE: &str = "Jumlah Penduduk (Ribu)";
const GINI_SOURCE: &str = "2023";

/// Finds the province column, renames it to [`PROVINCE_KEY`] and rewrites
/// its values with [`canonical_province`].
///
/// The column is, in order of preference: an existing `Provinsi` column, a
/// known alternate header, or the first column. A table without columns is
/// returned unchanged.
pub fn normalize_province_key(mut table: Table) -> Table {
    if !table.has_column(PROVINCE_KEY) {
        let source = ALTERNATE_KEYS
            .iter()
            .find(|k| table.has_column(k))
            .map(|k| k.to_string())
            .or_else(|| table.columns().first().cloned());
        match source {
            Some(col) => {
                debug!(from = %col, "using column as province key");
                table.rename_column(&col, PROVINCE_KEY);
            }
            None => {
                debug!("table has no columns; province key left unmapped");
                return table;
            }
        }
    }

    table.map_column(PROVINCE_KEY, |cell| match cell {
        Cell::Missing => Cell::Missing,
        other => {
            let name = canonical_province(&other.to_string());
            if name.is_empty() {
                Cell::Missing
            } else {
                Cell::Text(name)
            }
        }
    });
    table
}

/// Outer-joins per-period crime tables on the province key.
///
/// Tables are merged in the order given (oldest first), which only decides
/// the column order: every year column of every input survives, and a
/// province found in a single period still yields one row.
pub fn merge_time_series(tables: Vec<Table>) -> Result<Table> {
    let mut tables = tables.into_iter().map(normalize_province_key);
    let Some(first) = tables.next() else {
        return Ok(Table::new([PROVINCE_KEY]));
    };
    tables.try_fold(first, |acc, next| acc.outer_join(&next, PROVINCE_KEY))
}

/// Raw inputs of [`build_master_table`].
#[derive(Clone, Debug)]
pub struct MasterSources {
    pub income: Table,
    pub education: Table,
    /// The most recent crime-risk period.
    pub crime_latest: Table,
    pub gini: Table,
    pub population: Table,
}

/// Builds the denormalized analysis table.
///
/// Joins income, education, latest crime, Gini and population on the
/// province key, drops rows without a province, coerces numbers, renames
/// and projects the known columns, then derives the education tiers and
/// the region label.
pub fn build_master_table(sources: MasterSources) -> Result<Table> {
    let MasterSources {
        mut income,
        education,
        crime_latest,
        gini,
        population,
    } = sources;

    income.drop_column(INCOME_STRAY_COLUMN);
    let income = normalize_province_key(income);

    let mut education = normalize_province_key(education);
    if let Some(idx) = education.column_index(PROVINCE_KEY) {
        education.retain_rows(|row| {
            !matches!(&row[idx], Cell::Text(name) if EDUCATION_EXCLUDED.contains(&name.as_str()))
        });
    }

    let crime = normalize_province_key(crime_latest);

    let mut gini = normalize_province_key(gini);
    gini.rename_column(GINI_SOURCE, columns::GINI);

    let population = normalize_province_key(population);

    let mut master = income
        .outer_join(&education, PROVINCE_KEY)?
        .outer_join(&crime, PROVINCE_KEY)?
        .outer_join(&gini, PROVINCE_KEY)?
        .outer_join(&population, PROVINCE_KEY)?;

    master.drop_missing_key(PROVINCE_KEY);

    let converted = master.coerce_numeric();
    debug!(converted, "numeric columns coerced");

    let crime_renames: Vec<(String, String)> = columns::CRIME_YEARS
        .iter()
        .map(|y| (y.to_string(), columns::crime(*y)))
        .collect();
    for (from, to) in &crime_renames {
        master.rename_column(from, to);
    }
    master.rename_columns(&[
        (INCOME_FEB_SOURCE, columns::INCOME_FEB),
        (INCOME_AUG_SOURCE, columns::INCOME_AUG),
        (POPULATION_SOURCE, columns::POPULATION),
    ]);

    let crime_cols: Vec<String> = columns::CRIME_YEARS.iter().map(|y| columns::crime(*y)).collect();
    let mut wanted: Vec<&str> = vec![
        columns::PROVINCE,
        columns::INCOME_FEB,
        columns::INCOME_AUG,
        columns::PRIMARY,
        columns::JUNIOR,
        columns::SENIOR,
    ];
    wanted.extend(crime_cols.iter().map(String::as_str));
    wanted.extend([columns::GINI, columns::POPULATION]);

    let mut master = master.select(&wanted);
    for col in &wanted[1..] {
        let lost = master.force_numeric(col);
        if lost > 0 {
            debug!(column = %col, lost, "unparseable cells coerced to missing");
        }
    }

    derive_education_tiers(&mut master);
    attach_regions(&mut master);
    Ok(master)
}

/// Adds the four highest-completed-level columns.
///
/// `tier_k = cumulative_k - cumulative_{k+1}`; the lowest tier is
/// `100 - primary`. A row with any missing cumulative rate gets missing
/// tiers. Skipped entirely if the table lacks any of the three rates.
pub fn derive_education_tiers(table: &mut Table) {
    let (Some(sd), Some(smp), Some(sma)) = (
        table.column(columns::PRIMARY).map(|c| c.map(Cell::as_f64).collect::<Vec<_>>()),
        table.column(columns::JUNIOR).map(|c| c.map(Cell::as_f64).collect::<Vec<_>>()),
        table.column(columns::SENIOR).map(|c| c.map(Cell::as_f64).collect::<Vec<_>>()),
    ) else {
        return;
    };

    let tiers: Vec<[Cell; 4]> = sd
        .iter()
        .zip(&smp)
        .zip(&sma)
        .map(|((sd, smp), sma)| match (sd, smp, sma) {
            (Some(sd), Some(smp), Some(sma)) => [
                Cell::Number(100.0 - sd),
                Cell::Number(sd - smp),
                Cell::Number(smp - sma),
                Cell::Number(*sma),
            ],
            _ => Default::default(),
        })
        .collect();

    let names = [
        columns::NO_PRIMARY,
        columns::PRIMARY_ONLY,
        columns::JUNIOR_ONLY,
        columns::SENIOR_OR_HIGHER,
    ];
    for (k, name) in names.iter().enumerate() {
        table.set_column(name, tiers.iter().map(|t| t[k].clone()).collect());
    }
}

/// Adds the `Region` column from the fixed lookup. Unknown provinces get a
/// missing region.
pub fn attach_regions(table: &mut Table) {
    let Some(provinces) = table.column(PROVINCE_KEY) else {
        return;
    };
    let regions: Vec<Cell> = provinces
        .map(|cell| {
            cell.as_str()
                .and_then(Region::for_province)
                .map_or(Cell::Missing, |r| Cell::from(r.label()))
        })
        .collect();
    table.set_column(columns::REGION, regions);
}

/// Removes the national aggregate row.
pub fn exclude_national_aggregate(table: &mut Table) {
    if let Some(idx) = table.column_index(PROVINCE_KEY) {
        table.retain_rows(|row| row[idx].as_str() != Some(NATIONAL_AGGREGATE));
    }
}
