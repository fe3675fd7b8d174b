//! Renders each subcommand as text or JSON.

use crate::args::{Commands, TableFormat};
use anyhow::{bail, Context};
use provstat_core::analysis::{self, Summary, LATEST_YEAR};
use provstat_core::choropleth::{build_choropleth, format_grouped};
use provstat_core::oc_index::{compare, IndexComparison};
use provstat_core::{Cell, Dataset, Delta, RankChange, Selection, Table, ViewConfig};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufWriter, Write};

/// Output settings shared by every command.
pub struct Report<'a, W: Write> {
    pub dataset: &'a Dataset,
    pub view: &'a ViewConfig,
    pub selection: &'a Selection,
    pub json: bool,
    pub out: W,
}

impl<W: Write> Report<'_, W> {
    fn emit_json<T: Serialize + ?Sized>(&mut self, value: &T) -> anyhow::Result<()> {
        serde_json::to_writer_pretty(&mut self.out, value)?;
        writeln!(self.out)?;
        Ok(())
    }

    pub fn run(&mut self, command: &Commands) -> anyhow::Result<()> {
        let ds = self.dataset;
        let resolved = ds.resolve(self.selection)?;
        let selection = &resolved;

        match command {
            Commands::Stats => {
                let stats = ds.stats();
                if self.json {
                    return self.emit_json(&stats);
                }
                writeln!(self.out, "Dataset statistics:")?;
                writeln!(
                    self.out,
                    "  Provinces: {} ({} with a region)",
                    stats.provinces, stats.provinces_with_region
                )?;
                writeln!(self.out, "  Regions: {}", stats.regions)?;
                writeln!(
                    self.out,
                    "  Crime series: {} rows x {} years",
                    stats.series_rows, stats.series_years
                )?;
                writeln!(
                    self.out,
                    "  OC index countries: {} (2021), {} (2023)",
                    stats.indexed_countries_2021, stats.indexed_countries_2023
                )?;
                writeln!(self.out, "  Map shapes: {}", stats.shapes)?;
            }

            Commands::Regions => {
                let regions = ds.regions();
                if self.json {
                    return self.emit_json(&regions);
                }
                for r in regions {
                    writeln!(self.out, "{r}")?;
                }
            }

            Commands::Provinces => {
                let names = ds.provinces(selection.region);
                if self.json {
                    return self.emit_json(&names);
                }
                for name in names {
                    writeln!(self.out, "{name}")?;
                }
            }

            Commands::Province { name } => {
                let Some(r) = ds.province(name) else {
                    bail!("Unknown province: {name}");
                };
                if self.json {
                    return self.emit_json(r);
                }
                let opt = |v: Option<f64>| v.map_or_else(|| "N/A".to_string(), format_grouped);
                writeln!(self.out, "Province: {}", r.name)?;
                writeln!(self.out, "Map name: {}", ds.mapping.to_geo(&r.name).unwrap_or("N/A"))?;
                writeln!(
                    self.out,
                    "Region: {}",
                    r.region.map_or("N/A", |g| g.label())
                )?;
                for (year, rate) in &r.crime_rate {
                    writeln!(self.out, "Crime rate {year}: {}", format_grouped(*rate))?;
                }
                writeln!(self.out, "Income Feb 2023: {}", opt(r.income.february))?;
                writeln!(self.out, "Income Aug 2023: {}", opt(r.income.august))?;
                writeln!(self.out, "Gini ratio: {}", opt(r.gini_ratio))?;
                writeln!(self.out, "Population (thousands): {}", opt(r.population))?;
                if let Some(e) = r.education {
                    writeln!(self.out, "Education, highest level (%):")?;
                    writeln!(self.out, "  No primary: {:.2}", e.no_primary)?;
                    writeln!(self.out, "  Primary: {:.2}", e.primary_only)?;
                    writeln!(self.out, "  Junior secondary: {:.2}", e.junior_only)?;
                    writeln!(self.out, "  Senior secondary or higher: {:.2}", e.senior_or_higher)?;
                }
            }

            Commands::Summary => {
                let summary = ds.summary(selection);
                if self.json {
                    return self.emit_json(&summary);
                }
                self.write_summary(&summary)?;
            }

            Commands::Trend => {
                let years = self.view.trend_first_year..=self.view.trend_last_year;
                let trend = analysis::crime_trend(&ds.crime_series, selection, years);
                if self.json {
                    return self.emit_json(&trend);
                }
                writeln!(self.out, "{}", trend.label)?;
                for p in &trend.points {
                    writeln!(self.out, "  {}  {:.2}", p.year, p.value)?;
                }
            }

            Commands::Top { limit } => {
                let n = limit.unwrap_or(self.view.top_n);
                let top = analysis::top_provinces(selection.apply(&ds.records), LATEST_YEAR, n);
                if self.json {
                    let rows: Vec<_> = top
                        .iter()
                        .map(|(r, v)| serde_json::json!({ "province": r.name, "crime_rate": v }))
                        .collect();
                    return self.emit_json(&rows);
                }
                for (i, (r, v)) in top.iter().enumerate() {
                    writeln!(self.out, "{:>2}. {:<28} {}", i + 1, r.name, format_grouped(*v))?;
                }
            }

            Commands::Scatter { x, y } => {
                let points = analysis::scatter(&ds.records, *x, *y, selection);
                if self.json {
                    return self.emit_json(&points);
                }
                writeln!(self.out, "province\tgroup\t{}\t{}", x.column(), y.column())?;
                for p in points {
                    writeln!(
                        self.out,
                        "{}\t{}\t{}\t{}",
                        p.province,
                        p.group.as_deref().unwrap_or(""),
                        p.x,
                        p.y
                    )?;
                }
            }

            Commands::Map { metric, output } => {
                let layer = build_choropleth(&ds.records, &ds.shapes, *metric, selection, self.view);
                let collection = layer.to_feature_collection(&ds.shapes);
                match output {
                    Some(path) => {
                        let file = File::create(path)
                            .with_context(|| format!("creating {}", path.display()))?;
                        let mut writer = BufWriter::new(file);
                        serde_json::to_writer(&mut writer, &collection)?;
                        writer.flush()?;
                        writeln!(
                            self.out,
                            "Wrote {} features ({}) to {}",
                            collection.features.len(),
                            layer.title,
                            path.display()
                        )?;
                    }
                    None if self.json => return self.emit_json(&collection),
                    None => {
                        writeln!(self.out, "{}", layer.title)?;
                        for f in &layer.features {
                            writeln!(
                                self.out,
                                "  {:<28} {:>16}  {}",
                                f.province,
                                f.value.map_or_else(|| "N/A".to_string(), format_grouped),
                                f.style.fill_color
                            )?;
                        }
                    }
                }
            }

            Commands::Rank { year, country } => {
                let snapshot = match year {
                    2021 => &ds.oc_2021,
                    2023 => &ds.oc_2023,
                    other => bail!("No index for {other}; use 2021 or 2023"),
                };
                match country {
                    Some(c) => {
                        let Some(cmp) = compare(&ds.oc_2023, &ds.oc_2021, c) else {
                            bail!("{c} is not in the {} index", ds.oc_2023.year);
                        };
                        if self.json {
                            return self.emit_json(&cmp);
                        }
                        self.write_index_comparison(&cmp)?;
                    }
                    None if self.json => return self.emit_json(snapshot),
                    None => {
                        for e in &snapshot.entries {
                            let asean = e.asean_rank.map(|r| format!(" [ASEAN #{r}]")).unwrap_or_default();
                            writeln!(
                                self.out,
                                "{:>3}. {} ({}) {:.2}{}",
                                e.world_rank,
                                e.country,
                                e.continent.as_deref().unwrap_or("?"),
                                e.criminality,
                                asean
                            )?;
                        }
                    }
                }
            }

            Commands::Table { format } => {
                let table = selection.apply_table(&ds.master);
                match format {
                    TableFormat::Csv => table.write_csv(&mut self.out)?,
                    TableFormat::Json => {
                        return self.emit_json(&json_rows(&table));
                    }
                }
            }
        }
        Ok(())
    }

    fn write_summary(&mut self, summary: &Summary) -> anyhow::Result<()> {
        match summary {
            Summary::National { index: Some(cmp) } => self.write_index_comparison(cmp)?,
            Summary::National { index: None } => {
                writeln!(self.out, "Indonesia is not listed in the organized crime index")?
            }
            Summary::Province(s) => {
                writeln!(self.out, "{} ({})", s.province, s.region.map_or("N/A", |r| r.label()))?;
                writeln!(self.out, "  Crime rate 2023: {}", opt_delta(s.crime_rate.as_ref()))?;
                writeln!(self.out, "  Rank in region: {}", opt_rank(s.regional_rank.as_ref()))?;
                writeln!(self.out, "  Rank nationally: {}", opt_rank(s.national_rank.as_ref()))?;
            }
            Summary::Region(s) => {
                writeln!(self.out, "{} ({} provinces)", s.region, s.provinces)?;
                writeln!(self.out, "  Mean crime rate 2023: {}", opt_delta(s.mean_crime_rate.as_ref()))?;
                writeln!(self.out, "  Rank among regions: {}", opt_rank(s.rank.as_ref()))?;
            }
        }
        Ok(())
    }

    fn write_index_comparison(&mut self, cmp: &IndexComparison) -> anyhow::Result<()> {
        writeln!(
            self.out,
            "Organized crime index, {} ({} -> {})",
            cmp.country, cmp.previous_year, cmp.current_year
        )?;
        writeln!(self.out, "  Criminality: {}", fmt_delta(&cmp.score))?;
        writeln!(self.out, "  World rank: {}", fmt_rank(&cmp.world))?;
        writeln!(self.out, "  Continent rank: {}", opt_rank(cmp.continent.as_ref()))?;
        writeln!(self.out, "  ASEAN rank: {}", opt_rank(cmp.asean.as_ref()))?;
        Ok(())
    }
}

fn fmt_delta(d: &Delta) -> String {
    match d.change() {
        Some(c) if d.is_significant() => format!("{:.2} ({c:+.2})", d.current),
        Some(_) => format!("{:.2} (no change)", d.current),
        None => format!("{:.2}", d.current),
    }
}

fn opt_delta(d: Option<&Delta>) -> String {
    d.map_or_else(|| "N/A".to_string(), fmt_delta)
}

fn fmt_rank(r: &RankChange) -> String {
    match r.previous {
        Some(p) if p != r.current => format!("{} of {} (was {p})", r.current, r.total),
        Some(_) => format!("{} of {} (no change)", r.current, r.total),
        None => format!("{} of {}", r.current, r.total),
    }
}

fn opt_rank(r: Option<&RankChange>) -> String {
    r.map_or_else(|| "N/A".to_string(), fmt_rank)
}

/// One JSON object per row, keyed by column name.
fn json_rows(table: &Table) -> Vec<Map<String, Value>> {
    table
        .rows()
        .iter()
        .map(|row| {
            table
                .columns()
                .iter()
                .zip(row)
                .map(|(name, cell)| {
                    let value = match cell {
                        Cell::Missing => Value::Null,
                        Cell::Number(v) => serde_json::json!(v),
                        Cell::Text(s) => Value::String(s.clone()),
                    };
                    (name.clone(), value)
                })
                .collect()
        })
        .collect()
}
