// crates/provstat-core/src/oc_index.rs

//! Global organized-crime index: per-country criminality scores and the
//! world, continental and ASEAN rankings derived from them.

use crate::common::{Delta, RankChange};
use crate::error::Result;
use crate::loader::common_io::open_stream;
use crate::text::{equals_folded, standardize_number};
use crate::traits::NameMatch;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::warn;

/// Regional bloc used for the regional ranking.
pub const ASEAN_COUNTRIES: &[&str] = &[
    "Indonesia",
    "Malaysia",
    "Thailand",
    "Vietnam",
    "Philippines",
    "Singapore",
    "Myanmar",
    "Cambodia",
    "Laos",
    "Brunei",
    "Timor-Leste",
];

/// Smallest score change reported as a change.
pub const SCORE_DELTA_THRESHOLD: f64 = 0.01;

#[derive(Debug, Deserialize)]
struct OcRow {
    #[serde(rename = "Country")]
    country: String,
    #[serde(rename = "Continent", default)]
    continent: Option<String>,
    #[serde(rename = "Criminality")]
    criminality: String,
}

/// A country's score before ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexScore {
    pub country: String,
    pub continent: Option<String>,
    pub criminality: f64,
}

/// One ranked country for one index year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalCrimeIndexEntry {
    pub country: String,
    pub continent: Option<String>,
    pub year: u16,
    pub criminality: f64,
    /// 1 = highest score.
    pub world_rank: usize,
    pub continent_rank: Option<usize>,
    /// Only set for ASEAN members.
    pub asean_rank: Option<usize>,
}

impl NameMatch for GlobalCrimeIndexEntry {
    fn name_str(&self) -> &str {
        &self.country
    }
}

pub fn is_asean(country: &str) -> bool {
    ASEAN_COUNTRIES.iter().any(|c| equals_folded(c, country))
}

/// Reads `Country`/`Continent`/`Criminality` rows. Decimal commas are
/// accepted; rows whose score does not parse are dropped with a warning.
pub fn load_oc_index(path: &Path, delimiter: u8) -> Result<Vec<IndexScore>> {
    let reader = open_stream(path)?;
    read_oc_index_from(reader, delimiter)
}

pub fn read_oc_index_from<R: Read>(reader: R, delimiter: u8) -> Result<Vec<IndexScore>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut scores = Vec::new();
    for row in rdr.deserialize::<OcRow>() {
        let row = row?;
        match standardize_number(&row.criminality) {
            Some(criminality) => scores.push(IndexScore {
                country: row.country,
                continent: row.continent.filter(|c| !c.is_empty()),
                criminality,
            }),
            None => warn!(country = %row.country, value = %row.criminality, "criminality score not numeric; row skipped"),
        }
    }
    Ok(scores)
}

/// All ranked countries of one index year, ordered by world rank.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexSnapshot {
    pub year: u16,
    pub entries: Vec<GlobalCrimeIndexEntry>,
}

/// Ranks scores by descending criminality.
///
/// Ranks are positional: ties keep their source order (stable sort).
/// Continental ranks count within each continent; ASEAN ranks count only
/// ASEAN members.
pub fn rank_entries(scores: Vec<IndexScore>, year: u16) -> IndexSnapshot {
    let mut scores = scores;
    scores.sort_by(|a, b| b.criminality.total_cmp(&a.criminality));

    let mut per_continent: HashMap<String, usize> = HashMap::new();
    let mut asean = 0;
    let entries = scores
        .into_iter()
        .enumerate()
        .map(|(i, s)| {
            let continent_rank = s.continent.as_ref().map(|c| {
                let n = per_continent.entry(c.clone()).or_insert(0);
                *n += 1;
                *n
            });
            let asean_rank = is_asean(&s.country).then(|| {
                asean += 1;
                asean
            });
            GlobalCrimeIndexEntry {
                country: s.country,
                continent: s.continent,
                year,
                criminality: s.criminality,
                world_rank: i + 1,
                continent_rank,
                asean_rank,
            }
        })
        .collect();

    IndexSnapshot { year, entries }
}

impl IndexSnapshot {
    pub fn find(&self, country: &str) -> Option<&GlobalCrimeIndexEntry> {
        crate::traits::find_named(&self.entries, country)
    }

    pub fn world_total(&self) -> usize {
        self.entries.len()
    }

    pub fn continent_total(&self, continent: &str) -> usize {
        self.entries
            .iter()
            .filter(|e| e.continent.as_deref() == Some(continent))
            .count()
    }

    pub fn asean_total(&self) -> usize {
        self.entries.iter().filter(|e| e.asean_rank.is_some()).count()
    }
}

/// One country's standing in the current index versus the previous one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexComparison {
    pub country: String,
    pub current_year: u16,
    pub previous_year: u16,
    pub score: Delta,
    pub world: RankChange,
    pub continent: Option<RankChange>,
    pub asean: Option<RankChange>,
}

/// Compares `country` across two snapshots. `None` if it is absent from
/// the current one.
pub fn compare(
    current: &IndexSnapshot,
    previous: &IndexSnapshot,
    country: &str,
) -> Option<IndexComparison> {
    let now = current.find(country)?;
    let before = previous.find(country);

    let continent = now.continent_rank.map(|rank| RankChange {
        current: rank,
        previous: before.and_then(|b| b.continent_rank),
        total: now
            .continent
            .as_deref()
            .map_or(0, |c| current.continent_total(c)),
    });
    let asean = now.asean_rank.map(|rank| RankChange {
        current: rank,
        previous: before.and_then(|b| b.asean_rank),
        total: current.asean_total(),
    });

    Some(IndexComparison {
        country: now.country.clone(),
        current_year: current.year,
        previous_year: previous.year,
        score: Delta::new(
            now.criminality,
            before.map(|b| b.criminality),
            SCORE_DELTA_THRESHOLD,
        ),
        world: RankChange {
            current: now.world_rank,
            previous: before.map(|b| b.world_rank),
            total: current.world_total(),
        },
        continent,
        asean,
    })
}
