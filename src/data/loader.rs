//! Document loader
//!
//! Reads the two JSON documents (`locations.json`, `pokemon.json`) from the
//! assets directory and converts their raw shapes into the validated domain
//! model. All normalization happens here, once: legacy creature-id field
//! aliases, the two level-range spellings, numeric vs. text appearance
//! rates. Downstream code never probes alternate field names.
//!
//! Degradation rules:
//! - a missing or unparsable document is a load error; the app keeps an
//!   empty dataset and renders nothing
//! - a location with malformed coordinates is skipped with a warning
//! - a record naming an unknown (or no) creature is skipped with a warning

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tokio::task;

use super::model::{
    Creature, CreatureVersionMeta, Dataset, EmbeddedRecord, LevelRange, Location, Record,
    RecordFields,
};

/// File names looked up inside the assets directory.
const LOCATIONS_FILE: &str = "locations.json";
const CREATURES_FILE: &str = "pokemon.json";

/// Errors that abort a document load.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Load the dataset from an assets directory.
///
/// Runs on a blocking thread because file IO and parsing are synchronous.
/// Errors are stringified for the message channel.
pub async fn load_dataset(data_dir: PathBuf) -> Result<Dataset, String> {
    task::spawn_blocking(move || load_dataset_blocking(&data_dir).map_err(|e| e.to_string()))
        .await
        .map_err(|e| format!("Task join error: {}", e))?
}

/// Blocking implementation of the dataset load.
pub fn load_dataset_blocking(data_dir: &Path) -> Result<Dataset, DataError> {
    let loc_doc: LocationsDoc = read_document(&data_dir.join(LOCATIONS_FILE))?;
    let dex_doc: CreaturesDoc = read_document(&data_dir.join(CREATURES_FILE))?;

    let dataset = build_dataset(loc_doc, dex_doc);
    println!(
        "🗺️  Loaded {} locations, {} creatures",
        dataset.locations.len(),
        dataset.creatures.len()
    );

    Ok(dataset)
}

fn read_document<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, DataError> {
    let text = fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| DataError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

// ========== Raw document mirror (serde shapes) ==========

#[derive(Debug, Deserialize)]
struct LocationsDoc {
    #[serde(default)]
    locations: Vec<RawLocation>,
}

#[derive(Debug, Deserialize)]
struct RawLocation {
    id: String,
    name: String,
    #[serde(default)]
    coordinates: Vec<f64>,
    #[serde(default)]
    encounters: Vec<RawRecord>,
    #[serde(default)]
    gifts: Vec<RawRecord>,
}

/// One encounter/gift row as it appears on disk. The creature id historically
/// appeared under several names; they are accepted here, once, as aliases.
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(
        default,
        alias = "pokemon_id",
        alias = "poke_id",
        alias = "pokemon",
        alias = "poke"
    )]
    id: Option<String>,
    #[serde(default)]
    method: Option<String>,
    #[serde(default, alias = "rate")]
    appearance_rate: Option<RawRate>,
    #[serde(default)]
    level_range: Option<RawLevel>,
    #[serde(default)]
    min_level: Option<u32>,
    #[serde(default)]
    max_level: Option<u32>,
    #[serde(default)]
    rod: Option<String>,
    #[serde(default)]
    starter: Option<bool>,
    #[serde(default)]
    gift: Option<bool>,
    #[serde(default)]
    games: Option<HashMap<String, RawOverride>>,
}

/// Version-specific override sub-object of a record.
#[derive(Debug, Deserialize)]
struct RawOverride {
    #[serde(default)]
    method: Option<String>,
    #[serde(default, alias = "rate")]
    appearance_rate: Option<RawRate>,
    #[serde(default)]
    level_range: Option<RawLevel>,
    #[serde(default)]
    min_level: Option<u32>,
    #[serde(default)]
    max_level: Option<u32>,
    #[serde(default)]
    rod: Option<String>,
    #[serde(default)]
    starter: Option<bool>,
    #[serde(default)]
    gift: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct CreaturesDoc {
    #[serde(default)]
    pokemon: Vec<RawCreature>,
    #[serde(default)]
    not_obtainable_by_game: HashMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct RawCreature {
    id: String,
    name: String,
    #[serde(default)]
    regional_dex: u32,
    #[serde(default)]
    types: Vec<String>,
    #[serde(default)]
    games: HashMap<String, RawCreatureMeta>,
}

#[derive(Debug, Deserialize)]
struct RawCreatureMeta {
    #[serde(default)]
    obtainable: Option<bool>,
    #[serde(default)]
    starter: Option<bool>,
    #[serde(default)]
    gift: Option<bool>,
    #[serde(default)]
    locations: Vec<RawEmbedded>,
}

/// Legacy shape: an encounter row embedded directly on the creature.
#[derive(Debug, Deserialize)]
struct RawEmbedded {
    #[serde(default)]
    location_id: Option<String>,
    #[serde(default)]
    method: Option<String>,
    #[serde(default, alias = "rate")]
    appearance_rate: Option<RawRate>,
    #[serde(default)]
    level_range: Option<RawLevel>,
    #[serde(default)]
    min_level: Option<u32>,
    #[serde(default)]
    max_level: Option<u32>,
    #[serde(default)]
    rod: Option<String>,
    #[serde(default)]
    starter: Option<bool>,
    #[serde(default)]
    gift: Option<bool>,
}

/// Appearance rate appears both as a bare number and as display text.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawRate {
    Number(f64),
    Text(String),
}

impl RawRate {
    fn normalize(self) -> String {
        match self {
            RawRate::Number(n) if n.fract() == 0.0 => format!("{}%", n as i64),
            RawRate::Number(n) => format!("{}%", n),
            RawRate::Text(s) => s,
        }
    }
}

/// Level range appears as a bare number or a two-element array; older rows
/// use min_level/max_level instead.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawLevel {
    Single(u32),
    Pair(Vec<u32>),
}

// ========== Conversion to the domain model ==========

/// Build the validated dataset from the two parsed documents.
fn build_dataset(loc_doc: LocationsDoc, dex_doc: CreaturesDoc) -> Dataset {
    let creatures: Vec<Creature> = dex_doc.pokemon.into_iter().map(convert_creature).collect();
    let known_ids: HashSet<String> = creatures.iter().map(|c| c.id.clone()).collect();

    let locations: Vec<Location> = loc_doc
        .locations
        .into_iter()
        .filter_map(|raw| convert_location(raw, &known_ids))
        .collect();

    // Only renderable locations count; rows pointing at a skipped location
    // would never reach the map.
    let known_locations: HashSet<String> = locations.iter().map(|l| l.id.clone()).collect();

    // Drop embedded rows that point at locations the map cannot render.
    let creatures = creatures
        .into_iter()
        .map(|mut creature| {
            for meta in creature.games.values_mut() {
                meta.locations.retain(|row| {
                    let known = known_locations.contains(&row.location_id);
                    if !known {
                        eprintln!(
                            "⚠️  {}: embedded row names unknown location '{}', skipping",
                            creature.id, row.location_id
                        );
                    }
                    known
                });
            }
            creature
        })
        .collect();

    Dataset::new(locations, creatures, dex_doc.not_obtainable_by_game)
}

fn convert_location(raw: RawLocation, known_ids: &HashSet<String>) -> Option<Location> {
    // A location is renderable only with exactly two finite coordinates.
    let coordinates = match raw.coordinates.as_slice() {
        [row, col] if row.is_finite() && col.is_finite() => [*row as f32, *col as f32],
        _ => {
            eprintln!(
                "⚠️  Location '{}' has malformed coordinates {:?}, skipping",
                raw.id, raw.coordinates
            );
            return None;
        }
    };

    let encounters = convert_records(raw.encounters, &raw.id, known_ids);
    let gifts = convert_records(raw.gifts, &raw.id, known_ids);

    Some(Location {
        id: raw.id,
        name: raw.name,
        coordinates,
        encounters,
        gifts,
    })
}

fn convert_records(
    raws: Vec<RawRecord>,
    location_id: &str,
    known_ids: &HashSet<String>,
) -> Vec<Record> {
    raws.into_iter()
        .filter_map(|raw| {
            let creature_id = match raw.id {
                Some(ref id) if known_ids.contains(id) => id.clone(),
                Some(ref id) => {
                    eprintln!(
                        "⚠️  {}: record names unknown creature '{}', skipping",
                        location_id, id
                    );
                    return None;
                }
                None => {
                    eprintln!("⚠️  {}: record carries no creature id, skipping", location_id);
                    return None;
                }
            };

            let base = RecordFields {
                method: raw.method,
                rate: raw.appearance_rate.map(RawRate::normalize),
                levels: normalize_levels(raw.level_range, raw.min_level, raw.max_level),
                rod: raw.rod,
                starter: raw.starter,
                gift: raw.gift,
            };
            let games = raw.games.map(|games| {
                games
                    .into_iter()
                    .map(|(version, over)| (version, convert_override(over)))
                    .collect()
            });

            Some(Record {
                creature_id,
                base,
                games,
            })
        })
        .collect()
}

fn convert_override(raw: RawOverride) -> RecordFields {
    RecordFields {
        method: raw.method,
        rate: raw.appearance_rate.map(RawRate::normalize),
        levels: normalize_levels(raw.level_range, raw.min_level, raw.max_level),
        rod: raw.rod,
        starter: raw.starter,
        gift: raw.gift,
    }
}

fn convert_creature(raw: RawCreature) -> Creature {
    let games = raw
        .games
        .into_iter()
        .map(|(version, meta)| {
            let locations = meta
                .locations
                .into_iter()
                .filter_map(|row| {
                    let location_id = row.location_id?;
                    Some(EmbeddedRecord {
                        location_id,
                        fields: RecordFields {
                            method: row.method,
                            rate: row.appearance_rate.map(RawRate::normalize),
                            levels: normalize_levels(row.level_range, row.min_level, row.max_level),
                            rod: row.rod,
                            starter: row.starter,
                            gift: row.gift,
                        },
                    })
                })
                .collect();

            (
                version,
                CreatureVersionMeta {
                    obtainable: meta.obtainable,
                    starter: meta.starter,
                    gift: meta.gift,
                    locations,
                },
            )
        })
        .collect();

    Creature {
        id: raw.id,
        name: raw.name,
        regional_dex: raw.regional_dex,
        types: raw.types,
        games,
    }
}

/// Normalize the two level spellings into one shape. A two-element
/// `level_range` wins over `min_level`/`max_level`; a degenerate range
/// collapses to a single level.
fn normalize_levels(
    range: Option<RawLevel>,
    min_level: Option<u32>,
    max_level: Option<u32>,
) -> Option<LevelRange> {
    match range {
        Some(RawLevel::Single(level)) => Some(LevelRange::Single(level)),
        Some(RawLevel::Pair(pair)) => match pair.as_slice() {
            [lo, hi] if lo == hi => Some(LevelRange::Single(*lo)),
            [lo, hi] => Some(LevelRange::Range(*lo, *hi)),
            _ => {
                eprintln!("⚠️  level_range with {} elements, ignoring", pair.len());
                None
            }
        },
        None => match (min_level, max_level) {
            (Some(lo), Some(hi)) if lo == hi => Some(LevelRange::Single(lo)),
            (Some(lo), Some(hi)) => Some(LevelRange::Range(lo, hi)),
            (Some(level), None) | (None, Some(level)) => Some(LevelRange::Single(level)),
            (None, None) => None,
        },
    }
}
