//! Domain model for the two data documents
//!
//! These are the cleaned, validated shapes the rest of the application works
//! with. The loader owns the raw serde mirror of the JSON files and converts
//! into these types, so nothing downstream ever probes for alternate field
//! names or malformed coordinates.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The fixed set of game versions the data is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Version {
    Red,
    Blue,
    Yellow,
}

impl Version {
    pub const ALL: [Version; 3] = [Version::Red, Version::Blue, Version::Yellow];

    /// Key used by the JSON documents' per-version maps.
    pub fn key(&self) -> &'static str {
        match self {
            Version::Red => "red",
            Version::Blue => "blue",
            Version::Yellow => "yellow",
        }
    }

    /// Human-readable label for the version picker.
    pub fn label(&self) -> &'static str {
        match self {
            Version::Red => "Red",
            Version::Blue => "Blue",
            Version::Yellow => "Yellow",
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Level specification for an encounter: a single level or an inclusive range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelRange {
    Single(u32),
    Range(u32, u32),
}

impl LevelRange {
    /// Display text for popup and list rows ("5" or "3-7").
    pub fn display(&self) -> String {
        match self {
            LevelRange::Single(level) => format!("{}", level),
            LevelRange::Range(lo, hi) => format!("{}-{}", lo, hi),
        }
    }
}

/// The per-record fields an encounter or gift row can carry.
///
/// Every field is optional: a record-level set acts as the fallback and a
/// per-version override replaces individual fields (override wins, record
/// level is the default).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFields {
    pub method: Option<String>,
    pub rate: Option<String>,
    pub levels: Option<LevelRange>,
    pub rod: Option<String>,
    pub starter: Option<bool>,
    pub gift: Option<bool>,
}

impl RecordFields {
    /// Merge an override on top of these fields, field by field.
    pub fn merged_with(&self, over: &RecordFields) -> RecordFields {
        RecordFields {
            method: over.method.clone().or_else(|| self.method.clone()),
            rate: over.rate.clone().or_else(|| self.rate.clone()),
            levels: over.levels.or(self.levels),
            rod: over.rod.clone().or_else(|| self.rod.clone()),
            starter: over.starter.or(self.starter),
            gift: over.gift.or(self.gift),
        }
    }
}

/// A validated encounter or gift record attached to a location.
///
/// `games` carries per-version overrides; when it is present, the record only
/// exists for the versions it names.
#[derive(Debug, Clone)]
pub struct Record {
    pub creature_id: String,
    pub base: RecordFields,
    pub games: Option<HashMap<String, RecordFields>>,
}

impl Record {
    /// Resolve this record for one version.
    ///
    /// Returns the merged fields, or None when the record carries a version
    /// map that omits the requested version (absent for that version).
    pub fn fields_for(&self, version: Version) -> Option<RecordFields> {
        match &self.games {
            Some(games) => games
                .get(version.key())
                .map(|over| self.base.merged_with(over)),
            None => Some(self.base.clone()),
        }
    }
}

/// A renderable map location: validated coordinates plus its encounter rows.
#[derive(Debug, Clone)]
pub struct Location {
    pub id: String,
    pub name: String,
    /// (row, col) in map-image pixel space.
    pub coordinates: [f32; 2],
    pub encounters: Vec<Record>,
    pub gifts: Vec<Record>,
}

/// An encounter row embedded on a creature's per-version metadata
/// (the legacy document shape), joined to the location table by id.
#[derive(Debug, Clone)]
pub struct EmbeddedRecord {
    pub location_id: String,
    pub fields: RecordFields,
}

/// Per-version metadata on a creature.
#[derive(Debug, Clone, Default)]
pub struct CreatureVersionMeta {
    pub obtainable: Option<bool>,
    pub starter: Option<bool>,
    pub gift: Option<bool>,
    pub locations: Vec<EmbeddedRecord>,
}

/// A creature from the metadata document.
#[derive(Debug, Clone)]
pub struct Creature {
    pub id: String,
    pub name: String,
    /// Regional dex number, the default list ordering.
    pub regional_dex: u32,
    pub types: Vec<String>,
    pub games: HashMap<String, CreatureVersionMeta>,
}

impl Creature {
    pub fn version_meta(&self, version: Version) -> Option<&CreatureVersionMeta> {
        self.games.get(version.key())
    }
}

/// The loaded, immutable aggregate of both documents.
///
/// Built once at startup; every filtering pass reads it through the id
/// indexes. An empty dataset (load failure) renders as "nothing visible".
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub locations: Vec<Location>,
    /// Creatures in regional-dex order.
    pub creatures: Vec<Creature>,
    /// Per-version exclusion lists: creatures never obtainable in a version.
    pub exclusions: HashMap<String, Vec<String>>,
    location_index: HashMap<String, usize>,
    creature_index: HashMap<String, usize>,
}

impl Dataset {
    pub fn new(
        locations: Vec<Location>,
        mut creatures: Vec<Creature>,
        exclusions: HashMap<String, Vec<String>>,
    ) -> Self {
        creatures.sort_by_key(|c| c.regional_dex);

        let location_index = locations
            .iter()
            .enumerate()
            .map(|(i, loc)| (loc.id.clone(), i))
            .collect();
        let creature_index = creatures
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.clone(), i))
            .collect();

        Dataset {
            locations,
            creatures,
            exclusions,
            location_index,
            creature_index,
        }
    }

    pub fn location(&self, id: &str) -> Option<&Location> {
        self.location_index.get(id).map(|&i| &self.locations[i])
    }

    pub fn creature(&self, id: &str) -> Option<&Creature> {
        self.creature_index.get(id).map(|&i| &self.creatures[i])
    }

    /// Whether a version's exclusion list names this creature.
    /// A version with no list is equivalent to an empty list.
    pub fn is_excluded(&self, creature_id: &str, version: Version) -> bool {
        self.exclusions
            .get(version.key())
            .map(|ids| ids.iter().any(|id| id == creature_id))
            .unwrap_or(false)
    }
}
