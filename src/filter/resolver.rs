//! Entry resolution
//!
//! Flattens the raw record shapes into `Entry` rows for one version: location
//! encounter and gift records (with per-version overrides applied) plus the
//! legacy rows embedded on a creature's per-version metadata. An empty result
//! means the creature is unavailable in that version at any known location.

use crate::data::model::{Dataset, LevelRange, Location, Record, RecordFields, Version};

/// Where an entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntrySource {
    Encounter,
    Gift,
}

/// One flattened encounter row: a creature appearing at a location in the
/// active version, with every override already applied.
#[derive(Debug, Clone)]
pub struct Entry {
    pub location_id: String,
    pub location_name: String,
    pub source: EntrySource,
    pub method: Option<String>,
    pub rate: Option<String>,
    pub levels: Option<LevelRange>,
    pub rod: Option<String>,
    /// Explicit starter flag; None means the record said nothing and the
    /// predicate falls back to creature metadata.
    pub starter: Option<bool>,
    /// Gift source implies true unless the record explicitly overrides it.
    pub gift: bool,
}

impl Entry {
    fn from_fields(location: &Location, source: EntrySource, fields: RecordFields) -> Self {
        let gift = fields
            .gift
            .unwrap_or(matches!(source, EntrySource::Gift));
        Entry {
            location_id: location.id.clone(),
            location_name: location.name.clone(),
            source,
            method: fields.method,
            rate: fields.rate,
            levels: fields.levels,
            rod: fields.rod,
            starter: fields.starter,
            gift,
        }
    }
}

/// Gather every entry for one creature in one version.
///
/// Order is deterministic: location-document order, encounters before gifts
/// per location, then the creature's embedded rows.
pub fn resolve_entries(dataset: &Dataset, creature_id: &str, version: Version) -> Vec<Entry> {
    let mut entries = Vec::new();

    for location in &dataset.locations {
        collect_matching(location, &location.encounters, EntrySource::Encounter, creature_id, version, &mut entries);
        collect_matching(location, &location.gifts, EntrySource::Gift, creature_id, version, &mut entries);
    }

    if let Some(creature) = dataset.creature(creature_id) {
        if let Some(meta) = creature.version_meta(version) {
            for row in &meta.locations {
                // Unknown ids were dropped at load; skip defensively anyway.
                if let Some(location) = dataset.location(&row.location_id) {
                    entries.push(Entry::from_fields(
                        location,
                        EntrySource::Encounter,
                        row.fields.clone(),
                    ));
                }
            }
        }
    }

    entries
}

/// Gather every entry at one location in one version, across all creatures.
/// This feeds marker visibility and popup rows.
pub fn location_entries(
    dataset: &Dataset,
    location: &Location,
    version: Version,
) -> Vec<(String, Entry)> {
    let mut entries = Vec::new();

    for record in &location.encounters {
        if let Some(fields) = record.fields_for(version) {
            entries.push((
                record.creature_id.clone(),
                Entry::from_fields(location, EntrySource::Encounter, fields),
            ));
        }
    }
    for record in &location.gifts {
        if let Some(fields) = record.fields_for(version) {
            entries.push((
                record.creature_id.clone(),
                Entry::from_fields(location, EntrySource::Gift, fields),
            ));
        }
    }

    // Legacy shape: rows embedded on the creatures that point back here.
    for creature in &dataset.creatures {
        if let Some(meta) = creature.version_meta(version) {
            for row in &meta.locations {
                if row.location_id == location.id {
                    entries.push((
                        creature.id.clone(),
                        Entry::from_fields(location, EntrySource::Encounter, row.fields.clone()),
                    ));
                }
            }
        }
    }

    entries
}

fn collect_matching(
    location: &Location,
    records: &[Record],
    source: EntrySource,
    creature_id: &str,
    version: Version,
    out: &mut Vec<Entry>,
) {
    for record in records {
        if record.creature_id != creature_id {
            continue;
        }
        if let Some(fields) = record.fields_for(version) {
            out.push(Entry::from_fields(location, source, fields));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Creature, CreatureVersionMeta, EmbeddedRecord};
    use std::collections::HashMap;

    fn record(creature_id: &str, fields: RecordFields) -> Record {
        Record {
            creature_id: creature_id.into(),
            base: fields,
            games: None,
        }
    }

    fn versioned_record(
        creature_id: &str,
        base: RecordFields,
        versions: &[(&str, RecordFields)],
    ) -> Record {
        let games: HashMap<String, RecordFields> = versions
            .iter()
            .map(|(v, f)| (v.to_string(), f.clone()))
            .collect();
        Record {
            creature_id: creature_id.into(),
            base,
            games: Some(games),
        }
    }

    fn location(id: &str, encounters: Vec<Record>, gifts: Vec<Record>) -> Location {
        Location {
            id: id.into(),
            name: id.to_uppercase(),
            coordinates: [10.0, 20.0],
            encounters,
            gifts,
        }
    }

    fn creature(id: &str, dex: u32) -> Creature {
        Creature {
            id: id.into(),
            name: id.into(),
            regional_dex: dex,
            types: vec![],
            games: HashMap::new(),
        }
    }

    #[test]
    fn test_resolve_keeps_location_order() {
        let dataset = Dataset::new(
            vec![
                location("route-1", vec![record("pidgey", RecordFields::default())], vec![]),
                location("route-2", vec![record("pidgey", RecordFields::default())], vec![]),
            ],
            vec![creature("pidgey", 16)],
            HashMap::new(),
        );

        let entries = resolve_entries(&dataset, "pidgey", Version::Red);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].location_id, "route-1");
        assert_eq!(entries[1].location_id, "route-2");
    }

    #[test]
    fn test_version_map_gates_inclusion() {
        let red_only = versioned_record(
            "pidgey",
            RecordFields {
                method: Some("Walking".into()),
                ..RecordFields::default()
            },
            &[(
                "red",
                RecordFields {
                    rate: Some("10%".into()),
                    ..RecordFields::default()
                },
            )],
        );
        let dataset = Dataset::new(
            vec![location("route-1", vec![red_only], vec![])],
            vec![creature("pidgey", 16)],
            HashMap::new(),
        );

        let red = resolve_entries(&dataset, "pidgey", Version::Red);
        assert_eq!(red.len(), 1);
        // Version-specific fields win, record-level fields are the fallback.
        assert_eq!(red[0].method.as_deref(), Some("Walking"));
        assert_eq!(red[0].rate.as_deref(), Some("10%"));

        assert!(resolve_entries(&dataset, "pidgey", Version::Yellow).is_empty());
    }

    #[test]
    fn test_gift_source_implies_gift_flag() {
        let dataset = Dataset::new(
            vec![location(
                "celadon",
                vec![],
                vec![record("eevee", RecordFields::default())],
            )],
            vec![creature("eevee", 133)],
            HashMap::new(),
        );

        let entries = resolve_entries(&dataset, "eevee", Version::Red);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].source, EntrySource::Gift);
        assert!(entries[0].gift);
    }

    #[test]
    fn test_gift_flag_explicit_override_wins() {
        let dataset = Dataset::new(
            vec![location(
                "celadon",
                vec![],
                vec![record(
                    "eevee",
                    RecordFields {
                        gift: Some(false),
                        ..RecordFields::default()
                    },
                )],
            )],
            vec![creature("eevee", 133)],
            HashMap::new(),
        );

        let entries = resolve_entries(&dataset, "eevee", Version::Red);
        assert!(!entries[0].gift);
    }

    #[test]
    fn test_embedded_rows_are_resolved() {
        let mut pikachu = creature("pikachu", 25);
        pikachu.games.insert(
            "yellow".into(),
            CreatureVersionMeta {
                obtainable: Some(true),
                starter: Some(true),
                gift: None,
                locations: vec![EmbeddedRecord {
                    location_id: "pallet".into(),
                    fields: RecordFields {
                        method: Some("Starter".into()),
                        ..RecordFields::default()
                    },
                }],
            },
        );
        let dataset = Dataset::new(
            vec![location("pallet", vec![], vec![])],
            vec![pikachu],
            HashMap::new(),
        );

        let entries = resolve_entries(&dataset, "pikachu", Version::Yellow);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].location_name, "PALLET");
        assert_eq!(entries[0].method.as_deref(), Some("Starter"));

        assert!(resolve_entries(&dataset, "pikachu", Version::Red).is_empty());
    }

    #[test]
    fn test_location_entries_cover_all_sources() {
        let mut bulbasaur = creature("bulbasaur", 1);
        bulbasaur.games.insert(
            "red".into(),
            CreatureVersionMeta {
                locations: vec![EmbeddedRecord {
                    location_id: "pallet".into(),
                    fields: RecordFields::default(),
                }],
                ..CreatureVersionMeta::default()
            },
        );
        let dataset = Dataset::new(
            vec![location(
                "pallet",
                vec![record("pidgey", RecordFields::default())],
                vec![record("eevee", RecordFields::default())],
            )],
            vec![bulbasaur, creature("pidgey", 16), creature("eevee", 133)],
            HashMap::new(),
        );

        let pallet = dataset.location("pallet").unwrap();
        let entries = location_entries(&dataset, pallet, Version::Red);
        let ids: Vec<&str> = entries.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["pidgey", "eevee", "bulbasaur"]);
    }
}
