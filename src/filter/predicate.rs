//! Visibility predicate and obtainability derivation
//!
//! Six independent constraints, AND-combined, evaluated in a fixed order
//! with short-circuit rejection: obtainability, starter, gift, type,
//! method, rod. An entry with no constraints active always matches.
//!
//! Evaluated in two forms: per-entry (marker and popup rows) and
//! per-creature (list rows; true if ANY resolved entry matches).

use crate::data::model::{Creature, Dataset, Version};
use crate::filter::resolver::{resolve_entries, Entry};
use crate::filter::state::{FilterState, Method};

/// Creatures counted as starters when neither the entry nor the creature's
/// per-version metadata carries a starter flag.
const STARTERS: [&str; 5] = ["bulbasaur", "charmander", "squirtle", "pikachu", "eevee"];

/// Whether a creature can be obtained at all in a version.
///
/// The version's exclusion list wins outright; otherwise the creature is
/// obtainable iff it resolves to at least one entry.
pub fn is_obtainable(dataset: &Dataset, creature_id: &str, version: Version) -> bool {
    if dataset.is_excluded(creature_id, version) {
        return false;
    }
    !resolve_entries(dataset, creature_id, version).is_empty()
}

/// Per-entry form: does this single resolved entry survive the filters?
pub fn entry_matches(
    dataset: &Dataset,
    creature: &Creature,
    entry: &Entry,
    filters: &FilterState,
) -> bool {
    if filters.obtainable_only && !is_obtainable(dataset, &creature.id, filters.version) {
        return false;
    }

    if filters.starter_only && !entry_is_starter(creature, entry, filters.version) {
        return false;
    }

    if filters.gift_only && !entry.gift {
        return false;
    }

    if filters.types_enabled && !filters.selected_types.is_empty() {
        let intersects = creature
            .types
            .iter()
            .any(|tag| filters.selected_types.contains(tag));
        if !intersects {
            return false;
        }
    }

    if filters.method_enabled && filters.method != Method::Any {
        if !method_matches(filters.method, entry.method.as_deref()) {
            return false;
        }
        // Rod is only consulted under an active Fishing method filter.
        if filters.method == Method::Fishing && !rod_matches(filters, entry) {
            return false;
        }
    }

    true
}

/// Per-creature form: true iff ANY resolved entry survives the filters.
pub fn creature_matches(dataset: &Dataset, creature: &Creature, filters: &FilterState) -> bool {
    resolve_entries(dataset, &creature.id, filters.version)
        .iter()
        .any(|entry| entry_matches(dataset, creature, entry, filters))
}

/// Starter check fallback chain: entry flag, then the creature's per-version
/// metadata, then the fixed starter set.
fn entry_is_starter(creature: &Creature, entry: &Entry, version: Version) -> bool {
    if let Some(flag) = entry.starter {
        return flag;
    }
    if let Some(flag) = creature.version_meta(version).and_then(|meta| meta.starter) {
        return flag;
    }
    STARTERS.contains(&creature.id.as_str())
}

/// Keyword check against the lower-cased method text. A method with no
/// keyword table falls back to its own lower-cased name as a substring.
fn method_matches(method: Method, text: Option<&str>) -> bool {
    let text = match text {
        Some(text) => text.to_lowercase(),
        None => return false,
    };

    let keywords = method.keywords();
    if keywords.is_empty() {
        return text.contains(&method.label().to_lowercase());
    }
    keywords.iter().any(|keyword| text.contains(keyword))
}

/// Rod check: the rod name must appear in the entry's rod text, falling back
/// to the method text. An entry with neither passes automatically.
fn rod_matches(filters: &FilterState, entry: &Entry) -> bool {
    let haystack = entry.rod.as_deref().or(entry.method.as_deref());
    match haystack {
        Some(text) => text.to_lowercase().contains(filters.rod.needle()),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CreatureVersionMeta, Location, Record, RecordFields};
    use crate::filter::resolver::EntrySource;
    use crate::filter::state::Rod;
    use std::collections::HashMap;

    fn creature(id: &str, dex: u32, types: &[&str]) -> Creature {
        Creature {
            id: id.into(),
            name: id.into(),
            regional_dex: dex,
            types: types.iter().map(|t| t.to_string()).collect(),
            games: HashMap::new(),
        }
    }

    fn entry(method: Option<&str>) -> Entry {
        Entry {
            location_id: "route-1".into(),
            location_name: "Route 1".into(),
            source: EntrySource::Encounter,
            method: method.map(str::to_string),
            rate: None,
            levels: None,
            rod: None,
            starter: None,
            gift: false,
        }
    }

    fn dataset_with_pidgey() -> Dataset {
        Dataset::new(
            vec![Location {
                id: "route-1".into(),
                name: "Route 1".into(),
                coordinates: [10.0, 20.0],
                encounters: vec![Record {
                    creature_id: "pidgey".into(),
                    base: RecordFields {
                        method: Some("Walking in grass".into()),
                        ..RecordFields::default()
                    },
                    games: None,
                }],
                gifts: vec![],
            }],
            vec![creature("pidgey", 16, &["Normal", "Flying"])],
            HashMap::new(),
        )
    }

    #[test]
    fn test_no_entries_means_not_obtainable() {
        let dataset = dataset_with_pidgey();
        // No exclusion list involved; simply nothing resolves.
        assert!(!is_obtainable(&dataset, "mewtwo", Version::Red));
    }

    #[test]
    fn test_exclusion_list_overrides_entries() {
        let mut exclusions = HashMap::new();
        exclusions.insert("red".to_string(), vec!["pidgey".to_string()]);
        let mut dataset = dataset_with_pidgey();
        dataset.exclusions = exclusions;

        assert!(!resolve_entries(&dataset, "pidgey", Version::Red).is_empty());
        assert!(!is_obtainable(&dataset, "pidgey", Version::Red));
        // Other versions are untouched by red's list.
        assert!(is_obtainable(&dataset, "pidgey", Version::Blue));
    }

    #[test]
    fn test_unconstrained_filters_match_any_entry() {
        let dataset = dataset_with_pidgey();
        let pidgey = dataset.creature("pidgey").unwrap();
        let filters = FilterState::default();

        assert!(entry_matches(&dataset, pidgey, &entry(None), &filters));
        assert!(entry_matches(&dataset, pidgey, &entry(Some("Surfing")), &filters));
        assert!(creature_matches(&dataset, pidgey, &filters));
    }

    #[test]
    fn test_creature_with_no_entries_never_matches() {
        let dataset = dataset_with_pidgey();
        let mewtwo = creature("mewtwo", 150, &["Psychic"]);
        assert!(!creature_matches(&dataset, &mewtwo, &FilterState::default()));
    }

    #[test]
    fn test_obtainable_only_rejects_excluded() {
        let mut dataset = dataset_with_pidgey();
        dataset
            .exclusions
            .insert("red".to_string(), vec!["pidgey".to_string()]);
        let pidgey = dataset.creature("pidgey").unwrap().clone();

        let mut filters = FilterState::default();
        assert!(creature_matches(&dataset, &pidgey, &filters));
        filters.obtainable_only = true;
        assert!(!creature_matches(&dataset, &pidgey, &filters));
    }

    #[test]
    fn test_type_filter_requires_intersection() {
        let dataset = dataset_with_pidgey();
        let pidgey = dataset.creature("pidgey").unwrap();

        let mut filters = FilterState::default();
        filters.types_enabled = true;
        filters.toggle_type("Flying");
        assert!(entry_matches(&dataset, pidgey, &entry(None), &filters));

        filters.toggle_type("Flying");
        filters.toggle_type("Water");
        assert!(!entry_matches(&dataset, pidgey, &entry(None), &filters));

        // Tag match is case-sensitive.
        filters.toggle_type("Water");
        filters.toggle_type("flying");
        assert!(!entry_matches(&dataset, pidgey, &entry(None), &filters));
    }

    #[test]
    fn test_type_filter_enabled_with_empty_selection_passes() {
        let dataset = dataset_with_pidgey();
        let pidgey = dataset.creature("pidgey").unwrap();

        let mut filters = FilterState::default();
        filters.types_enabled = true;
        assert!(entry_matches(&dataset, pidgey, &entry(None), &filters));
    }

    #[test]
    fn test_method_keywords() {
        assert!(method_matches(Method::Walking, Some("Walking in tall grass")));
        assert!(method_matches(Method::Surfing, Some("Surf")));
        assert!(method_matches(Method::Trade, Some("In-game trade")));
        assert!(!method_matches(Method::Walking, Some("Surfing")));
        assert!(!method_matches(Method::Walking, None));
    }

    #[test]
    fn test_good_rod_text_passes_fishing_method() {
        // "Good Rod" contains no "fish"; the "rod" keyword carries it.
        assert!(method_matches(Method::Fishing, Some("Good Rod")));
        assert!(method_matches(Method::Fishing, Some("Fishing")));
    }

    #[test]
    fn test_rod_subfilter_matches_rod_text() {
        let dataset = dataset_with_pidgey();
        let pidgey = dataset.creature("pidgey").unwrap();

        let mut filters = FilterState::default();
        filters.method_enabled = true;
        filters.method = Method::Fishing;
        filters.rod = Rod::Good;

        let mut fishing = entry(Some("Fishing"));
        fishing.rod = Some("Good Rod".into());
        assert!(entry_matches(&dataset, pidgey, &fishing, &filters));

        filters.rod = Rod::Super;
        assert!(!entry_matches(&dataset, pidgey, &fishing, &filters));
    }

    #[test]
    fn test_rod_subfilter_falls_back_to_method_text() {
        let dataset = dataset_with_pidgey();
        let pidgey = dataset.creature("pidgey").unwrap();

        let mut filters = FilterState::default();
        filters.method_enabled = true;
        filters.method = Method::Fishing;
        filters.rod = Rod::Good;

        // No rod field; the method text "Good Rod" satisfies both checks.
        assert!(entry_matches(&dataset, pidgey, &entry(Some("Good Rod")), &filters));
        filters.rod = Rod::Old;
        assert!(!entry_matches(&dataset, pidgey, &entry(Some("Good Rod")), &filters));
    }

    #[test]
    fn test_rod_check_auto_passes_without_any_text() {
        let mut filters = FilterState::default();
        filters.rod = Rod::Super;

        // Neither rod nor method text: nothing to constrain against.
        assert!(rod_matches(&filters, &entry(None)));

        // A rod-free fishing method text is consulted and fails.
        assert!(!rod_matches(&filters, &entry(Some("fishing spot"))));

        // An explicit rod field takes precedence over the method text.
        let mut fishing = entry(Some("fishing spot"));
        fishing.rod = Some("Super Rod".into());
        assert!(rod_matches(&filters, &fishing));
    }

    #[test]
    fn test_gift_only_requires_gift_flag() {
        let dataset = dataset_with_pidgey();
        let pidgey = dataset.creature("pidgey").unwrap();

        let mut filters = FilterState::default();
        filters.gift_only = true;

        let mut e = entry(None);
        assert!(!entry_matches(&dataset, pidgey, &e, &filters));
        e.gift = true;
        assert!(entry_matches(&dataset, pidgey, &e, &filters));
    }

    #[test]
    fn test_starter_fallback_chain() {
        let dataset = dataset_with_pidgey();
        let mut filters = FilterState::default();
        filters.starter_only = true;

        // 1. Explicit entry flag wins.
        let pidgey = dataset.creature("pidgey").unwrap();
        let mut flagged = entry(None);
        flagged.starter = Some(true);
        assert!(entry_matches(&dataset, pidgey, &flagged, &filters));
        assert!(!entry_matches(&dataset, pidgey, &entry(None), &filters));

        // 2. Creature per-version metadata.
        let mut nidoran = creature("nidoran-f", 29, &["Poison"]);
        nidoran.games.insert(
            "red".into(),
            CreatureVersionMeta {
                starter: Some(true),
                ..CreatureVersionMeta::default()
            },
        );
        assert!(entry_matches(&dataset, &nidoran, &entry(None), &filters));

        // 3. Fixed starter set.
        let charmander = creature("charmander", 4, &["Fire"]);
        assert!(entry_matches(&dataset, &charmander, &entry(None), &filters));
    }

    #[test]
    fn test_pikachu_excluded_in_yellow_despite_other_versions() {
        // Pikachu resolves in red but is named in yellow's exclusion list
        // and has no yellow entries.
        let mut dataset = Dataset::new(
            vec![Location {
                id: "viridian-forest".into(),
                name: "Viridian Forest".into(),
                coordinates: [40.0, 12.0],
                encounters: vec![Record {
                    creature_id: "pikachu".into(),
                    base: RecordFields::default(),
                    games: Some(
                        [("red".to_string(), RecordFields::default())]
                            .into_iter()
                            .collect(),
                    ),
                }],
                gifts: vec![],
            }],
            vec![creature("pikachu", 25, &["Electric"])],
            HashMap::new(),
        );
        dataset
            .exclusions
            .insert("yellow".to_string(), vec!["pikachu".to_string()]);

        assert!(is_obtainable(&dataset, "pikachu", Version::Red));
        assert!(!is_obtainable(&dataset, "pikachu", Version::Yellow));
    }
}
