//! Filter configuration
//!
//! One value type capturing the whole filter panel: active version, the four
//! independent toggles, the selected type tags, and the method/rod pickers.
//! This is deliberately not a global: UI handlers mutate the application's
//! copy and every resolver/predicate call receives a snapshot by reference,
//! which keeps the predicate engine trivially testable.
//!
//! The state serializes to JSON so the panel can be restored across sessions.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::model::Version;

/// Capture-method filter choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Method {
    Any,
    Walking,
    Fishing,
    Surfing,
    Evolution,
    Trade,
}

impl Method {
    pub const ALL: [Method; 6] = [
        Method::Any,
        Method::Walking,
        Method::Fishing,
        Method::Surfing,
        Method::Evolution,
        Method::Trade,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Method::Any => "Any",
            Method::Walking => "Walking",
            Method::Fishing => "Fishing",
            Method::Surfing => "Surfing",
            Method::Evolution => "Evolution",
            Method::Trade => "Trade",
        }
    }

    /// Substring keywords an entry's method text is matched against.
    ///
    /// "rod" counts as a Fishing keyword: upstream data writes fishing
    /// methods as e.g. "Good Rod", which never contains "fish".
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Method::Any => &[],
            Method::Walking => &["grass", "walk"],
            Method::Fishing => &["fish", "rod"],
            Method::Surfing => &["surf"],
            Method::Evolution => &["evolution"],
            Method::Trade => &["trade"],
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Fishing-rod sub-filter, meaningful only when the method filter is Fishing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rod {
    Old,
    Good,
    Super,
}

impl Rod {
    pub const ALL: [Rod; 3] = [Rod::Old, Rod::Good, Rod::Super];

    pub fn label(&self) -> &'static str {
        match self {
            Rod::Old => "Old Rod",
            Rod::Good => "Good Rod",
            Rod::Super => "Super Rod",
        }
    }

    /// Lower-cased needle matched against an entry's rod text.
    pub fn needle(&self) -> &'static str {
        match self {
            Rod::Old => "old",
            Rod::Good => "good",
            Rod::Super => "super",
        }
    }
}

impl fmt::Display for Rod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The whole filter panel as one snapshot value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    /// Active game version; gates all resolution.
    pub version: Version,
    /// Show only creatures obtainable in the active version.
    pub obtainable_only: bool,
    /// Show only starter entries.
    pub starter_only: bool,
    /// Show only gift entries.
    pub gift_only: bool,
    /// Whether the type multi-select applies.
    pub types_enabled: bool,
    /// Selected type tags; only meaningful when `types_enabled`.
    pub selected_types: BTreeSet<String>,
    /// Whether the method picker applies.
    pub method_enabled: bool,
    pub method: Method,
    /// Rod sub-filter; only consulted when the method filter is Fishing.
    pub rod: Rod,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            version: Version::Red,
            obtainable_only: false,
            starter_only: false,
            gift_only: false,
            types_enabled: false,
            selected_types: BTreeSet::new(),
            method_enabled: false,
            method: Method::Any,
            rod: Rod::Old,
        }
    }
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no constraint beyond the version is active.
    pub fn is_unconstrained(&self) -> bool {
        let defaults = Self {
            version: self.version,
            ..Self::default()
        };
        *self == defaults
    }

    /// Flip a type tag in or out of the selection.
    pub fn toggle_type(&mut self, tag: &str) {
        if !self.selected_types.remove(tag) {
            self.selected_types.insert(tag.to_string());
        }
    }

    /// Clear every constraint, keeping the active version.
    pub fn reset(&mut self) {
        *self = Self {
            version: self.version,
            ..Self::default()
        };
    }

    /// Convert to JSON string for on-disk persistence
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse from JSON string (previous session's panel)
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unconstrained() {
        assert!(FilterState::default().is_unconstrained());
    }

    #[test]
    fn test_version_change_keeps_unconstrained() {
        let mut filters = FilterState::default();
        filters.version = Version::Yellow;
        assert!(filters.is_unconstrained());
    }

    #[test]
    fn test_toggle_type_round_trip() {
        let mut filters = FilterState::default();
        filters.toggle_type("Water");
        assert!(filters.selected_types.contains("Water"));
        filters.toggle_type("Water");
        assert!(filters.selected_types.is_empty());
    }

    #[test]
    fn test_reset_keeps_version() {
        let mut filters = FilterState::default();
        filters.version = Version::Blue;
        filters.obtainable_only = true;
        filters.method_enabled = true;
        filters.method = Method::Fishing;

        filters.reset();

        assert!(filters.is_unconstrained());
        assert_eq!(filters.version, Version::Blue);
    }

    #[test]
    fn test_json_round_trip() {
        let mut filters = FilterState::default();
        filters.version = Version::Yellow;
        filters.types_enabled = true;
        filters.toggle_type("Electric");
        filters.method_enabled = true;
        filters.method = Method::Fishing;
        filters.rod = Rod::Super;

        let json = filters.to_json().unwrap();
        let restored = FilterState::from_json(&json).unwrap();

        assert_eq!(filters, restored);
        assert!(!restored.is_unconstrained());
    }

    #[test]
    fn test_fishing_keywords_cover_rod_spelling() {
        assert!(Method::Fishing.keywords().contains(&"rod"));
        assert!(Method::Fishing.keywords().contains(&"fish"));
    }
}
