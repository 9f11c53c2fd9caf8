//! Filtering engine
//!
//! The three pieces that decide what is visible:
//! - state.rs: the filter-panel snapshot value
//! - resolver.rs: flattens location/gift records into per-version entries
//! - predicate.rs: the AND-combined visibility constraints and the
//!   obtainability derivation

pub mod predicate;
pub mod resolver;
pub mod state;
