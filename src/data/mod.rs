//! Data layer
//!
//! This module owns everything about the two JSON documents:
//! - Validated domain types and the loaded aggregate (model.rs)
//! - Reading, parsing and normalizing the documents (loader.rs)

pub mod loader;
pub mod model;
