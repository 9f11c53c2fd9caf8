//! UI building blocks
//!
//! - map.rs: the pannable/zoomable map canvas with markers
//! - popup.rs: per-location popup payload and rendering
//! - panel.rs: filter sidebar and the derived creature list

pub mod map;
pub mod panel;
pub mod popup;
