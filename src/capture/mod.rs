//! Capture tracking
//!
//! Persisted "caught" flags and their fan-out to every UI surface bound to
//! the same capture key (store.rs).

pub mod store;
