// LogPulse - core/mod.rs
//
// Core business logic layer: data model, filter predicate, record store,
// wire validation, chart data, export.
// Must NOT depend on: ui, platform, app, or any network crate.

pub mod export;
pub mod filter;
pub mod model;
pub mod stats;
pub mod store;
pub mod wire;
