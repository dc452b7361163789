// LogPulse - ui/panels/mod.rs

pub mod about;
pub mod charts;
pub mod detail;
pub mod filters;
pub mod stats;
pub mod summary;
pub mod table;
