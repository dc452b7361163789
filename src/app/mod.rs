// LogPulse - app/mod.rs
//
// Application layer: orchestration, state management, backend transport.
// Dependencies: core layer.
// Must NOT depend on: ui, platform specifics.

pub mod controller;
pub mod fetcher;
pub mod session;
pub mod state;
pub mod subscriber;
