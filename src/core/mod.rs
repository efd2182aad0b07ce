// VarSleuth - core/mod.rs
//
// Core business logic layer.
// Must NOT depend on: ui, platform, app, or open files directly.

pub mod classify;
pub mod export;
pub mod model;
pub mod parser;
pub mod series;
